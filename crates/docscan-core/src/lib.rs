// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// docscan — Core types, configuration, and error definitions shared across
// all crates.

pub mod config;
pub mod error;
pub mod human_errors;
pub mod transition;
pub mod types;

pub use config::ScanConfig;
pub use error::{ErrorKind, ScanError};
pub use transition::{ScanEvent, Transition};
pub use types::*;
