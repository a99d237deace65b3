// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// docscan-session — One scan request from start to a single outcome.
//
// `Scanner::start_scan` spawns a session task that walks the stage machine
// (source selection, acquisition, detection, confirmation, rectification,
// export) through the bridge collaborators and delivers exactly one
// `ScanOutcome` through its completion slot.

pub mod cancel;
pub mod completion;
pub mod export;
pub mod outcome;
pub mod scanner;
mod session;

pub use cancel::{CancelHandle, CancelToken, cancel_pair};
pub use completion::CompletionSlot;
pub use export::{ExportAdapter, StoredScan};
pub use outcome::{ScanOutcome, ScanResult};
pub use scanner::{ScanHandle, Scanner};
