// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image module — decoded raster images and their pixel layouts.

pub mod raster;

pub use raster::{ColorFormat, RasterImage};
