// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// qrdetect — Core types, error codes, and configuration shared across all crates.

pub mod config;
pub mod error;
pub mod rejection;
pub mod types;

pub use config::DetectorConfig;
pub use error::DetectorError;
pub use rejection::{ErrorCode, Rejection};
pub use types::*;
