// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for qrdetect.

use std::time::Duration;

use thiserror::Error;

/// Top-level error type for all qrdetect operations.
///
/// Every variant is classified into one of the four wire error codes by
/// [`crate::rejection::ErrorCode::classify`] before it leaves the bridge.
#[derive(Debug, Error)]
pub enum DetectorError {
    // -- Request errors --
    #[error("{0}")]
    InvalidInput(String),

    #[error("{0}")]
    UnsupportedInput(String),

    // -- Image resolution --
    #[error("{0}")]
    ImageRead(String),

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    // -- Recognizer --
    #[error("{0}")]
    Detection(String),

    #[error("recognizer timed out after {} ms", .0.as_millis())]
    Timeout(Duration),

    #[error("recognizer has been released")]
    RecognizerReleased,

    #[error("recognizer dropped the request without completing it")]
    RecognizerAbandoned,

    #[error("{0}")]
    Unexpected(String),

    // -- Host framework --
    #[error("no native module named {0:?}")]
    UnknownModule(String),

    #[error("module {module:?} has no method {method:?}")]
    UnknownMethod { module: String, method: String },

    #[error("a native module named {0:?} is already registered")]
    DuplicateModule(String),

    #[error("platform bridge error: {0}")]
    Bridge(String),

    // -- Configuration --
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, DetectorError>;
