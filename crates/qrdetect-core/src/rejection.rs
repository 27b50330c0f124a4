// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Error-code classification for the bridge boundary.
//
// Every `DetectorError` is mapped to exactly one of four wire codes plus a
// caller-facing message before it crosses into the host application. Nothing
// leaves the bridge unclassified.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::DetectorError;

/// Wire error code carried on the rejection channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Malformed or unsupported request shape. Detected before any
    /// recognizer call.
    InvalidInput,
    /// The recognizer reported a processing failure.
    DetectionError,
    /// The image reference could not be resolved or read.
    IoError,
    /// Anything the other three do not cover.
    UnknownError,
}

impl ErrorCode {
    /// The code as it appears on the wire (`"INVALID_INPUT"` etc.).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidInput => "INVALID_INPUT",
            Self::DetectionError => "DETECTION_ERROR",
            Self::IoError => "IO_ERROR",
            Self::UnknownError => "UNKNOWN_ERROR",
        }
    }

    /// Classify an error into its wire code.
    pub fn classify(err: &DetectorError) -> Self {
        match err {
            DetectorError::InvalidInput(_) | DetectorError::UnsupportedInput(_) => {
                Self::InvalidInput
            }
            DetectorError::ImageRead(_) | DetectorError::Io(_) => Self::IoError,
            DetectorError::Detection(_) | DetectorError::Timeout(_) => Self::DetectionError,
            DetectorError::RecognizerReleased
            | DetectorError::RecognizerAbandoned
            | DetectorError::Unexpected(_)
            | DetectorError::UnknownModule(_)
            | DetectorError::UnknownMethod { .. }
            | DetectorError::DuplicateModule(_)
            | DetectorError::Bridge(_)
            | DetectorError::Config(_)
            | DetectorError::Serialization(_) => Self::UnknownError,
        }
    }

    /// Whether the caller can fix the failure by sending a corrected
    /// request. Detection errors are surfaced verbatim and never retried
    /// here.
    pub fn caller_recoverable(&self) -> bool {
        matches!(self, Self::InvalidInput | Self::IoError)
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A `(code, message)` pair delivered on the host's error channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rejection {
    pub code: ErrorCode,
    pub message: String,
}

impl Rejection {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl From<&DetectorError> for Rejection {
    fn from(err: &DetectorError) -> Self {
        let code = ErrorCode::classify(err);
        let message = match (code, err) {
            (ErrorCode::InvalidInput, _) => err.to_string(),
            (ErrorCode::IoError, DetectorError::Io(io)) => format!("Failed to read image: {io}"),
            (ErrorCode::IoError, _) => format!("Failed to read image: {err}"),
            (ErrorCode::DetectionError, _) => format!("Failed to process image: {err}"),
            (ErrorCode::UnknownError, _) => format!("An unexpected error occurred: {err}"),
        };
        Self { code, message }
    }
}

impl From<DetectorError> for Rejection {
    fn from(err: DetectorError) -> Self {
        Self::from(&err)
    }
}
