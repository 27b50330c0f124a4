// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the QR detector bridge.

use serde::{Deserialize, Serialize};

/// Message returned when the recognizer ran and found nothing.
pub const NOT_FOUND_MESSAGE: &str = "No QR code found in image";

/// Message returned when a code region was located but carried no payload.
pub const EMPTY_VALUE_MESSAGE: &str = "QR code detected but value is null";

/// Message for requests that carry neither `path` nor `base64`.
pub const MISSING_SOURCE_MESSAGE: &str = "Image data must contain a valid path or base64 string";

/// Message for the reserved inline-data variant.
pub const INLINE_DATA_UNSUPPORTED_MESSAGE: &str = "Base64 image processing not implemented yet";

/// Reference to the image a caller wants scanned.
///
/// Exactly one variant is ever populated. A request that names neither is
/// rejected at the boundary; there is no "empty path" default.
/// Built from the host's `path` / `base64` keys at the request boundary;
/// not serialised itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSourceDescriptor {
    /// A locally resolvable image: filesystem path or `file://` URI.
    Path(String),
    /// Base64-encoded image bytes. Accepted for shape compatibility only.
    InlineData(String),
}

impl ImageSourceDescriptor {
    /// Short tag used in logs (never the payload itself).
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Path(_) => "path",
            Self::InlineData(_) => "inline_data",
        }
    }
}

/// Normalised result of one decode attempt that reached the recognizer.
///
/// Failures travel on the `Err` side of `detect`'s result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeOutcome {
    /// The first candidate carried a non-empty payload.
    Success { payload: String },
    /// A code was geometrically located but no payload could be extracted.
    EmptyValue,
    /// The recognizer ran and returned zero candidates.
    NotFound,
}

impl DecodeOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

/// Structured map handed back to the host on the resolve channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectResponse {
    pub success: bool,
    #[serde(rename = "qrCode", default, skip_serializing_if = "Option::is_none")]
    pub qr_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<DecodeOutcome> for DetectResponse {
    fn from(outcome: DecodeOutcome) -> Self {
        match outcome {
            DecodeOutcome::Success { payload } => Self {
                success: true,
                qr_code: Some(payload),
                error: None,
            },
            DecodeOutcome::EmptyValue => Self {
                success: false,
                qr_code: None,
                error: Some(EMPTY_VALUE_MESSAGE.into()),
            },
            DecodeOutcome::NotFound => Self {
                success: false,
                qr_code: None,
                error: Some(NOT_FOUND_MESSAGE.into()),
            },
        }
    }
}
