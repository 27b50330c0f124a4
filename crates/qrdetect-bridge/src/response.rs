// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Response mapping: outcomes onto the resolve channel, errors onto the
// reject channel.

use qrdetect_core::error::Result;
use qrdetect_core::rejection::Rejection;
use qrdetect_core::types::{DecodeOutcome, DetectResponse};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// What a dispatched call settles to: a resolved value or a rejection.
pub type Settlement = std::result::Result<Value, Rejection>;

/// Serialise a decode outcome as the response map.
pub fn resolve(outcome: DecodeOutcome) -> Result<Value> {
    Ok(serde_json::to_value(DetectResponse::from(outcome))?)
}

/// Single-value form of a settlement, for hosts that cannot take two
/// channels (e.g. a JNI call returning one string).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Envelope {
    Ok(Value),
    Err(Rejection),
}

impl From<Settlement> for Envelope {
    fn from(settlement: Settlement) -> Self {
        match settlement {
            Ok(value) => Self::Ok(value),
            Err(rejection) => Self::Err(rejection),
        }
    }
}

impl Envelope {
    pub fn to_json_string(&self) -> String {
        // An Envelope holds only JSON values and plain strings.
        serde_json::to_string(self).unwrap_or_else(|err| {
            serde_json::json!({
                "err": { "code": "UNKNOWN_ERROR", "message": err.to_string() }
            })
            .to_string()
        })
    }
}
