// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Request parsing: loosely-typed host arguments into an explicit descriptor.

use qrdetect_core::error::{DetectorError, Result};
use qrdetect_core::types::{ImageSourceDescriptor, MISSING_SOURCE_MESSAGE};
use serde_json::Value;

/// Validate a detect request map on entry.
///
/// `{ "path": "..." }` is preferred and wins when both keys are present.
/// `{ "base64": ... }` yields the inline-data variant whatever its value.
/// A `null` value counts as absent.
pub fn parse_descriptor(args: &Value) -> Result<ImageSourceDescriptor> {
    let map = args.as_object().ok_or_else(|| {
        DetectorError::InvalidInput(format!(
            "Image data must be an object with a path or base64 key, got {}",
            value_kind(args)
        ))
    })?;

    match map.get("path") {
        Some(Value::String(path)) => return Ok(ImageSourceDescriptor::Path(path.clone())),
        Some(Value::Null) | None => {}
        Some(other) => {
            return Err(DetectorError::InvalidInput(format!(
                "Image path must be a string, got {}",
                value_kind(other)
            )));
        }
    }

    match map.get("base64") {
        Some(Value::String(data)) => Ok(ImageSourceDescriptor::InlineData(data.clone())),
        Some(Value::Null) | None => Err(DetectorError::InvalidInput(MISSING_SOURCE_MESSAGE.into())),
        Some(other) => Ok(ImageSourceDescriptor::InlineData(other.to_string())),
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
