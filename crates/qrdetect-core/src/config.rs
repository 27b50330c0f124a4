// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Detector configuration.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{DetectorError, Result};

/// Settings fixed for the lifetime of a detector module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    /// Images whose longest side exceeds this are downscaled before
    /// recognition. 0 disables downscaling.
    pub max_image_dimension: u32,
    /// Upper bound on one recognition. `None` waits for the recognizer
    /// however long it takes.
    pub recognizer_timeout_ms: Option<u64>,
    /// Attach the call inspector. Only honoured in debug builds.
    pub debug_tools: bool,
    /// How many dispatched calls the inspector keeps.
    pub inspector_capacity: usize,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            max_image_dimension: 2048,
            recognizer_timeout_ms: None,
            debug_tools: cfg!(debug_assertions),
            inspector_capacity: 64,
        }
    }
}

impl DetectorConfig {
    /// Read a JSON config file. Missing keys take their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let data = std::fs::read_to_string(path.as_ref())?;
        let config: Self = serde_json::from_str(&data)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings that would make every call fail.
    pub fn validate(&self) -> Result<()> {
        if self.recognizer_timeout_ms == Some(0) {
            return Err(DetectorError::Config(
                "recognizer_timeout_ms must be greater than zero".into(),
            ));
        }
        if self.debug_tools && self.inspector_capacity == 0 {
            return Err(DetectorError::Config(
                "inspector_capacity must be greater than zero when debug_tools is on".into(),
            ));
        }
        Ok(())
    }

    pub fn recognizer_timeout(&self) -> Option<Duration> {
        self.recognizer_timeout_ms.map(Duration::from_millis)
    }
}
