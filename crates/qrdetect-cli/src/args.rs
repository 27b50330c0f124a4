// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Command-line arguments.

use std::path::PathBuf;

use clap::Parser;
use qrdetect_core::config::DetectorConfig;
use qrdetect_core::error::Result;
use serde_json::{Map, Value};

/// Detect a QR code in an image through the QR detector native module.
#[derive(Debug, Parser)]
#[command(name = "qrdetect", version, about)]
pub struct Args {
    /// Image path or file:// URI.
    pub path: Option<String>,

    /// Send an inline base64 image instead of (or alongside) a path.
    #[arg(long, value_name = "DATA")]
    pub base64: Option<String>,

    /// JSON configuration file.
    #[arg(long, short, env = "QRDETECT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Give up on a recognition after this many milliseconds.
    #[arg(long, value_name = "MS")]
    pub timeout_ms: Option<u64>,

    /// Downscale images whose longest side exceeds this (0 disables).
    #[arg(long, value_name = "PX")]
    pub max_dimension: Option<u32>,

    /// Do not attach the debug call inspector.
    #[arg(long)]
    pub no_debug_tools: bool,

    /// Print the inspector's call records to stderr before exiting.
    #[arg(long)]
    pub show_calls: bool,
}

impl Args {
    /// The detect request map the host would send.
    pub fn request(&self) -> Value {
        let mut map = Map::new();
        if let Some(path) = &self.path {
            map.insert("path".into(), Value::String(path.clone()));
        }
        if let Some(data) = &self.base64 {
            map.insert("base64".into(), Value::String(data.clone()));
        }
        Value::Object(map)
    }

    /// File config (or defaults) with command-line overrides applied.
    pub fn detector_config(&self) -> Result<DetectorConfig> {
        let mut config = match &self.config {
            Some(path) => DetectorConfig::load(path)?,
            None => DetectorConfig::default(),
        };
        if let Some(ms) = self.timeout_ms {
            config.recognizer_timeout_ms = Some(ms);
        }
        if let Some(px) = self.max_dimension {
            config.max_image_dimension = px;
        }
        if self.no_debug_tools {
            config.debug_tools = false;
        }
        config.validate()?;
        Ok(config)
    }
}
