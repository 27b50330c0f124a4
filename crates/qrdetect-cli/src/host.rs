// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Host wiring: registry lifecycle around one dispatched call.

use std::process::ExitCode;

use qrdetect_bridge::inspector::attach_debug_tools;
use qrdetect_bridge::{DETECT_METHOD, MODULE_NAME, ModuleRegistry, default_package};
use qrdetect_core::config::DetectorConfig;
use qrdetect_core::error::Result;
use tracing::info;

use crate::args::Args;

/// A QR code was found and decoded.
pub const EXIT_DECODED: u8 = 0;
/// The call resolved without a payload (nothing found, or no value).
pub const EXIT_NO_PAYLOAD: u8 = 1;
/// The call was rejected, or the host could not start.
pub const EXIT_REJECTED: u8 = 2;

/// Register the shipped package and, in debug builds, the inspector.
pub fn build_registry(config: &DetectorConfig) -> Result<ModuleRegistry> {
    let mut registry = ModuleRegistry::new();
    registry.register_package(default_package(config)?)?;
    if attach_debug_tools(&mut registry, config) {
        info!("debug tools enabled");
    }
    Ok(registry)
}

pub async fn run(args: &Args) -> Result<ExitCode> {
    let config = args.detector_config()?;
    let mut registry = build_registry(&config)?;

    let settlement = registry
        .dispatch(MODULE_NAME, DETECT_METHOD, args.request())
        .await;

    if args.show_calls {
        if let Some(inspector) = registry.inspector() {
            for record in inspector.recent() {
                eprintln!("{}", serde_json::to_string(&record)?);
            }
        }
    }
    registry.destroy_all();

    let code = match settlement {
        Ok(response) => {
            println!("{}", serde_json::to_string_pretty(&response)?);
            if response["success"] == true {
                EXIT_DECODED
            } else {
                EXIT_NO_PAYLOAD
            }
        }
        Err(rejection) => {
            eprintln!("{}", serde_json::to_string(&rejection)?);
            EXIT_REJECTED
        }
    };
    Ok(ExitCode::from(code))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn registry_exposes_detector() {
        let config = DetectorConfig {
            debug_tools: false,
            ..Default::default()
        };
        let mut registry = build_registry(&config).unwrap();
        assert!(registry.get(MODULE_NAME).is_some());
        assert!(registry.inspector().is_none());
        registry.destroy_all();
    }
}
