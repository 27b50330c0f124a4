// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>

//! qrdetect — Native-module bridge for QR detection.
//!
//! The host application framework dispatches calls by module and method
//! name through a [`module::ModuleRegistry`]. The one module shipped here,
//! [`detector::QrDetectorModule`], turns an image reference into a decoded
//! QR payload, and classifies every failure into a `(code, message)`
//! rejection before it crosses back to the host.

pub mod detector;
pub mod inspector;
pub mod module;
pub mod request;
pub mod response;
pub mod shared;

#[cfg(target_os = "android")]
pub mod android;

pub use detector::{QrDetectorModule, DETECT_METHOD, MODULE_NAME};
pub use module::{default_package, ModuleRegistry, NativeModule};
pub use shared::SharedDetector;
