// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Process-wide detector slot for hosts that call in through free functions
// (JNI) rather than a registry they own.
//
// The slot is built lazily on first use and torn down once. Teardown is
// sticky: a destroy notification that arrives before anything was built
// still wins, and no later call builds a fresh recognizer.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

use qrdetect_core::config::DetectorConfig;
use qrdetect_core::error::{DetectorError, Result};
use tracing::info;

use crate::detector::QrDetectorModule;

/// Lazily built, once-destroyed detector module.
#[derive(Default)]
pub struct SharedDetector {
    module: OnceLock<Arc<QrDetectorModule>>,
    destroyed: AtomicBool,
}

impl SharedDetector {
    pub const fn new() -> Self {
        Self {
            module: OnceLock::new(),
            destroyed: AtomicBool::new(false),
        }
    }

    /// Whether a module has been built.
    pub fn is_built(&self) -> bool {
        self.module.get().is_some()
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed.load(Ordering::Acquire)
    }

    /// The module, built from `config` on first use.
    ///
    /// After [`destroy`](Self::destroy) this fails with
    /// [`DetectorError::RecognizerReleased`].
    pub fn get_or_build(&self, config: &DetectorConfig) -> Result<Arc<QrDetectorModule>> {
        if self.is_destroyed() {
            return Err(DetectorError::RecognizerReleased);
        }
        let module = match self.module.get() {
            Some(module) => module.clone(),
            None => {
                let built = Arc::new(QrDetectorModule::new(config)?);
                self.module.get_or_init(|| built).clone()
            }
        };
        // A destroy that raced the build must not leave a live recognizer.
        if self.is_destroyed() {
            module.dispose();
            return Err(DetectorError::RecognizerReleased);
        }
        Ok(module)
    }

    /// Release the module if one was built and refuse to build another.
    pub fn destroy(&self) {
        if self.destroyed.swap(true, Ordering::AcqRel) {
            return;
        }
        if let Some(module) = self.module.get() {
            module.dispose();
        }
        info!(built = self.is_built(), "shared QR detector destroyed");
    }
}

#[cfg(test)]
mod tests {
    use qrdetect_core::rejection::{ErrorCode, Rejection};

    use super::*;

    #[test]
    fn builds_once() {
        let shared = SharedDetector::new();
        let a = shared.get_or_build(&DetectorConfig::default()).unwrap();
        let b = shared.get_or_build(&DetectorConfig::default()).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn destroy_releases_the_built_module() {
        let shared = SharedDetector::new();
        let module = shared.get_or_build(&DetectorConfig::default()).unwrap();

        shared.destroy();
        shared.destroy();
        assert!(module.is_disposed());
        assert!(matches!(
            shared.get_or_build(&DetectorConfig::default()),
            Err(DetectorError::RecognizerReleased)
        ));
    }

    #[test]
    fn destroy_before_first_use_is_sticky() {
        let shared = SharedDetector::new();
        shared.destroy();

        let err = shared.get_or_build(&DetectorConfig::default()).unwrap_err();
        assert_eq!(Rejection::from(&err).code, ErrorCode::UnknownError);
        assert!(!shared.is_built());
    }
}
