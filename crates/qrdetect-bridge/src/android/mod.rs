// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Android entry points via JNI.
//
// The Java side declares, in `com.qrdetect.bridge.QRDetectorNative`:
//
//     static native boolean nativeInit(String configJson);
//     static native String nativeDetect(String path);
//     static native void nativeDestroy();
//
// `nativeDetect` blocks the calling Java thread until the call settles, so
// the Java module must call it off the UI thread (e.g. from an executor) and
// resolve or reject its promise from the returned envelope
// `{"ok": {...}}` / `{"err": {"code", "message"}}`.
//
// One detector module lives for the whole process. After `nativeDestroy` it
// stays released: later detects are rejected, nothing is rebuilt.

#![cfg(target_os = "android")]

use std::sync::OnceLock;

use jni::objects::{JClass, JObject, JString};
use jni::sys::{jboolean, jstring, JNI_FALSE, JNI_TRUE};
use jni::JNIEnv;

use qrdetect_core::config::DetectorConfig;
use qrdetect_core::error::{DetectorError, Result};
use qrdetect_core::rejection::Rejection;
use qrdetect_core::types::{ImageSourceDescriptor, MISSING_SOURCE_MESSAGE};

use crate::response::{self, Envelope};
use crate::shared::SharedDetector;

static RUNTIME: OnceLock<tokio::runtime::Runtime> = OnceLock::new();
static DETECTOR: SharedDetector = SharedDetector::new();

fn runtime() -> Result<&'static tokio::runtime::Runtime> {
    if let Some(rt) = RUNTIME.get() {
        return Ok(rt);
    }
    let rt = tokio::runtime::Builder::new_multi_thread()
        .thread_name("qrdetect")
        .enable_all()
        .build()
        .map_err(|e| DetectorError::Bridge(format!("failed to start async runtime: {e}")))?;
    // A racing thread may have won; either runtime is equivalent.
    Ok(RUNTIME.get_or_init(|| rt))
}

/// Convenience: map any `jni::errors::Error` into `DetectorError::Bridge`.
fn jni_err(context: &str, e: jni::errors::Error) -> DetectorError {
    DetectorError::Bridge(format!("{context}: {e}"))
}

/// Read an optional Java string. `null` maps to `None`.
fn optional_string(env: &mut JNIEnv, value: &JString) -> Result<Option<String>> {
    if value.is_null() {
        return Ok(None);
    }
    let s: String = env
        .get_string(value)
        .map_err(|e| jni_err("get_string", e))?
        .into();
    Ok(Some(s))
}

fn detect_envelope(env: &mut JNIEnv, path: &JString) -> Envelope {
    let settlement = (|| -> Result<serde_json::Value> {
        let path = optional_string(env, path)?
            .ok_or_else(|| DetectorError::InvalidInput(MISSING_SOURCE_MESSAGE.into()))?;
        let module = DETECTOR.get_or_build(&DetectorConfig::default())?;
        let outcome = runtime()?
            .block_on(async move { module.detect(&ImageSourceDescriptor::Path(path)).await })?;
        response::resolve(outcome)
    })()
    .map_err(|err| {
        tracing::debug!(error = %err, "Android detect rejected");
        Rejection::from(err)
    });
    Envelope::from(settlement)
}

#[unsafe(no_mangle)]
pub extern "system" fn Java_com_qrdetect_bridge_QRDetectorNative_nativeInit<'local>(
    mut env: JNIEnv<'local>,
    _class: JClass<'local>,
    config_json: JString<'local>,
) -> jboolean {
    let result = (|| -> Result<()> {
        let config = match optional_string(&mut env, &config_json)? {
            Some(json) => {
                let config: DetectorConfig = serde_json::from_str(&json)?;
                config.validate()?;
                config
            }
            None => DetectorConfig::default(),
        };
        if DETECTOR.is_built() {
            tracing::warn!("nativeInit called after the detector was created; keeping it");
            return Ok(());
        }
        DETECTOR.get_or_build(&config)?;
        runtime()?;
        Ok(())
    })();

    match result {
        Ok(()) => JNI_TRUE,
        Err(err) => {
            tracing::error!(error = %err, "Android: detector init failed");
            JNI_FALSE
        }
    }
}

#[unsafe(no_mangle)]
pub extern "system" fn Java_com_qrdetect_bridge_QRDetectorNative_nativeDetect<'local>(
    mut env: JNIEnv<'local>,
    _class: JClass<'local>,
    path: JString<'local>,
) -> jstring {
    let envelope = detect_envelope(&mut env, &path);
    match env.new_string(envelope.to_json_string()) {
        Ok(s) => s.into_raw(),
        Err(e) => {
            tracing::error!(error = %e, "Android: failed to hand the result back to Java");
            JObject::null().into_raw()
        }
    }
}

#[unsafe(no_mangle)]
pub extern "system" fn Java_com_qrdetect_bridge_QRDetectorNative_nativeDestroy<'local>(
    _env: JNIEnv<'local>,
    _class: JClass<'local>,
) {
    DETECTOR.destroy();
}
