// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// QR detector module — the image-to-payload request bridge.
//
// Owns the one shared recognizer for its whole lifetime: built at
// construction, released exactly once by `dispose` (or on drop). Each call
// resolves the image, submits it once, and normalises the single completion
// event. No retries, no caching, no cancellation at this layer.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use qrdetect_core::config::DetectorConfig;
use qrdetect_core::error::{DetectorError, Result};
use qrdetect_core::types::{DecodeOutcome, ImageSourceDescriptor, INLINE_DATA_UNSUPPORTED_MESSAGE};
use qrdetect_vision::{
    Candidate, Completion, ImageLoader, ImagePreparer, QrRecognizer, RecognitionEvent,
    Recognizer, ScannerOptions,
};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::module::NativeModule;
use crate::{request, response};

/// Name the host framework dispatches to.
pub const MODULE_NAME: &str = "QRDetectorModule";

/// The one callable method.
pub const DETECT_METHOD: &str = "detectQRCode";

/// Bridge between host detect requests and the shared recognizer.
pub struct QrDetectorModule {
    recognizer: Mutex<Option<Arc<dyn Recognizer>>>,
    timeout: Option<Duration>,
}

impl std::fmt::Debug for QrDetectorModule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QrDetectorModule")
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl QrDetectorModule {
    /// Build the module with a QR-only recognizer configured from `config`.
    pub fn new(config: &DetectorConfig) -> Result<Self> {
        config.validate()?;
        let recognizer = QrRecognizer::new(
            ScannerOptions::qr_only(),
            ImagePreparer::new(config.max_image_dimension),
        )?;
        Ok(Self::with_recognizer(
            Arc::new(recognizer),
            config.recognizer_timeout(),
        ))
    }

    /// Build the module around an existing recognizer.
    pub fn with_recognizer(recognizer: Arc<dyn Recognizer>, timeout: Option<Duration>) -> Self {
        Self {
            recognizer: Mutex::new(Some(recognizer)),
            timeout,
        }
    }

    pub fn is_disposed(&self) -> bool {
        self.slot().is_none()
    }

    /// Detect a QR code in the image `descriptor` points at.
    ///
    /// Request and image-resolution failures return before the recognizer
    /// is touched. After [`dispose`](Self::dispose) every call fails with
    /// [`DetectorError::RecognizerReleased`].
    pub async fn detect(&self, descriptor: &ImageSourceDescriptor) -> Result<DecodeOutcome> {
        let reference = match descriptor {
            ImageSourceDescriptor::Path(path) => path.clone(),
            ImageSourceDescriptor::InlineData(_) => {
                return Err(DetectorError::UnsupportedInput(
                    INLINE_DATA_UNSUPPORTED_MESSAGE.into(),
                ));
            }
        };
        let recognizer = self.recognizer()?;
        let started = Instant::now();

        let image = tokio::task::spawn_blocking(move || ImageLoader::load(&reference))
            .await
            .map_err(|err| DetectorError::Unexpected(format!("image loading task failed: {err}")))??;

        let (completion, pending) = Completion::channel();
        recognizer.process(image, completion);

        let event = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, pending.wait())
                .await
                .map_err(|_| DetectorError::Timeout(limit))??,
            None => pending.wait().await?,
        };

        match event {
            RecognitionEvent::Succeeded(candidates) => {
                let outcome = normalize_candidates(&candidates);
                debug!(
                    candidates = candidates.len(),
                    corners = ?candidates.first().map(|c| c.corners),
                    success = outcome.is_success(),
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "recognition finished"
                );
                Ok(outcome)
            }
            // Disposed between taking the handle and submitting.
            RecognitionEvent::Failed(failure) if failure.closed => {
                debug!("recognizer closed while the call was in flight");
                Err(DetectorError::RecognizerReleased)
            }
            RecognitionEvent::Failed(failure) => {
                warn!(error = %failure, "recognizer reported a failure");
                Err(DetectorError::Detection(failure.message))
            }
        }
    }

    /// Release the recognizer. Later calls are no-ops.
    pub fn dispose(&self) {
        let released = self.slot().take();
        if let Some(recognizer) = released {
            recognizer.close();
            info!("QR detector disposed");
        }
    }

    fn recognizer(&self) -> Result<Arc<dyn Recognizer>> {
        self.slot().clone().ok_or(DetectorError::RecognizerReleased)
    }

    fn slot(&self) -> std::sync::MutexGuard<'_, Option<Arc<dyn Recognizer>>> {
        // The slot holds no invariant a panicking holder could break.
        self.recognizer.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for QrDetectorModule {
    fn drop(&mut self) {
        self.dispose();
    }
}

/// Map a recognizer's candidate list onto an outcome.
///
/// Only the first candidate is inspected. This is a simplification, not a
/// selection policy: multi-code images report whichever code the recognizer
/// listed first, with no score or geometry ranking.
pub fn normalize_candidates(candidates: &[Candidate]) -> DecodeOutcome {
    match candidates.first() {
        None => DecodeOutcome::NotFound,
        Some(first) => match first.raw_value.as_deref() {
            Some(value) if !value.is_empty() => DecodeOutcome::Success {
                payload: value.to_owned(),
            },
            _ => DecodeOutcome::EmptyValue,
        },
    }
}

#[async_trait]
impl NativeModule for QrDetectorModule {
    fn name(&self) -> &str {
        MODULE_NAME
    }

    fn methods(&self) -> &[&'static str] {
        &[DETECT_METHOD]
    }

    async fn invoke(&self, method: &str, args: Value) -> Result<Value> {
        if method != DETECT_METHOD {
            return Err(DetectorError::UnknownMethod {
                module: MODULE_NAME.into(),
                method: method.into(),
            });
        }
        let descriptor = request::parse_descriptor(&args)?;
        debug!(source = descriptor.kind(), "detect request");
        let outcome = self.detect(&descriptor).await?;
        response::resolve(outcome)
    }

    fn on_destroy(&self) {
        self.dispose();
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::path::{Path, PathBuf};
    use std::sync::atomic::{AtomicUsize, Ordering};

    use image::{DynamicImage, GrayImage, Luma};
    use qrdetect_core::rejection::{ErrorCode, Rejection};
    use qrdetect_core::types::MISSING_SOURCE_MESSAGE;
    use serde_json::json;

    use super::*;

    /// What the scripted recognizer does with the next submission.
    enum Script {
        Succeed(Vec<Candidate>),
        Fail(&'static str),
        Drop,
        Hang,
    }

    /// Recognizer that replays a script and counts calls.
    struct ScriptedRecognizer {
        options: ScannerOptions,
        script: Mutex<VecDeque<Script>>,
        parked: Mutex<Vec<Completion>>,
        submissions: AtomicUsize,
        closes: AtomicUsize,
    }

    impl ScriptedRecognizer {
        fn new(script: Vec<Script>) -> Arc<Self> {
            Arc::new(Self {
                options: ScannerOptions::qr_only(),
                script: Mutex::new(script.into()),
                parked: Mutex::new(Vec::new()),
                submissions: AtomicUsize::new(0),
                closes: AtomicUsize::new(0),
            })
        }
    }

    impl Recognizer for ScriptedRecognizer {
        fn options(&self) -> &ScannerOptions {
            &self.options
        }

        fn process(&self, _image: DynamicImage, completion: Completion) {
            self.submissions.fetch_add(1, Ordering::SeqCst);
            match self.script.lock().unwrap().pop_front().expect("script exhausted") {
                Script::Succeed(candidates) => completion.succeed(candidates),
                Script::Fail(message) => completion.fail(message),
                Script::Drop => drop(completion),
                Script::Hang => self.parked.lock().unwrap().push(completion),
            }
        }

        fn close(&self) {
            self.closes.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn write_png(dir: &Path, name: &str, image: &GrayImage) -> PathBuf {
        let path = dir.join(name);
        image.save(&path).unwrap();
        path
    }

    fn render_qr(text: &str) -> GrayImage {
        const SCALE: u32 = 8;
        const QUIET: u32 = 4;
        let code = qrcode::QrCode::new(text.as_bytes()).unwrap();
        let modules = code.width() as u32;
        let side = (modules + 2 * QUIET) * SCALE;
        let mut image = GrayImage::from_pixel(side, side, Luma([255u8]));
        for (i, color) in code.to_colors().iter().enumerate() {
            if *color == qrcode::Color::Dark {
                let (mx, my) = (i as u32 % modules + QUIET, i as u32 / modules + QUIET);
                for d in 0..SCALE * SCALE {
                    image.put_pixel(mx * SCALE + d % SCALE, my * SCALE + d / SCALE, Luma([0u8]));
                }
            }
        }
        image
    }

    fn blank() -> GrayImage {
        GrayImage::from_pixel(120, 120, Luma([255u8]))
    }

    fn path_of(path: &Path) -> ImageSourceDescriptor {
        ImageSourceDescriptor::Path(path.to_str().unwrap().into())
    }

    async fn scripted(script: Vec<Script>) -> (Arc<ScriptedRecognizer>, QrDetectorModule, tempfile::TempDir) {
        let recognizer = ScriptedRecognizer::new(script);
        let module = QrDetectorModule::with_recognizer(recognizer.clone(), None);
        (recognizer, module, tempfile::tempdir().unwrap())
    }

    #[test]
    fn first_candidate_only() {
        let outcome = normalize_candidates(&[Candidate::qr("FIRST"), Candidate::qr("SECOND")]);
        assert_eq!(outcome, DecodeOutcome::Success { payload: "FIRST".into() });

        let outcome = normalize_candidates(&[Candidate::qr_without_value(), Candidate::qr("B")]);
        assert_eq!(outcome, DecodeOutcome::EmptyValue);
    }

    #[test]
    fn empty_payload_is_empty_value() {
        assert_eq!(normalize_candidates(&[Candidate::qr("")]), DecodeOutcome::EmptyValue);
        assert_eq!(normalize_candidates(&[]), DecodeOutcome::NotFound);
    }

    #[tokio::test]
    async fn decodes_real_qr_image() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_png(dir.path(), "valid_qr.png", &render_qr("HELLO"));
        let module = QrDetectorModule::new(&DetectorConfig::default()).unwrap();

        let outcome = module.detect(&path_of(&path)).await.unwrap();
        assert_eq!(outcome, DecodeOutcome::Success { payload: "HELLO".into() });

        // Same image, same answer.
        assert_eq!(module.detect(&path_of(&path)).await.unwrap(), outcome);
    }

    #[tokio::test]
    async fn blank_image_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_png(dir.path(), "blank.png", &blank());
        let module = QrDetectorModule::new(&DetectorConfig::default()).unwrap();

        let value = module
            .invoke(DETECT_METHOD, json!({ "path": path.to_str().unwrap() }))
            .await
            .unwrap();
        assert_eq!(value, json!({ "success": false, "error": "No QR code found in image" }));
    }

    #[tokio::test]
    async fn file_uri_resolves_like_a_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_png(dir.path(), "qr code.png", &render_qr("URI"));
        let uri = format!("file://{}", path.to_str().unwrap().replace(' ', "%20"));
        let module = QrDetectorModule::new(&DetectorConfig::default()).unwrap();

        let value = module.invoke(DETECT_METHOD, json!({ "path": uri })).await.unwrap();
        assert_eq!(value, json!({ "success": true, "qrCode": "URI" }));
    }

    #[tokio::test]
    async fn unreadable_image_is_io_error_without_recognition() {
        let (recognizer, module, dir) = scripted(vec![]).await;
        let path = dir.path().join("corrupt.png");
        std::fs::write(&path, b"\x89PNG but not really").unwrap();

        let err = module.detect(&path_of(&path)).await.unwrap_err();
        let rejection = Rejection::from(&err);
        assert_eq!(rejection.code, ErrorCode::IoError);
        assert!(rejection.message.starts_with("Failed to read image: "));
        assert_eq!(recognizer.submissions.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn inline_data_is_always_rejected() {
        let (recognizer, module, _dir) = scripted(vec![]).await;
        for payload in ["", "iVBORw0KGgo=", "not base64 at all"] {
            let err = module
                .detect(&ImageSourceDescriptor::InlineData(payload.into()))
                .await
                .unwrap_err();
            let rejection = Rejection::from(err);
            assert_eq!(rejection.code, ErrorCode::InvalidInput);
            assert_eq!(rejection.message, "Base64 image processing not implemented yet");
        }
        assert_eq!(recognizer.submissions.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn missing_source_is_invalid_input() {
        let (_recognizer, module, _dir) = scripted(vec![]).await;
        let err = module.invoke(DETECT_METHOD, json!({})).await.unwrap_err();
        let rejection = Rejection::from(err);
        assert_eq!(rejection.code, ErrorCode::InvalidInput);
        assert_eq!(rejection.message, MISSING_SOURCE_MESSAGE);
    }

    #[tokio::test]
    async fn null_payload_is_empty_value() {
        let (_recognizer, module, dir) =
            scripted(vec![Script::Succeed(vec![Candidate::qr_without_value()])]).await;
        let path = write_png(dir.path(), "damaged.png", &blank());

        let value = module
            .invoke(DETECT_METHOD, json!({ "path": path.to_str().unwrap() }))
            .await
            .unwrap();
        assert_eq!(
            value,
            json!({ "success": false, "error": "QR code detected but value is null" })
        );
    }

    #[tokio::test]
    async fn recognizer_failure_is_detection_error() {
        let (_recognizer, module, dir) = scripted(vec![Script::Fail("model unavailable")]).await;
        let path = write_png(dir.path(), "any.png", &blank());

        let rejection = Rejection::from(module.detect(&path_of(&path)).await.unwrap_err());
        assert_eq!(rejection.code, ErrorCode::DetectionError);
        assert_eq!(rejection.message, "Failed to process image: model unavailable");
    }

    #[tokio::test]
    async fn dropped_completion_is_unknown_error() {
        let (_recognizer, module, dir) = scripted(vec![Script::Drop]).await;
        let path = write_png(dir.path(), "any.png", &blank());

        let rejection = Rejection::from(module.detect(&path_of(&path)).await.unwrap_err());
        assert_eq!(rejection.code, ErrorCode::UnknownError);
    }

    #[tokio::test]
    async fn configured_timeout_bounds_a_hung_recognizer() {
        let recognizer = ScriptedRecognizer::new(vec![Script::Hang]);
        let module =
            QrDetectorModule::with_recognizer(recognizer.clone(), Some(Duration::from_millis(50)));
        let dir = tempfile::tempdir().unwrap();
        let path = write_png(dir.path(), "any.png", &blank());

        let err = module.detect(&path_of(&path)).await.unwrap_err();
        assert!(matches!(err, DetectorError::Timeout(_)));
        assert_eq!(ErrorCode::classify(&err), ErrorCode::DetectionError);
    }

    #[tokio::test]
    async fn detect_after_dispose_fails_deterministically() {
        let (recognizer, module, dir) = scripted(vec![]).await;
        let path = write_png(dir.path(), "valid.png", &render_qr("HELLO"));

        module.dispose();
        module.dispose();
        assert!(module.is_disposed());
        assert_eq!(recognizer.closes.load(Ordering::SeqCst), 1);

        for _ in 0..2 {
            let err = module.detect(&path_of(&path)).await.unwrap_err();
            assert!(matches!(err, DetectorError::RecognizerReleased));
        }
        assert_eq!(recognizer.submissions.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn dispose_during_call_matches_dispose_before_call() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_png(dir.path(), "valid.png", &render_qr("HELLO"));
        let recognizer = Arc::new(
            QrRecognizer::new(ScannerOptions::qr_only(), ImagePreparer::default()).unwrap(),
        );
        let module = QrDetectorModule::with_recognizer(recognizer.clone(), None);

        // The module still holds its handle, but the recognizer is already
        // closed when the submission reaches it.
        recognizer.close();
        let in_flight = module.detect(&path_of(&path)).await.unwrap_err();
        assert!(matches!(in_flight, DetectorError::RecognizerReleased));

        module.dispose();
        let after = module.detect(&path_of(&path)).await.unwrap_err();
        assert_eq!(Rejection::from(&in_flight), Rejection::from(&after));
        assert_eq!(Rejection::from(&after).code, ErrorCode::UnknownError);
    }

    #[tokio::test]
    async fn drop_releases_recognizer_once() {
        let (recognizer, module, _dir) = scripted(vec![]).await;
        module.on_destroy();
        drop(module);
        assert_eq!(recognizer.closes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn concurrent_calls_share_one_recognizer() {
        let dir = tempfile::tempdir().unwrap();
        let a = write_png(dir.path(), "a.png", &render_qr("ALPHA"));
        let b = write_png(dir.path(), "b.png", &render_qr("BRAVO"));
        let module = Arc::new(QrDetectorModule::new(&DetectorConfig::default()).unwrap());

        let (da, db) = (path_of(&a), path_of(&b));
        let (ra, rb) = tokio::join!(module.detect(&da), module.detect(&db));
        assert_eq!(ra.unwrap(), DecodeOutcome::Success { payload: "ALPHA".into() });
        assert_eq!(rb.unwrap(), DecodeOutcome::Success { payload: "BRAVO".into() });
    }

    #[tokio::test]
    async fn unknown_method_is_rejected() {
        let (_recognizer, module, _dir) = scripted(vec![]).await;
        let err = module.invoke("scanBarcode", json!({})).await.unwrap_err();
        assert!(matches!(err, DetectorError::UnknownMethod { .. }));
    }
}
