// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Recognizer seam.
//
// A recognizer accepts one image per submission and reports back through a
// single-use `Completion`: either the success channel (zero or more
// candidates) or the failure channel (an error message). The handle is
// consumed by whichever channel fires, so at most one outcome is ever
// delivered. A handle dropped without firing surfaces to the waiting side as
// `DetectorError::RecognizerAbandoned`, so a call can never hang on a
// recognizer that forgot to answer.

pub mod qr;

use std::fmt;

use ::image::DynamicImage;
use qrdetect_core::error::{DetectorError, Result};
use thiserror::Error;
use tokio::sync::oneshot;
use tracing::debug;

/// Code symbologies a recognizer can be configured for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BarcodeFormat {
    QrCode,
    DataMatrix,
    Aztec,
    Pdf417,
    Code128,
    Ean13,
}

impl fmt::Display for BarcodeFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::QrCode => "QR_CODE",
            Self::DataMatrix => "DATA_MATRIX",
            Self::Aztec => "AZTEC",
            Self::Pdf417 => "PDF417",
            Self::Code128 => "CODE_128",
            Self::Ean13 => "EAN_13",
        };
        f.write_str(name)
    }
}

/// Recognizer configuration, fixed at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannerOptions {
    formats: Vec<BarcodeFormat>,
}

impl ScannerOptions {
    /// Options recognizing QR codes and nothing else.
    pub fn qr_only() -> Self {
        Self::builder().barcode_formats(&[BarcodeFormat::QrCode]).build()
    }

    pub fn builder() -> ScannerOptionsBuilder {
        ScannerOptionsBuilder::default()
    }

    pub fn formats(&self) -> &[BarcodeFormat] {
        &self.formats
    }
}

#[derive(Debug, Default)]
pub struct ScannerOptionsBuilder {
    formats: Vec<BarcodeFormat>,
}

impl ScannerOptionsBuilder {
    /// Replace the set of formats. Duplicates are collapsed.
    pub fn barcode_formats(mut self, formats: &[BarcodeFormat]) -> Self {
        self.formats.clear();
        for format in formats {
            if !self.formats.contains(format) {
                self.formats.push(*format);
            }
        }
        self
    }

    pub fn build(self) -> ScannerOptions {
        ScannerOptions {
            formats: self.formats,
        }
    }
}

/// Pixel coordinate of a candidate corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

/// One detected code region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub format: BarcodeFormat,
    /// Decoded text. `None` when the region was located but no text payload
    /// could be extracted.
    pub raw_value: Option<String>,
    /// Decoded bytes, empty when decoding failed.
    pub raw_bytes: Vec<u8>,
    /// Corners clockwise from top-left.
    pub corners: [Point; 4],
}

impl Candidate {
    /// A QR candidate carrying `value`, with no geometry.
    pub fn qr(value: impl Into<String>) -> Self {
        let value = value.into();
        Self {
            format: BarcodeFormat::QrCode,
            raw_bytes: value.clone().into_bytes(),
            raw_value: Some(value),
            corners: [Point::default(); 4],
        }
    }

    /// A QR candidate that was located but yielded no payload.
    pub fn qr_without_value() -> Self {
        Self {
            format: BarcodeFormat::QrCode,
            raw_value: None,
            raw_bytes: Vec::new(),
            corners: [Point::default(); 4],
        }
    }
}

/// Error detail delivered on the failure channel.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct RecognizerFailure {
    pub message: String,
    /// Set when the submission was refused because the recognizer had
    /// already been closed, as opposed to failing while processing.
    pub closed: bool,
}

/// The one event a submission produces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecognitionEvent {
    Succeeded(Vec<Candidate>),
    Failed(RecognizerFailure),
}

/// Single-use completion handle passed to [`Recognizer::process`].
#[derive(Debug)]
pub struct Completion {
    tx: oneshot::Sender<RecognitionEvent>,
}

/// Waiting side of a [`Completion`].
#[derive(Debug)]
pub struct PendingRecognition {
    rx: oneshot::Receiver<RecognitionEvent>,
}

impl Completion {
    pub fn channel() -> (Completion, PendingRecognition) {
        let (tx, rx) = oneshot::channel();
        (Completion { tx }, PendingRecognition { rx })
    }

    /// Success channel.
    pub fn succeed(self, candidates: Vec<Candidate>) {
        self.deliver(RecognitionEvent::Succeeded(candidates));
    }

    /// Failure channel.
    pub fn fail(self, message: impl Into<String>) {
        self.deliver(RecognitionEvent::Failed(RecognizerFailure {
            message: message.into(),
            closed: false,
        }));
    }

    /// Failure channel, for submissions that arrive after `close`.
    pub fn refuse_closed(self) {
        self.deliver(RecognitionEvent::Failed(RecognizerFailure {
            message: "recognizer is closed".into(),
            closed: true,
        }));
    }

    fn deliver(self, event: RecognitionEvent) {
        if self.tx.send(event).is_err() {
            // Caller lost interest; the result is discarded.
            debug!("recognition finished after its caller went away");
        }
    }
}

impl PendingRecognition {
    /// Wait for the one event. A dropped completion resolves as
    /// [`DetectorError::RecognizerAbandoned`].
    pub async fn wait(self) -> Result<RecognitionEvent> {
        self.rx.await.map_err(|_| DetectorError::RecognizerAbandoned)
    }
}

/// An asynchronous code recognizer.
///
/// Implementations must be safe to share: the bridge submits concurrent
/// calls against one instance without serialising them.
pub trait Recognizer: Send + Sync {
    /// Configuration this recognizer was built with.
    fn options(&self) -> &ScannerOptions;

    /// Submit an image. Must not block; the outcome arrives on `completion`.
    fn process(&self, image: DynamicImage, completion: Completion);

    /// Release underlying resources. Submissions after `close` fail.
    fn close(&self);
}
