// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// qrdetect-vision — Image resolution and QR recognition for the detector bridge.
//
// Resolves caller-supplied image references into decoded images, prepares
// them for recognition (downscale, luma), and drives the asynchronous
// recognizer that reports exactly one completion per submission.

pub mod image;
pub mod recognizer;

// Re-export the primary types so callers can use `qrdetect_vision::QrRecognizer` etc.
pub use self::image::loader::ImageLoader;
pub use self::image::processor::ImagePreparer;
pub use recognizer::qr::QrRecognizer;
pub use recognizer::{
    BarcodeFormat, Candidate, Completion, PendingRecognition, Point, RecognitionEvent,
    Recognizer, RecognizerFailure, ScannerOptions,
};
