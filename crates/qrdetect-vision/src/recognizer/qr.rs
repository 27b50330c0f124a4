// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// QR recognizer backed by `rqrr`.
//
// Detection is CPU-bound, so each submission runs on tokio's blocking pool
// and reports through its completion handle. `rqrr` keeps no state between
// images, which makes one instance safe to share across concurrent calls
// without a lock.

use std::sync::atomic::{AtomicBool, Ordering};

use ::image::{DynamicImage, GrayImage};
use qrdetect_core::error::{DetectorError, Result};
use tracing::{debug, info, warn};

use super::{BarcodeFormat, Candidate, Completion, Point, Recognizer, ScannerOptions};
use crate::image::processor::ImagePreparer;

/// Recognizer for QR codes.
#[derive(Debug)]
pub struct QrRecognizer {
    options: ScannerOptions,
    preparer: ImagePreparer,
    closed: AtomicBool,
}

impl QrRecognizer {
    /// Build a recognizer. `options` must name QR codes and nothing else.
    pub fn new(options: ScannerOptions, preparer: ImagePreparer) -> Result<Self> {
        match options.formats() {
            [BarcodeFormat::QrCode] => {}
            [] => {
                return Err(DetectorError::Config(
                    "scanner options name no barcode format".into(),
                ));
            }
            formats => {
                let names: Vec<String> = formats.iter().map(ToString::to_string).collect();
                return Err(DetectorError::Config(format!(
                    "QR recognizer only supports QR_CODE, got [{}]",
                    names.join(", ")
                )));
            }
        }
        info!(
            max_dimension = preparer.max_dimension(),
            "QR recognizer created"
        );
        Ok(Self {
            options,
            preparer,
            closed: AtomicBool::new(false),
        })
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }
}

impl Recognizer for QrRecognizer {
    fn options(&self) -> &ScannerOptions {
        &self.options
    }

    fn process(&self, image: DynamicImage, completion: Completion) {
        if self.is_closed() {
            completion.refuse_closed();
            return;
        }
        let runtime = match tokio::runtime::Handle::try_current() {
            Ok(handle) => handle,
            Err(err) => {
                completion.fail(format!("no async runtime to run recognition on: {err}"));
                return;
            }
        };

        let preparer = self.preparer;
        runtime.spawn_blocking(move || {
            let luma = preparer.prepare(image);
            match scan_luma(&luma) {
                Ok(candidates) => completion.succeed(candidates),
                Err(message) => completion.fail(message),
            }
        });
    }

    fn close(&self) {
        if !self.closed.swap(true, Ordering::AcqRel) {
            info!("QR recognizer closed");
        }
    }
}

/// Locate and decode every QR grid in a luma image.
fn scan_luma(luma: &GrayImage) -> std::result::Result<Vec<Candidate>, String> {
    let (width, height) = luma.dimensions();
    if width == 0 || height == 0 {
        return Err(format!("image has no pixels ({width}x{height})"));
    }

    let mut prepared = rqrr::PreparedImage::prepare_from_greyscale(
        width as usize,
        height as usize,
        |x, y| luma.get_pixel(x as u32, y as u32).0[0],
    );
    let grids = prepared.detect_grids();
    debug!(grids = grids.len(), "QR grids located");

    let candidates = grids
        .iter()
        .map(|grid| {
            let mut bytes = Vec::new();
            let raw_value = match grid.decode_to(&mut bytes) {
                Ok(_meta) => String::from_utf8(bytes.clone()).ok(),
                Err(err) => {
                    warn!(error = %err, "QR grid located but payload could not be decoded");
                    bytes.clear();
                    None
                }
            };
            Candidate {
                format: BarcodeFormat::QrCode,
                raw_value,
                raw_bytes: bytes,
                corners: grid.bounds.map(|p| Point { x: p.x, y: p.y }),
            }
        })
        .collect();
    Ok(candidates)
}
