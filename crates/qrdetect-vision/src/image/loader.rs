// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image loader — turns a caller-supplied reference (plain path or `file://`
// URI) into a decoded image. Every failure here is an image-read error; the
// recognizer is never reached.

use std::path::PathBuf;

use ::image::DynamicImage;
use percent_encoding::percent_decode_str;
use qrdetect_core::error::{DetectorError, Result};
use tracing::{debug, info, instrument};

/// Resolves and decodes image references.
///
/// The loader does blocking filesystem I/O. In an async context, call it
/// from `tokio::task::spawn_blocking`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageLoader;

impl ImageLoader {
    /// Map a reference to a local filesystem path without touching the disk.
    ///
    /// Accepts plain paths and `file://` URIs (with or without a `localhost`
    /// authority, percent-escapes decoded). Any other URI scheme is rejected.
    pub fn resolve_location(reference: &str) -> Result<PathBuf> {
        let reference = reference.trim();
        if reference.is_empty() {
            return Err(DetectorError::ImageRead("image path is empty".into()));
        }

        if let Some(rest) = strip_prefix_ignore_case(reference, "file:") {
            let rest = rest
                .strip_prefix("//localhost")
                .or_else(|| rest.strip_prefix("//"))
                .unwrap_or(rest);
            if !rest.starts_with('/') {
                return Err(DetectorError::ImageRead(format!(
                    "file URI must carry an absolute path: {reference}"
                )));
            }
            let decoded = percent_decode_str(rest).decode_utf8().map_err(|_| {
                DetectorError::ImageRead(format!("file URI is not valid UTF-8: {reference}"))
            })?;
            return Ok(PathBuf::from(decoded.as_ref()));
        }

        if let Some(scheme) = uri_scheme(reference) {
            return Err(DetectorError::ImageRead(format!(
                "unsupported URI scheme {scheme:?} in {reference}"
            )));
        }

        Ok(PathBuf::from(reference))
    }

    /// Resolve `reference` and decode the image it points at.
    #[instrument(skip_all, fields(reference = %reference))]
    pub fn load(reference: &str) -> Result<DynamicImage> {
        let path = Self::resolve_location(reference)?;
        let bytes = std::fs::read(&path).map_err(|err| {
            DetectorError::ImageRead(format!("{}: {}", path.display(), err))
        })?;
        debug!(bytes = bytes.len(), "image file read");

        let image = ::image::load_from_memory(&bytes).map_err(|err| {
            DetectorError::ImageRead(format!("failed to decode {}: {}", path.display(), err))
        })?;
        info!(width = image.width(), height = image.height(), "image loaded");
        Ok(image)
    }
}

fn strip_prefix_ignore_case<'a>(s: &'a str, prefix: &str) -> Option<&'a str> {
    let head = s.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix).then(|| &s[prefix.len()..])
}

/// Return the scheme of `s` if it looks like `scheme:...`.
///
/// Single-letter schemes are treated as Windows drive letters, not URIs.
fn uri_scheme(s: &str) -> Option<&str> {
    let (scheme, _) = s.split_once(':')?;
    let mut chars = scheme.chars();
    let first = chars.next()?;
    if scheme.len() < 2 || !first.is_ascii_alphabetic() {
        return None;
    }
    chars
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        .then_some(scheme)
}
