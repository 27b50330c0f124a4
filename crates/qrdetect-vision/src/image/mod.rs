// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image module — reference resolution, decoding, and recognition prep.

pub mod loader;
pub mod processor;

pub use loader::ImageLoader;
pub use processor::ImagePreparer;
