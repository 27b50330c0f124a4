// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Recognition prep — bound the working size and reduce to 8-bit luma.

use ::image::imageops::FilterType;
use ::image::{DynamicImage, GrayImage};
use tracing::{debug, instrument};

/// Prepares decoded images for the recognizer.
#[derive(Debug, Clone, Copy)]
pub struct ImagePreparer {
    /// Longest side allowed before downscaling. 0 disables downscaling.
    max_dimension: u32,
}

impl Default for ImagePreparer {
    fn default() -> Self {
        Self::new(2048)
    }
}

impl ImagePreparer {
    pub fn new(max_dimension: u32) -> Self {
        Self { max_dimension }
    }

    pub fn max_dimension(&self) -> u32 {
        self.max_dimension
    }

    /// Downscale (preserving aspect ratio) if needed, then convert to luma.
    #[instrument(skip_all, fields(width = image.width(), height = image.height()))]
    pub fn prepare(&self, image: DynamicImage) -> GrayImage {
        let longest = image.width().max(image.height());
        let image = if self.max_dimension > 0 && longest > self.max_dimension {
            let resized = image.resize(self.max_dimension, self.max_dimension, FilterType::Triangle);
            debug!(
                new_w = resized.width(),
                new_h = resized.height(),
                "downscaled for recognition"
            );
            resized
        } else {
            image
        };
        image.to_luma8()
    }
}

#[cfg(test)]
mod tests {
    use ::image::{Luma, Rgb, RgbImage};

    use super::*;

    #[test]
    fn large_images_are_bounded() {
        let image = DynamicImage::ImageLuma8(GrayImage::from_pixel(4000, 1000, Luma([0u8])));
        let prepared = ImagePreparer::new(1000).prepare(image);
        assert_eq!(prepared.width(), 1000);
        assert_eq!(prepared.height(), 250);
    }

    #[test]
    fn small_images_keep_their_size() {
        let image = DynamicImage::ImageLuma8(GrayImage::new(300, 200));
        let prepared = ImagePreparer::new(1000).prepare(image);
        assert_eq!(prepared.dimensions(), (300, 200));
    }

    #[test]
    fn zero_disables_downscaling() {
        let image = DynamicImage::ImageLuma8(GrayImage::new(5000, 10));
        let prepared = ImagePreparer::new(0).prepare(image);
        assert_eq!(prepared.width(), 5000);
    }

    #[test]
    fn colour_is_reduced_to_luma() {
        let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(2, 2, Rgb([255, 255, 255])));
        let prepared = ImagePreparer::default().prepare(image);
        assert_eq!(prepared.get_pixel(1, 1).0[0], 255);
    }
}
