//! Crop assistant: deterministic framing before inference.

use crate::config::CropMode;
use crate::constants::crop::CENTER_WEIGHTED_FRACTION;
use image::DynamicImage;
use tracing::debug;

/// Pixel region kept by a crop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropRegion {
    /// Left edge.
    pub x: u32,
    /// Top edge.
    pub y: u32,
    /// Region width.
    pub width: u32,
    /// Region height.
    pub height: u32,
}

/// Compute the crop region for an image of the given size.
///
/// Returns `None` when the arithmetic leaves an empty region.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn crop_region(width: u32, height: u32, use_center_weighted: bool) -> Option<CropRegion> {
    let min_dim = width.min(height);

    let region = if use_center_weighted {
        let (cx, cy) = (width / 2, height / 2);
        let half = (f64::from(min_dim) * CENTER_WEIGHTED_FRACTION / 2.0).floor() as u32;
        let x1 = cx.saturating_sub(half);
        let y1 = cy.saturating_sub(half);
        let x2 = cx.saturating_add(half).min(width);
        let y2 = cy.saturating_add(half).min(height);
        CropRegion {
            x: x1,
            y: y1,
            width: x2.saturating_sub(x1),
            height: y2.saturating_sub(y1),
        }
    } else {
        CropRegion {
            x: (width - min_dim) / 2,
            y: (height - min_dim) / 2,
            width: min_dim,
            height: min_dim,
        }
    };

    (region.width > 0 && region.height > 0).then_some(region)
}

/// Crop to the center square, or the center-weighted square when requested.
///
/// Falls back to the original image when no usable region exists.
pub fn normalize(image: &DynamicImage, use_center_weighted: bool) -> DynamicImage {
    match crop_region(image.width(), image.height(), use_center_weighted) {
        Some(region) => image.crop_imm(region.x, region.y, region.width, region.height),
        None => {
            debug!(
                "Crop left an empty region for {}x{} image; using original",
                image.width(),
                image.height()
            );
            image.clone()
        }
    }
}

/// Apply the configured crop mode.
pub fn apply_crop(image: &DynamicImage, mode: CropMode) -> DynamicImage {
    match mode {
        CropMode::None => image.clone(),
        CropMode::Center => normalize(image, false),
        CropMode::CenterWeighted => normalize(image, true),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    fn blank(width: u32, height: u32) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb([9, 9, 9])))
    }

    #[test]
    fn test_center_square_landscape() {
        let region = crop_region(640, 480, false);
        assert_eq!(
            region,
            Some(CropRegion {
                x: 80,
                y: 0,
                width: 480,
                height: 480
            })
        );
    }

    #[test]
    fn test_center_weighted_is_80_percent() {
        let region = crop_region(1000, 500, true);
        assert_eq!(
            region,
            Some(CropRegion {
                x: 300,
                y: 50,
                width: 400,
                height: 400
            })
        );
    }

    #[test]
    fn test_center_weighted_tiny_image_falls_back() {
        // 1x1: half of 0.8 floors to zero, leaving an empty region
        assert_eq!(crop_region(1, 1, true), None);
        let image = blank(1, 1);
        let cropped = normalize(&image, true);
        assert_eq!((cropped.width(), cropped.height()), (1, 1));
    }

    #[test]
    fn test_zero_sized_image_returns_original() {
        let image = blank(0, 0);
        let cropped = normalize(&image, false);
        assert_eq!((cropped.width(), cropped.height()), (0, 0));
    }

    #[test]
    fn test_normalize_is_deterministic() {
        let image = blank(300, 200);
        let a = normalize(&image, false);
        let b = normalize(&image, false);
        assert_eq!(a.as_bytes(), b.as_bytes());
        assert_eq!((a.width(), a.height()), (200, 200));
    }

    #[test]
    fn test_apply_crop_none_keeps_size() {
        let image = blank(300, 200);
        let out = apply_crop(&image, CropMode::None);
        assert_eq!((out.width(), out.height()), (300, 200));
    }
}
