//! Model input preparation.

use image::DynamicImage;
use image::imageops::FilterType;

/// Square RGB image laid out as an NHWC `[1, size, size, 3]` f32 tensor.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelInput {
    size: u32,
    data: Vec<f32>,
}

impl ModelInput {
    /// Resize to `size`x`size` and flatten to NHWC.
    ///
    /// Values are divided by 255 when `normalize` is set, otherwise kept in `[0, 255]`.
    pub fn from_image(image: &DynamicImage, size: u32, normalize: bool) -> Self {
        let rgb = image
            .resize_exact(size, size, FilterType::CatmullRom)
            .to_rgb8();
        let scale = if normalize { 1.0 / 255.0 } else { 1.0 };
        let data = rgb
            .as_raw()
            .iter()
            .map(|&v| f32::from(v) * scale)
            .collect();
        Self { size, data }
    }

    /// Side length in pixels.
    pub fn size(&self) -> u32 {
        self.size
    }

    /// Tensor shape.
    pub fn shape(&self) -> [i64; 4] {
        let s = i64::from(self.size);
        [1, s, s, 3]
    }

    /// Flattened tensor data.
    pub fn data(&self) -> &[f32] {
        &self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    #[test]
    fn test_shape_and_normalization() {
        let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(50, 30, Rgb([255, 0, 51])));
        let input = ModelInput::from_image(&image, 8, true);
        assert_eq!(input.shape(), [1, 8, 8, 3]);
        assert_eq!(input.data().len(), 8 * 8 * 3);
        assert!((input.data()[0] - 1.0).abs() < 0.01);
        assert!(input.data()[1].abs() < 0.01);
        assert!((input.data()[2] - 0.2).abs() < 0.01);
    }

    #[test]
    fn test_raw_range_without_normalize() {
        let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(4, 4, Rgb([200, 100, 0])));
        let input = ModelInput::from_image(&image, 4, false);
        assert!((input.data()[0] - 200.0).abs() < 1.0);
        assert!((input.data()[1] - 100.0).abs() < 1.0);
    }
}
