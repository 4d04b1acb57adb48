//! Image loading and content hashing.

use crate::error::{Error, Result};
use image::DynamicImage;
use sha2::{Digest, Sha256};
use std::path::Path;

/// A decoded input image.
#[derive(Debug, Clone)]
pub struct DecodedImage {
    /// Decoded pixels.
    pub image: DynamicImage,
    /// Size of the encoded file in bytes.
    pub file_size_bytes: u64,
    /// Content hash of the decoded pixels (lowercase hex SHA-256).
    pub content_hash: String,
}

/// Read and decode an image file.
///
/// Supports JPEG, PNG and WebP.
pub fn decode_image_file(path: &Path) -> Result<DecodedImage> {
    let bytes = std::fs::read(path).map_err(|e| Error::ImageOpen {
        path: path.to_path_buf(),
        source: e,
    })?;

    let image = image::load_from_memory(&bytes).map_err(|e| Error::ImageDecode {
        path: path.to_path_buf(),
        source: e,
    })?;

    let content_hash = content_hash(&image);
    Ok(DecodedImage {
        image,
        file_size_bytes: bytes.len() as u64,
        content_hash,
    })
}

/// Hash of the image's dimensions and RGBA pixels.
///
/// Identical pixels give the same hash regardless of container format or metadata.
pub fn content_hash(image: &DynamicImage) -> String {
    let rgba = image.to_rgba8();
    let mut hasher = Sha256::new();
    hasher.update(rgba.width().to_le_bytes());
    hasher.update(rgba.height().to_le_bytes());
    hasher.update(rgba.as_raw());
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgb, RgbImage};
    use std::io::Write;
    use tempfile::{NamedTempFile, TempDir};

    #[test]
    fn test_decode_png_and_hash() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cow.png");
        RgbImage::from_pixel(8, 4, Rgb([10, 20, 30]))
            .save_with_format(&path, ImageFormat::Png)
            .unwrap();

        let decoded = decode_image_file(&path).unwrap();
        assert_eq!(decoded.image.width(), 8);
        assert_eq!(decoded.image.height(), 4);
        assert!(decoded.file_size_bytes > 0);
        assert_eq!(decoded.content_hash.len(), 64);
    }

    #[test]
    fn test_hash_ignores_container_format() {
        let dir = TempDir::new().unwrap();
        let img = RgbImage::from_pixel(6, 6, Rgb([200, 100, 50]));
        let png = dir.path().join("a.png");
        let bmp = dir.path().join("a.bmp");
        img.save_with_format(&png, ImageFormat::Png).unwrap();
        img.save_with_format(&bmp, ImageFormat::Bmp).unwrap();

        let a = decode_image_file(&png).unwrap();
        let b = decode_image_file(&bmp).unwrap();
        assert_eq!(a.content_hash, b.content_hash);
    }

    #[test]
    fn test_hash_differs_for_different_pixels() {
        let a = DynamicImage::ImageRgb8(RgbImage::from_pixel(4, 4, Rgb([0, 0, 0])));
        let b = DynamicImage::ImageRgb8(RgbImage::from_pixel(4, 4, Rgb([0, 0, 1])));
        assert_ne!(content_hash(&a), content_hash(&b));
    }

    #[test]
    fn test_decode_garbage_is_decode_error() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"definitely not an image").unwrap();
        let result = decode_image_file(file.path());
        assert!(matches!(result, Err(Error::ImageDecode { .. })));
    }

    #[test]
    fn test_decode_missing_file_is_open_error() {
        let result = decode_image_file(Path::new("/nonexistent/cow.jpg"));
        assert!(matches!(result, Err(Error::ImageOpen { .. })));
    }
}
