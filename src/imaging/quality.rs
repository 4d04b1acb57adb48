//! Quality gate: advisory image-acquisition checks.
//!
//! Every rule produces a pass flag and a score normalized so that 1.0 sits
//! exactly at the rule's threshold. Failing rules never block inference.

use crate::constants::quality::{
    BRIGHTNESS_HIGH, BRIGHTNESS_LOW, BRIGHTNESS_MARGIN, BRIGHTNESS_MID, MIN_DYNAMIC_RANGE,
    MIN_LAPLACIAN_VARIANCE, MIN_RESOLUTION,
};
use image::{DynamicImage, GrayImage};
use serde::Serialize;

/// A single quality rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QualityRule {
    /// Shorter side in pixels.
    Resolution,
    /// Laplacian-variance sharpness.
    Blur,
    /// Mean normalized intensity.
    Brightness,
    /// Standard deviation of normalized intensity.
    DynamicRange,
    /// Encoded file size.
    FileSize,
}

impl std::fmt::Display for QualityRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Resolution => write!(f, "resolution"),
            Self::Blur => write!(f, "blur"),
            Self::Brightness => write!(f, "brightness"),
            Self::DynamicRange => write!(f, "dynamic_range"),
            Self::FileSize => write!(f, "file_size"),
        }
    }
}

/// Outcome of one rule.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RuleCheck {
    /// Whether the rule passed.
    pub pass: bool,
    /// Normalized score; 1.0 is exactly at threshold.
    pub score: f64,
    /// Measured value the rule was evaluated on.
    pub value: f64,
}

/// Per-rule verdicts plus aggregates for one image.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QualityReport {
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
    /// Resolution rule.
    pub resolution: RuleCheck,
    /// Sharpness rule.
    pub blur: RuleCheck,
    /// Brightness rule.
    pub brightness: RuleCheck,
    /// Dynamic-range rule.
    pub dynamic_range: RuleCheck,
    /// File-size rule, present only when both sizes were supplied.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_size: Option<RuleCheck>,
    /// Mean of all present rule scores.
    pub overall_score: f64,
    /// Whether every present rule passed.
    pub overall_pass: bool,
}

impl QualityReport {
    /// All present rules, in report order.
    pub fn rules(&self) -> Vec<(QualityRule, RuleCheck)> {
        let mut rules = vec![
            (QualityRule::Resolution, self.resolution),
            (QualityRule::Blur, self.blur),
            (QualityRule::Brightness, self.brightness),
            (QualityRule::DynamicRange, self.dynamic_range),
        ];
        if let Some(file_size) = self.file_size {
            rules.push((QualityRule::FileSize, file_size));
        }
        rules
    }

    /// Rules that did not pass.
    pub fn failed_rules(&self) -> Vec<QualityRule> {
        self.rules()
            .into_iter()
            .filter(|(_, check)| !check.pass)
            .map(|(rule, _)| rule)
            .collect()
    }

    /// One retake tip per failed rule.
    pub fn guidance(&self) -> Vec<&'static str> {
        self.failed_rules()
            .into_iter()
            .map(|rule| match rule {
                QualityRule::Resolution => "Move closer or use a higher camera resolution",
                QualityRule::Blur => "Image looks blurry; hold the camera steady and refocus",
                QualityRule::Brightness if self.brightness.value < BRIGHTNESS_LOW => {
                    "Low light detected; use flash or move to better light"
                }
                QualityRule::Brightness => "Image is overexposed; move to shade or avoid direct sun",
                QualityRule::DynamicRange => "Low contrast; avoid haze and flat backgrounds",
                QualityRule::FileSize => "File is too large; upload a smaller image",
            })
            .collect()
    }
}

/// Score an image against the quality rules.
///
/// `file_size_bytes` and `max_file_size_bytes` enable the file-size rule only
/// when both are supplied.
pub fn assess(
    image: &DynamicImage,
    file_size_bytes: Option<u64>,
    max_file_size_bytes: Option<u64>,
) -> QualityReport {
    let (width, height) = (image.width(), image.height());
    let gray = image.to_luma8();

    let resolution = check_resolution(width, height);
    let blur = check_blur(laplacian_variance(&gray));
    let (mean, std_dev) = intensity_stats(&gray);
    let brightness = check_brightness(mean);
    let dynamic_range = check_dynamic_range(std_dev);
    let file_size = match (file_size_bytes, max_file_size_bytes) {
        (Some(size), Some(max)) => Some(check_file_size(size, max)),
        _ => None,
    };

    let mut checks = vec![resolution, blur, brightness, dynamic_range];
    checks.extend(file_size);
    #[allow(clippy::cast_precision_loss)]
    let overall_score = checks.iter().map(|c| c.score).sum::<f64>() / checks.len() as f64;
    let overall_pass = checks.iter().all(|c| c.pass);

    QualityReport {
        width,
        height,
        resolution,
        blur,
        brightness,
        dynamic_range,
        file_size,
        overall_score,
        overall_pass,
    }
}

fn check_resolution(width: u32, height: u32) -> RuleCheck {
    let min_side = f64::from(width.min(height));
    RuleCheck {
        pass: min_side >= f64::from(MIN_RESOLUTION),
        score: min_side / f64::from(MIN_RESOLUTION),
        value: min_side,
    }
}

fn check_blur(variance: f64) -> RuleCheck {
    RuleCheck {
        pass: variance >= MIN_LAPLACIAN_VARIANCE,
        score: variance / MIN_LAPLACIAN_VARIANCE,
        value: variance,
    }
}

fn check_brightness(brightness: f64) -> RuleCheck {
    let score = if brightness < BRIGHTNESS_MID {
        (brightness / BRIGHTNESS_MARGIN).min((1.0 - brightness) / BRIGHTNESS_MARGIN)
    } else if brightness > BRIGHTNESS_HIGH {
        (1.0 - brightness) / BRIGHTNESS_MARGIN
    } else {
        1.0
    };
    RuleCheck {
        pass: (BRIGHTNESS_LOW..=BRIGHTNESS_HIGH).contains(&brightness),
        score: score.max(0.0),
        value: brightness,
    }
}

fn check_dynamic_range(std_dev: f64) -> RuleCheck {
    RuleCheck {
        pass: std_dev >= MIN_DYNAMIC_RANGE,
        score: std_dev / MIN_DYNAMIC_RANGE,
        value: std_dev,
    }
}

#[allow(clippy::cast_precision_loss)]
fn check_file_size(size: u64, max: u64) -> RuleCheck {
    RuleCheck {
        pass: size <= max,
        score: (max as f64 / size.max(1) as f64).min(1.0),
        value: size as f64,
    }
}

/// Mean and population standard deviation of intensity, normalized to [0, 1].
#[allow(clippy::cast_precision_loss)]
fn intensity_stats(gray: &GrayImage) -> (f64, f64) {
    let pixels = gray.as_raw();
    if pixels.is_empty() {
        return (0.0, 0.0);
    }
    let n = pixels.len() as f64;
    let mean = pixels.iter().map(|&p| f64::from(p)).sum::<f64>() / n;
    let variance = pixels
        .iter()
        .map(|&p| (f64::from(p) - mean).powi(2))
        .sum::<f64>()
        / n;
    (mean / 255.0, variance.sqrt() / 255.0)
}

/// Reflect-101 border index: `-1 -> 1`, `n -> n - 2`.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn reflect_101(i: i64, n: i64) -> u32 {
    if n == 1 {
        return 0;
    }
    let reflected = if i < 0 {
        -i
    } else if i >= n {
        2 * n - 2 - i
    } else {
        i
    };
    reflected as u32
}

/// Population variance of the 4-neighbour Laplacian response.
#[allow(clippy::cast_precision_loss)]
fn laplacian_variance(gray: &GrayImage) -> f64 {
    let (width, height) = gray.dimensions();
    if width == 0 || height == 0 {
        return 0.0;
    }
    let (w, h) = (i64::from(width), i64::from(height));
    let at = |x: i64, y: i64| f64::from(gray.get_pixel(reflect_101(x, w), reflect_101(y, h))[0]);
    let response = |x: i64, y: i64| {
        at(x - 1, y) + at(x + 1, y) + at(x, y - 1) + at(x, y + 1) - 4.0 * at(x, y)
    };

    let n = (w * h) as f64;
    let mut sum = 0.0;
    for y in 0..h {
        for x in 0..w {
            sum += response(x, y);
        }
    }
    let mean = sum / n;

    let mut squared = 0.0;
    for y in 0..h {
        for x in 0..w {
            squared += (response(x, y) - mean).powi(2);
        }
    }
    squared / n
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Luma, Rgb, RgbImage};

    fn solid(width: u32, height: u32, value: u8) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb([value; 3])))
    }

    fn checkerboard(size: u32) -> DynamicImage {
        let gray = GrayImage::from_fn(size, size, |x, y| {
            if (x + y) % 2 == 0 { Luma([0]) } else { Luma([255]) }
        });
        DynamicImage::ImageLuma8(gray)
    }

    #[test]
    fn test_resolution_threshold_inclusive() {
        assert!(check_resolution(512, 900).pass);
        assert!((check_resolution(512, 900).score - 1.0).abs() < f64::EPSILON);
        assert!(!check_resolution(511, 900).pass);
    }

    #[test]
    fn test_flat_image_is_blurry_and_low_contrast() {
        let report = assess(&solid(600, 600, 128), None, None);
        assert!(report.resolution.pass);
        assert!(!report.blur.pass);
        assert!(report.blur.value.abs() < f64::EPSILON);
        assert!(!report.dynamic_range.pass);
        assert!(report.brightness.pass);
        assert!(!report.overall_pass);
    }

    #[test]
    fn test_checkerboard_is_sharp_and_contrasty() {
        let report = assess(&checkerboard(64), None, None);
        assert!(report.blur.pass);
        assert!(report.blur.value > MIN_LAPLACIAN_VARIANCE);
        assert!(report.dynamic_range.pass);
        assert!((report.dynamic_range.value - 0.5).abs() < 1e-9);
        assert!(!report.resolution.pass);
    }

    #[test]
    fn test_laplacian_reflects_borders() {
        let gray = GrayImage::from_fn(3, 3, |x, _| if x == 1 { Luma([255]) } else { Luma([0]) });
        assert!(laplacian_variance(&gray) > 0.0);
        assert_eq!(reflect_101(-1, 3), 1);
        assert_eq!(reflect_101(3, 3), 1);
        assert_eq!(reflect_101(0, 1), 0);
    }

    #[test]
    fn test_brightness_scores() {
        let dark = check_brightness(0.05);
        assert!(!dark.pass);
        assert!((dark.score - 0.2).abs() < 1e-9);

        let bright = check_brightness(0.9);
        assert!(!bright.pass);
        assert!((bright.score - 0.4).abs() < 1e-9);

        let mid = check_brightness(0.6);
        assert!(mid.pass);
        assert!((mid.score - 1.0).abs() < f64::EPSILON);

        assert!(check_brightness(0.25).pass);
        assert!(check_brightness(0.75).pass);
    }

    #[test]
    fn test_file_size_rule_needs_both_sizes() {
        let image = solid(16, 16, 100);
        assert!(assess(&image, Some(10), None).file_size.is_none());
        assert!(assess(&image, None, Some(10)).file_size.is_none());

        let report = assess(&image, Some(200), Some(100));
        let file_size = report.file_size.unwrap_or(RuleCheck {
            pass: true,
            score: 0.0,
            value: 0.0,
        });
        assert!(!file_size.pass);
        assert!((file_size.score - 0.5).abs() < 1e-9);
        assert_eq!(report.rules().len(), 5);
    }

    #[test]
    fn test_overall_score_is_mean() {
        let report = assess(&solid(1024, 1024, 128), Some(1), Some(100));
        let scores: Vec<f64> = report.rules().iter().map(|(_, c)| c.score).collect();
        let mean = scores.iter().sum::<f64>() / scores.len() as f64;
        assert!((report.overall_score - mean).abs() < 1e-12);
    }

    #[test]
    fn test_guidance_for_dark_image() {
        let report = assess(&solid(600, 600, 10), None, None);
        let tips = report.guidance();
        assert!(tips.iter().any(|t| t.contains("Low light")));
        assert_eq!(tips.len(), report.failed_rules().len());
    }

    #[test]
    fn test_assess_is_deterministic() {
        let image = checkerboard(32);
        assert_eq!(assess(&image, None, None), assess(&image, None, None));
    }

    #[test]
    fn test_empty_image_does_not_panic() {
        let report = assess(&solid(0, 0, 0), None, None);
        assert!(!report.overall_pass);
        assert!(report.overall_score.is_finite());
    }
}
