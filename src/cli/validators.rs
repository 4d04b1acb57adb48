//! CLI argument validators.

use crate::constants::confidence;

/// Parse a float and check it lies within `[min, max]`.
fn parse_in_range<T>(s: &str, min: T, max: T, name: &str) -> Result<T, String>
where
    T: std::str::FromStr + PartialOrd + std::fmt::Display + Copy,
{
    let value: T = s
        .parse()
        .map_err(|_| format!("'{s}' is not a valid number"))?;

    if !(min..=max).contains(&value) {
        return Err(format!("{name} must be between {min} and {max}, got {value}"));
    }

    Ok(value)
}

/// Parse and validate a confidence or threshold value (0.0-1.0).
pub fn parse_confidence(s: &str) -> Result<f32, String> {
    parse_in_range(s, confidence::MIN, confidence::MAX, "confidence")
}

/// Parse and validate an upload size limit in megabytes.
pub fn parse_file_size_mb(s: &str) -> Result<f64, String> {
    let value = parse_in_range(s, 0.0, 1024.0, "max file size")?;
    if value <= 0.0 {
        return Err("max file size must be greater than 0".to_string());
    }
    Ok(value)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_confidence_valid() {
        assert_eq!(parse_confidence("0.5").ok(), Some(0.5));
        assert_eq!(parse_confidence("0").ok(), Some(0.0));
        assert_eq!(parse_confidence("1.0").ok(), Some(1.0));
    }

    #[test]
    fn test_parse_confidence_invalid() {
        assert!(parse_confidence("1.1").is_err());
        assert!(parse_confidence("-0.1").is_err());
        assert!(parse_confidence("NaN").is_err());
        let err = parse_confidence("abc").unwrap_err();
        assert!(err.contains("not a valid number"));
    }

    #[test]
    fn test_parse_file_size_mb() {
        assert_eq!(parse_file_size_mb("10").ok(), Some(10.0));
        assert!(parse_file_size_mb("0").is_err());
        assert!(parse_file_size_mb("-1").is_err());
        let err = parse_file_size_mb("4096").unwrap_err();
        assert!(err.contains("max file size must be between"));
    }
}
