//! Human-readable console output.

use crate::imaging::QualityReport;
use crate::output::ImageRecord;
use crate::router::{HeadOutcome, InferenceResult};
use std::fmt::Write as _;

/// Render one image's result for the console.
pub fn format_result(record: &ImageRecord) -> String {
    let result = &record.result;
    let mut out = String::new();

    let _ = writeln!(out, "{}", record.file_name());
    let _ = writeln!(
        out,
        "  Species: {} ({:.1}%, {})",
        result.species.label,
        result.species.confidence * 100.0,
        result.species_band
    );

    match (&result.breed, &result.guardrail) {
        (Some(breed), _) => {
            let _ = writeln!(
                out,
                "  Breed:   {} ({:.1}%, {}) [{} head]",
                display_label(&breed.outcome.label),
                breed.outcome.confidence * 100.0,
                breed.verdict,
                breed.head
            );
            let others: Vec<String> = breed
                .top_k
                .iter()
                .skip(1)
                .map(|c| format!("{} {:.1}%", display_label(&c.label), c.confidence * 100.0))
                .collect();
            if !others.is_empty() {
                let _ = writeln!(out, "  Also:    {}", others.join(", "));
            }
        }
        (None, Some(guardrail)) => {
            let _ = writeln!(out, "  Model is unsure; compare the two likely options:");
            let _ = writeln!(out, "    Sheep head:  {}", side(&guardrail.sheep));
            let _ = writeln!(out, "    Bovine head: {}", side(&guardrail.bovine));
        }
        (None, None) => {
            let _ = writeln!(out, "  Breed:   not evaluated ({})", result.final_state);
        }
    }

    let _ = writeln!(
        out,
        "  Quality: {:.2} ({}), latency {:.0}ms ({})",
        result.quality.overall_score,
        if result.quality.overall_pass { "ok" } else { "check" },
        result.elapsed_ms,
        result.latency
    );
    for tip in result.quality.guidance() {
        let _ = writeln!(out, "    tip: {tip}");
    }
    if result.requires_manual_check() {
        let _ = writeln!(out, "  Manual verification recommended");
    }
    out
}

/// Render a standalone quality report.
pub fn format_quality(report: &QualityReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Image: {}x{}", report.width, report.height);
    for (rule, check) in report.rules() {
        let _ = writeln!(
            out,
            "  {:<14} {:<4} score {:.2} (value {:.3})",
            rule.to_string(),
            if check.pass { "pass" } else { "FAIL" },
            check.score,
            check.value
        );
    }
    let _ = writeln!(
        out,
        "Overall: {:.2} ({})",
        report.overall_score,
        if report.overall_pass { "pass" } else { "fail" }
    );
    for tip in report.guidance() {
        let _ = writeln!(out, "  tip: {tip}");
    }
    out
}

/// One-line batch summary.
pub fn format_batch_summary(results: &[&InferenceResult], failed: usize) -> String {
    let committed = results.iter().filter(|r| r.breed.is_some()).count();
    let review = results.iter().filter(|r| r.requires_manual_check()).count();
    format!(
        "{} image(s) routed, {committed} breed(s) committed, {review} need review, {failed} failed",
        results.len()
    )
}

fn side(outcome: &HeadOutcome) -> String {
    match outcome {
        HeadOutcome::Available(o) => {
            format!("{} ({:.1}%)", display_label(&o.label), o.confidence * 100.0)
        }
        HeadOutcome::Unavailable { reason } => format!("unavailable ({reason})"),
    }
}

/// Underscores in class folder names read as spaces.
fn display_label(label: &str) -> String {
    label.replace('_', " ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::assess;
    use image::{DynamicImage, Rgb, RgbImage};

    #[test]
    fn test_format_quality_lists_rules_and_tips() {
        let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(100, 100, Rgb([5, 5, 5])));
        let report = assess(&image, Some(2048), Some(1024));
        let text = format_quality(&report);
        assert!(text.contains("resolution"));
        assert!(text.contains("file_size"));
        assert!(text.contains("FAIL"));
        assert!(text.contains("tip: Low light"));
    }

    #[test]
    fn test_display_label() {
        assert_eq!(display_label("red_sindhi"), "red sindhi");
    }
}
