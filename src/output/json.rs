//! JSON results writer.

use crate::error::{Error, Result};
use crate::output::{ImageRecord, OutputWriter};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

/// JSON result file structure.
#[derive(Debug, Serialize)]
pub struct JsonResultFile<'a> {
    /// Analysis timestamp.
    pub analysis_date: DateTime<Utc>,
    /// Analysis settings.
    pub settings: JsonSettings,
    /// Per-image results.
    pub results: &'a [ImageRecord],
    /// Summary statistics.
    pub summary: JsonSummary,
}

/// Analysis settings for JSON output.
#[derive(Debug, Clone, Serialize)]
pub struct JsonSettings {
    /// Species confidence threshold.
    pub species_threshold: f32,
    /// Breed confidence threshold.
    pub breed_threshold: f32,
    /// Whether the lite species-only ensemble was used.
    pub offline: bool,
    /// Crop mode name.
    pub crop: String,
}

/// Summary statistics.
#[derive(Debug, Serialize)]
pub struct JsonSummary {
    /// Images routed.
    pub total_images: usize,
    /// Images with a committed breed.
    pub breeds_committed: usize,
    /// Images where the guardrail engaged.
    pub guardrail_engaged: usize,
    /// Images that need a human review.
    pub manual_checks: usize,
    /// Images that failed the quality gate.
    pub quality_failures: usize,
}

impl JsonSummary {
    fn from_records(records: &[ImageRecord]) -> Self {
        let count = |pred: fn(&ImageRecord) -> bool| records.iter().filter(|r| pred(r)).count();
        Self {
            total_images: records.len(),
            breeds_committed: count(|r| r.result.breed.is_some()),
            guardrail_engaged: count(|r| r.result.guardrail.is_some()),
            manual_checks: count(|r| r.result.requires_manual_check()),
            quality_failures: count(|r| !r.result.quality.overall_pass),
        }
    }
}

/// Writer for JSON result files.
pub struct JsonResultWriter {
    records: Vec<ImageRecord>,
    output_path: PathBuf,
    settings: JsonSettings,
}

impl JsonResultWriter {
    /// Create a new JSON result writer.
    pub fn new(output_path: &Path, settings: JsonSettings) -> Self {
        Self {
            records: Vec::new(),
            output_path: output_path.to_path_buf(),
            settings,
        }
    }
}

impl OutputWriter for JsonResultWriter {
    fn write_header(&mut self) -> Result<()> {
        // No header for JSON - written at finalize
        Ok(())
    }

    fn write_record(&mut self, record: &ImageRecord) -> Result<()> {
        self.records.push(record.clone());
        Ok(())
    }

    fn finalize(&mut self) -> Result<()> {
        let file = JsonResultFile {
            analysis_date: Utc::now(),
            settings: self.settings.clone(),
            results: &self.records,
            summary: JsonSummary::from_records(&self.records),
        };

        let writer = BufWriter::new(File::create(&self.output_path)?);
        serde_json::to_writer_pretty(writer, &file).map_err(|e| Error::JsonWrite {
            path: self.output_path.clone(),
            source: e,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_json_writer_empty_batch() {
        let dir = tempdir().expect("create temp dir");
        let output_path = dir.path().join("results.json");

        let mut writer = JsonResultWriter::new(
            &output_path,
            JsonSettings {
                species_threshold: 0.8,
                breed_threshold: 0.7,
                offline: false,
                crop: "center".to_string(),
            },
        );
        writer.write_header().expect("write header");
        writer.finalize().expect("finalize");

        let content = std::fs::read_to_string(&output_path).expect("read file");
        let value: serde_json::Value = serde_json::from_str(&content).expect("parse JSON");
        assert_eq!(value["summary"]["total_images"], 0);
        assert_eq!(value["settings"]["crop"], "center");
        assert!(value["results"].as_array().expect("results array").is_empty());
    }
}
