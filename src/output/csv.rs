//! CSV writers for results and session history.

use crate::constants::UTF8_BOM;
use crate::constants::confidence::DECIMAL_PLACES;
use crate::error::{Error, Result};
use crate::output::{ImageRecord, OutputWriter};
use crate::session::HistoryEntry;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Results CSV columns.
const RESULT_COLUMNS: [&str; 12] = [
    "File",
    "Image hash",
    "Species",
    "Species confidence",
    "Routed head",
    "Breed",
    "Breed confidence",
    "Verdict",
    "Manual check",
    "Quality score",
    "Quality pass",
    "Inference (ms)",
];

/// CSV format output writer for routed results.
pub struct CsvWriter {
    writer: csv::Writer<BufWriter<File>>,
    path: PathBuf,
}

impl CsvWriter {
    /// Create a new CSV writer, optionally prefixing a UTF-8 BOM for Excel.
    pub fn new(path: &Path, bom: bool) -> Result<Self> {
        let mut file = BufWriter::new(File::create(path)?);
        // BOM goes ahead of anything the csv writer emits
        if bom {
            file.write_all(UTF8_BOM)?;
        }
        Ok(Self {
            writer: csv::Writer::from_writer(file),
            path: path.to_path_buf(),
        })
    }

    fn csv_error(&self, source: csv::Error) -> Error {
        Error::CsvWrite {
            path: self.path.clone(),
            source,
        }
    }
}

impl OutputWriter for CsvWriter {
    fn write_header(&mut self) -> Result<()> {
        self.writer
            .write_record(RESULT_COLUMNS)
            .map_err(|e| self.csv_error(e))
    }

    fn write_record(&mut self, record: &ImageRecord) -> Result<()> {
        let result = &record.result;
        let breed = result.breed.as_ref();
        let row = [
            record.file_path.display().to_string(),
            record.image_hash.clone(),
            result.species.label.clone(),
            format_confidence(result.species.confidence),
            result.routed_head.to_string(),
            breed.map(|b| b.outcome.label.clone()).unwrap_or_default(),
            breed
                .map(|b| format_confidence(b.outcome.confidence))
                .unwrap_or_default(),
            breed.map(|b| b.verdict.to_string()).unwrap_or_default(),
            result.requires_manual_check().to_string(),
            format!("{:.3}", result.quality.overall_score),
            result.quality.overall_pass.to_string(),
            format!("{:.1}", result.elapsed_ms),
        ];
        self.writer.write_record(&row).map_err(|e| self.csv_error(e))
    }

    fn finalize(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

fn format_confidence(confidence: f32) -> String {
    format!("{confidence:.decimal$}", decimal = DECIMAL_PLACES)
}

/// Export the session history as CSV.
pub fn write_history_csv(entries: &[HistoryEntry], path: &Path, bom: bool) -> Result<()> {
    let csv_error = |source: csv::Error| Error::CsvWrite {
        path: path.to_path_buf(),
        source,
    };

    let mut file = BufWriter::new(File::create(path)?);
    if bom {
        file.write_all(UTF8_BOM)?;
    }
    let mut writer = csv::Writer::from_writer(file);
    if entries.is_empty() {
        writer
            .write_record([
                "timestamp",
                "image_hash",
                "file_name",
                "species",
                "species_confidence",
                "breed",
                "breed_confidence",
                "inference_ms",
            ])
            .map_err(csv_error)?;
    }
    for entry in entries {
        writer.serialize(entry).map_err(csv_error)?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use tempfile::TempDir;

    fn history_entry() -> HistoryEntry {
        HistoryEntry {
            timestamp: Utc::now(),
            image_hash: "abc123".to_string(),
            file_name: "buffalo, murrah.jpg".to_string(),
            species: "bovine".to_string(),
            species_confidence: 0.91,
            breed: Some("Murrah".to_string()),
            breed_confidence: Some(0.77),
            inference_ms: 42.5,
        }
    }

    #[test]
    fn test_history_csv_quotes_and_header() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("history.csv");
        write_history_csv(&[history_entry()], &path, false).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.starts_with("timestamp,image_hash,file_name"));
        assert!(contents.contains("\"buffalo, murrah.jpg\""));
        assert!(contents.contains("Murrah"));
    }

    #[test]
    fn test_history_csv_with_bom() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("history.csv");
        write_history_csv(&[], &path, true).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(&bytes[..3], UTF8_BOM);
        assert!(String::from_utf8_lossy(&bytes[3..]).starts_with("timestamp,"));
    }

    #[test]
    fn test_results_csv_with_bom() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("results.csv");
        let mut writer = CsvWriter::new(&path, true).unwrap();
        writer.write_header().unwrap();
        writer.finalize().unwrap();

        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(&bytes[..3], UTF8_BOM);
        assert!(String::from_utf8_lossy(&bytes[3..]).starts_with("File,Image hash,"));
    }

    #[test]
    fn test_results_csv_without_bom() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("results.csv");
        let mut writer = CsvWriter::new(&path, false).unwrap();
        writer.write_header().unwrap();
        writer.finalize().unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.starts_with("File,Image hash,"));
    }

    #[test]
    fn test_format_confidence() {
        assert_eq!(format_confidence(0.75), "0.7500");
    }
}
