//! In-memory active-learning queue.

use super::Correction;
use crate::error::{Error, Result};
use std::io::Write;
use std::path::Path;

/// Corrections gathered during a session, in record order.
///
/// Only [`ActiveLearningQueue::clear`] or dropping the session empties it.
#[derive(Debug, Clone, Default)]
pub struct ActiveLearningQueue {
    items: Vec<Correction>,
}

impl ActiveLearningQueue {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a correction.
    pub fn push(&mut self, correction: Correction) {
        self.items.push(correction);
    }

    /// Queued corrections.
    pub fn items(&self) -> &[Correction] {
        &self.items
    }

    /// Number of queued corrections.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the queue is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Remove every queued correction.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Write the queue as CSV with a header row.
    pub fn write_csv<W: Write>(&self, writer: W) -> std::result::Result<(), csv::Error> {
        write_corrections_csv(&self.items, writer)
    }

    /// Export the queue to a CSV file.
    pub fn export_csv(&self, path: &Path) -> Result<()> {
        export_corrections_csv(&self.items, path)
    }
}

/// Write corrections as CSV with a header row.
pub fn write_corrections_csv<W: Write>(
    corrections: &[Correction],
    writer: W,
) -> std::result::Result<(), csv::Error> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    if corrections.is_empty() {
        csv_writer.write_record(Correction::COLUMNS)?;
    }
    for correction in corrections {
        csv_writer.serialize(correction)?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Export corrections to a CSV file.
pub fn export_corrections_csv(corrections: &[Correction], path: &Path) -> Result<()> {
    let file = std::fs::File::create(path)?;
    write_corrections_csv(corrections, file).map_err(|e| Error::CsvWrite {
        path: path.to_path_buf(),
        source: e,
    })
}
