//! Durable append-only corrections log.

use super::{ActiveLearningQueue, Correction};
use crate::constants::ledger::{LOCK_ATTEMPTS, LOCK_RETRY_MS, STALE_LOCK_SECS};
use crate::error::{Error, Result};
use crate::locking::{FileLock, RetryPolicy};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;
use tracing::{debug, info};

/// Append-only CSV log of corrections.
///
/// Appends are serialized in-process by a mutex and across processes by a
/// `<ledger>.lock` file. Each record is written with a single `write_all`.
#[derive(Debug)]
pub struct CorrectionLedger {
    path: PathBuf,
    write_guard: Mutex<()>,
    retry: RetryPolicy,
}

impl CorrectionLedger {
    /// Open a ledger at `path`. The file is created on first append.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::with_retry(
            path,
            RetryPolicy {
                attempts: LOCK_ATTEMPTS,
                delay: Duration::from_millis(LOCK_RETRY_MS),
                stale_after: Duration::from_secs(STALE_LOCK_SECS),
            },
        )
    }

    /// Open a ledger with a custom lock retry policy.
    pub fn with_retry(path: impl Into<PathBuf>, retry: RetryPolicy) -> Self {
        Self {
            path: path.into(),
            write_guard: Mutex::new(()),
            retry,
        }
    }

    /// Ledger file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Persist a correction, then queue it for active learning.
    ///
    /// On failure nothing is appended and the queue is left untouched.
    pub fn record(
        &self,
        queue: &mut ActiveLearningQueue,
        image_hash: &str,
        predicted: &str,
        actual: &str,
        confidence: f32,
    ) -> Result<Correction> {
        let correction = Correction::now(image_hash, predicted, actual, confidence);
        self.append(&correction)?;
        queue.push(correction.clone());
        info!(
            "Recorded correction for {}: {predicted} -> {actual}",
            short_hash(image_hash)
        );
        Ok(correction)
    }

    /// Append one correction to the log.
    pub fn append(&self, correction: &Correction) -> Result<()> {
        let persistence = |reason: String| Error::Persistence {
            path: self.path.clone(),
            reason,
        };

        let _guard = self
            .write_guard
            .lock()
            .map_err(|_| persistence("ledger mutex poisoned".to_string()))?;

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| persistence(e.to_string()))?;
        }

        let _lock = FileLock::acquire_with_retry(&self.path, self.retry)
            .map_err(|e| persistence(e.to_string()))?;

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| persistence(e.to_string()))?;
        let needs_header = file
            .metadata()
            .map_err(|e| persistence(e.to_string()))?
            .len()
            == 0;

        let bytes =
            encode_record(correction, needs_header).map_err(|e| persistence(e.to_string()))?;
        file.write_all(&bytes)
            .and_then(|()| file.flush())
            .map_err(|e| persistence(e.to_string()))?;

        debug!("Appended {} bytes to {}", bytes.len(), self.path.display());
        Ok(())
    }

    /// Read every correction back in append order.
    ///
    /// A ledger that does not exist yet reads as empty.
    pub fn read_all(&self) -> Result<Vec<Correction>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_path(&self.path)
            .map_err(|e| Error::LedgerRead {
                path: self.path.clone(),
                source: e,
            })?;

        reader
            .deserialize::<Correction>()
            .map(|record| {
                record.map_err(|e| Error::LedgerRead {
                    path: self.path.clone(),
                    source: e,
                })
            })
            .collect()
    }
}

/// Serialize one record (optionally preceded by the header) into a buffer.
fn encode_record(
    correction: &Correction,
    with_header: bool,
) -> std::result::Result<Vec<u8>, csv::Error> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(with_header)
        .from_writer(Vec::new());
    writer.serialize(correction)?;
    writer
        .into_inner()
        .map_err(|e| csv::Error::from(e.into_error()))
}

fn short_hash(hash: &str) -> &str {
    hash.get(..12).unwrap_or(hash)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tempfile::TempDir;

    #[test]
    fn test_record_appends_and_queues() {
        let dir = TempDir::new().unwrap();
        let ledger = CorrectionLedger::new(dir.path().join("corrections.csv"));
        let mut queue = ActiveLearningQueue::new();

        ledger.record(&mut queue, "aaa", "Gir", "Sahiwal", 0.61).unwrap();
        ledger.record(&mut queue, "bbb", "Deccani", "Nellore", 0.55).unwrap();

        let all = ledger.read_all().unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].image_hash, "aaa");
        assert_eq!(all[1].actual, "Nellore");
        assert_eq!(queue.len(), 2);
        assert_eq!(queue.items(), all.as_slice());
    }

    #[test]
    fn test_header_written_once() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("corrections.csv");
        let ledger = CorrectionLedger::new(&path);
        let mut queue = ActiveLearningQueue::new();

        for i in 0..3 {
            ledger
                .record(&mut queue, &format!("hash{i}"), "Gir", "Sahiwal", 0.5)
                .unwrap();
        }

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text.lines().count(), 4);
        assert_eq!(
            text.lines().next().unwrap(),
            "timestamp,image_hash,predicted,actual,confidence"
        );
    }

    #[test]
    fn test_failed_write_is_persistence_error_and_not_queued() {
        let dir = TempDir::new().unwrap();
        // The ledger path is a directory, so opening it for append fails
        let ledger = CorrectionLedger::new(dir.path());
        let mut queue = ActiveLearningQueue::new();

        let result = ledger.record(&mut queue, "aaa", "Gir", "Sahiwal", 0.61);
        assert!(matches!(result, Err(Error::Persistence { .. })));
        assert!(queue.is_empty());
    }

    #[test]
    fn test_held_lock_is_persistence_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("corrections.csv");
        let ledger = CorrectionLedger::with_retry(
            &path,
            RetryPolicy {
                attempts: 2,
                delay: Duration::from_millis(1),
                stale_after: Duration::from_secs(3600),
            },
        );
        let _held = FileLock::acquire(&path).unwrap();
        let mut queue = ActiveLearningQueue::new();

        let result = ledger.record(&mut queue, "aaa", "Gir", "Sahiwal", 0.61);
        assert!(matches!(result, Err(Error::Persistence { .. })));
        assert!(queue.is_empty());
        assert!(ledger.read_all().unwrap().is_empty());
    }

    #[test]
    fn test_concurrent_appends_are_not_interleaved() {
        let dir = TempDir::new().unwrap();
        let ledger = Arc::new(CorrectionLedger::new(dir.path().join("corrections.csv")));

        let handles: Vec<_> = (0..4)
            .map(|t| {
                let ledger = Arc::clone(&ledger);
                std::thread::spawn(move || {
                    let mut queue = ActiveLearningQueue::new();
                    for i in 0..10 {
                        ledger
                            .record(&mut queue, &format!("t{t}-{i}"), "Gir", "Sahiwal", 0.6)
                            .unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(ledger.read_all().unwrap().len(), 40);
    }

    #[test]
    fn test_missing_ledger_reads_empty() {
        let dir = TempDir::new().unwrap();
        let ledger = CorrectionLedger::new(dir.path().join("none.csv"));
        assert!(ledger.read_all().unwrap().is_empty());
    }
}
