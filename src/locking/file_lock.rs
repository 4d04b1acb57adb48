//! Cross-process lock files guarding appends to shared files.

use crate::constants::ledger::LOCK_FILE_EXTENSION;
use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tracing::{debug, warn};

/// Lock file content for debugging.
#[derive(Debug, Serialize, Deserialize)]
pub struct LockInfo {
    /// Process ID that holds the lock.
    pub pid: u32,
    /// Hostname of the machine.
    pub hostname: String,
    /// When the lock was acquired.
    pub started: DateTime<Utc>,
    /// File the lock protects.
    pub target: PathBuf,
}

/// How hard to try before giving up on a held lock.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Number of acquisition attempts.
    pub attempts: u32,
    /// Delay between attempts.
    pub delay: Duration,
    /// Lock files older than this are removed and retried.
    pub stale_after: Duration,
}

/// RAII guard for file locks.
#[derive(Debug)]
pub struct FileLock {
    lock_path: PathBuf,
}

impl FileLock {
    /// Attempt once to acquire the lock for `target`.
    ///
    /// The lock file sits next to the target as `<target>.lock`.
    pub fn acquire(target: &Path) -> Result<Self> {
        let lock_path = Self::lock_path_for(target);

        let file = OpenOptions::new()
            .write(true)
            .create_new(true) // Fails if file exists
            .open(&lock_path);

        match file {
            Ok(mut f) => {
                let info = LockInfo {
                    pid: std::process::id(),
                    hostname: hostname::get().map_or_else(
                        |_| "unknown".to_string(),
                        |h| h.to_string_lossy().into_owned(),
                    ),
                    started: Utc::now(),
                    target: target.to_path_buf(),
                };

                let json = serde_json::to_string_pretty(&info).unwrap_or_else(|_| "{}".to_string());
                let _ = f.write_all(json.as_bytes());

                // Register for cleanup on signal
                register_lock(&lock_path);

                Ok(Self { lock_path })
            }
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                Err(Error::FileLocked { path: lock_path })
            }
            Err(e) => Err(Error::LockCreate {
                path: lock_path,
                source: e,
            }),
        }
    }

    /// Acquire the lock, waiting for other holders and clearing stale locks.
    pub fn acquire_with_retry(target: &Path, policy: RetryPolicy) -> Result<Self> {
        let mut last_error = None;
        for attempt in 1..=policy.attempts.max(1) {
            match Self::acquire(target) {
                Ok(lock) => return Ok(lock),
                Err(Error::FileLocked { path }) => {
                    if let Some(observed) = Self::stale_since(target, policy.stale_after) {
                        match Self::remove_if_unchanged(target, observed) {
                            Ok(true) => warn!("Removed stale lock file: {}", path.display()),
                            Ok(false) => debug!("Stale lock changed hands: {}", path.display()),
                            Err(e) => debug!("{e}"),
                        }
                        continue;
                    }
                    debug!("Lock held ({attempt}/{}): {}", policy.attempts, path.display());
                    last_error = Some(Error::FileLocked { path });
                    std::thread::sleep(policy.delay);
                }
                Err(e) => return Err(e),
            }
        }
        Err(last_error.unwrap_or_else(|| Error::FileLocked {
            path: Self::lock_path_for(target),
        }))
    }

    /// Get the lock file path for a target file.
    pub fn lock_path_for(target: &Path) -> PathBuf {
        let mut name = target
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "unknown".into());
        name.push(LOCK_FILE_EXTENSION);
        target.with_file_name(name)
    }

    /// Check if a lock file exists.
    pub fn is_locked(target: &Path) -> bool {
        Self::lock_path_for(target).exists()
    }

    /// Check if a lock is stale (older than `max_age`).
    pub fn is_stale(target: &Path, max_age: Duration) -> bool {
        Self::stale_since(target, max_age).is_some()
    }

    /// Modification time of the lock file, if it is older than `max_age`.
    pub fn stale_since(target: &Path, max_age: Duration) -> Option<SystemTime> {
        let modified = fs::metadata(Self::lock_path_for(target))
            .and_then(|m| m.modified())
            .ok()?;
        (modified.elapsed().unwrap_or_default() > max_age).then_some(modified)
    }

    /// Remove the lock file only if it is still the one last modified at `observed`.
    ///
    /// The file is first renamed aside, so of several waiters that saw the
    /// same stale lock only one can claim it. A lock that was re-acquired
    /// after the staleness check is linked back into place.
    /// Returns whether a stale lock was removed.
    pub fn remove_if_unchanged(target: &Path, observed: SystemTime) -> Result<bool> {
        let lock_path = Self::lock_path_for(target);
        let mut claimed = lock_path.clone().into_os_string();
        claimed.push(format!(".stale-{}", std::process::id()));
        let claimed = PathBuf::from(claimed);

        match fs::rename(&lock_path, &claimed) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(false),
            Err(e) => {
                return Err(Error::LockRemove {
                    path: lock_path,
                    source: e,
                });
            }
        }

        let unchanged = fs::metadata(&claimed)
            .and_then(|m| m.modified())
            .is_ok_and(|modified| modified == observed);
        if unchanged {
            fs::remove_file(&claimed).map_err(|e| Error::LockRemove {
                path: claimed,
                source: e,
            })?;
            return Ok(true);
        }

        // Fails if yet another writer already holds a new lock
        if let Err(e) = fs::hard_link(&claimed, &lock_path) {
            warn!("Could not restore lock file {}: {e}", lock_path.display());
        }
        let _ = fs::remove_file(&claimed);
        Ok(false)
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.lock_path);
        unregister_lock(&self.lock_path);
    }
}

/// Global registry of active lock paths for cleanup on signal.
static ACTIVE_LOCKS: std::sync::LazyLock<std::sync::Mutex<Vec<PathBuf>>> =
    std::sync::LazyLock::new(|| std::sync::Mutex::new(Vec::new()));

/// Register a lock path for cleanup on signal.
pub fn register_lock(path: &Path) {
    if let Ok(mut locks) = ACTIVE_LOCKS.lock() {
        locks.push(path.to_path_buf());
    }
}

/// Unregister a lock path after normal cleanup.
pub fn unregister_lock(path: &Path) {
    if let Ok(mut locks) = ACTIVE_LOCKS.lock() {
        locks.retain(|p| p != path);
    }
}

/// Clean up all registered locks. Called on signal.
pub fn cleanup_all_locks() {
    if let Ok(locks) = ACTIVE_LOCKS.lock() {
        for lock_path in locks.iter() {
            let _ = fs::remove_file(lock_path);
        }
    }
}
