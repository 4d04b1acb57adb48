//! Lock files for shared output.

mod file_lock;

pub use file_lock::{FileLock, LockInfo, RetryPolicy, cleanup_all_locks};
