//! File records and modification tracking

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// A file known to the cache.
///
/// `timestamp` is the modification time in nanoseconds since the Unix epoch
/// as last observed, or 0 when the file has never been seen on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct File {
    pub path: PathBuf,
    #[serde(default)]
    pub timestamp: u64,
    #[serde(default)]
    pub outdated: bool,
}

impl File {
    /// Record a file observed for the first time. It starts out outdated.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let timestamp = modified_nanos(&path).unwrap_or(0);

        Self {
            path,
            timestamp,
            outdated: true,
        }
    }

    /// A build artifact that does not exist yet.
    pub fn artifact(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            timestamp: 0,
            outdated: true,
        }
    }

    /// True when the file on disk still has the recorded timestamp.
    pub fn is_current(&self) -> bool {
        modified_nanos(&self.path) == Some(self.timestamp)
    }

    /// Take the current timestamp from disk and clear `outdated`.
    pub fn refresh(&mut self) {
        self.timestamp = modified_nanos(&self.path).unwrap_or(0);
        self.outdated = false;
    }
}

/// Modification time of `path` in nanoseconds since the Unix epoch.
pub fn modified_nanos(path: &Path) -> Option<u64> {
    let mtime = std::fs::metadata(path).ok()?.modified().ok()?;
    let nanos = mtime
        .duration_since(SystemTime::UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    u64::try_from(nanos).ok()
}
