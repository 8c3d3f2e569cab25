use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Utc;

use crate::error::WatchError;

/// Append-only log of completed dispatch outcomes, one timestamped line per
/// entry. The core only ever writes it; read-back is an external concern.
pub struct HistoryLog {
    path: PathBuf,
}

impl HistoryLog {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one entry. The summary must be a single line; embedded
    /// newlines are flattened to keep the log line-oriented.
    pub fn append(&self, summary: &str) -> Result<(), WatchError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|e| WatchError::HistoryAppend {
                    path: self.path.clone(),
                    source: e,
                })?;
            }
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| WatchError::HistoryAppend {
                path: self.path.clone(),
                source: e,
            })?;

        let summary = summary.replace(['\n', '\r'], " ");
        let line = format!("{} {}\n", Utc::now().format("%Y-%m-%dT%H:%M:%S%.3fZ"), summary);
        file.write_all(line.as_bytes())
            .map_err(|e| WatchError::HistoryAppend {
                path: self.path.clone(),
                source: e,
            })
    }
}
