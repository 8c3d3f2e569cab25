use std::path::{Path, PathBuf};

use log::{debug, trace};
use walkdir::WalkDir;

use crate::error::WatchError;
use crate::watcher::item::{is_hidden, WatchedItem};

/// OS metadata and sync-tool bookkeeping names that are never candidates.
const DENIED_NAMES: &[&str] = &["Thumbs.db", "desktop.ini", "$RECYCLE.BIN", "System Volume Information"];

/// In-progress download suffixes; entries carrying one are still being
/// written by some other tool and are skipped outright.
const PARTIAL_SUFFIXES: &[&str] = &[
    ".part",
    ".partial",
    ".crdownload",
    ".download",
    ".tmp",
    ".!qb",
    ".!ut",
    "~",
];

/// Lists dispatch candidates at the top level of the drop directory.
/// Anything below the top level belongs to its containing item.
pub struct DropScanner {
    watch_directory: PathBuf,
}

impl DropScanner {
    pub fn new<P: AsRef<Path>>(watch_directory: P) -> Self {
        Self {
            watch_directory: watch_directory.as_ref().to_path_buf(),
        }
    }

    pub fn watch_directory(&self) -> &Path {
        &self.watch_directory
    }

    /// One scan pass. Results are name-sorted so dispatch order is
    /// deterministic within a tick.
    pub fn scan(&self) -> Result<Vec<WatchedItem>, WatchError> {
        if !self.watch_directory.is_dir() {
            return Err(WatchError::MissingDirectory {
                path: self.watch_directory.clone(),
            });
        }

        let mut items = Vec::new();

        for entry in WalkDir::new(&self.watch_directory)
            .min_depth(1)
            .max_depth(1) // Top-level candidates only
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };

            if Self::is_denied(name) {
                trace!("Skipping denylisted entry: {}", name);
                continue;
            }

            items.push(WatchedItem::new(path.to_path_buf()));
        }

        items.sort_by(|a, b| a.name.cmp(&b.name));
        debug!(
            "Scanned {} candidate(s) in {}",
            items.len(),
            self.watch_directory.display()
        );
        Ok(items)
    }

    fn is_denied(name: &str) -> bool {
        if is_hidden(name) || DENIED_NAMES.contains(&name) {
            return true;
        }
        let lowered = name.to_lowercase();
        PARTIAL_SUFFIXES
            .iter()
            .any(|suffix| lowered.ends_with(suffix))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_scan_empty_directory() {
        let temp_dir = TempDir::new().unwrap();
        let scanner = DropScanner::new(temp_dir.path());

        let items = scanner.scan().unwrap();
        assert!(items.is_empty());
    }

    #[test]
    fn test_scan_missing_directory_is_error() {
        let temp_dir = TempDir::new().unwrap();
        let scanner = DropScanner::new(temp_dir.path().join("nope"));

        let result = scanner.scan();
        assert!(matches!(result, Err(WatchError::MissingDirectory { .. })));
    }

    #[test]
    fn test_scan_includes_files_and_directories() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("movie.mkv"), b"x").unwrap();
        std::fs::create_dir(temp_dir.path().join("season-pack")).unwrap();

        let scanner = DropScanner::new(temp_dir.path());
        let items = scanner.scan().unwrap();

        assert_eq!(items.len(), 2);
        assert_eq!(items[0].name, "movie.mkv");
        assert_eq!(items[1].name, "season-pack");
    }

    #[test]
    fn test_scan_is_top_level_only() {
        let temp_dir = TempDir::new().unwrap();
        let sub = temp_dir.path().join("season-pack");
        std::fs::create_dir(&sub).unwrap();
        std::fs::write(sub.join("episode.mkv"), b"x").unwrap();

        let scanner = DropScanner::new(temp_dir.path());
        let items = scanner.scan().unwrap();

        // The directory itself is the candidate, not its contents
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].name, "season-pack");
    }

    #[test]
    fn test_scan_skips_hidden_and_system_entries() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join(".DS_Store"), b"x").unwrap();
        std::fs::write(temp_dir.path().join("Thumbs.db"), b"x").unwrap();
        std::fs::write(temp_dir.path().join("desktop.ini"), b"x").unwrap();
        std::fs::write(temp_dir.path().join(".hidden-sync-state"), b"x").unwrap();
        std::fs::write(temp_dir.path().join("keep.mkv"), b"x").unwrap();

        let scanner = DropScanner::new(temp_dir.path());
        let items = scanner.scan().unwrap();

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].name, "keep.mkv");
    }

    #[test]
    fn test_scan_skips_partial_downloads() {
        let temp_dir = TempDir::new().unwrap();
        for name in [
            "movie.mkv.part",
            "movie.mkv.crdownload",
            "fetch.partial",
            "payload.download",
            "scratch.tmp",
            "torrented.!qB",
            "torrented.!ut",
            "editor-backup~",
        ] {
            std::fs::write(temp_dir.path().join(name), b"x").unwrap();
        }
        std::fs::write(temp_dir.path().join("finished.mkv"), b"x").unwrap();

        let scanner = DropScanner::new(temp_dir.path());
        let items = scanner.scan().unwrap();

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].name, "finished.mkv");
    }

    #[test]
    fn test_scan_results_sorted_by_name() {
        let temp_dir = TempDir::new().unwrap();
        for name in ["charlie.mkv", "alpha.mkv", "bravo.mkv"] {
            std::fs::write(temp_dir.path().join(name), b"x").unwrap();
        }

        let scanner = DropScanner::new(temp_dir.path());
        let names: Vec<String> = scanner.scan().unwrap().into_iter().map(|i| i.name).collect();

        assert_eq!(names, vec!["alpha.mkv", "bravo.mkv", "charlie.mkv"]);
    }
}
