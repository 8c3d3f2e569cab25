//! Test harness for isolated watcher runs.
//!
//! `WatchHarness` owns a temporary directory tree (drop dir, history log,
//! lock file) and builds configs pointing into it. Handlers are `/bin/sh`
//! one-liners so dispatch, reaping and ceiling behavior are observable
//! without real downloaders.

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use assert_fs::prelude::*;
use assert_fs::TempDir;

use dropwatch::config::{
    ClipboardClassConfig, ClipboardConfig, Config, FolderConfig, HandlerCommand, StabilityConfig,
};

pub struct WatchHarness {
    temp_dir: TempDir,
    /// The watched drop directory.
    pub drop_dir: PathBuf,
    /// Path of the append-only history log.
    pub history_path: PathBuf,
    /// Path of the instance lock file.
    pub lock_path: PathBuf,
}

impl WatchHarness {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        temp_dir
            .child("drop")
            .create_dir_all()
            .expect("Failed to create drop dir");

        Self {
            drop_dir: temp_dir.child("drop").path().to_path_buf(),
            history_path: temp_dir.child("history.log").path().to_path_buf(),
            lock_path: temp_dir.child("dropwatch.lock").path().to_path_buf(),
            temp_dir,
        }
    }

    pub fn temp_path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Create a file in the drop directory and return its path.
    pub fn drop_file(&self, name: &str, content: &[u8]) -> PathBuf {
        let child = self.temp_dir.child(format!("drop/{}", name));
        child.write_binary(content).expect("Failed to write drop file");
        child.path().to_path_buf()
    }

    /// Folder-watching config with fast stability settings (1 check, 1 s).
    pub fn folder_config(&self, ceiling: usize, handler: HandlerCommand) -> Config {
        Config {
            version: "1.0".to_string(),
            watch_directory: self.drop_dir.clone(),
            history_log: self.history_path.clone(),
            lock_file: self.lock_path.clone(),
            max_concurrent_jobs: ceiling,
            poll_interval_secs: 1,
            stability: StabilityConfig {
                checks: 1,
                interval_secs: 1,
            },
            folder: FolderConfig {
                enabled: true,
                handler: Some(handler),
            },
            clipboard: ClipboardConfig::default(),
        }
    }

    /// Clipboard-only config (folder detection off).
    pub fn clipboard_config(&self, youtube_handler: HandlerCommand) -> Config {
        Config {
            version: "1.0".to_string(),
            watch_directory: self.drop_dir.clone(),
            history_log: self.history_path.clone(),
            lock_file: self.lock_path.clone(),
            max_concurrent_jobs: 2,
            poll_interval_secs: 1,
            stability: StabilityConfig {
                checks: 1,
                interval_secs: 1,
            },
            folder: FolderConfig {
                enabled: false,
                handler: None,
            },
            clipboard: ClipboardConfig {
                youtube: ClipboardClassConfig {
                    enabled: true,
                    handler: Some(youtube_handler),
                },
                magnet: ClipboardClassConfig::default(),
            },
        }
    }

    /// Handler running the given shell script; `$1`/`$2`/`$3` are the
    /// positional item arguments (type tag, path, hint for folder items).
    pub fn script_handler(script: &str) -> HandlerCommand {
        HandlerCommand {
            program: "/bin/sh".to_string(),
            args: vec!["-c".to_string(), script.to_string(), "handler".to_string()],
        }
    }

    /// Handler that appends its item arguments to `name` in the temp dir,
    /// then exits. Returns the handler and the recording file's path.
    pub fn recording_handler(&self, name: &str) -> (HandlerCommand, PathBuf) {
        let out = self.temp_path().join(name);
        (
            Self::script_handler(&format!("echo \"$1 $2 $3\" >> {}", out.display())),
            out,
        )
    }

    pub fn history_contents(&self) -> String {
        std::fs::read_to_string(&self.history_path).unwrap_or_default()
    }
}
