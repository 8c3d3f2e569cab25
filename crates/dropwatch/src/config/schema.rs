use std::path::PathBuf;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub version: String,
    pub watch_directory: PathBuf,
    #[serde(default = "default_history_log")]
    pub history_log: PathBuf,
    #[serde(default = "default_lock_file")]
    pub lock_file: PathBuf,
    #[serde(default = "default_max_concurrent_jobs")]
    pub max_concurrent_jobs: usize,
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
    #[serde(default)]
    pub stability: StabilityConfig,
    #[serde(default)]
    pub folder: FolderConfig,
    #[serde(default)]
    pub clipboard: ClipboardConfig,
}

fn default_max_concurrent_jobs() -> usize {
    num_cpus::get()
}

fn default_poll_interval_secs() -> u64 {
    5
}

fn default_history_log() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("dropwatch")
        .join("history.log")
}

fn default_lock_file() -> PathBuf {
    dirs::runtime_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("dropwatch.lock")
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StabilityConfig {
    #[serde(default = "default_stability_checks")]
    pub checks: u32,
    #[serde(default = "default_stability_interval")]
    pub interval_secs: u64,
}

fn default_stability_checks() -> u32 {
    3
}

fn default_stability_interval() -> u64 {
    2
}

impl Default for StabilityConfig {
    fn default() -> Self {
        Self {
            checks: default_stability_checks(),
            interval_secs: default_stability_interval(),
        }
    }
}

/// External handler invocation: a program plus leading arguments. The
/// detector appends the item's positional arguments (URL, or type tag +
/// path + category hint) when invoking it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HandlerCommand {
    pub program: String,
    #[serde(default)]
    pub args: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FolderConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default)]
    pub handler: Option<HandlerCommand>,
}

fn default_true() -> bool {
    true
}

impl Default for FolderConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            handler: None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClipboardConfig {
    #[serde(default)]
    pub youtube: ClipboardClassConfig,
    #[serde(default)]
    pub magnet: ClipboardClassConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClipboardClassConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub handler: Option<HandlerCommand>,
}

impl Default for ClipboardClassConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            handler: None,
        }
    }
}

impl Config {
    /// True if any clipboard content class is enabled.
    pub fn clipboard_enabled(&self) -> bool {
        self.clipboard.youtube.enabled || self.clipboard.magnet.enabled
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_applied() {
        let json = r#"
        {
            "version": "1.0",
            "watch_directory": "/drop"
        }
        "#;

        let config: Config = serde_json::from_str(json).unwrap();
        assert_eq!(config.version, "1.0");
        assert_eq!(config.watch_directory, PathBuf::from("/drop"));
        assert_eq!(config.max_concurrent_jobs, num_cpus::get());
        assert_eq!(config.poll_interval_secs, 5);
        assert_eq!(config.stability.checks, 3);
        assert_eq!(config.stability.interval_secs, 2);
        assert!(config.folder.enabled);
        assert!(config.folder.handler.is_none());
        assert!(!config.clipboard_enabled());
    }

    #[test]
    fn test_handler_command_parsed() {
        let json = r#"
        {
            "version": "1.0",
            "watch_directory": "/drop",
            "folder": {
                "enabled": true,
                "handler": { "program": "process-item", "args": ["--quiet"] }
            }
        }
        "#;

        let config: Config = serde_json::from_str(json).unwrap();
        let handler = config.folder.handler.unwrap();
        assert_eq!(handler.program, "process-item");
        assert_eq!(handler.args, vec!["--quiet".to_string()]);
    }

    #[test]
    fn test_clipboard_classes_disabled_by_default() {
        let json = r#"
        {
            "version": "1.0",
            "watch_directory": "/drop",
            "clipboard": {
                "youtube": { "enabled": true, "handler": { "program": "grab-video" } }
            }
        }
        "#;

        let config: Config = serde_json::from_str(json).unwrap();
        assert!(config.clipboard.youtube.enabled);
        assert!(!config.clipboard.magnet.enabled);
        assert!(config.clipboard_enabled());
    }
}
