use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DropwatchError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Instance lock error: {0}")]
    Lock(#[from] LockError),

    #[error("Watch error: {0}")]
    Watch(#[from] WatchError),

    #[error("Dispatch error: {0}")]
    Dispatch(#[from] DispatchError),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config JSON: {0}")]
    ParseJson(#[from] serde_json::Error),

    #[error("Config validation failed: {message}")]
    Validation { message: String },

    #[error("Schema validation failed: {errors}")]
    SchemaValidation { errors: String },

    #[error("Handler program '{program}' for '{detector}' not found on PATH")]
    HandlerNotFound { detector: String, program: String },
}

#[derive(Error, Debug)]
pub enum LockError {
    #[error("Another instance is already running (lock held on '{path}')")]
    AlreadyRunning { path: PathBuf },

    #[error("Failed to open lock file '{path}': {source}")]
    OpenFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to acquire lock on '{path}': {source}")]
    Acquire {
        path: PathBuf,
        #[source]
        source: nix::Error,
    },
}

#[derive(Error, Debug)]
pub enum WatchError {
    #[error("Watched directory '{path}' does not exist")]
    MissingDirectory { path: PathBuf },

    #[error("Directory scan failed for '{path}': {source}")]
    ScanFailed {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("Clipboard unavailable: {0}")]
    ClipboardUnavailable(String),

    #[error("Clipboard read failed: {0}")]
    ClipboardRead(String),

    #[error("Failed to append to history log '{path}': {source}")]
    HistoryAppend {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Error, Debug)]
pub enum DispatchError {
    #[error("Item '{item_id}' already has a live job")]
    DuplicateItem { item_id: String },

    #[error("Failed to spawn handler '{program}' for '{item_id}': {source}")]
    SpawnFailed {
        program: String,
        item_id: String,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, DropwatchError>;
