pub mod clipboard;
pub mod config;
pub mod error;
pub mod handler;
pub mod history;
pub mod lock;
pub mod stability;
pub mod watcher;

pub use clipboard::{ClipboardMonitor, ClipboardSource, ContentClass, SystemClipboard};
pub use config::{load_config, load_config_from_str, Config, HandlerCommand};
pub use error::{
    ConfigError, DispatchError, DropwatchError, LockError, Result, WatchError,
};
pub use history::HistoryLog;
pub use lock::InstanceLock;
pub use stability::StabilityProber;
pub use watcher::{
    DispatchOutcome, Dispatcher, DropScanner, JobRegistry, WatchedItem, Watcher,
};
