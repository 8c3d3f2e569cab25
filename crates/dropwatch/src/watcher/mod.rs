pub mod daemon;
pub mod dispatch;
pub mod item;
pub mod registry;
pub mod scanner;

pub use daemon::{validate_environment, Watcher};
pub use dispatch::{DispatchOutcome, Dispatcher};
pub use item::{ItemKind, WatchedItem};
pub use registry::{JobOutcome, JobRecord, JobRegistry, ReapedJob};
pub use scanner::DropScanner;
