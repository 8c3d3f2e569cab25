pub mod monitor;

pub use monitor::{ClipboardInvocation, ClipboardMonitor};

use crate::error::WatchError;

/// Monitored clipboard content classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentClass {
    /// Video-sharing URL shapes (youtube.com/watch, shorts, playlists, youtu.be).
    Youtube,
    /// BitTorrent magnet URIs.
    Magnet,
}

impl ContentClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentClass::Youtube => "youtube",
            ContentClass::Magnet => "magnet",
        }
    }
}

impl std::fmt::Display for ContentClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Source of clipboard text. The system implementation is backed by the OS
/// clipboard; tests inject scripted sources.
pub trait ClipboardSource {
    /// Current clipboard text, or `None` when the clipboard is empty or
    /// holds non-text content.
    fn read_text(&mut self) -> Result<Option<String>, WatchError>;
}

/// OS clipboard backed by `arboard`.
pub struct SystemClipboard {
    inner: arboard::Clipboard,
}

impl SystemClipboard {
    pub fn new() -> Result<Self, WatchError> {
        let inner = arboard::Clipboard::new()
            .map_err(|e| WatchError::ClipboardUnavailable(e.to_string()))?;
        Ok(Self { inner })
    }
}

impl ClipboardSource for SystemClipboard {
    fn read_text(&mut self) -> Result<Option<String>, WatchError> {
        match self.inner.get_text() {
            Ok(text) => Ok(Some(text)),
            Err(arboard::Error::ContentNotAvailable) => Ok(None),
            Err(e) => Err(WatchError::ClipboardRead(e.to_string())),
        }
    }
}
