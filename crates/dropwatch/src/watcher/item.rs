use std::path::PathBuf;

use chrono::{DateTime, Utc};

/// A top-level entry of the drop directory observed during one scan.
/// Ephemeral: rebuilt on every scan, identified only by its path.
#[derive(Debug, Clone)]
pub struct WatchedItem {
    pub path: PathBuf,
    pub name: String,
    pub discovered_at: DateTime<Utc>,
}

impl WatchedItem {
    pub fn new(path: PathBuf) -> Self {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.to_string_lossy().to_string());
        Self {
            path,
            name,
            discovered_at: Utc::now(),
        }
    }

    /// The identifier used for registry dedupe: the absolute path as text.
    pub fn id(&self) -> String {
        self.path.to_string_lossy().to_string()
    }

    pub fn kind(&self) -> ItemKind {
        if self.path.is_dir() {
            ItemKind::Directory
        } else {
            ItemKind::File
        }
    }

    /// Coarse category hint for the handler, derived from the name.
    pub fn category_hint(&self) -> &'static str {
        if self.kind() == ItemKind::Directory {
            return "other";
        }
        match mime_guess::from_path(&self.path).first() {
            Some(mime) => match mime.type_().as_str() {
                "video" => "video",
                "audio" => "audio",
                "image" => "image",
                _ => "other",
            },
            None => "other",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemKind {
    File,
    Directory,
}

impl ItemKind {
    /// Type tag passed to folder handlers.
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemKind::File => "file",
            ItemKind::Directory => "dir",
        }
    }
}

impl std::fmt::Display for ItemKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Helper shared by the scanner tests and the scanner itself.
pub(crate) fn is_hidden(name: &str) -> bool {
    name.starts_with('.')
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_item_name_from_path() {
        let item = WatchedItem::new(PathBuf::from("/drop/Some.Show.S01E01.mkv"));
        assert_eq!(item.name, "Some.Show.S01E01.mkv");
        assert_eq!(item.id(), "/drop/Some.Show.S01E01.mkv");
    }

    #[test]
    fn test_kind_of_file_and_directory() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("movie.mkv");
        std::fs::write(&file, b"x").unwrap();
        let dir = temp_dir.path().join("season-pack");
        std::fs::create_dir(&dir).unwrap();

        assert_eq!(WatchedItem::new(file).kind(), ItemKind::File);
        assert_eq!(WatchedItem::new(dir).kind(), ItemKind::Directory);
    }

    #[test]
    fn test_category_hint_from_extension() {
        let hint = |name: &str| WatchedItem::new(PathBuf::from(name)).category_hint();

        assert_eq!(hint("movie.mkv"), "video");
        assert_eq!(hint("movie.mp4"), "video");
        assert_eq!(hint("album.flac"), "audio");
        assert_eq!(hint("cover.jpg"), "image");
        assert_eq!(hint("payload.bin"), "other");
        assert_eq!(hint("noextension"), "other");
    }

    #[test]
    fn test_directory_hint_is_other() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().join("Album.Name.2024.flac");
        std::fs::create_dir(&dir).unwrap();

        assert_eq!(WatchedItem::new(dir).category_hint(), "other");
    }
}
