use std::path::Path;
use std::time::{Duration, SystemTime};

use log::debug;

/// One (size, mtime) observation of a path.
type Sample = (u64, Option<SystemTime>);

/// Decides whether a path has stopped changing.
///
/// A probe takes up to `checks` samples spaced `interval` apart and succeeds
/// only after `checks` consecutive samples identical to the initial one. Any
/// observed change fails the probe immediately; the caller re-probes from
/// zero on a later scan, so an item is never dispatched while still being
/// written. The call blocks for at most `checks * interval`.
#[derive(Debug, Clone)]
pub struct StabilityProber {
    checks: u32,
    interval: Duration,
}

impl StabilityProber {
    pub fn new(checks: u32, interval: Duration) -> Self {
        Self { checks, interval }
    }

    /// Number of consecutive unchanged samples required.
    pub fn checks(&self) -> u32 {
        self.checks
    }

    /// Spacing between samples.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// True once the path's (size, mtime) has been observed unchanged for
    /// `checks` consecutive samples. A path that disappears mid-probe is
    /// unstable, not an error. A zero-byte file is stable like any other;
    /// stability means "not currently being written", not non-emptiness.
    pub fn is_stable(&self, path: &Path) -> bool {
        let Some(mut last) = Self::sample(path) else {
            debug!("Stability probe: {:?} vanished before first sample", path);
            return false;
        };

        let mut unchanged = 0u32;
        while unchanged < self.checks {
            std::thread::sleep(self.interval);

            let Some(current) = Self::sample(path) else {
                debug!("Stability probe: {:?} vanished mid-probe", path);
                return false;
            };

            if current == last {
                unchanged += 1;
            } else {
                // Still being written; the next scan starts a fresh probe
                debug!(
                    "Stability probe: {:?} changed after {} unchanged sample(s)",
                    path, unchanged
                );
                return false;
            }
            last = current;
        }

        true
    }

    fn sample(path: &Path) -> Option<Sample> {
        let metadata = std::fs::metadata(path).ok()?;
        Some((metadata.len(), metadata.modified().ok()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;
    use tempfile::TempDir;

    fn fast_prober(checks: u32) -> StabilityProber {
        StabilityProber::new(checks, Duration::from_millis(30))
    }

    #[test]
    fn test_unchanged_file_is_stable() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("file.bin");
        std::fs::write(&path, b"settled content").unwrap();

        assert!(fast_prober(3).is_stable(&path));
    }

    #[test]
    fn test_zero_byte_file_is_stable() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("empty.bin");
        std::fs::write(&path, b"").unwrap();

        assert!(fast_prober(3).is_stable(&path));
    }

    #[test]
    fn test_probe_spans_required_window() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("file.bin");
        std::fs::write(&path, b"x").unwrap();

        let prober = StabilityProber::new(3, Duration::from_millis(50));
        let started = Instant::now();
        assert!(prober.is_stable(&path));
        assert!(started.elapsed() >= Duration::from_millis(150));
    }

    #[test]
    fn test_missing_path_is_unstable() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("never-existed");

        assert!(!fast_prober(3).is_stable(&path));
    }

    #[test]
    fn test_path_vanishing_mid_probe_is_unstable() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("doomed.bin");
        std::fs::write(&path, b"short lived").unwrap();

        let remover = {
            let path = path.clone();
            std::thread::spawn(move || {
                std::thread::sleep(Duration::from_millis(60));
                let _ = std::fs::remove_file(&path);
            })
        };

        let prober = StabilityProber::new(10, Duration::from_millis(30));
        assert!(!prober.is_stable(&path));
        remover.join().unwrap();
    }

    #[test]
    fn test_growing_file_is_unstable() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("growing.bin");
        std::fs::write(&path, b"start").unwrap();

        let writer = {
            let path = path.clone();
            std::thread::spawn(move || {
                // Keep appending across the whole probe window
                for _ in 0..20 {
                    std::thread::sleep(Duration::from_millis(15));
                    use std::io::Write;
                    if let Ok(mut f) = std::fs::OpenOptions::new().append(true).open(&path) {
                        let _ = f.write_all(b"more");
                    }
                }
            })
        };

        let prober = StabilityProber::new(4, Duration::from_millis(40));
        assert!(!prober.is_stable(&path));
        writer.join().unwrap();
    }

    #[test]
    fn test_directory_can_be_probed() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().join("item-dir");
        std::fs::create_dir(&dir).unwrap();

        assert!(fast_prober(2).is_stable(&dir));
    }
}
