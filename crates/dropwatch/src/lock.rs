use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use log::{debug, warn};
use nix::errno::Errno;
use nix::fcntl::{Flock, FlockArg};

/// System-wide advisory lock guaranteeing a single live orchestrator.
///
/// The lock is a non-blocking exclusive `flock` on a well-known path. It is
/// held for the process lifetime and released either explicitly via
/// [`release`](InstanceLock::release) or implicitly on drop, so every exit
/// path gives it up. Release is idempotent.
pub struct InstanceLock {
    path: PathBuf,
    guard: Option<Flock<File>>,
}

impl InstanceLock {
    /// Acquire the lock, failing fast if another instance already holds it.
    ///
    /// Creates the backing file if absent and records the holder's PID in it
    /// as a diagnostic aid.
    pub fn acquire<P: AsRef<Path>>(path: P) -> Result<Self, crate::error::LockError> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|e| crate::error::LockError::OpenFile {
                    path: path.clone(),
                    source: e,
                })?;
            }
        }

        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .read(true)
            .write(true)
            .open(&path)
            .map_err(|e| crate::error::LockError::OpenFile {
                path: path.clone(),
                source: e,
            })?;

        let mut guard = match Flock::lock(file, FlockArg::LockExclusiveNonblock) {
            Ok(guard) => guard,
            Err((_, Errno::EWOULDBLOCK)) => {
                return Err(crate::error::LockError::AlreadyRunning { path });
            }
            Err((_, errno)) => {
                return Err(crate::error::LockError::Acquire {
                    path,
                    source: errno,
                });
            }
        };

        // Best-effort PID breadcrumb for operators inspecting the lock file
        if let Err(e) = guard
            .set_len(0)
            .and_then(|_| writeln!(*guard, "{}", std::process::id()))
        {
            warn!("Could not record PID in lock file {:?}: {}", path, e);
        }

        debug!("Acquired instance lock at {:?}", path);
        Ok(Self {
            path,
            guard: Some(guard),
        })
    }

    /// Path of the lock's backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Release the lock. Safe to call more than once; later calls are no-ops.
    pub fn release(&mut self) {
        if let Some(guard) = self.guard.take() {
            if let Err((_, errno)) = guard.unlock() {
                warn!("Failed to unlock {:?}: {}", self.path, errno);
            } else {
                debug!("Released instance lock at {:?}", self.path);
            }
        }
    }

    /// True while the lock is still held.
    pub fn is_held(&self) -> bool {
        self.guard.is_some()
    }
}

impl Drop for InstanceLock {
    fn drop(&mut self) {
        self.release();
    }
}
