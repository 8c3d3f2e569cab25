use std::process::{Child, ExitStatus};

use chrono::{DateTime, Utc};
use log::{debug, warn};
use nix::sys::signal::{kill, Signal};
use nix::unistd::Pid;

use crate::error::DispatchError;

/// One in-flight handler invocation. Created by the dispatcher at launch,
/// removed only by the reaper once the subprocess has exited.
#[derive(Debug)]
pub struct JobRecord {
    pub id: String,
    pub item_id: String,
    pub launched_at: DateTime<Utc>,
    child: Child,
}

impl JobRecord {
    pub fn new(item_id: String, child: Child) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            item_id,
            launched_at: Utc::now(),
            child,
        }
    }

    pub fn pid(&self) -> u32 {
        self.child.id()
    }
}

/// How a reaped job ended.
#[derive(Debug)]
pub enum JobOutcome {
    /// The handler exited and its status was collected.
    Exited(ExitStatus),
    /// The handler could not be waited on; treated as failed.
    Unknown,
}

impl JobOutcome {
    pub fn success(&self) -> bool {
        matches!(self, JobOutcome::Exited(status) if status.success())
    }
}

impl std::fmt::Display for JobOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JobOutcome::Exited(status) => match status.code() {
                Some(code) => write!(f, "exit {}", code),
                None => write!(f, "terminated by signal"),
            },
            JobOutcome::Unknown => write!(f, "unknown status"),
        }
    }
}

/// A finished job removed from the registry.
#[derive(Debug)]
pub struct ReapedJob {
    pub id: String,
    pub item_id: String,
    pub outcome: JobOutcome,
    pub runtime_secs: i64,
}

/// In-memory table of live handler invocations. Single-writer discipline:
/// the dispatcher inserts, the reaper removes, nothing else mutates it, so
/// no locking is needed inside the process.
#[derive(Debug, Default)]
pub struct JobRegistry {
    jobs: Vec<JobRecord>,
}

impl JobRegistry {
    pub fn new() -> Self {
        Self { jobs: Vec::new() }
    }

    pub fn count(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    /// True while a live job exists for this item identifier.
    pub fn contains(&self, item_id: &str) -> bool {
        self.jobs.iter().any(|job| job.item_id == item_id)
    }

    /// Insert a freshly launched job. Refuses a second record for an item
    /// identifier that is still live.
    pub fn insert(&mut self, record: JobRecord) -> Result<(), DispatchError> {
        if self.contains(&record.item_id) {
            return Err(DispatchError::DuplicateItem {
                item_id: record.item_id,
            });
        }
        debug!(
            "Registered job {} for '{}' (pid {})",
            record.id,
            record.item_id,
            record.pid()
        );
        self.jobs.push(record);
        Ok(())
    }

    /// Poll every record's liveness without blocking and remove the
    /// finished ones. A child that cannot be waited on counts as failed
    /// with unknown status rather than stalling the loop.
    pub fn reap(&mut self) -> Vec<ReapedJob> {
        let mut finished = Vec::new();
        let now = Utc::now();

        let mut i = 0;
        while i < self.jobs.len() {
            let outcome = match self.jobs[i].child.try_wait() {
                Ok(Some(status)) => Some(JobOutcome::Exited(status)),
                Ok(None) => None,
                Err(e) => {
                    warn!(
                        "Liveness check failed for job {} ('{}'): {}",
                        self.jobs[i].id, self.jobs[i].item_id, e
                    );
                    Some(JobOutcome::Unknown)
                }
            };

            match outcome {
                Some(outcome) => {
                    let record = self.jobs.remove(i);
                    finished.push(ReapedJob {
                        id: record.id,
                        item_id: record.item_id,
                        outcome,
                        runtime_secs: (now - record.launched_at).num_seconds(),
                    });
                }
                None => i += 1,
            }
        }

        finished
    }

    /// Best-effort advisory termination of every live job. Sends SIGTERM
    /// without joining: handlers get the chance to clean up, and shutdown
    /// latency stays bounded regardless of their behavior. A process that
    /// already exited is not an error.
    pub fn terminate_all(&mut self) -> usize {
        let mut signalled = 0;
        for job in self.jobs.drain(..) {
            let pid = Pid::from_raw(job.child.id() as i32);
            match kill(pid, Signal::SIGTERM) {
                Ok(()) => {
                    debug!("Sent SIGTERM to job {} (pid {})", job.id, pid);
                    signalled += 1;
                }
                Err(nix::errno::Errno::ESRCH) => {
                    debug!("Job {} (pid {}) already gone", job.id, pid);
                }
                Err(e) => {
                    warn!("Could not signal job {} (pid {}): {}", job.id, pid, e);
                }
            }
        }
        signalled
    }
}
