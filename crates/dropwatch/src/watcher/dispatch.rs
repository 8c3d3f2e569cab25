use log::{info, warn};
use tracing::info_span;

use crate::config::HandlerCommand;
use crate::error::DispatchError;
use crate::handler;
use crate::watcher::item::WatchedItem;
use crate::watcher::registry::{JobRecord, JobRegistry};

/// What happened to a dispatch attempt.
#[derive(Debug, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Handler launched, JobRecord inserted.
    Launched { job_id: String },
    /// Registry at the ceiling; the scanner re-surfaces the item next tick.
    Deferred,
    /// A live job already exists for this item.
    AlreadyActive,
}

/// Launches folder handlers for stable items, subject to the concurrency
/// ceiling. This is the only path with true parallelism; clipboard handlers
/// run synchronously and never pass through here.
pub struct Dispatcher {
    handler: HandlerCommand,
    ceiling: usize,
}

impl Dispatcher {
    pub fn new(handler: HandlerCommand, ceiling: usize) -> Self {
        Self { handler, ceiling }
    }

    pub fn ceiling(&self) -> usize {
        self.ceiling
    }

    /// Launch the handler for one item unless the registry already tracks
    /// it or is at the ceiling. The caller has already checked `contains`;
    /// it is re-checked here so the uniqueness invariant never depends on
    /// call order.
    pub fn dispatch(
        &self,
        item: &WatchedItem,
        registry: &mut JobRegistry,
    ) -> Result<DispatchOutcome, DispatchError> {
        let item_id = item.id();

        if registry.contains(&item_id) {
            return Ok(DispatchOutcome::AlreadyActive);
        }

        if registry.count() >= self.ceiling {
            info!(
                "Deferring '{}': {} of {} job slots in use",
                item.name,
                registry.count(),
                self.ceiling
            );
            return Ok(DispatchOutcome::Deferred);
        }

        let _span = info_span!("dispatch", item = %item.name).entered();

        let kind = item.kind();
        let hint = item.category_hint();
        let child = handler::spawn_detached(&self.handler, &[kind.as_str(), &item_id, hint])
            .map_err(|e| {
                warn!("Handler '{}' failed to start: {}", self.handler.program, e);
                DispatchError::SpawnFailed {
                    program: self.handler.program.clone(),
                    item_id: item_id.clone(),
                    source: e,
                }
            })?;

        let record = JobRecord::new(item_id, child);
        let job_id = record.id.clone();
        info!(
            "Dispatched {} '{}' as job {} (pid {}, hint: {})",
            kind,
            item.name,
            job_id,
            record.pid(),
            hint
        );
        registry.insert(record)?;

        Ok(DispatchOutcome::Launched { job_id })
    }
}
