use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use log::{debug, info, warn};

use crate::clipboard::{ClipboardMonitor, ClipboardSource, ContentClass, SystemClipboard};
use crate::config::Config;
use crate::error::{ConfigError, DropwatchError, WatchError};
use crate::handler;
use crate::history::HistoryLog;
use crate::stability::StabilityProber;
use crate::watcher::dispatch::{DispatchOutcome, Dispatcher};
use crate::watcher::registry::JobRegistry;
use crate::watcher::scanner::DropScanner;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RunState {
    Running,
    ShuttingDown,
    Terminated,
}

/// The folder-detection half of the loop: scan, probe, dispatch.
struct FolderWatch {
    scanner: DropScanner,
    prober: StabilityProber,
    dispatcher: Dispatcher,
}

/// The orchestrator context: owns every detector, the registry, and the
/// history log, and drives them from a single control thread. Detectors and
/// bookkeeping share no hidden module state; everything flows through this
/// struct.
pub struct Watcher {
    config: Arc<Config>,
    folder: Option<FolderWatch>,
    clipboard: Option<ClipboardMonitor>,
    registry: JobRegistry,
    history: HistoryLog,
    /// Items that passed the stability probe but were deferred at the
    /// ceiling. They are not re-probed; only the registry's active-check
    /// gates their re-dispatch.
    stable_deferred: HashSet<String>,
    shutdown: Arc<AtomicBool>,
    state: RunState,
}

/// Fail-fast startup checks: the watched directory must exist while folder
/// detection is on, and every enabled handler program must resolve. Run
/// before any component is constructed.
pub fn validate_environment(config: &Config) -> Result<(), DropwatchError> {
    if config.folder.enabled {
        if !config.watch_directory.is_dir() {
            return Err(WatchError::MissingDirectory {
                path: config.watch_directory.clone(),
            }
            .into());
        }
        if let Some(handler_cmd) = &config.folder.handler {
            resolve_or_fail("folder", &handler_cmd.program)?;
        }
    }

    if config.clipboard.youtube.enabled {
        if let Some(handler_cmd) = &config.clipboard.youtube.handler {
            resolve_or_fail("clipboard.youtube", &handler_cmd.program)?;
        }
    }
    if config.clipboard.magnet.enabled {
        if let Some(handler_cmd) = &config.clipboard.magnet.handler {
            resolve_or_fail("clipboard.magnet", &handler_cmd.program)?;
        }
    }

    Ok(())
}

fn resolve_or_fail(detector: &str, program: &str) -> Result<(), DropwatchError> {
    match handler::resolve_program(program) {
        Some(_) => Ok(()),
        None => Err(ConfigError::HandlerNotFound {
            detector: detector.to_string(),
            program: program.to_string(),
        }
        .into()),
    }
}

impl Watcher {
    /// Production constructor: validates the environment and attaches the
    /// system clipboard. An unavailable clipboard is degraded operation,
    /// not an error: clipboard classes are disabled with a warning and the
    /// folder detector keeps running.
    pub fn from_config(
        config: Arc<Config>,
        shutdown: Arc<AtomicBool>,
    ) -> Result<Self, DropwatchError> {
        let source: Option<Box<dyn ClipboardSource>> = if config.clipboard_enabled() {
            match SystemClipboard::new() {
                Ok(clipboard) => Some(Box::new(clipboard)),
                Err(e) => {
                    warn!("Clipboard detection disabled: {}", e);
                    None
                }
            }
        } else {
            None
        };

        Self::with_clipboard_source(config, shutdown, source)
    }

    /// Constructor with an injected clipboard source (tests, headless use).
    pub fn with_clipboard_source(
        config: Arc<Config>,
        shutdown: Arc<AtomicBool>,
        clipboard_source: Option<Box<dyn ClipboardSource>>,
    ) -> Result<Self, DropwatchError> {
        validate_environment(&config)?;

        let folder = if config.folder.enabled {
            let handler_cmd = config.folder.handler.clone().ok_or_else(|| {
                ConfigError::Validation {
                    message: "folder detection is enabled but no folder handler is configured"
                        .to_string(),
                }
            })?;
            Some(FolderWatch {
                scanner: DropScanner::new(&config.watch_directory),
                prober: StabilityProber::new(
                    config.stability.checks,
                    Duration::from_secs(config.stability.interval_secs),
                ),
                dispatcher: Dispatcher::new(handler_cmd, config.max_concurrent_jobs),
            })
        } else {
            None
        };

        let clipboard = match clipboard_source {
            Some(source) if config.clipboard_enabled() => {
                let mut monitor = ClipboardMonitor::new(source);
                if config.clipboard.youtube.enabled {
                    if let Some(handler_cmd) = config.clipboard.youtube.handler.clone() {
                        monitor = monitor.with_class(ContentClass::Youtube, handler_cmd);
                    }
                }
                if config.clipboard.magnet.enabled {
                    if let Some(handler_cmd) = config.clipboard.magnet.handler.clone() {
                        monitor = monitor.with_class(ContentClass::Magnet, handler_cmd);
                    }
                }
                Some(monitor)
            }
            _ => None,
        };

        let history = HistoryLog::new(&config.history_log);

        Ok(Self {
            config,
            folder,
            clipboard,
            registry: JobRegistry::new(),
            history,
            stable_deferred: HashSet::new(),
            shutdown,
            state: RunState::Running,
        })
    }

    pub fn registry(&self) -> &JobRegistry {
        &self.registry
    }

    /// True once the shutdown sequence has completed.
    pub fn is_terminated(&self) -> bool {
        self.state == RunState::Terminated
    }

    /// Run until the shutdown flag is raised, then terminate cleanly.
    pub fn run(&mut self) {
        info!(
            "dropwatch started (folder: {}, clipboard: {})",
            if self.folder.is_some() {
                "on"
            } else {
                "off"
            },
            match &self.clipboard {
                Some(monitor) => format!("{} class(es)", monitor.class_count()),
                None => "off".to_string(),
            }
        );

        while !self.shutdown.load(Ordering::Relaxed) {
            self.tick();
            self.sleep_until_next_tick();
        }

        self.shutdown_now();
    }

    /// One control-loop iteration: reap finished jobs first so freed
    /// capacity is visible to this tick's dispatch, then poll the
    /// clipboard, then scan the drop directory.
    pub fn tick(&mut self) {
        for reaped in self.registry.reap() {
            let summary = format!(
                "folder job {} '{}' finished: {} ({}s)",
                reaped.id, reaped.item_id, reaped.outcome, reaped.runtime_secs
            );
            if reaped.outcome.success() {
                info!("{}", summary);
            } else {
                warn!("{}", summary);
            }
            if let Err(e) = self.history.append(&summary) {
                warn!("History write failed: {}", e);
            }
        }

        if let Some(monitor) = self.clipboard.as_mut() {
            for invocation in monitor.tick() {
                let summary = format!(
                    "clipboard {} '{}' {}",
                    invocation.class,
                    invocation.text,
                    match invocation.exit_code {
                        Some(code) => format!("exit {}", code),
                        None if invocation.success => "ok".to_string(),
                        None => "failed to run".to_string(),
                    }
                );
                if let Err(e) = self.history.append(&summary) {
                    warn!("History write failed: {}", e);
                }
            }
        }

        if let Some(folder) = self.folder.as_ref() {
            match folder.scanner.scan() {
                Err(e) => warn!("Drop directory scan failed: {}", e),
                Ok(items) => {
                    // Deferred-stability state is only kept for items still
                    // present in the drop directory
                    let present: HashSet<String> = items.iter().map(|i| i.id()).collect();
                    self.stable_deferred.retain(|id| present.contains(id));

                    for item in items {
                        // No new work once a termination signal arrived
                        if self.shutdown.load(Ordering::Relaxed) {
                            break;
                        }
                        let item_id = item.id();
                        // Duplicate check before probing: an item with a
                        // live job is never re-probed
                        if self.registry.contains(&item_id) {
                            continue;
                        }
                        // A stable-but-deferred item keeps its established
                        // stability; everything else earns it now
                        if !self.stable_deferred.contains(&item_id)
                            && !folder.prober.is_stable(&item.path)
                        {
                            debug!("'{}' not yet stable", item.name);
                            continue;
                        }
                        match folder.dispatcher.dispatch(&item, &mut self.registry) {
                            Ok(DispatchOutcome::Launched { .. }) => {
                                self.stable_deferred.remove(&item_id);
                            }
                            Ok(DispatchOutcome::Deferred) => {
                                self.stable_deferred.insert(item_id);
                            }
                            Ok(DispatchOutcome::AlreadyActive) => {}
                            Err(e) => {
                                // Per-item isolation: the loop keeps running
                                // and the item re-earns stability later
                                self.stable_deferred.remove(&item_id);
                                warn!("Dispatch failed for '{}': {}", item.name, e);
                            }
                        }
                    }
                }
            }
        }
    }

    /// End-of-tick sleep, sliced so a signal interrupts the wait quickly.
    fn sleep_until_next_tick(&self) {
        let deadline = Instant::now() + Duration::from_secs(self.config.poll_interval_secs);
        while Instant::now() < deadline {
            if self.shutdown.load(Ordering::Relaxed) {
                return;
            }
            std::thread::sleep(Duration::from_millis(100));
        }
    }

    /// The shutdown sequence: stop accepting dispatch, then send advisory
    /// termination to every live job without joining it. Idempotent; a
    /// second call is a no-op. Returns true if this call performed the
    /// sequence.
    pub fn shutdown_now(&mut self) -> bool {
        if self.state != RunState::Running {
            return false;
        }
        self.state = RunState::ShuttingDown;
        self.shutdown.store(true, Ordering::Relaxed);

        let live = self.registry.count();
        if live > 0 {
            info!("Shutting down: signalling {} live job(s)", live);
            let signalled = self.registry.terminate_all();
            debug!("SIGTERM sent to {} job(s)", signalled);
        } else {
            info!("Shutting down: no live jobs");
        }

        self.state = RunState::Terminated;
        true
    }
}
