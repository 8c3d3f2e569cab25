use log::{debug, info, warn};
use regex::Regex;

use crate::clipboard::{ClipboardSource, ContentClass};
use crate::config::HandlerCommand;
use crate::handler;

/// A completed synchronous clipboard-handler invocation.
#[derive(Debug)]
pub struct ClipboardInvocation {
    pub class: ContentClass,
    pub text: String,
    pub success: bool,
    pub exit_code: Option<i32>,
}

struct ClassState {
    class: ContentClass,
    pattern: Regex,
    handler: HandlerCommand,
    last_seen: Option<String>,
}

/// Polls a clipboard source, de-duplicates against per-class snapshots of
/// the last-seen text, and invokes the matching class handler.
pub struct ClipboardMonitor {
    source: Box<dyn ClipboardSource>,
    classes: Vec<ClassState>,
}

impl ClipboardMonitor {
    pub fn new(source: Box<dyn ClipboardSource>) -> Self {
        Self {
            source,
            classes: Vec::new(),
        }
    }

    /// Enable a content class with its handler.
    pub fn with_class(mut self, class: ContentClass, handler: HandlerCommand) -> Self {
        let pattern = match class {
            ContentClass::Youtube => Regex::new(
                r"^https?://(?:www\.|m\.)?(?:youtube\.com/(?:watch\?\S+|shorts/\S+|playlist\?\S+)|youtu\.be/\S+)$",
            ),
            ContentClass::Magnet => {
                Regex::new(r"^magnet:\?xt=urn:btih:[A-Za-z0-9]{32,40}\S*$")
            }
        }
        .expect("content class pattern is a fixed, valid expression");

        self.classes.push(ClassState {
            class,
            pattern,
            handler,
            last_seen: None,
        });
        self
    }

    /// Number of enabled content classes.
    pub fn class_count(&self) -> usize {
        self.classes.len()
    }

    /// One detection tick: read the clipboard, update per-class snapshots,
    /// and run the handler for every class whose (changed) text matches.
    ///
    /// Handlers run to completion before this returns. Blocking here is
    /// deliberate: clipboard actions are rare and single-shot, and a
    /// synchronous invocation caps clipboard-triggered concurrency at one,
    /// so these jobs never enter the registry. Handler failure is a
    /// warning, never fatal to the loop.
    pub fn tick(&mut self) -> Vec<ClipboardInvocation> {
        let text = match self.source.read_text() {
            Ok(text) => text.unwrap_or_default(),
            Err(e) => {
                warn!("Clipboard read failed: {}", e);
                return Vec::new();
            }
        };

        let mut invocations = Vec::new();

        for state in &mut self.classes {
            if state.last_seen.as_deref() == Some(text.as_str()) {
                continue;
            }
            state.last_seen = Some(text.clone());

            let trimmed = text.trim();
            if trimmed.is_empty() || !state.pattern.is_match(trimmed) {
                debug!("Clipboard change does not match class '{}'", state.class);
                continue;
            }

            info!("Clipboard {} item detected, invoking handler", state.class);
            let invocation = match handler::run_blocking(&state.handler, &[trimmed]) {
                Ok(status) => {
                    if !status.success() {
                        warn!(
                            "Clipboard {} handler exited with {:?}",
                            state.class,
                            status.code()
                        );
                    }
                    ClipboardInvocation {
                        class: state.class,
                        text: trimmed.to_string(),
                        success: status.success(),
                        exit_code: status.code(),
                    }
                }
                Err(e) => {
                    warn!(
                        "Clipboard {} handler '{}' failed to start: {}",
                        state.class, state.handler.program, e
                    );
                    ClipboardInvocation {
                        class: state.class,
                        text: trimmed.to_string(),
                        success: false,
                        exit_code: None,
                    }
                }
            };
            invocations.push(invocation);
        }

        invocations
    }
}
