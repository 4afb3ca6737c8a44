//! Viewport breakpoints and the resize listener built on them.
//!
//! DESIGN
//! ======
//! [`Breakpoints`] is the ordered bucket table (name → minimum width), usually
//! materialized by the build into a JSON file. A width maps to the largest
//! bucket whose threshold it reaches; widths below every threshold map to
//! [`MINIMAL_BUCKET`].
//!
//! [`BreakpointListener`] takes the viewport width as a `watch` channel rather
//! than reading a global window, so it can be driven from tests. It reports
//! once at construction, then after each burst of resizes has been quiet for
//! the debounce period. Notifications that repeat the last seen width are
//! ignored outright.

#[cfg(test)]
#[path = "breakpoint_test.rs"]
mod breakpoint_test;

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use serde::Deserialize;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info};

/// Bucket reported when the width is below every threshold.
pub const MINIMAL_BUCKET: &str = "xs";

// =============================================================================
// ERROR TYPE
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum BreakpointError {
    #[error("failed to read breakpoint table: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse breakpoint table: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid width for breakpoint {name}: {value}")]
    InvalidWidth { name: String, value: String },
}

// =============================================================================
// BREAKPOINT TABLE
// =============================================================================

#[derive(Deserialize)]
#[serde(untagged)]
enum RawWidth {
    Pixels(u32),
    Css(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Breakpoints {
    /// Sorted ascending by width.
    entries: Vec<(String, u32)>,
}

impl Breakpoints {
    #[must_use]
    pub fn new<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, u32)>,
        S: Into<String>,
    {
        let mut entries = entries
            .into_iter()
            .map(|(name, width)| (name.into(), width))
            .collect::<Vec<_>>();
        entries.sort_by_key(|(_, width)| *width);
        Self { entries }
    }

    /// Parse a JSON object of `name: width`. Widths may be integers, digit
    /// strings, or pixel lengths such as `"640px"`.
    ///
    /// # Errors
    ///
    /// Returns [`BreakpointError::Parse`] for malformed JSON and
    /// [`BreakpointError::InvalidWidth`] for any other width, including
    /// relative units like `"40rem"`.
    pub fn from_json_str(text: &str) -> Result<Self, BreakpointError> {
        let raw: BTreeMap<String, RawWidth> = serde_json::from_str(text)?;
        let entries = raw
            .into_iter()
            .map(|(name, width)| match width {
                RawWidth::Pixels(px) => Ok((name, px)),
                RawWidth::Css(value) => match pixel_width(&value) {
                    Some(px) => Ok((name, px)),
                    None => Err(BreakpointError::InvalidWidth { name, value }),
                },
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(entries))
    }

    /// Read the materialized breakpoint table from `path`.
    ///
    /// # Errors
    ///
    /// Returns [`BreakpointError::Io`] when the file cannot be read, otherwise
    /// see [`Breakpoints::from_json_str`].
    pub fn from_path(path: &Path) -> Result<Self, BreakpointError> {
        let text = std::fs::read_to_string(path)?;
        let table = Self::from_json_str(&text)?;
        info!(path = %path.display(), buckets = table.entries.len(), "breakpoint table loaded");
        Ok(table)
    }

    /// Name of the bucket `width` falls into.
    #[must_use]
    pub fn bucket_for(&self, width: u32) -> &str {
        self.entries
            .iter()
            .rev()
            .find(|(_, threshold)| *threshold <= width)
            .map_or(MINIMAL_BUCKET, |(name, _)| name.as_str())
    }

    /// Buckets in ascending width order.
    pub fn buckets(&self) -> impl Iterator<Item = (&str, u32)> {
        self.entries.iter().map(|(name, width)| (name.as_str(), *width))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// `"768px"` or `"768"` → 768. Other units are not pixels and are refused.
fn pixel_width(value: &str) -> Option<u32> {
    let trimmed = value.trim();
    let digits = trimmed.strip_suffix("px").unwrap_or(trimmed);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

// =============================================================================
// LISTENER
// =============================================================================

/// Payload delivered to the listener callback.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScreenChange {
    pub screen_size: String,
    /// Whether the bucket differs from the previous report.
    pub has_changed: bool,
}

struct ListenerState {
    screen_size: Option<String>,
    window_width: u32,
}

pub struct BreakpointListener {
    state: Arc<Mutex<ListenerState>>,
    task: JoinHandle<()>,
}

impl BreakpointListener {
    /// Report the current bucket to `callback`, then keep watching `viewport`
    /// for width changes. The watch task ends when the viewport sender is
    /// dropped; dropping the listener does not stop it.
    ///
    /// Must be called from within a Tokio runtime.
    #[must_use]
    pub fn spawn<F>(
        breakpoints: Breakpoints,
        mut viewport: watch::Receiver<u32>,
        debounce: Duration,
        callback: F,
    ) -> Self
    where
        F: FnMut(ScreenChange) + Send + 'static,
    {
        let state = Arc::new(Mutex::new(ListenerState {
            screen_size: None,
            window_width: *viewport.borrow_and_update(),
        }));
        let mut watcher = Watcher { breakpoints, state: Arc::clone(&state), callback };
        watcher.check_view();

        let task = tokio::spawn(async move {
            let mut deadline: Option<Instant> = None;
            loop {
                tokio::select! {
                    changed = viewport.changed() => {
                        if changed.is_err() {
                            debug!("viewport closed; breakpoint listener stopped");
                            break;
                        }
                        let width = *viewport.borrow_and_update();
                        if watcher.observe(width) {
                            deadline = Some(Instant::now() + debounce);
                        }
                    }
                    () = tokio::time::sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                        deadline = None;
                        watcher.check_view();
                    }
                }
            }
        });

        Self { state, task }
    }

    /// Last reported bucket.
    #[must_use]
    pub fn screen_size(&self) -> Option<String> {
        lock(&self.state).screen_size.clone()
    }

    /// Last observed viewport width.
    #[must_use]
    pub fn window_width(&self) -> u32 {
        lock(&self.state).window_width
    }

    /// Whether the watch task is still running.
    #[must_use]
    pub fn is_listening(&self) -> bool {
        !self.task.is_finished()
    }
}

impl std::fmt::Debug for BreakpointListener {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = lock(&self.state);
        f.debug_struct("BreakpointListener")
            .field("screen_size", &state.screen_size)
            .field("window_width", &state.window_width)
            .finish_non_exhaustive()
    }
}

struct Watcher<F> {
    breakpoints: Breakpoints,
    state: Arc<Mutex<ListenerState>>,
    callback: F,
}

impl<F: FnMut(ScreenChange)> Watcher<F> {
    /// Record a new width. Returns `false` when it matches the last one.
    fn observe(&self, width: u32) -> bool {
        let mut state = lock(&self.state);
        if state.window_width == width {
            return false;
        }
        state.window_width = width;
        true
    }

    fn check_view(&mut self) {
        let change = {
            let mut state = lock(&self.state);
            let screen_size = self.breakpoints.bucket_for(state.window_width).to_owned();
            let has_changed = state.screen_size.as_deref() != Some(screen_size.as_str());
            state.screen_size = Some(screen_size.clone());
            ScreenChange { screen_size, has_changed }
        };
        debug!(screen_size = %change.screen_size, has_changed = change.has_changed, "breakpoint checked");
        (self.callback)(change);
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
