//! Recorded event traces and their deterministic replay.
//!
//! A scenario is the filesystem stand-in for a human wiggling a scrollbar: a
//! list of timed steps applied to a fresh highlighter over a page layout.
//! Replay paces the clock in fixed frame ticks, delivers each step when its
//! time comes, and records every change of active section as a transition.
//! The resulting trace serialises to JSON, so expected behavior can be
//! diffed instead of eyeballed.

use crate::config::Config;
use crate::events::{Dispatcher, PageEvent, VisibilityEntry};
use crate::highlighter::Highlighter;
use crate::page::Page;
use serde::{Deserialize, Serialize};
use std::io;
use std::path::Path;

/// Replay frame cadence in milliseconds, one tick per 60 Hz frame.
pub const FRAME_MS: u64 = 16;

#[derive(Serialize, Deserialize, Clone, Debug)]
/// A timed event trace to drive a highlighter with.
pub struct Scenario {
    /// URL fragment the page is loaded with, if any.
    #[serde(default)]
    pub fragment: Option<String>,
    /// Steps in playback order. Equal timestamps keep their listed order.
    pub steps: Vec<Step>,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(tag = "event", rename_all = "snake_case")]
/// One timed step of a scenario.
pub enum Step {
    /// The page scrolls to `y`.
    Scroll {
        /// Milliseconds into the replay.
        at_ms: u64,
        /// New scroll offset.
        y: f64,
    },
    /// A visibility report arrives.
    Visibility {
        /// Milliseconds into the replay.
        at_ms: u64,
        /// Observed sections.
        entries: Vec<VisibilityEntry>,
    },
    /// The URL fragment changes.
    Fragment {
        /// Milliseconds into the replay.
        at_ms: u64,
        /// The new fragment, without the leading `#`.
        fragment: String,
    },
    /// A section anchor is clicked.
    Click {
        /// Milliseconds into the replay.
        at_ms: u64,
        /// The clicked link's target id.
        target: String,
    },
    /// The header or viewport is re-measured.
    Resize {
        /// Milliseconds into the replay.
        at_ms: u64,
        /// New header height.
        header_height: f64,
        /// New viewport height.
        viewport_height: f64,
    },
}

impl Step {
    #[must_use]
    /// When the step fires.
    pub fn at_ms(&self) -> u64 {
        match self {
            Self::Scroll { at_ms, .. }
            | Self::Visibility { at_ms, .. }
            | Self::Fragment { at_ms, .. }
            | Self::Click { at_ms, .. }
            | Self::Resize { at_ms, .. } => *at_ms,
        }
    }

    fn into_event(self) -> PageEvent {
        match self {
            Self::Scroll { y, .. } => PageEvent::Scroll { y },
            Self::Visibility { at_ms, entries } => PageEvent::Visibility {
                entries,
                now_ms: at_ms,
            },
            Self::Fragment { at_ms, fragment } => PageEvent::Fragment {
                fragment,
                now_ms: at_ms,
            },
            Self::Click { at_ms, target } => PageEvent::Click {
                target,
                now_ms: at_ms,
            },
            Self::Resize {
                at_ms,
                header_height,
                viewport_height,
            } => PageEvent::Resize {
                header_height,
                viewport_height,
                now_ms: at_ms,
            },
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug)]
/// One change of active section during a replay.
pub struct Transition {
    /// Milliseconds into the replay at which the change landed.
    pub at_ms: u64,
    /// Active id before the change.
    pub from: Option<String>,
    /// Active id after the change.
    pub to: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default)]
/// The observable outcome of a replay.
pub struct Trace {
    /// Active id immediately after initialisation.
    pub initial: Option<String>,
    /// Every subsequent change of active section, in order.
    pub transitions: Vec<Transition>,
}

impl Trace {
    #[must_use]
    /// The active id after the whole replay.
    pub fn final_active(&self) -> Option<&str> {
        self.transitions
            .last()
            .map_or(self.initial.as_deref(), |t| t.to.as_deref())
    }
}

impl Scenario {
    /// Load a scenario from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not a valid
    /// scenario.
    pub fn load(path: &Path) -> io::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        serde_json::from_str(&contents).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }

    #[must_use]
    /// Drive a fresh highlighter through the scenario and collect the
    /// activation trace.
    ///
    /// Steps fire on the first frame tick at or after their timestamp, in
    /// listed order for equal times, followed by the tick itself. One
    /// trailing tick past the last step flushes coalesced scroll work.
    pub fn replay(&self, page: Page, cfg: Config) -> Trace {
        let debounce = cfg.resize_debounce_ms;
        let mut highlighter = Highlighter::new(page, cfg, self.fragment.as_deref());
        let (mut dispatcher, _handles) = Dispatcher::wired(debounce);

        let mut steps = self.steps.clone();
        steps.sort_by_key(Step::at_ms);

        let mut trace = Trace {
            initial: highlighter.active_id().map(ToString::to_string),
            transitions: Vec::new(),
        };
        let mut last_active = trace.initial.clone();

        let end = steps.last().map_or(0, Step::at_ms).saturating_add(FRAME_MS);
        let mut pending = steps.into_iter().peekable();
        let mut now_ms = 0;
        while now_ms <= end {
            while let Some(step) = pending.next_if(|s| s.at_ms() <= now_ms) {
                let at_ms = step.at_ms();
                dispatcher.dispatch(&mut highlighter, step.into_event());
                record(&mut trace, &mut last_active, at_ms, &highlighter);
            }
            dispatcher.dispatch(&mut highlighter, PageEvent::Frame { now_ms });
            record(&mut trace, &mut last_active, now_ms, &highlighter);
            now_ms += FRAME_MS;
        }
        trace
    }
}

fn record(
    trace: &mut Trace,
    last_active: &mut Option<String>,
    at_ms: u64,
    highlighter: &Highlighter,
) {
    let active = highlighter.active_id().map(ToString::to_string);
    if active != *last_active {
        trace.transitions.push(Transition {
            at_ms,
            from: last_active.clone(),
            to: active.clone(),
        });
        *last_active = active;
    }
}

#[cfg(test)]
#[path = "tests/scenario.rs"]
mod tests;
