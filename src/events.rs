//! Event wiring between a page and its highlighter.
//!
//! The browser hands callbacks to `addEventListener` and hopes; here the
//! wiring is explicit. A [`Dispatcher`] routes [`PageEvent`]s into the
//! highlighter's entry points, but only while a subscription for that kind
//! of event is live, and every [`subscribe`](Dispatcher::subscribe) returns
//! a handle that [`unsubscribe`](Dispatcher::unsubscribe) tears down
//! deterministically. Tests drive the same path the simulator does.
//!
//! Resize is the one stateful kind: measurements settle only after a quiet
//! window, so the dispatcher holds the newest geometry and applies it on the
//! first frame tick past the debounce deadline.

use crate::highlighter::Highlighter;
use log::debug;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Clone, Debug)]
/// One observed section in a visibility report.
pub struct VisibilityEntry {
    /// Section id the entry describes.
    pub id: String,
    /// Fraction of the section inside the observed area.
    pub ratio: f64,
    /// Whether the section intersects the observed area at all.
    pub intersecting: bool,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
/// The subscribable kinds of page event.
pub enum EventKind {
    /// Scroll offset changes.
    Scroll,
    /// Viewport-intersection reports.
    Visibility,
    /// URL fragment navigation.
    Fragment,
    /// Clicks on section anchors.
    Click,
    /// Header/viewport measurement changes.
    Resize,
}

impl EventKind {
    /// Every subscribable kind, for wiring up a full page.
    pub const ALL: [Self; 5] = [
        Self::Scroll,
        Self::Visibility,
        Self::Fragment,
        Self::Click,
        Self::Resize,
    ];
}

#[derive(Clone, Debug)]
/// A synthetic page event.
///
/// `Frame` is not subscribable: it is the clock the dispatcher and
/// highlighter pace themselves by, and is always delivered.
pub enum PageEvent {
    /// The page scrolled to a new offset.
    Scroll {
        /// New scroll offset in pixels from the document top.
        y: f64,
    },
    /// An animation-frame tick.
    Frame {
        /// Milliseconds since the page loaded.
        now_ms: u64,
    },
    /// A visibility report for observed sections.
    Visibility {
        /// One entry per observed section.
        entries: Vec<VisibilityEntry>,
        /// Milliseconds since the page loaded.
        now_ms: u64,
    },
    /// The URL fragment changed.
    Fragment {
        /// The new fragment, without the leading `#`.
        fragment: String,
        /// Milliseconds since the page loaded.
        now_ms: u64,
    },
    /// A section anchor was clicked.
    Click {
        /// The clicked link's target section id.
        target: String,
        /// Milliseconds since the page loaded.
        now_ms: u64,
    },
    /// The header or viewport was re-measured.
    Resize {
        /// New rendered header height in pixels.
        header_height: f64,
        /// New viewport height in pixels.
        viewport_height: f64,
        /// Milliseconds since the page loaded.
        now_ms: u64,
    },
}

#[derive(PartialEq, Eq, Debug)]
/// Proof of a live subscription, redeemable for its teardown.
pub struct SubscriptionHandle(u64);

/// Newest geometry waiting out the resize debounce window.
struct PendingResize {
    header_height: f64,
    viewport_height: f64,
    apply_at_ms: u64,
}

/// Routes page events into a highlighter for the subscribed kinds.
pub struct Dispatcher {
    subscriptions: Vec<(u64, EventKind)>,
    next_handle: u64,
    debounce_ms: u64,
    pending_resize: Option<PendingResize>,
}

impl Dispatcher {
    #[must_use]
    /// A dispatcher with no subscriptions; events other than frames are
    /// dropped until kinds are subscribed.
    pub fn new(resize_debounce_ms: u64) -> Self {
        Self {
            subscriptions: Vec::new(),
            next_handle: 0,
            debounce_ms: resize_debounce_ms,
            pending_resize: None,
        }
    }

    #[must_use]
    /// A dispatcher already subscribed to every event kind.
    ///
    /// The bundled handles stay redeemable for selective teardown.
    pub fn wired(resize_debounce_ms: u64) -> (Self, Vec<SubscriptionHandle>) {
        let mut dispatcher = Self::new(resize_debounce_ms);
        let handles = EventKind::ALL
            .into_iter()
            .map(|kind| dispatcher.subscribe(kind))
            .collect();
        (dispatcher, handles)
    }

    #[must_use = "dropping the handle forfeits the subscription's teardown"]
    /// Start routing events of `kind`.
    pub fn subscribe(&mut self, kind: EventKind) -> SubscriptionHandle {
        let handle = self.next_handle;
        self.next_handle += 1;
        self.subscriptions.push((handle, kind));
        SubscriptionHandle(handle)
    }

    /// Stop the subscription behind `handle`.
    ///
    /// Returns false if the handle was already torn down. Other
    /// subscriptions of the same kind keep the kind flowing.
    pub fn unsubscribe(&mut self, handle: SubscriptionHandle) -> bool {
        let before = self.subscriptions.len();
        self.subscriptions.retain(|(id, _)| *id != handle.0);
        self.subscriptions.len() != before
    }

    #[must_use]
    /// Whether any live subscription covers `kind`.
    pub fn is_subscribed(&self, kind: EventKind) -> bool {
        self.subscriptions.iter().any(|(_, k)| *k == kind)
    }

    /// Deliver one event to the highlighter.
    ///
    /// Unsubscribed kinds are dropped. Frame ticks always land: they flush
    /// any debounce-expired resize first, then let the highlighter run its
    /// pending recomputation.
    pub fn dispatch(&mut self, highlighter: &mut Highlighter, event: PageEvent) {
        match event {
            PageEvent::Scroll { y } => {
                if self.is_subscribed(EventKind::Scroll) {
                    highlighter.on_scroll(y);
                }
            }
            PageEvent::Frame { now_ms } => {
                self.flush_resize(highlighter, now_ms);
                highlighter.on_frame(now_ms);
            }
            PageEvent::Visibility { entries, now_ms } => {
                if self.is_subscribed(EventKind::Visibility) {
                    highlighter.on_visibility(&entries, now_ms);
                }
            }
            PageEvent::Fragment { fragment, now_ms } => {
                if self.is_subscribed(EventKind::Fragment) {
                    highlighter.on_fragment_change(&fragment, now_ms);
                }
            }
            PageEvent::Click { target, now_ms } => {
                if self.is_subscribed(EventKind::Click) {
                    highlighter.on_link_click(&target, now_ms);
                }
            }
            PageEvent::Resize {
                header_height,
                viewport_height,
                now_ms,
            } => {
                if self.is_subscribed(EventKind::Resize) {
                    debug!("resize measured, settling for {}ms", self.debounce_ms);
                    self.pending_resize = Some(PendingResize {
                        header_height,
                        viewport_height,
                        apply_at_ms: now_ms.saturating_add(self.debounce_ms),
                    });
                }
            }
        }
    }

    fn flush_resize(&mut self, highlighter: &mut Highlighter, now_ms: u64) {
        if let Some(pending) = &self.pending_resize {
            if now_ms >= pending.apply_at_ms {
                highlighter.on_resize(pending.header_height, pending.viewport_height);
                self.pending_resize = None;
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/events.rs"]
mod tests;
