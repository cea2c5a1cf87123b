//! The core state machine deciding which page section is active.
//!
//! A single-page site with a fixed header wants the nav link for whatever
//! the reader is looking at to light up, and nothing else. We keep a single
//! source of truth that is interrogated and mutated as synthetic events
//! arrive: scroll offsets, visibility reports, fragment navigation, link
//! clicks. Time is an explicit `now_ms` carried by the events, so every
//! decision here is deterministic and replayable.
//!
//! No entry point returns an error or panics: a section id without a
//! rectangle is skipped, an unknown id clears the highlight, and both are
//! at most logged.

use crate::config::Config;
use crate::events::VisibilityEntry;
use crate::page::{NavRegion, Page};
use log::{debug, warn};

/// A time-boxed manual activation.
///
/// Set when the user clicks a nav link or navigates by fragment. While it
/// lives, automatic recomputation re-applies its id instead of computing
/// freshly; only the top-of-page rule beats it. The pair is discarded the
/// first time its expiry is observed, so an expired override can never
/// re-apply.
#[derive(Clone, Debug)]
struct Override {
    id: String,
    expires_ms: u64,
}

/// Which way the last coalesced scroll moved.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum ScrollDirection {
    Up,
    Down,
}

/// A section intersecting the viewport window, with its ranking keys.
struct Candidate {
    id: String,
    ratio: f64,
    distance_to_top: f64,
}

/// Tracks scroll position and viewport intersection to decide the active
/// section, reflecting it onto the nav links as presentation state.
///
/// Construct one per page in the bootstrap routine and feed it events;
/// there is no global instance. The scroll path is coalesced to one
/// recomputation per frame: scroll events only record the newest offset and
/// raise a pending flag, and [`Highlighter::on_frame`] does the work.
///
/// The recomputation policy, in priority order:
///
/// ```text
/// 1. offset at page top            -> first section, beats everything
/// 2. live override                 -> the override's id
/// 3. rank intersecting sections    -> best visible-fraction wins,
///                                     ties to the top edge nearest the header
/// 4. nothing intersecting          -> first section when drifting up near
///                                     the top, else nearest top edge
/// 5. near the top, first section   -> first section, regardless of rank
///    among candidates
/// ```
pub struct Highlighter {
    page: Page,
    cfg: Config,
    /// Indices into `page.links` for nav-region links with known targets.
    tracked: Vec<usize>,
    active_id: Option<String>,
    override_state: Option<Override>,
    /// Newest reported scroll offset, applied on the next frame.
    scroll_y: f64,
    /// Offset at the previous recomputation, for direction detection.
    last_scroll_y: f64,
    /// Set by scroll/resize events, cleared by the frame tick.
    pending_frame: bool,
}

impl Highlighter {
    #[must_use]
    /// Build a highlighter over a page model.
    ///
    /// Collects the tracked links (nav-region anchors targeting known
    /// section ids), strips active presentation from matching anchors found
    /// elsewhere on the page, and activates the section named by `fragment`
    /// when known, else the first section.
    pub fn new(page: Page, cfg: Config, fragment: Option<&str>) -> Self {
        let tracked: Vec<usize> = page
            .links
            .iter()
            .enumerate()
            .filter(|(_, link)| {
                matches!(link.region, NavRegion::Primary | NavRegion::Mobile)
                    && page.is_known(&link.target)
            })
            .map(|(i, _)| i)
            .collect();

        for id in &page.section_ids {
            if page.section(id).is_none() {
                warn!("section '{id}' has no rectangle; it will be skipped");
            }
        }

        let mut hl = Self {
            page,
            cfg,
            tracked,
            active_id: None,
            override_state: None,
            scroll_y: 0.0,
            last_scroll_y: 0.0,
            pending_frame: false,
        };
        hl.sanitize_stray_links();

        let initial = match fragment {
            Some(f) if hl.page.is_known(f) => Some(f.to_string()),
            _ => hl.first_id(),
        };
        if let Some(id) = initial {
            hl.set_active(&id);
        }
        hl
    }

    /// Anchors outside the nav regions must not carry active presentation,
    /// however the page markup arrived.
    fn sanitize_stray_links(&mut self) {
        for (i, link) in self.page.links.iter_mut().enumerate() {
            if self.tracked.contains(&i) || !self.page.section_ids.contains(&link.target) {
                continue;
            }
            for token in &self.cfg.active_classes {
                link.toggle_class(token, false);
            }
            link.current = false;
        }
    }

    #[must_use]
    /// The page model, including current link presentation.
    pub fn page(&self) -> &Page {
        &self.page
    }

    #[must_use]
    /// The active configuration.
    pub fn config(&self) -> &Config {
        &self.cfg
    }

    #[must_use]
    /// The currently active section id, if any.
    pub fn active_id(&self) -> Option<&str> {
        self.active_id.as_deref()
    }

    #[must_use]
    /// Newest scroll offset reported to the highlighter.
    pub fn scroll_y(&self) -> f64 {
        self.scroll_y
    }

    #[must_use]
    /// Whether a manual override is still suppressing recomputation.
    pub fn has_override(&self, now_ms: u64) -> bool {
        self.override_state
            .as_ref()
            .is_some_and(|o| now_ms < o.expires_ms)
    }

    /// Mark the tracked links targeting `id` active and clear every other
    /// tracked link.
    ///
    /// The full active token set plus the current-page marker go on, or come
    /// off, together. An unknown id clears everything and records no active
    /// section.
    pub fn set_active(&mut self, id: &str) {
        let known = self.page.is_known(id);
        if !known {
            warn!("set_active: '{id}' is not a known section; clearing highlight");
        }
        for &i in &self.tracked {
            let link = &mut self.page.links[i];
            let is_active = known && link.target == id;
            for token in &self.cfg.active_classes {
                link.toggle_class(token, is_active);
            }
            link.current = is_active;
        }
        self.active_id = known.then(|| id.to_string());
    }

    /// Record a manual activation and apply it immediately.
    ///
    /// Until `now_ms + duration_ms`, automatic recomputation re-applies `id`
    /// rather than computing freshly; the top-of-page rule still wins.
    pub fn apply_override(&mut self, id: &str, duration_ms: u64, now_ms: u64) {
        debug!("override -> '{id}' for {duration_ms}ms");
        self.override_state = Some(Override {
            id: id.to_string(),
            expires_ms: now_ms.saturating_add(duration_ms),
        });
        self.set_active(id);
    }

    /// A click on a page anchor.
    ///
    /// Tracked nav links override to their target; so does any body anchor
    /// back to the first section (the brand logo on a typical page). Other
    /// clicks are not ours to handle.
    pub fn on_link_click(&mut self, target: &str, now_ms: u64) {
        let tracked_target = self
            .tracked
            .iter()
            .any(|&i| self.page.links[i].target == target);
        let is_home = self.first_id().is_some_and(|first| first == target);
        if tracked_target || is_home {
            self.apply_override(target, self.cfg.override_ms, now_ms);
        } else {
            debug!("ignoring click on untracked target '{target}'");
        }
    }

    /// The URL fragment changed.
    ///
    /// Known ids override to themselves; anything else falls back to the
    /// first section, matching what the address bar now claims.
    pub fn on_fragment_change(&mut self, fragment: &str, now_ms: u64) {
        let id = if self.page.is_known(fragment) {
            fragment.to_string()
        } else {
            let Some(first) = self.first_id() else {
                return;
            };
            first
        };
        self.apply_override(&id, self.cfg.override_ms, now_ms);
    }

    /// Record a new scroll offset.
    ///
    /// Cheap by design: recomputation waits for the next frame tick, and
    /// offsets arriving in between are coalesced into the newest one.
    pub fn on_scroll(&mut self, y: f64) {
        self.scroll_y = y.max(0.0);
        self.pending_frame = true;
    }

    /// Frame tick: run at most one pending recomputation.
    pub fn on_frame(&mut self, now_ms: u64) {
        if self.pending_frame {
            self.pending_frame = false;
            self.recompute(now_ms);
        }
    }

    /// Apply new header/viewport geometry and schedule a recomputation.
    ///
    /// Debouncing belongs to the event wiring; by the time this is called
    /// the new measurements are final.
    pub fn on_resize(&mut self, header_height: f64, viewport_height: f64) {
        self.page.header_height = header_height;
        self.page.viewport_height = viewport_height;
        self.pending_frame = true;
    }

    /// Visibility report for observed sections.
    ///
    /// Near the page top the first section wins outright; then a live
    /// override; then the intersecting entry with the greatest reported
    /// ratio. Entries for unknown ids are ignored, and with no intersecting
    /// entry the highlight is left as it stands: the scroll path owns the
    /// fallbacks.
    pub fn on_visibility(&mut self, entries: &[VisibilityEntry], now_ms: u64) {
        if self.scroll_y <= self.page.header_height + self.cfg.visibility_top_slack_px {
            if let Some(first) = self.first_id() {
                self.set_active(&first);
            }
            return;
        }
        if let Some(id) = self.live_override(now_ms) {
            self.set_active(&id);
            return;
        }
        let mut best: Option<&VisibilityEntry> = None;
        for entry in entries {
            if !entry.intersecting || !self.page.is_known(&entry.id) {
                continue;
            }
            if best.is_none_or(|b| entry.ratio > b.ratio) {
                best = Some(entry);
            }
        }
        if let Some(entry) = best {
            let id = entry.id.clone();
            self.set_active(&id);
        }
    }

    /// The live override id, discarding the override the first time it is
    /// seen expired.
    fn live_override(&mut self, now_ms: u64) -> Option<String> {
        let state = self.override_state.as_ref()?;
        if now_ms < state.expires_ms {
            return Some(state.id.clone());
        }
        debug!("override '{}' expired", state.id);
        self.override_state = None;
        None
    }

    fn first_id(&self) -> Option<String> {
        self.page.section_ids.first().cloned()
    }

    /// The scroll-path policy. See the type-level docs for the rule order.
    fn recompute(&mut self, now_ms: u64) {
        let y = self.scroll_y;
        let direction = if y < self.last_scroll_y {
            ScrollDirection::Up
        } else {
            ScrollDirection::Down
        };
        self.last_scroll_y = y;

        // Rule 1: the page top belongs to the first section, override or not.
        if y <= self.cfg.top_threshold_px {
            if let Some(first) = self.first_id() {
                self.set_active(&first);
            }
            return;
        }

        // Rule 2: a recent manual activation holds.
        if let Some(id) = self.live_override(now_ms) {
            self.set_active(&id);
            return;
        }

        let candidates = self.rank_candidates();
        let near_top = y <= self.page.header_height + self.cfg.near_top_slack_px;

        if candidates.is_empty() {
            // Rule 4: nothing clearly visible.
            if direction == ScrollDirection::Up && near_top {
                if let Some(first) = self.first_id() {
                    self.set_active(&first);
                }
                return;
            }
            if let Some(id) = self.nearest_section_id() {
                self.set_active(&id);
            }
            return;
        }

        // Rule 5: very near the top, the first section beats the ranking
        // when it is in contention at all.
        if near_top {
            if let Some(first) = self.first_id() {
                if candidates.iter().any(|c| c.id == first) {
                    self.set_active(&first);
                    return;
                }
            }
        }

        let winner = candidates[0].id.clone();
        self.set_active(&winner);
    }

    /// Sections intersecting the viewport window, best first.
    ///
    /// The window runs from the header boundary to the viewport bottom.
    /// Ranking is by visible-fraction (visible span over section height),
    /// ties broken by the top edge nearest the header boundary.
    fn rank_candidates(&self) -> Vec<Candidate> {
        let view_top = self.page.header_height;
        let view_bottom = self.page.viewport_height;
        let mut candidates = Vec::new();

        for id in &self.page.section_ids {
            let Some(section) = self.page.section(id) else {
                continue;
            };
            let top = section.top - self.scroll_y;
            let bottom = top + section.height;
            let visible = (bottom.min(view_bottom) - top.max(view_top)).max(0.0);
            if visible <= 0.0 {
                continue;
            }
            // visible > 0 implies bottom > top, so the height is non-zero.
            candidates.push(Candidate {
                id: id.clone(),
                ratio: visible / section.height,
                distance_to_top: (top - view_top).abs(),
            });
        }

        candidates.sort_by(|a, b| {
            b.ratio
                .total_cmp(&a.ratio)
                .then(a.distance_to_top.total_cmp(&b.distance_to_top))
        });
        candidates
    }

    /// The section whose top edge sits nearest the header boundary,
    /// intersecting or not. Earlier sections win ties.
    fn nearest_section_id(&self) -> Option<String> {
        let view_top = self.page.header_height;
        let mut closest: Option<(String, f64)> = None;
        for id in &self.page.section_ids {
            let Some(section) = self.page.section(id) else {
                continue;
            };
            let distance = (section.top - self.scroll_y - view_top).abs();
            if closest.as_ref().is_none_or(|(_, d)| distance < *d) {
                closest = Some((id.clone(), distance));
            }
        }
        closest.map(|(id, _)| id)
    }
}

#[cfg(test)]
#[path = "tests/highlighter.rs"]
mod tests;
