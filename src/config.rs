//! Configuration to acknowledge developer preferences as well as set defaults.
//!
//! Specifically, we try to find a waymark.toml, and if present we load
//! settings from there. The pixel thresholds and durations here are tuning
//! knobs inherited from field testing of the page they were lifted from, not
//! load-bearing semantics; the defaults reproduce that behavior exactly.

use facet::Facet;
use std::fs;

#[derive(Facet, Clone)]
/// Tuning knobs loaded from waymark.toml or falling back to defaults.
pub struct Config {
    /// Scroll offsets at or below this count as "page top" and force the
    /// first section active, beating any override.
    #[facet(default = 2.0)]
    pub top_threshold_px: f64,
    /// Slack above the header boundary for the visibility path's top rule.
    #[facet(default = 4.0)]
    pub visibility_top_slack_px: f64,
    /// Slack for the near-top rules on the scroll path (steps 4 and 5).
    #[facet(default = 16.0)]
    pub near_top_slack_px: f64,
    /// How long a manual activation suppresses automatic recomputation.
    #[facet(default = 800)]
    pub override_ms: u64,
    /// Quiet window before a resize is applied to the page geometry.
    #[facet(default = 150)]
    pub resize_debounce_ms: u64,
    /// Pixels one arrow-key press scrolls the simulator.
    #[facet(default = 40.0)]
    pub scroll_step_px: f64,
    /// Class tokens toggled on the active nav link.
    #[facet(default = vec![
        "text-brand-700".to_string(),
        "font-semibold".to_string(),
        "bg-brand-100/50".to_string(),
        "rounded-md".to_string(),
        "px-2".to_string(),
        "py-1".to_string(),
    ])]
    pub active_classes: Vec<String>,
}

impl Config {
    #[must_use]
    /// Load configuration from waymark.toml if present.
    ///
    /// # Panics
    ///
    /// Panics if the default configuration cannot be parsed.
    pub fn load() -> Self {
        if let Ok(contents) = fs::read_to_string("waymark.toml") {
            if let Ok(config) = facet_toml::from_str::<Self>(&contents) {
                return config;
            }
        }
        facet_toml::from_str::<Self>("").unwrap()
    }
}
