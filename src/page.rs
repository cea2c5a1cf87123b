//! The host page as plain data.
//!
//! In the browser these collaborators are the live DOM: section elements,
//! anchors in the desktop and mobile navs, the fixed header. Here they are a
//! snapshot the highlighter inspects and mutates, loadable from a JSON
//! layout file so the same page can drive the simulator, a scenario replay,
//! and unit tests.

use crate::section::Section;
use serde::{Deserialize, Serialize};
use std::io;
use std::path::Path;

#[derive(Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Debug)]
#[serde(rename_all = "snake_case")]
/// Where on the page a link lives.
///
/// Only the two nav regions participate in highlighting; body anchors that
/// target a known section are stripped of any active presentation at
/// initialisation so stale markup cannot survive.
pub enum NavRegion {
    /// The desktop navigation bar.
    Primary,
    /// The collapsible mobile navigation.
    Mobile,
    /// Anywhere else on the page (brand logo, in-content anchors).
    Body,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
/// An anchor with a section target and its presentation state.
pub struct NavLink {
    /// Region the link was found in.
    pub region: NavRegion,
    /// Section id the link points at (the `#fragment` without the hash).
    pub target: String,
    /// Class tokens currently applied to the link.
    #[serde(default)]
    pub classes: Vec<String>,
    /// Whether the link carries the current-page marker.
    #[serde(default)]
    pub current: bool,
}

impl NavLink {
    #[must_use]
    /// Whether the link currently carries `token`.
    pub fn has_class(&self, token: &str) -> bool {
        self.classes.iter().any(|c| c == token)
    }

    /// Apply or remove `token`, keeping the class list free of duplicates.
    pub(crate) fn toggle_class(&mut self, token: &str, on: bool) {
        if on {
            if !self.has_class(token) {
                self.classes.push(token.to_string());
            }
        } else {
            self.classes.retain(|c| c != token);
        }
    }
}

fn default_header_height() -> f64 {
    80.0
}

fn default_viewport_height() -> f64 {
    720.0
}

#[derive(Serialize, Deserialize, Clone, Debug)]
/// Layout snapshot of a sectioned page.
pub struct Page {
    /// Known section ids in page order; the first is the top-of-page home.
    pub section_ids: Vec<String>,
    /// Rectangles for sections that rendered. Ids without one are skipped.
    pub sections: Vec<Section>,
    /// Every anchor on the page that targets a section.
    pub links: Vec<NavLink>,
    /// Rendered height of the fixed header in pixels.
    #[serde(default = "default_header_height")]
    pub header_height: f64,
    /// Height of the browser viewport in pixels.
    #[serde(default = "default_viewport_height")]
    pub viewport_height: f64,
}

impl Page {
    /// Load a page layout from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not a valid page
    /// layout.
    pub fn load(path: &Path) -> io::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        serde_json::from_str(&contents).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }

    #[must_use]
    /// Look up the rectangle for a section id, if it rendered.
    pub fn section(&self, id: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.id == id)
    }

    #[must_use]
    /// Whether `id` names a known section.
    pub fn is_known(&self, id: &str) -> bool {
        self.section_ids.iter().any(|s| s == id)
    }

    #[must_use]
    /// Total scrollable height: the lowest section bottom edge.
    pub fn document_height(&self) -> f64 {
        self.sections.iter().map(Section::bottom).fold(0.0, f64::max)
    }

    #[must_use]
    /// Built-in demo layout: a four-section single-page site with desktop
    /// and mobile navs plus a brand anchor back to the top.
    pub fn demo() -> Self {
        let ids = ["inicio", "servicios", "antes-despues", "ubicacion"];
        let mut links: Vec<NavLink> = Vec::new();
        for region in [NavRegion::Primary, NavRegion::Mobile] {
            links.extend(ids.iter().map(|id| NavLink {
                region,
                target: (*id).to_string(),
                classes: Vec::new(),
                current: false,
            }));
        }
        links.push(NavLink {
            region: NavRegion::Body,
            target: "inicio".to_string(),
            classes: Vec::new(),
            current: false,
        });
        links.push(NavLink {
            region: NavRegion::Body,
            target: "ubicacion".to_string(),
            classes: Vec::new(),
            current: false,
        });

        Self {
            section_ids: ids.iter().map(|id| (*id).to_string()).collect(),
            sections: vec![
                Section {
                    id: "inicio".to_string(),
                    top: 0.0,
                    height: 800.0,
                },
                Section {
                    id: "servicios".to_string(),
                    top: 800.0,
                    height: 900.0,
                },
                Section {
                    id: "antes-despues".to_string(),
                    top: 1700.0,
                    height: 700.0,
                },
                Section {
                    id: "ubicacion".to_string(),
                    top: 2400.0,
                    height: 600.0,
                },
            ],
            links,
            header_height: default_header_height(),
            viewport_height: default_viewport_height(),
        }
    }
}

#[cfg(test)]
#[path = "tests/page.rs"]
mod tests;
