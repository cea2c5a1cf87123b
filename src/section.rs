//! Section representation for scroll-tracked pages.
//!
//! A section is a named, anchorable region of the page identified by a
//! stable string id. Its rectangle lives in document space (pixels from the
//! top of the page) and is discovered by lookup in the page model, never
//! cached by the highlighter, so layout changes take effect on the next
//! recomputation.

use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Clone, Debug)]
/// Named page region with its document-space rectangle.
pub struct Section {
    /// Anchor id the section is addressed by (`#id` in links and fragments).
    pub id: String,
    /// Distance in pixels from the document top to the section's top edge.
    pub top: f64,
    /// Rendered height of the section in pixels.
    pub height: f64,
}

impl Section {
    #[must_use]
    /// Document-space offset of the section's bottom edge.
    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }
}
