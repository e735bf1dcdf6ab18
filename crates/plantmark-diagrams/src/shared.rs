//! Process-wide placeholder table for the two-call API.
//!
//! Some markdown hosts only offer a "before conversion" and an "after
//! conversion" hook with no way to pass state between them. For those,
//! [`SharedPlaceholders`] keeps the table of the most recent extraction.
//!
//! ```
//! use plantmark_diagrams::{BlockExtractor, RenderConfig, SharedPlaceholders};
//!
//! static PLACEHOLDERS: SharedPlaceholders = SharedPlaceholders::new();
//!
//! let extractor = BlockExtractor::new(RenderConfig::default());
//! let markdown = PLACEHOLDERS.preprocess(&extractor, "```plantuml\nA -> B\n```");
//! assert_eq!(markdown, "<!-- PLANTUML_BLOCK_0 -->");
//!
//! let html = PLACEHOLDERS.restore(&markdown);
//! assert_eq!(html, r#"<div class="plantuml"><p>A -> B</p></div>"#);
//! ```
//!
//! Interleaved documents still overwrite each other's table; callers that can
//! carry state should use [`crate::DiagramPipeline`] or the [`crate::Extraction`]
//! value directly.

use std::sync::Mutex;

use crate::extract::BlockExtractor;
use crate::fetch::Transport;
use crate::placeholder::PlaceholderTable;

/// Lock-protected placeholder table shared between hook calls.
#[derive(Debug, Default)]
pub struct SharedPlaceholders {
    table: Mutex<PlaceholderTable>,
}

impl SharedPlaceholders {
    /// Create an empty shared table.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            table: Mutex::new(PlaceholderTable::new()),
        }
    }

    /// Extract diagram blocks and make their table the current one.
    ///
    /// Fetching happens before the lock is taken.
    pub fn preprocess<T: Transport>(&self, extractor: &BlockExtractor<T>, markdown: &str) -> String {
        let extraction = extractor.extract(markdown);
        *self.table.lock().unwrap() = extraction.placeholders;
        extraction.markdown
    }

    /// Restore markers in `html` from the current table.
    #[must_use]
    pub fn restore(&self, html: &str) -> String {
        self.table.lock().unwrap().restore(html)
    }

    /// Number of fragments in the current table.
    #[must_use]
    pub fn len(&self) -> usize {
        self.table.lock().unwrap().len()
    }

    /// Whether the current table is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
