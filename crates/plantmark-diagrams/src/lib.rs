//! PlantUML block rendering around a markdown converter.
//!
//! Diagram source blocks are lifted out of the markdown before conversion and
//! put back, rendered, afterwards:
//! - [`BlockExtractor`] replaces each fenced `plantuml` block with an HTML
//!   comment marker and renders the block through the diagram server
//! - the markdown converter of your choice turns the rest into HTML, passing
//!   the comment markers through
//! - [`PlaceholderTable::restore`] swaps the markers for the rendered fragments
//!
//! Rendering never fails a document: a disabled renderer yields the escaped
//! source, and network failures become an error paragraph in place of the
//! diagram.
//!
//! # Architecture
//!
//! - [`encode`](fn@encode): deflate + base64 variant used in diagram URLs
//! - [`DiagramFetcher`]: one block to markup, over a pluggable [`Transport`]
//! - [`scan`](fn@scan): pure fence scanner
//! - [`BlockExtractor`]: scan, parallel fetch, substitution
//! - [`PlaceholderTable`]: token to fragment table and restoration
//! - [`SharedPlaceholders`]: lock-protected table for two-hook hosts
//! - [`DiagramPipeline`]: extract, convert, restore in one call
//!
//! # Example
//!
//! ```
//! use plantmark_diagrams::{DiagramPipeline, RenderConfig};
//!
//! let pipeline = DiagramPipeline::new(RenderConfig::default());
//! let result = pipeline.render("```plantuml\nA -> B\n```", str::to_owned);
//!
//! assert_eq!(result.html, r#"<div class="plantuml"><p>A -> B</p></div>"#);
//! ```

mod consts;
mod encode;
mod extract;
mod fetch;
mod html;
mod pipeline;
mod placeholder;
mod scan;
mod shared;

pub use consts::{DEFAULT_IMAGE_FORMAT, DEFAULT_LANGUAGE, DEFAULT_TIMEOUT, PLACEHOLDER_PREFIX};
pub use encode::{diagram_url, encode};
pub use extract::{BlockExtractor, Extraction};
pub use fetch::{
    DiagramFetcher, FetchError, RenderConfig, Transport, UreqTransport, create_agent,
    fetch_diagram,
};
pub use html::escape_text;
pub use pipeline::{DiagramPipeline, RenderResult};
pub use placeholder::PlaceholderTable;
pub use scan::{DiagramBlock, FenceFamily, ScanOutput, scan};
pub use shared::SharedPlaceholders;
