//! Extract, convert, restore in one call.

use crate::extract::BlockExtractor;
use crate::fetch::{RenderConfig, Transport, UreqTransport};

/// Final HTML of a render pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderResult {
    /// Converted HTML with diagram fragments in place.
    pub html: String,
    /// Extraction notices plus markers lost during conversion.
    pub warnings: Vec<String>,
}

/// Runs a markdown converter between block extraction and restoration.
///
/// The placeholder table lives only for the duration of [`Self::render`], so
/// one pipeline can render any number of documents concurrently.
pub struct DiagramPipeline<T = UreqTransport> {
    extractor: BlockExtractor<T>,
}

impl DiagramPipeline<UreqTransport> {
    /// Create a pipeline fetching over HTTP with `config`.
    #[must_use]
    pub fn new(config: RenderConfig) -> Self {
        Self::with_extractor(BlockExtractor::new(config))
    }
}

impl<T: Transport> DiagramPipeline<T> {
    /// Create a pipeline around an existing extractor.
    #[must_use]
    pub fn with_extractor(extractor: BlockExtractor<T>) -> Self {
        Self { extractor }
    }

    /// Extractor used for the first stage.
    #[must_use]
    pub fn extractor(&self) -> &BlockExtractor<T> {
        &self.extractor
    }

    /// Render `markdown` to HTML with `convert` as the markdown converter.
    ///
    /// `convert` must pass HTML comments through, which every CommonMark
    /// converter does for a comment on its own line.
    pub fn render<F>(&self, markdown: &str, convert: F) -> RenderResult
    where
        F: FnOnce(&str) -> String,
    {
        let extraction = self.extractor.extract(markdown);
        let converted = convert(&extraction.markdown);

        let mut warnings = extraction.warnings;
        for token in extraction.placeholders.missing_markers(&converted) {
            tracing::warn!(token = %token, "Converter dropped a diagram placeholder");
            warnings.push(format!("placeholder {token} was lost during conversion"));
        }

        RenderResult {
            html: extraction.placeholders.restore(&converted),
            warnings,
        }
    }
}
