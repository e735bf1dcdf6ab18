//! Block extraction: scan, render, substitute.
//!
//! Extraction is a pure function of its input and configuration. Every call
//! builds its own [`PlaceholderTable`], so concurrent extractions never share
//! state.

use rayon::prelude::*;

use crate::consts::DEFAULT_LANGUAGE;
use crate::fetch::{DiagramFetcher, RenderConfig, Transport, UreqTransport};
use crate::html::container;
use crate::placeholder::PlaceholderTable;
use crate::scan::scan;

/// Markdown with diagram blocks replaced by placeholder markers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extraction {
    /// Rewritten markdown.
    pub markdown: String,
    /// Fragments for the markers in [`Self::markdown`].
    pub placeholders: PlaceholderTable,
    /// Unterminated blocks and similar leniency notices.
    pub warnings: Vec<String>,
}

/// Replaces fenced diagram blocks with placeholders holding rendered markup.
pub struct BlockExtractor<T = UreqTransport> {
    fetcher: DiagramFetcher<T>,
    language: String,
}

impl BlockExtractor<UreqTransport> {
    /// Create an extractor fetching over HTTP with `config`.
    #[must_use]
    pub fn new(config: RenderConfig) -> Self {
        Self::with_fetcher(DiagramFetcher::new(config))
    }
}

impl<T: Transport> BlockExtractor<T> {
    /// Create an extractor around an existing fetcher.
    #[must_use]
    pub fn with_fetcher(fetcher: DiagramFetcher<T>) -> Self {
        Self {
            fetcher,
            language: DEFAULT_LANGUAGE.to_owned(),
        }
    }

    /// Recognize fences tagged with `language` instead of `plantuml`.
    ///
    /// The tag is also the CSS class of the wrapping container.
    #[must_use]
    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    /// Fetcher used for each block.
    #[must_use]
    pub fn fetcher(&self) -> &DiagramFetcher<T> {
        &self.fetcher
    }

    /// Replace each diagram block in `markdown` with a placeholder marker.
    ///
    /// Blocks are fetched in parallel. Tokens are still assigned in document
    /// order, and text outside blocks is kept byte for byte.
    #[must_use]
    pub fn extract(&self, markdown: &str) -> Extraction {
        let scanned = scan(markdown, &self.language);

        for warning in &scanned.warnings {
            tracing::warn!(warning = %warning, "Lenient diagram block handling");
        }

        if scanned.blocks.is_empty() {
            return Extraction {
                markdown: markdown.to_owned(),
                placeholders: PlaceholderTable::new(),
                warnings: scanned.warnings,
            };
        }

        let dark = self.fetcher.config().dark;
        let fragments: Vec<String> = scanned
            .blocks
            .par_iter()
            .map(|block| container(&self.language, &self.fetcher.fetch(&block.source, dark)))
            .collect();

        let mut placeholders = PlaceholderTable::new();
        let markers: Vec<String> = fragments
            .into_iter()
            .map(|fragment| PlaceholderTable::marker(&placeholders.insert(fragment)))
            .collect();

        tracing::debug!(blocks = markers.len(), "Extracted diagram blocks");

        Extraction {
            markdown: scanned.assemble(|index| markers[index].clone()),
            placeholders,
            warnings: scanned.warnings,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::FetchError;
    use pretty_assertions::assert_eq;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn extractor<F>(config: RenderConfig, f: F) -> BlockExtractor<F>
    where
        F: Fn(&str) -> Result<String, FetchError> + Send + Sync,
    {
        BlockExtractor::with_fetcher(DiagramFetcher::with_transport(config, f))
    }

    fn disabled() -> RenderConfig {
        RenderConfig::default()
    }

    #[test]
    fn test_fallback_block_replaced_with_marker() {
        let calls = AtomicUsize::new(0);
        let extractor = extractor(disabled(), |_| {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(String::new())
        });

        let result = extractor.extract("before\n```plantuml\nA->B: hi\n```\nafter");

        assert_eq!(result.markdown, "before\n<!-- PLANTUML_BLOCK_0 -->\nafter");
        assert_eq!(
            result.placeholders.get("PLANTUML_BLOCK_0"),
            Some(r#"<div class="plantuml"><p>A->B: hi</p></div>"#)
        );
        assert_eq!(result.placeholders.len(), 1);
        assert!(result.warnings.is_empty());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_no_blocks_is_identity() {
        let extractor = extractor(disabled(), |_| Ok(String::new()));
        let markdown = "# Title\n\n```rust\nfn main() {}\n```\n";

        let result = extractor.extract(markdown);

        assert_eq!(result.markdown, markdown);
        assert!(result.placeholders.is_empty());
    }

    #[test]
    fn test_enabled_wraps_server_body() {
        let extractor = extractor(
            RenderConfig::with_server("http://localhost:8080"),
            |url| Ok(format!("<svg data-url=\"{url}\"/>")),
        );

        let result = extractor.extract("```plantuml\nA -> B\n```");
        let fragment = result.placeholders.get("PLANTUML_BLOCK_0").unwrap();

        assert!(fragment.starts_with(r#"<div class="plantuml"><svg data-url="http://localhost:8080/svg/"#));
        assert!(fragment.ends_with("\"/></div>"));
    }

    #[test]
    fn test_tokens_follow_document_order() {
        let extractor = extractor(
            RenderConfig::with_server("http://localhost:8080"),
            |url| Ok(url.rsplit('/').next().unwrap_or_default().to_owned()),
        );
        let markdown = "```plantuml\nfirst\n```\n~~~plantuml\nsecond\n~~~\n```plantuml\nthird\n```";

        let result = extractor.extract(markdown);

        assert_eq!(
            result.markdown,
            "<!-- PLANTUML_BLOCK_0 -->\n<!-- PLANTUML_BLOCK_1 -->\n<!-- PLANTUML_BLOCK_2 -->"
        );
        for (i, source) in ["first", "second", "third"].iter().enumerate() {
            let expected = format!(
                r#"<div class="plantuml">{}</div>"#,
                crate::encode::encode(source)
            );
            assert_eq!(
                result.placeholders.get(&format!("PLANTUML_BLOCK_{i}")),
                Some(expected.as_str())
            );
        }
    }

    #[test]
    fn test_fetch_error_absorbed() {
        let extractor = extractor(RenderConfig::with_server("http://localhost:8080"), |_| {
            Err(FetchError::Request("timed out".to_owned()))
        });

        let result = extractor.extract("text\n```plantuml\nA -> B\n```");

        assert_eq!(result.markdown, "text\n<!-- PLANTUML_BLOCK_0 -->");
        assert_eq!(
            result.placeholders.get("PLANTUML_BLOCK_0"),
            Some(r#"<div class="plantuml"><p>Error fetching PlantUML diagram: timed out</p></div>"#)
        );
    }

    #[test]
    fn test_one_failed_fetch_leaves_other_blocks_rendered() {
        let bad = crate::encode::encode("bad");
        let extractor = extractor(RenderConfig::with_server("http://localhost:8080"), move |url| {
            if url.ends_with(&bad) {
                Err(FetchError::Request("x".to_owned()))
            } else {
                Ok("<svg/>".to_owned())
            }
        });

        let result = extractor.extract("```plantuml\ngood\n```\n```plantuml\nbad\n```\n~~~plantuml\nalso good\n~~~");

        assert_eq!(result.placeholders.len(), 3);
        let fragments: Vec<(String, &str)> = result.placeholders.iter().collect();
        assert_eq!(
            fragments,
            vec![
                ("PLANTUML_BLOCK_0".to_owned(), r#"<div class="plantuml"><svg/></div>"#),
                (
                    "PLANTUML_BLOCK_1".to_owned(),
                    r#"<div class="plantuml"><p>Error fetching PlantUML diagram: x</p></div>"#
                ),
                ("PLANTUML_BLOCK_2".to_owned(), r#"<div class="plantuml"><svg/></div>"#),
            ]
        );
    }

    #[test]
    fn test_dark_flag_reaches_url() {
        let config = RenderConfig {
            dark: true,
            ..RenderConfig::with_server("http://localhost:8080")
        };
        let extractor = extractor(config, |url| Ok(url.to_owned()));
        assert!(extractor.fetcher().config().dark);

        let result = extractor.extract("```plantuml\nA\n```");

        assert!(
            result
                .placeholders
                .get("PLANTUML_BLOCK_0")
                .unwrap()
                .contains("http://localhost:8080/dsvg/")
        );
    }

    #[test]
    fn test_unterminated_block_finalized_with_warning() {
        let extractor = extractor(disabled(), |_| Ok(String::new()));

        let result = extractor.extract("intro\n```plantuml\nA -> B");

        assert_eq!(result.markdown, "intro\n<!-- PLANTUML_BLOCK_0 -->");
        assert_eq!(
            result.placeholders.get("PLANTUML_BLOCK_0"),
            Some(r#"<div class="plantuml"><p>A -> B</p></div>"#)
        );
        assert_eq!(result.warnings.len(), 1);
    }

    #[test]
    fn test_each_call_gets_fresh_table() {
        let extractor = extractor(disabled(), |_| Ok(String::new()));

        let first = extractor.extract("```plantuml\nA\n```\n```plantuml\nB\n```");
        let second = extractor.extract("```plantuml\nC\n```");

        assert_eq!(first.placeholders.len(), 2);
        assert_eq!(second.placeholders.len(), 1);
        assert_eq!(
            second.placeholders.get("PLANTUML_BLOCK_0"),
            Some(r#"<div class="plantuml"><p>C</p></div>"#)
        );
    }

    #[test]
    fn test_custom_language_sets_class() {
        let extractor = extractor(disabled(), |_| Ok(String::new())).language("puml");

        let result = extractor.extract("```puml\nA\n```\n```plantuml\nB\n```");

        assert_eq!(
            result.markdown,
            "<!-- PLANTUML_BLOCK_0 -->\n```plantuml\nB\n```"
        );
        assert_eq!(
            result.placeholders.get("PLANTUML_BLOCK_0"),
            Some(r#"<div class="puml"><p>A</p></div>"#)
        );
    }
}
