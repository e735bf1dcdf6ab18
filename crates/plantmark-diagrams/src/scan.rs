//! Line scanner that isolates fenced diagram blocks.
//!
//! Scanning is pure: it splits the markdown into pass-through lines and block
//! slots, and collects the blocks so they can be fetched together afterwards.
//!
//! Two fence families are recognized, each with its own opening and closing
//! marker:
//!
//! ````text
//! ```plantuml        ~~~plantuml
//! A -> B             A -> B
//! ```                ~~~
//! ````
//!
//! The fence line must consist of exactly the marker and language tag
//! (surrounding whitespace is ignored). Nesting is not supported: while a block
//! is open, every line other than its own closing fence is content.

/// Delimiter family of a fenced block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FenceFamily {
    /// `` ``` `` fences.
    Backtick,
    /// `~~~` fences.
    Tilde,
}

impl FenceFamily {
    /// All families, in the order they are tried.
    const ALL: [Self; 2] = [Self::Backtick, Self::Tilde];

    /// Bare fence marker, which is also the closing fence.
    #[must_use]
    pub fn marker(self) -> &'static str {
        match self {
            Self::Backtick => "```",
            Self::Tilde => "~~~",
        }
    }

    /// Family whose opening fence for `language` equals `trimmed`, if any.
    fn opening(trimmed: &str, language: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|family| trimmed.strip_prefix(family.marker()) == Some(language))
    }
}

/// A diagram block found by the scanner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagramBlock {
    /// Fence family the block was opened with.
    pub family: FenceFamily,
    /// Content lines joined with `\n`, unaltered.
    pub source: String,
    /// 1-based line number of the opening fence.
    pub line: usize,
    /// Whether a closing fence was seen before end of input.
    pub terminated: bool,
}

/// One piece of scanner output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Piece<'a> {
    /// Line passed through unchanged.
    Line(&'a str),
    /// Slot for the block at this index in [`ScanOutput::blocks`].
    Block(usize),
}

/// Result of scanning a markdown document.
#[derive(Debug)]
pub struct ScanOutput<'a> {
    pieces: Vec<Piece<'a>>,
    /// Blocks in document order.
    pub blocks: Vec<DiagramBlock>,
    /// Leniency notices (unterminated blocks).
    pub warnings: Vec<String>,
}

impl ScanOutput<'_> {
    /// Rebuild the document, writing `slot(i)` in place of block `i`.
    pub(crate) fn assemble<F>(&self, mut slot: F) -> String
    where
        F: FnMut(usize) -> String,
    {
        self.pieces
            .iter()
            .map(|piece| match *piece {
                Piece::Line(line) => line.to_owned(),
                Piece::Block(index) => slot(index),
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Block being accumulated.
struct OpenBlock<'a> {
    family: FenceFamily,
    line: usize,
    content: Vec<&'a str>,
}

/// Scan `markdown` for blocks fenced with `language`.
///
/// Input is split on `\n` only, so a trailing newline survives as a final
/// empty line and `\r` stays part of its line. A block still open at end of
/// input is finalized as if it had been closed, and a warning is recorded.
#[must_use]
pub fn scan<'a>(markdown: &'a str, language: &str) -> ScanOutput<'a> {
    let mut pieces = Vec::new();
    let mut blocks = Vec::new();
    let mut warnings = Vec::new();
    let mut open: Option<OpenBlock<'a>> = None;

    let mut finish = |block: OpenBlock<'a>, terminated: bool, pieces: &mut Vec<Piece<'a>>| {
        pieces.push(Piece::Block(blocks.len()));
        blocks.push(DiagramBlock {
            family: block.family,
            source: block.content.join("\n"),
            line: block.line,
            terminated,
        });
    };

    for (idx, line) in markdown.split('\n').enumerate() {
        let trimmed = line.trim();

        let closes = open
            .as_ref()
            .is_some_and(|block| trimmed == block.family.marker());
        if closes {
            if let Some(block) = open.take() {
                finish(block, true, &mut pieces);
            }
            continue;
        }

        if let Some(block) = open.as_mut() {
            block.content.push(line);
            continue;
        }

        if let Some(family) = FenceFamily::opening(trimmed, language) {
            open = Some(OpenBlock {
                family,
                line: idx + 1,
                content: Vec::new(),
            });
        } else {
            pieces.push(Piece::Line(line));
        }
    }

    if let Some(block) = open.take() {
        warnings.push(format!(
            "line {}: unterminated {}{language} block closed at end of input",
            block.line,
            block.family.marker()
        ));
        finish(block, false, &mut pieces);
    }

    ScanOutput {
        pieces,
        blocks,
        warnings,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    /// Assemble with `[i]` in place of each block.
    fn slots(output: &ScanOutput<'_>) -> String {
        output.assemble(|i| format!("[{i}]"))
    }

    #[test]
    fn test_backtick_block() {
        let output = scan("before\n```plantuml\nA->B: hi\n```\nafter", "plantuml");

        assert_eq!(slots(&output), "before\n[0]\nafter");
        assert_eq!(
            output.blocks,
            vec![DiagramBlock {
                family: FenceFamily::Backtick,
                source: "A->B: hi".to_owned(),
                line: 2,
                terminated: true,
            }]
        );
        assert!(output.warnings.is_empty());
    }

    #[test]
    fn test_tilde_block() {
        let output = scan("~~~plantuml\n@startuml\nA -> B\n@enduml\n~~~", "plantuml");

        assert_eq!(slots(&output), "[0]");
        assert_eq!(output.blocks[0].family, FenceFamily::Tilde);
        assert_eq!(output.blocks[0].source, "@startuml\nA -> B\n@enduml");
    }

    #[test]
    fn test_mixed_families_in_order() {
        let markdown = "```plantuml\nfirst\n```\ntext\n~~~plantuml\nsecond\n~~~\n```plantuml\nthird\n```";
        let output = scan(markdown, "plantuml");

        assert_eq!(slots(&output), "[0]\ntext\n[1]\n[2]");
        let sources: Vec<_> = output.blocks.iter().map(|b| b.source.as_str()).collect();
        assert_eq!(sources, vec!["first", "second", "third"]);
    }

    #[test]
    fn test_fence_lines_trimmed() {
        let output = scan("  ```plantuml  \nA\n\t```\t", "plantuml");

        assert_eq!(slots(&output), "[0]");
        assert_eq!(output.blocks[0].source, "A");
    }

    #[test]
    fn test_content_lines_not_altered() {
        let output = scan("```plantuml\n  indented\r\n\ttab\n\n```", "plantuml");

        assert_eq!(output.blocks[0].source, "  indented\r\n\ttab\n");
    }

    #[test]
    fn test_other_languages_pass_through() {
        let markdown = "```rust\nfn main() {}\n```\n```PlantUML\nA\n```\n``` plantuml\nB\n```";
        let output = scan(markdown, "plantuml");

        assert_eq!(slots(&output), markdown);
        assert!(output.blocks.is_empty());
    }

    #[test]
    fn test_fence_with_trailing_content_not_opening() {
        let markdown = "```plantuml {format=png}\nA\n```";
        let output = scan(markdown, "plantuml");

        assert!(output.blocks.is_empty());
        assert_eq!(slots(&output), markdown);
    }

    #[test]
    fn test_other_family_close_is_content() {
        let output = scan("```plantuml\nA\n~~~\nB\n```", "plantuml");

        assert_eq!(output.blocks.len(), 1);
        assert_eq!(output.blocks[0].source, "A\n~~~\nB");
    }

    #[test]
    fn test_nested_opening_is_content() {
        let output = scan("~~~plantuml\n```plantuml\nA\n~~~", "plantuml");

        assert_eq!(output.blocks.len(), 1);
        assert_eq!(output.blocks[0].source, "```plantuml\nA");
    }

    #[test]
    fn test_unterminated_block_finalized() {
        let output = scan("intro\n```plantuml\nA -> B\nB -> C", "plantuml");

        assert_eq!(slots(&output), "intro\n[0]");
        assert_eq!(output.blocks[0].source, "A -> B\nB -> C");
        assert!(!output.blocks[0].terminated);
        assert_eq!(output.warnings.len(), 1);
        assert!(output.warnings[0].contains("line 2"));
        assert!(output.warnings[0].contains("unterminated"));
    }

    #[test]
    fn test_bare_closing_fence_outside_passes_through() {
        let markdown = "```\ncode\n```";
        let output = scan(markdown, "plantuml");

        assert_eq!(slots(&output), markdown);
    }

    #[test]
    fn test_trailing_newline_preserved() {
        let output = scan("```plantuml\nA\n```\n", "plantuml");

        assert_eq!(slots(&output), "[0]\n");
    }

    #[test]
    fn test_empty_block() {
        let output = scan("```plantuml\n```", "plantuml");

        assert_eq!(output.blocks[0].source, "");
        assert_eq!(slots(&output), "[0]");
    }

    #[test]
    fn test_custom_language() {
        let output = scan("```puml\nA\n```\n```plantuml\nB\n```", "puml");

        assert_eq!(output.blocks.len(), 1);
        assert_eq!(output.blocks[0].source, "A");
        assert_eq!(slots(&output), "[0]\n```plantuml\nB\n```");
    }
}
