//! Placeholder table mapping tokens to rendered fragments.
//!
//! Extraction replaces every diagram block with an HTML comment such as
//! `<!-- PLANTUML_BLOCK_0 -->`. Markdown converters pass comments through
//! verbatim, so after conversion [`PlaceholderTable::restore`] swaps each
//! comment for the fragment stored under its token.

use crate::consts::PLACEHOLDER_PREFIX;

/// Closing part of a marker comment, after the token.
const MARKER_SUFFIX: &str = " -->";

/// Token to fragment mapping for one render pass.
///
/// Tokens are assigned sequentially from `PLANTUML_BLOCK_0` in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlaceholderTable {
    fragments: Vec<String>,
}

impl PlaceholderTable {
    /// Create an empty table.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            fragments: Vec::new(),
        }
    }

    /// Store a fragment under the next token and return the token.
    pub fn insert(&mut self, fragment: String) -> String {
        let token = token_for(self.fragments.len());
        self.fragments.push(fragment);
        token
    }

    /// Fragment stored under `token`.
    #[must_use]
    pub fn get(&self, token: &str) -> Option<&str> {
        let index = parse_token(token)?;
        self.fragments.get(index).map(String::as_str)
    }

    /// Number of stored fragments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    /// Whether the table holds no fragments.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    /// Iterate `(token, fragment)` pairs in token order.
    pub fn iter(&self) -> impl Iterator<Item = (String, &str)> {
        self.fragments
            .iter()
            .enumerate()
            .map(|(index, fragment)| (token_for(index), fragment.as_str()))
    }

    /// Remove all fragments and restart numbering at zero.
    pub fn clear(&mut self) {
        self.fragments.clear();
    }

    /// HTML comment marking where `token`'s fragment belongs.
    #[must_use]
    pub fn marker(token: &str) -> String {
        format!("<!-- {token}{MARKER_SUFFIX}")
    }

    /// Tokens whose marker does not occur in `html`.
    #[must_use]
    pub fn missing_markers(&self, html: &str) -> Vec<String> {
        self.iter()
            .map(|(token, _)| token)
            .filter(|token| !html.contains(&Self::marker(token)))
            .collect()
    }

    /// Replace the first marker of every token with its fragment.
    ///
    /// Scans `html` once, so markup inside an inserted fragment is never
    /// rescanned. Later duplicates of a marker, markers for unknown tokens,
    /// and tokens without a marker are left alone. The table is not modified.
    #[must_use]
    pub fn restore(&self, html: &str) -> String {
        if self.fragments.is_empty() {
            return html.to_owned();
        }

        let opener = format!("<!-- {PLACEHOLDER_PREFIX}_");
        let extra: usize = self.fragments.iter().map(String::len).sum();
        let mut result = String::with_capacity(html.len() + extra);
        let mut used = vec![false; self.fragments.len()];
        let mut remaining = html;

        while let Some(start) = remaining.find(&opener) {
            result.push_str(&remaining[..start]);
            let after_opener = &remaining[start + opener.len()..];

            let digits = after_opener.bytes().take_while(u8::is_ascii_digit).count();
            let index = after_opener[digits..]
                .starts_with(MARKER_SUFFIX)
                .then(|| parse_index(&after_opener[..digits]))
                .flatten()
                .filter(|&i| i < used.len() && !used[i]);

            if let Some(index) = index {
                used[index] = true;
                result.push_str(&self.fragments[index]);
                remaining = &after_opener[digits + MARKER_SUFFIX.len()..];
            } else {
                // Not one of ours, keep it verbatim
                result.push_str(&remaining[start..start + opener.len()]);
                remaining = after_opener;
            }
        }

        result.push_str(remaining);

        for (index, _) in used.iter().enumerate().filter(|(_, seen)| !**seen) {
            tracing::debug!(token = %token_for(index), "Placeholder marker not found, skipping");
        }

        result
    }
}

/// Token for the fragment at `index`.
fn token_for(index: usize) -> String {
    format!("{PLACEHOLDER_PREFIX}_{index}")
}

/// Index encoded in a token, if it is one of ours.
fn parse_token(token: &str) -> Option<usize> {
    parse_index(token.strip_prefix(PLACEHOLDER_PREFIX)?.strip_prefix('_')?)
}

/// Parse a token index exactly as [`token_for`] writes it.
///
/// Leading zeros and signs are rejected so `PLANTUML_BLOCK_01` never aliases
/// `PLANTUML_BLOCK_1`.
fn parse_index(digits: &str) -> Option<usize> {
    let canonical = !digits.is_empty()
        && digits.bytes().all(|b| b.is_ascii_digit())
        && (digits == "0" || !digits.starts_with('0'));
    canonical.then(|| digits.parse().ok()).flatten()
}
