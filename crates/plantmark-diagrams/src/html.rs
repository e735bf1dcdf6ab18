//! HTML fragment helpers.

/// Escape text placed inside an HTML element.
///
/// Only `&` and `<` are rewritten: that is enough to keep text from opening
/// tags or entities, and leaves diagram arrows like `A->B` readable in the
/// source markup.
#[must_use]
pub fn escape_text(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            _ => result.push(c),
        }
    }
    result
}

/// Wrap text in a paragraph, escaping it.
pub(crate) fn paragraph(text: &str) -> String {
    format!("<p>{}</p>", escape_text(text))
}

/// Wrap a rendered fragment in the styling container for `class`.
pub(crate) fn container(class: &str, fragment: &str) -> String {
    format!(r#"<div class="{class}">{fragment}</div>"#)
}
