use std::sync::LazyLock;

use regex::Regex;

static BREAK_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)<br\b[^>]*>").unwrap());

/// Split raw body markup into logical lines at every `<br>` tag.
///
/// Works on the markup itself rather than a parsed tree, so the inline
/// `style` attributes carrying the color markers stay inside each segment.
/// Empty input yields a single empty segment.
pub fn segment(html: &str) -> Vec<&str> {
    BREAK_RE.split(html).collect()
}
