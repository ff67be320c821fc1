use scraper::Html;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Lowercase, then drop diacritics (NFD + remove combining marks).
/// Shared by the title heuristic and the roster keys.
pub fn normalize(s: &str) -> String {
    s.to_lowercase()
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect()
}

/// Text content of a markup fragment, tags removed and entities decoded.
/// Unbalanced tags left over from line splitting are tolerated.
pub fn plain_text(fragment: &str) -> String {
    Html::parse_fragment(fragment)
        .root_element()
        .text()
        .collect()
}

/// Plain text of a body: each text node trimmed, empty ones dropped,
/// joined with newlines.
pub fn full_text(html: &str) -> String {
    let fragment = Html::parse_fragment(html);
    fragment
        .root_element()
        .text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
