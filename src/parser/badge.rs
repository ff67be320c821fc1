use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use super::rules::{is_known_code, BADGE_DIR, BADGE_SUFFIX};

static IMG_SRC_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<img\b[^>]*?[\s"']src\s*=\s*["']([^"']+)["']"#).unwrap()
});

/// Outcome of looking at one image source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BadgeScan {
    /// Not a badge image at all.
    NotBadge,
    /// Looks like a badge path but no code can be cut out of it.
    Malformed,
    /// Uppercased code candidate, not yet checked against the whitelist.
    Code(String),
}

/// Image sources in document order.
pub fn image_sources(html: &str) -> impl Iterator<Item = &str> {
    IMG_SRC_RE
        .captures_iter(html)
        .filter_map(|c| c.get(1))
        .map(|m| m.as_str())
}

/// Cut the code out of `.../pasadores/<CODE>_..._pasador.png`.
pub fn scan_source(src: &str) -> BadgeScan {
    // ASCII lowering keeps byte offsets aligned with `src`.
    let lower = src.to_ascii_lowercase();
    let Some(dir_at) = lower.find(BADGE_DIR) else {
        return BadgeScan::NotBadge;
    };
    let after_dir = dir_at + BADGE_DIR.len();
    let Some(suffix_rel) = lower[after_dir..].find(BADGE_SUFFIX) else {
        return BadgeScan::NotBadge;
    };

    let segment = &src[after_dir..after_dir + suffix_rel];
    let filename = segment.rsplit('/').next().unwrap_or(segment);
    let code = filename.split('_').next().unwrap_or("").trim();
    if code.is_empty() || !code.chars().all(|c| c.is_ascii_alphanumeric()) {
        return BadgeScan::Malformed;
    }
    BadgeScan::Code(code.to_ascii_uppercase())
}

/// First whitelisted instruction code found in the body's badge images.
pub fn extract_code(html: &str) -> Option<String> {
    image_sources(html).find_map(|src| match scan_source(src) {
        BadgeScan::Code(code) if is_known_code(&code) => Some(code),
        BadgeScan::Code(code) => {
            debug!("Badge code {} not in whitelist ({})", code, src);
            None
        }
        BadgeScan::Malformed => {
            debug!("Skipping malformed badge path: {}", src);
            None
        }
        BadgeScan::NotBadge => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn img(src: &str) -> String {
        format!(r#"<img class="postimage" src="{}" alt="badge">"#, src)
    }

    #[test]
    fn known_code() {
        let html = img("https://foro.squadalpha.es/images/pasadores/CIAC_123_pasador.png");
        assert_eq!(extract_code(&html).as_deref(), Some("CIAC"));
    }

    #[test]
    fn unknown_code() {
        let html = img("https://foro.squadalpha.es/images/pasadores/ZZZZ_pasador.png");
        assert_eq!(extract_code(&html), None);
    }

    #[test]
    fn lowercase_filename_is_uppercased() {
        let html = img("/img/pasadores/jtac_v2_pasador.jpg");
        assert_eq!(extract_code(&html).as_deref(), Some("JTAC"));
    }

    #[test]
    fn skips_malformed_and_continues() {
        let html = format!(
            "{}<br>{}<br>{}",
            img("/img/pasadores/_pasador.png"),
            img("/img/pasadores/ZZZZ_pasador.png"),
            img("/img/pasadores/MED_pasador.png"),
        );
        assert_eq!(extract_code(&html).as_deref(), Some("MED"));
    }

    #[test]
    fn first_valid_in_document_order() {
        let html = format!(
            "{}{}",
            img("/img/pasadores/CQB_pasador.png"),
            img("/img/pasadores/CIAC_pasador.png")
        );
        assert_eq!(extract_code(&html).as_deref(), Some("CQB"));
    }

    #[test]
    fn needs_both_tokens() {
        assert_eq!(scan_source("/img/pasadores/CIAC.png"), BadgeScan::NotBadge);
        assert_eq!(scan_source("/img/CIAC_pasador.png"), BadgeScan::NotBadge);
        assert_eq!(scan_source("/img/pasadores/_pasador.png"), BadgeScan::Malformed);
    }

    #[test]
    fn filename_inside_nested_dir() {
        assert_eq!(
            scan_source("/img/pasadores/2024/eod_pasador.png"),
            BadgeScan::Code("EOD".into())
        );
    }

    #[test]
    fn no_images() {
        assert_eq!(extract_code("<b>nothing here</b>"), None);
        assert_eq!(extract_code(""), None);
    }

    #[test]
    fn data_src_is_not_the_source() {
        let html = r#"<img data-src="/lazy/pasadores/CIAC_pasador.png" src="/img/placeholder.gif">"#;
        assert_eq!(image_sources(html).collect::<Vec<_>>(), vec!["/img/placeholder.gif"]);
        assert_eq!(extract_code(html), None);
    }

    #[test]
    fn single_quoted_src() {
        let html = "<IMG alt='x' SRC='/i/pasadores/ART_pasador.gif'>";
        assert_eq!(extract_code(html).as_deref(), Some("ART"));
    }
}
