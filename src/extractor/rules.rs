//! # Extraction Rule Tables
//!
//! Data-driven rules for content extraction: junk-element taxonomy, the
//! ordered main-content selector list, boilerplate patterns, and the keyword
//! lists used by the paragraph and language heuristics. Keeping these as
//! plain tables lets them be tuned and tested independently of the DOM
//! traversal in `content.rs`.

use std::sync::LazyLock;

use regex::Regex;

/// Elements that never contribute readable content
pub const JUNK_TAGS: &[&str] = &[
    "script", "style", "nav", "footer", "header", "aside", "iframe", "noscript",
];

/// Ordered priority list of selectors likely to hold the main article body.
/// The first candidate whose visible text exceeds
/// [`MAIN_CONTENT_MIN_CHARS`] wins.
pub const CONTENT_SELECTORS: &[&str] = &[
    "article",
    "[role=\"main\"]",
    "main",
    ".post-content",
    ".entry-content",
    ".article-content",
    ".article-body",
    ".post-body",
    ".content-body",
    "#content",
    ".content",
];

/// Minimum visible text length for a priority-selector candidate
pub const MAIN_CONTENT_MIN_CHARS: usize = 200;

/// Minimum visible text length for the largest-block fallback
pub const FALLBACK_BLOCK_MIN_CHARS: usize = 100;

/// Body text below this length flags the page as likely client-rendered
pub const LOW_CONFIDENCE_CHARS: usize = 100;

/// Titles and headings at or above this length are discarded
pub const MAX_TITLE_CHARS: usize = 200;

/// Paragraph length bounds, in characters: kept when in `[MIN, MAX)`
pub const PARAGRAPH_MIN_CHARS: usize = 50;
pub const PARAGRAPH_MAX_CHARS: usize = 2000;

/// Navigation keywords; a paragraph with 3+ hits is treated as link chrome
pub const NAV_KEYWORDS: &[&str] = &[
    "home", "about", "contact", "menu", "login", "terms", "privacy",
];

/// Stopwords for the coarse language guess; 4+ hits in the first 1000
/// characters classifies the page as English
pub const ENGLISH_STOPWORDS: &[&str] = &["the", "and", "is", "of", "to", "in", "that"];

/// Class/id fragments that mark an element as junk (ads, banners, social
/// chrome, cookie notices). Matched on `-`/`_`/whitespace token boundaries so
/// "ad" does not fire on "header" or "readme".
pub static JUNK_CLASS_ID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(^|[-_\s])(ad|ads|advert|advertisement|banner|sponsor|sponsored|promo|popup|cookie|newsletter|subscribe|social|share|comment|comments)([-_\s]|$)",
    )
    .expect("junk class/id pattern is valid")
});

/// Boilerplate text patterns: legal notices, consent banners, and calls to
/// action that are template text rather than page content
pub static BOILERPLATE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)^\s*(©|copyright\s+(©\s*)?\d{4}|all rights reserved)",
        r"(?i)(this (web)?site uses cookies|we use cookies|by (continuing|using).{0,40}(accept|agree))",
        r"(?i)(privacy policy|terms of (service|use)|cookie policy)\s*\.?\s*$",
        r"(?i)^\s*(subscribe( to)?( our)? newsletter|sign up (for|to)|join our mailing list)",
        r"(?i)^\s*(share (this|on)|follow us( on)?|read more|continue reading)",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("boilerplate pattern is valid"))
    .collect()
});

/// Zero-width and BOM characters stripped during normalization
pub const ZERO_WIDTH_CHARS: &[char] = &['\u{200B}', '\u{200C}', '\u{200D}', '\u{FEFF}'];

/// Returns true when a class or id attribute value marks junk chrome
pub fn is_junk_class_or_id(value: &str) -> bool {
    JUNK_CLASS_ID.is_match(value)
}

/// Returns true when text matches any boilerplate pattern
pub fn is_boilerplate(text: &str) -> bool {
    BOILERPLATE_PATTERNS.iter().any(|re| re.is_match(text))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_junk_class_matches_token_boundaries() {
        assert!(is_junk_class_or_id("ad"));
        assert!(is_junk_class_or_id("sidebar-ad"));
        assert!(is_junk_class_or_id("cookie_banner"));
        assert!(is_junk_class_or_id("social share"));
        assert!(is_junk_class_or_id("promo-box"));

        // Substrings inside larger words must not fire
        assert!(!is_junk_class_or_id("header"));
        assert!(!is_junk_class_or_id("readme"));
        assert!(!is_junk_class_or_id("gradient"));
        assert!(!is_junk_class_or_id("article-body"));
    }

    #[test]
    fn test_boilerplate_patterns() {
        assert!(is_boilerplate("© 2024 Example Corp. All rights reserved."));
        assert!(is_boilerplate("Copyright 2023 Example Inc"));
        assert!(is_boilerplate("This website uses cookies to improve your experience."));
        assert!(is_boilerplate("Subscribe to our newsletter for updates"));
        assert!(is_boilerplate("Share this article on social media"));

        assert!(!is_boilerplate(
            "The committee published its annual report in March."
        ));
    }
}
