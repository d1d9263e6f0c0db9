//! Heuristic content extraction from raw HTML.
//!
//! Extraction is a pure function of the input document: it never fails and
//! degrades through three levels when no content container qualifies
//! (priority selectors, then the largest text-bearing block, then the whole
//! body). Junk elements are skipped during the DOM walk rather than removed,
//! since `scraper` documents are immutable.

use std::collections::HashSet;
use std::sync::LazyLock;

use ego_tree::NodeRef;
use scraper::node::Node;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, trace};
use url::Url;

use super::rules;
use super::{Heading, Language, ParsedContent, UNTITLED_PAGE};

static CONTENT_SELECTORS: LazyLock<Vec<Selector>> = LazyLock::new(|| {
    rules::CONTENT_SELECTORS
        .iter()
        .map(|s| Selector::parse(s).expect("content selector is valid"))
        .collect()
});

static FALLBACK_BLOCKS: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div, section, article").expect("valid selector"));
static BODY: LazyLock<Selector> = LazyLock::new(|| Selector::parse("body").expect("valid selector"));
static HEADINGS: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("h1, h2, h3, h4, h5, h6").expect("valid selector"));
static H1: LazyLock<Selector> = LazyLock::new(|| Selector::parse("h1").expect("valid selector"));
static TITLE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("title").expect("valid selector"));
static PARAGRAPH: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("p").expect("valid selector"));
static ANCHOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a[href]").expect("valid selector"));

/// Elements that force a paragraph break in collected text
const BLOCK_TAGS: &[&str] = &[
    "p", "div", "section", "article", "blockquote", "pre", "ul", "ol", "li", "table", "tr", "h1",
    "h2", "h3", "h4", "h5", "h6",
];

/// Parse raw HTML into structured content.
///
/// Always returns a best-effort result; malformed markup degrades to less
/// specific extraction rather than erroring. The output depends only on the
/// inputs (see the determinism test below).
pub fn parse(html: &str, url: &str) -> ParsedContent {
    let document = Html::parse_document(html);

    let title = extract_title(&document);
    let description = extract_description(&document);
    let (main_content, low_confidence) = extract_main_content(&document);
    let headings = extract_headings(&document);
    let paragraphs = extract_paragraphs(&document);
    let links = extract_links(&document, url);

    let word_count = main_content.split_whitespace().count();
    let read_time_minutes = word_count.div_ceil(225) as u32;
    let unique_word_ratio = unique_word_ratio(&main_content);
    let has_boilerplate = paragraphs.iter().any(|p| rules::is_boilerplate(p));
    let language = guess_language(&main_content);

    debug!(
        url,
        word_count,
        headings = headings.len(),
        paragraphs = paragraphs.len(),
        links = links.len(),
        "extracted content"
    );

    ParsedContent {
        url: url.to_string(),
        title,
        description,
        main_content,
        headings,
        paragraphs,
        links,
        word_count,
        read_time_minutes,
        unique_word_ratio,
        has_boilerplate,
        language,
        low_confidence,
    }
}

/// Returns true when an element should be skipped entirely
fn is_junk_element(el: &scraper::node::Element) -> bool {
    if rules::JUNK_TAGS.contains(&el.name()) {
        return true;
    }
    if el.attr("class").is_some_and(rules::is_junk_class_or_id) {
        return true;
    }
    if el.attr("id").is_some_and(rules::is_junk_class_or_id) {
        return true;
    }
    if let Some(style) = el.attr("style") {
        let style: String = style
            .to_ascii_lowercase()
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect();
        if style.contains("display:none") || style.contains("visibility:hidden") {
            return true;
        }
    }
    el.attr("aria-hidden") == Some("true")
}

fn has_junk_ancestor(el: ElementRef) -> bool {
    el.ancestors()
        .filter_map(|node| node.value().as_element())
        .any(is_junk_element)
}

fn collect_visible_text(node: NodeRef<'_, Node>, out: &mut String) {
    for child in node.children() {
        match child.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(el) => {
                if is_junk_element(el) {
                    continue;
                }
                if el.name() == "br" {
                    out.push('\n');
                    continue;
                }
                let block = BLOCK_TAGS.contains(&el.name());
                if block {
                    out.push_str("\n\n");
                }
                collect_visible_text(child, out);
                if block {
                    out.push_str("\n\n");
                }
            }
            _ => {}
        }
    }
}

/// Junk-stripped, whitespace-normalized text of an element's subtree
fn visible_text(el: ElementRef) -> String {
    let mut raw = String::new();
    collect_visible_text(*el, &mut raw);
    normalize_text(&raw)
}

/// Normalize whitespace and strip zero-width characters.
///
/// Horizontal whitespace runs collapse to a single space; runs of two or
/// more newlines collapse to a blank-line paragraph break; single newlines
/// become spaces.
pub fn normalize_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut newlines = 0usize;
    let mut pending_space = false;

    for c in text.chars() {
        if rules::ZERO_WIDTH_CHARS.contains(&c) {
            continue;
        }
        if c == '\n' {
            newlines += 1;
            continue;
        }
        if c.is_whitespace() {
            pending_space = true;
            continue;
        }
        if !out.is_empty() {
            if newlines >= 2 {
                out.push_str("\n\n");
            } else if newlines == 1 || pending_space {
                out.push(' ');
            }
        }
        newlines = 0;
        pending_space = false;
        out.push(c);
    }
    out
}

/// Extract the main content with graded fallbacks.
///
/// Returns the text and a low-confidence flag set when only a very short
/// body was found (likely a client-rendered page that needs a
/// browser-capable fetch).
fn extract_main_content(document: &Html) -> (String, bool) {
    // Level 1: ordered priority selectors
    for selector in CONTENT_SELECTORS.iter() {
        for candidate in document.select(selector) {
            if has_junk_ancestor(candidate) {
                continue;
            }
            let text = visible_text(candidate);
            if text.chars().count() > rules::MAIN_CONTENT_MIN_CHARS {
                return (text, false);
            }
        }
    }

    // Level 2: largest text-bearing block
    let largest = document
        .select(&FALLBACK_BLOCKS)
        .filter(|el| !has_junk_ancestor(*el))
        .map(visible_text)
        .max_by_key(|text| text.chars().count());
    if let Some(text) = largest
        && text.chars().count() > rules::FALLBACK_BLOCK_MIN_CHARS
    {
        return (text, false);
    }

    // Level 3: whole body
    let body = document
        .select(&BODY)
        .next()
        .map(visible_text)
        .unwrap_or_default();
    let low_confidence = body.chars().count() < rules::LOW_CONFIDENCE_CHARS;
    if low_confidence {
        trace!("short body text, page may be client-rendered");
    }
    (body, low_confidence)
}

fn meta_content(document: &Html, selector: &str) -> Option<String> {
    let selector = Selector::parse(selector).ok()?;
    document
        .select(&selector)
        .next()
        .and_then(|el| el.value().attr("content"))
        .map(|s| normalize_text(s))
        .filter(|s| !s.is_empty())
}

/// Title via ordered fallback: h1, Open Graph, Twitter card, `<title>`,
/// title meta; `"Untitled Page"` when none qualify.
fn extract_title(document: &Html) -> String {
    let h1 = document
        .select(&H1)
        .filter(|el| !has_junk_ancestor(*el))
        .map(|el| normalize_text(&el.text().collect::<String>()))
        .find(|t| !t.is_empty());

    let candidates = [
        h1,
        meta_content(document, "meta[property=\"og:title\"]"),
        meta_content(document, "meta[name=\"twitter:title\"]"),
        document
            .select(&TITLE)
            .next()
            .map(|el| normalize_text(&el.text().collect::<String>())),
        meta_content(document, "meta[name=\"title\"]"),
    ];

    candidates
        .into_iter()
        .flatten()
        .find(|t| !t.is_empty() && t.chars().count() < rules::MAX_TITLE_CHARS)
        .unwrap_or_else(|| UNTITLED_PAGE.to_string())
}

fn extract_description(document: &Html) -> Option<String> {
    meta_content(document, "meta[name=\"description\"]")
        .or_else(|| meta_content(document, "meta[property=\"og:description\"]"))
}

fn extract_headings(document: &Html) -> Vec<Heading> {
    document
        .select(&HEADINGS)
        .filter(|el| !has_junk_ancestor(*el))
        .filter_map(|el| {
            let level: u8 = el.value().name().trim_start_matches('h').parse().ok()?;
            let text = normalize_text(&el.text().collect::<String>());
            if text.is_empty()
                || text.chars().count() >= rules::MAX_TITLE_CHARS
                || rules::is_boilerplate(&text)
            {
                return None;
            }
            Some(Heading { level, text })
        })
        .collect()
}

/// Returns true when text reads like real prose rather than link chrome
fn looks_like_content(text: &str) -> bool {
    if !text.contains(['.', '!', '?']) {
        return false;
    }
    if text.split_whitespace().count() < 10 {
        return false;
    }

    let letters = text.chars().filter(|c| c.is_alphabetic()).count();
    let capitals = text.chars().filter(|c| c.is_uppercase()).count();
    if letters > 0 && capitals * 2 > letters {
        return false;
    }

    let lower = text.to_lowercase();
    let nav_hits = lower
        .split(|c: char| !c.is_alphanumeric())
        .filter(|word| rules::NAV_KEYWORDS.contains(word))
        .count();
    nav_hits < 3
}

fn extract_paragraphs(document: &Html) -> Vec<String> {
    let mut seen_prefixes: HashSet<String> = HashSet::new();
    let mut paragraphs = Vec::new();

    for el in document.select(&PARAGRAPH) {
        if has_junk_ancestor(el) {
            continue;
        }
        let text = visible_text(el);
        let len = text.chars().count();
        if len < rules::PARAGRAPH_MIN_CHARS || len >= rules::PARAGRAPH_MAX_CHARS {
            continue;
        }
        if !looks_like_content(&text) || rules::is_boilerplate(&text) {
            continue;
        }

        // Near-duplicate check on a normalized 100-char prefix
        let prefix: String = text.to_lowercase().chars().take(100).collect();
        if !seen_prefixes.insert(prefix) {
            continue;
        }
        paragraphs.push(text);
    }
    paragraphs
}

/// Absolute, fragment-stripped http(s) links from the document
fn extract_links(document: &Html, base_url: &str) -> Vec<String> {
    let Ok(base) = Url::parse(base_url) else {
        return Vec::new();
    };

    let mut seen: HashSet<String> = HashSet::new();
    let mut links = Vec::new();
    for el in document.select(&ANCHOR) {
        let Some(href) = el.value().attr("href") else {
            continue;
        };
        let Ok(mut resolved) = base.join(href) else {
            continue;
        };
        resolved.set_fragment(None);
        if !matches!(resolved.scheme(), "http" | "https") {
            continue;
        }
        let url = resolved.to_string();
        if seen.insert(url.clone()) {
            links.push(url);
        }
    }
    links
}

fn unique_word_ratio(text: &str) -> f64 {
    let tokens: Vec<String> = text
        .split_whitespace()
        .map(|w| {
            w.trim_matches(|c: char| !c.is_alphanumeric())
                .to_lowercase()
        })
        .filter(|w| !w.is_empty())
        .collect();
    if tokens.is_empty() {
        return 0.0;
    }
    let unique: HashSet<&str> = tokens.iter().map(String::as_str).collect();
    unique.len() as f64 / tokens.len() as f64
}

/// English if at least 4 of the 7 stopwords appear in the first 1000 chars
fn guess_language(text: &str) -> Language {
    let sample: String = text.chars().take(1000).collect::<String>().to_lowercase();
    let words: HashSet<&str> = sample
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect();
    let hits = rules::ENGLISH_STOPWORDS
        .iter()
        .filter(|w| words.contains(**w))
        .count();
    if hits >= 4 {
        Language::English
    } else {
        Language::Unknown
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ARTICLE_HTML: &str = r#"<!DOCTYPE html>
<html><head>
  <title>Sample Article | Example</title>
  <meta name="description" content="A sample article about crawling.">
</head><body>
  <header><h1>Site Banner</h1><nav><a href="/home">Home</a></nav></header>
  <article>
    <h1>Understanding Web Crawlers</h1>
    <p>Web crawlers traverse the link graph of a website in order to discover
    pages. They are typically implemented with a frontier queue and a set of
    visited addresses to avoid fetching the same page twice.</p>
    <p>Politeness matters when crawling. A crawler that issues requests too
    quickly can overwhelm a small server, so a fixed delay between requests
    is the usual approach for single-host crawls.</p>
    <div class="newsletter-signup"><p>Subscribe to our newsletter for weekly
    updates about everything we publish on this site, delivered to you.</p></div>
  </article>
  <footer><p>© 2024 Example Corp. All rights reserved.</p></footer>
  <script>console.log("hidden");</script>
</body></html>"#;

    #[test]
    fn test_parse_extracts_article_content() {
        let content = parse(ARTICLE_HTML, "https://example.com/crawlers");

        assert_eq!(content.title, "Understanding Web Crawlers");
        assert_eq!(
            content.description.as_deref(),
            Some("A sample article about crawling.")
        );
        assert!(content.main_content.contains("frontier queue"));
        // Junk subtrees are skipped
        assert!(!content.main_content.contains("console.log"));
        assert!(!content.main_content.contains("Subscribe to our newsletter"));
        assert!(!content.main_content.contains("Site Banner"));
        assert_eq!(content.language, Language::English);
        assert!(!content.low_confidence);
    }

    #[test]
    fn test_parse_is_deterministic() {
        let a = parse(ARTICLE_HTML, "https://example.com/crawlers");
        let b = parse(ARTICLE_HTML, "https://example.com/crawlers");
        assert_eq!(a, b);
    }

    #[test]
    fn test_parse_degrades_to_body_text() {
        let html = "<html><body>Tiny page.</body></html>";
        let content = parse(html, "https://example.com/");

        assert_eq!(content.title, UNTITLED_PAGE);
        assert_eq!(content.main_content, "Tiny page.");
        assert!(content.low_confidence);
    }

    #[test]
    fn test_parse_empty_and_malformed_input() {
        let content = parse("", "https://example.com/");
        assert_eq!(content.main_content, "");
        assert_eq!(content.title, UNTITLED_PAGE);

        // Unclosed tags still produce a best-effort result
        let content = parse("<div><p>Broken <b>markup", "https://example.com/");
        assert!(content.main_content.contains("Broken markup"));
    }

    #[test]
    fn test_title_fallback_chain() {
        let html = r#"<html><head>
            <meta property="og:title" content="OG Title">
            <title>Doc Title</title>
        </head><body></body></html>"#;
        // No h1, so Open Graph wins over <title>
        assert_eq!(parse(html, "https://example.com/").title, "OG Title");

        let html = "<html><head><title>Doc Title</title></head><body></body></html>";
        assert_eq!(parse(html, "https://example.com/").title, "Doc Title");

        let overlong = format!(
            "<html><body><h1>{}</h1><title>Short</title></body></html>",
            "x".repeat(250)
        );
        // Overlong h1 is skipped in favor of the next candidate
        let parsed = parse(&overlong, "https://example.com/");
        assert_ne!(parsed.title.chars().count(), 250);
    }

    #[test]
    fn test_hidden_elements_are_skipped() {
        let html = r#"<html><body><article>
            <p>Visible paragraph text that is long enough to survive filtering,
            with a sentence ending and plenty of ordinary words in it. More text
            here keeps the candidate above the two hundred character threshold
            required for the first level of extraction to accept it as real.</p>
            <p style="display: none">Hidden inline paragraph.</p>
            <p aria-hidden="true">Hidden aria paragraph.</p>
        </article></body></html>"#;
        let content = parse(html, "https://example.com/");
        assert!(content.main_content.contains("Visible paragraph"));
        assert!(!content.main_content.contains("Hidden inline"));
        assert!(!content.main_content.contains("Hidden aria"));
    }

    #[test]
    fn test_links_resolved_and_fragment_stripped() {
        let html = r#"<html><body>
            <a href="/about">About</a>
            <a href="https://example.com/blog#section">Blog</a>
            <a href="mailto:someone@example.com">Mail</a>
            <a href="/about">About again</a>
        </body></html>"#;
        let content = parse(html, "https://example.com/");
        assert_eq!(
            content.links,
            vec![
                "https://example.com/about".to_string(),
                "https://example.com/blog".to_string(),
            ]
        );
    }

    #[test]
    fn test_paragraph_filtering() {
        let html = r#"<html><body><article>
            <p>Short one.</p>
            <p>Home About Contact Menu Login Terms Privacy and more links here
            to make this paragraph long enough to pass the length check.</p>
            <p>This paragraph is real content with enough words to pass every
            heuristic check, including sentence punctuation and casing.</p>
            <p>This paragraph is real content with enough words to pass every
            heuristic check, including sentence punctuation and casing, and it
            keeps going so only its tail differs from the one above.</p>
        </article></body></html>"#;
        let content = parse(html, "https://example.com/");
        // Short, nav-heavy, and prefix-duplicate paragraphs are dropped
        assert_eq!(content.paragraphs.len(), 1);
        assert!(content.paragraphs[0].starts_with("This paragraph is real"));
    }

    #[test]
    fn test_normalize_text() {
        assert_eq!(normalize_text("a  b\tc"), "a b c");
        assert_eq!(normalize_text("a\nb"), "a b");
        assert_eq!(normalize_text("a\n\n\n\nb"), "a\n\nb");
        assert_eq!(normalize_text("  a\u{200B}b  "), "ab");
        assert_eq!(normalize_text("\n\nleading break"), "leading break");
    }

    #[test]
    fn test_read_time_and_word_stats() {
        let words = vec!["word"; 450].join(" ");
        let html = format!("<html><body><article><p>{words}.</p></article></body></html>");
        let content = parse(&html, "https://example.com/");
        assert_eq!(content.word_count, 450);
        assert_eq!(content.read_time_minutes, 2);
        // A single repeated token is maximally repetitive
        assert!(content.unique_word_ratio < 0.3);
    }
}
