//! Additive quality scoring for extracted content.
//!
//! The score is the sole admission gate used by the crawler: pages below the
//! configured minimum are counted and skipped, never treated as errors.

use super::{ParsedContent, UNTITLED_PAGE};

/// Compute a 0-100 quality score for extracted content.
///
/// Additive rubric: title presence, word count tiers, heading and paragraph
/// counts, an ideal-length bonus, with penalties for repetitive text and
/// detected boilerplate.
pub fn quality_score(content: &ParsedContent) -> u8 {
    let mut score: i32 = 0;

    if content.title != UNTITLED_PAGE {
        score += 20;
    }

    if content.word_count >= 50 {
        score += 15;
    }
    if content.word_count >= 200 {
        score += 15;
    }

    if !content.headings.is_empty() {
        score += 10;
    }
    if content.headings.len() >= 3 {
        score += 10;
    }

    if content.paragraphs.len() >= 3 {
        score += 10;
    }
    if content.paragraphs.len() >= 5 {
        score += 10;
    }

    if (200..=5000).contains(&content.word_count) {
        score += 5;
    }
    if (500..=3000).contains(&content.word_count) {
        score += 5;
    }

    if content.unique_word_ratio < 0.3 {
        score -= 10;
    }
    if content.has_boilerplate {
        score -= 5;
    }

    score.clamp(0, 100) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractor::{Heading, Language};

    fn content_with(
        title: &str,
        word_count: usize,
        headings: usize,
        paragraphs: usize,
        unique_word_ratio: f64,
        has_boilerplate: bool,
    ) -> ParsedContent {
        ParsedContent {
            url: "https://example.com/".to_string(),
            title: title.to_string(),
            description: None,
            main_content: String::new(),
            headings: (0..headings)
                .map(|i| Heading {
                    level: 2,
                    text: format!("Heading {i}"),
                })
                .collect(),
            paragraphs: (0..paragraphs).map(|i| format!("Paragraph {i}")).collect(),
            links: Vec::new(),
            word_count,
            read_time_minutes: 1,
            unique_word_ratio,
            has_boilerplate,
            language: Language::English,
            low_confidence: false,
        }
    }

    #[test]
    fn test_empty_page_scores_near_zero() {
        let content = content_with(UNTITLED_PAGE, 0, 0, 0, 0.0, false);
        // Only the repetition penalty applies, clamped at zero
        assert_eq!(quality_score(&content), 0);
    }

    #[test]
    fn test_rich_page_scores_full_marks() {
        let content = content_with("Good Article", 1000, 4, 6, 0.7, false);
        // 20 + 15 + 15 + 10 + 10 + 10 + 10 + 5 + 5
        assert_eq!(quality_score(&content), 100);
    }

    #[test]
    fn test_word_count_tiers() {
        let content = content_with("T", 50, 0, 0, 0.7, false);
        assert_eq!(quality_score(&content), 20 + 15);

        let content = content_with("T", 200, 0, 0, 0.7, false);
        // Both word tiers plus the in-range bonus
        assert_eq!(quality_score(&content), 20 + 15 + 15 + 5);

        let content = content_with("T", 6000, 0, 0, 0.7, false);
        // Out of ideal range: tier points only
        assert_eq!(quality_score(&content), 20 + 15 + 15);
    }

    #[test]
    fn test_penalties() {
        let base = quality_score(&content_with("T", 300, 1, 3, 0.7, false));
        let repetitive = quality_score(&content_with("T", 300, 1, 3, 0.2, false));
        let boilerplate = quality_score(&content_with("T", 300, 1, 3, 0.7, true));

        assert_eq!(base - repetitive, 10);
        assert_eq!(base - boilerplate, 5);
    }
}
