//! # Text Chunking Module
//!
//! Splits page content into bounded, overlapping segments suitable for
//! embedding. The splitter works paragraph-first: paragraphs accumulate
//! into a chunk until the next one would overflow, at which point the chunk
//! is closed and the next one is seeded with an overlap tail for context
//! continuity. Oversized paragraphs fall back to sentence boundaries, and
//! oversized sentences to a raw character split that advances by
//! `chunk_size - chunk_overlap` per step, which bounds the iteration count
//! and guarantees forward progress.
//!
//! Chunk filtering (word count, boilerplate prefixes, sentence punctuation)
//! lives here too; the pipeline applies it after prefix deduplication and
//! before any embedding call is made.

use tracing::{debug, instrument};

use crate::extractor::rules;

use super::config::ChunkOptions;

/// Chunks with fewer words than this are dropped as low-value
pub const MIN_CHUNK_WORDS: usize = 20;

/// Split text into chunks of at most `chunk_size` characters.
///
/// Sizes are measured in characters, never bytes, so multi-byte input is
/// split safely. Assumes validated options (`chunk_overlap < chunk_size`).
#[instrument(skip(text), fields(len = text.len()))]
pub fn split_text(text: &str, options: &ChunkOptions) -> Vec<String> {
    let text = text.trim();
    if text.is_empty() {
        return Vec::new();
    }
    if text.chars().count() <= options.chunk_size {
        return vec![text.to_string()];
    }

    let mut chunks = Vec::new();
    let mut buffer = String::new();

    for paragraph in text.split("\n\n") {
        let paragraph = paragraph.trim();
        if paragraph.is_empty() {
            continue;
        }

        if paragraph.chars().count() > options.chunk_size {
            flush(&mut buffer, &mut chunks);
            split_oversized_paragraph(paragraph, options, &mut chunks, &mut buffer);
            continue;
        }

        if would_overflow(&buffer, paragraph, options.chunk_size, 2) {
            close_with_overlap(&mut buffer, &mut chunks, paragraph, options, 2);
        }
        append_piece(&mut buffer, paragraph, "\n\n");
    }

    flush(&mut buffer, &mut chunks);
    debug!(chunks = chunks.len(), "split text");
    chunks
}

/// Sentence-level fallback for a paragraph that alone exceeds the chunk size
fn split_oversized_paragraph(
    paragraph: &str,
    options: &ChunkOptions,
    chunks: &mut Vec<String>,
    buffer: &mut String,
) {
    for sentence in split_sentences(paragraph) {
        if sentence.chars().count() > options.chunk_size {
            flush(buffer, chunks);
            hard_split(&sentence, options, chunks);
            continue;
        }
        if would_overflow(buffer, &sentence, options.chunk_size, 1) {
            close_with_overlap(buffer, chunks, &sentence, options, 1);
        }
        append_piece(buffer, &sentence, " ");
    }
}

/// Raw character split for a sentence that alone exceeds the chunk size.
///
/// Advances by `chunk_size - chunk_overlap` per step; consecutive windows
/// share `chunk_overlap` characters. Produces `ceil(len / step)` chunks.
fn hard_split(sentence: &str, options: &ChunkOptions, chunks: &mut Vec<String>) {
    let chars: Vec<char> = sentence.chars().collect();
    let step = options.chunk_size - options.chunk_overlap;

    let mut start = 0;
    while start < chars.len() {
        let end = usize::min(start + options.chunk_size, chars.len());
        let piece: String = chars[start..end].iter().collect();
        let piece = piece.trim().to_string();
        if !piece.is_empty() {
            chunks.push(piece);
        }
        start += step;
    }
}

/// Split on sentence-ending punctuation, keeping the delimiter with its
/// sentence
fn split_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut current = String::new();
    for c in text.chars() {
        current.push(c);
        if matches!(c, '.' | '!' | '?') {
            let trimmed = current.trim();
            if !trimmed.is_empty() {
                sentences.push(trimmed.to_string());
            }
            current.clear();
        }
    }
    let trimmed = current.trim();
    if !trimmed.is_empty() {
        sentences.push(trimmed.to_string());
    }
    sentences
}

fn would_overflow(buffer: &str, next: &str, chunk_size: usize, sep_len: usize) -> bool {
    if buffer.is_empty() {
        return false;
    }
    buffer.chars().count() + next.chars().count() + sep_len > chunk_size
}

/// Close the current chunk and seed the next buffer with an overlap tail.
///
/// The tail is the last `chunk_overlap` characters' worth of whole words
/// from the closed chunk, trimmed from the front so the seed plus the
/// incoming piece still fits within `chunk_size`.
fn close_with_overlap(
    buffer: &mut String,
    chunks: &mut Vec<String>,
    incoming: &str,
    options: &ChunkOptions,
    sep_len: usize,
) {
    let closed = std::mem::take(buffer).trim().to_string();
    if closed.is_empty() {
        return;
    }

    let budget = options
        .chunk_size
        .saturating_sub(incoming.chars().count() + sep_len)
        .min(options.chunk_overlap);
    *buffer = overlap_tail(&closed, budget);
    chunks.push(closed);
}

/// Last whole words of `text` totalling at most `max_chars` characters
fn overlap_tail(text: &str, max_chars: usize) -> String {
    let mut words: Vec<&str> = Vec::new();
    let mut total = 0;
    for word in text.split_whitespace().rev() {
        let cost = word.chars().count() + usize::from(!words.is_empty());
        if total + cost > max_chars {
            break;
        }
        total += cost;
        words.push(word);
    }
    words.reverse();
    words.join(" ")
}

fn append_piece(buffer: &mut String, piece: &str, separator: &str) {
    if !buffer.is_empty() {
        buffer.push_str(separator);
    }
    buffer.push_str(piece);
}

fn flush(buffer: &mut String, chunks: &mut Vec<String>) {
    let closed = std::mem::take(buffer).trim().to_string();
    if !closed.is_empty() {
        chunks.push(closed);
    }
}

/// Returns true for chunks not worth embedding: too few words, boilerplate
/// text, or no sentence-ending punctuation
pub fn is_low_value(text: &str) -> bool {
    if text.split_whitespace().count() < MIN_CHUNK_WORDS {
        return true;
    }
    if !text.contains(['.', '!', '?']) {
        return true;
    }
    rules::is_boilerplate(text)
}
