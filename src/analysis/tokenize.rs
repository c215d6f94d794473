//! Sentence and word segmentation
//!
//! Both splits start from the Unicode text segmentation rules (UAX #29).
//! Sentence boundaries are then corrected for English: a segment ending in a
//! known abbreviation ("Dr.", "e.g.") or a single initial ("J.") runs on into
//! the next one. Word tokens follow the treebank convention of counting
//! punctuation marks as tokens of their own; contractions such as "don't"
//! stay one token.

use unicode_segmentation::UnicodeSegmentation;

/// English abbreviations that end in a period without ending the sentence,
/// lowercased and without their final period
const ABBREVIATIONS: &[&str] = &[
    "mr", "mrs", "ms", "dr", "prof", "sr", "jr", "st", "mt", "ft", "gen", "gov", "sen", "rep",
    "rev", "capt", "lt", "col", "sgt", "hon", "vs", "e.g", "i.e", "a.m", "p.m", "cf", "approx",
    "dept", "fig", "vol", "jan", "feb", "mar", "apr", "jun", "jul", "aug", "sep", "sept", "oct",
    "nov", "dec", "u.s", "u.k",
];

/// Splits text into sentences, dropping whitespace-only segments
pub fn sentences(text: &str) -> impl Iterator<Item = &str> {
    let mut spans = Vec::new();
    let mut start: Option<usize> = None;

    for (offset, segment) in text.split_sentence_bound_indices() {
        let begin = *start.get_or_insert(offset);
        if ends_with_abbreviation(segment) {
            continue;
        }
        spans.push(&text[begin..offset + segment.len()]);
        start = None;
    }
    if let Some(begin) = start {
        spans.push(&text[begin..]);
    }

    spans
        .into_iter()
        .map(str::trim)
        .filter(|sentence| !sentence.is_empty())
}

/// Splits a sentence into word and punctuation tokens
pub fn words(sentence: &str) -> impl Iterator<Item = &str> {
    sentence
        .split_word_bounds()
        .filter(|token| !token.trim().is_empty())
}

/// Returns true if a segment's last token is an abbreviation or an initial
fn ends_with_abbreviation(segment: &str) -> bool {
    let Some(token) = segment.split_whitespace().last() else {
        return false;
    };
    let Some(stem) = token.strip_suffix('.') else {
        return false;
    };
    let stem = stem
        .trim_start_matches(|c: char| !c.is_alphanumeric())
        .to_lowercase();

    let mut chars = stem.chars();
    let initial = matches!((chars.next(), chars.next()), (Some(c), None) if c.is_alphabetic());

    initial || ABBREVIATIONS.contains(&stem.as_str())
}
