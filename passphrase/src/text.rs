//! Text normalization and similarity measures.
//!
//! All lengths and distances count Unicode scalar values, so Arabic and
//! Latin text are treated alike.

use once_cell::sync::Lazy;
use regex::Regex;

static PUNCT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[[:punct:]\p{P}]").expect("static punctuation pattern")
});

static SPACES: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("static whitespace pattern"));

/// Similarity above which two words count as the same word.
pub const WORD_MATCH_THRESHOLD: f64 = 0.8;
/// Weight of word similarity in [`text_similarity`]; characters get the rest.
pub const WORD_WEIGHT: f64 = 0.7;

/// Trims, lowercases, strips punctuation and collapses whitespace.
pub fn normalize(text: &str) -> String {
    let lower = text.trim().to_lowercase();
    let stripped = PUNCT.replace_all(&lower, "");
    SPACES.replace_all(&stripped, " ").trim().to_string()
}

/// Edit distance with unit insert, delete and substitute costs.
pub fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut cur = vec![0; b.len() + 1];
    for (i, ca) in a.iter().enumerate() {
        cur[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            cur[j + 1] = if ca == cb {
                prev[j]
            } else {
                1 + prev[j].min(prev[j + 1]).min(cur[j])
            };
        }
        std::mem::swap(&mut prev, &mut cur);
    }
    prev[b.len()]
}

/// `1 - distance / max_len`; 1 for two empty strings.
pub fn char_similarity(a: &str, b: &str) -> f64 {
    let max_len = a.chars().count().max(b.chars().count());
    if max_len == 0 {
        return 1.0;
    }
    1.0 - levenshtein(a, b) as f64 / max_len as f64
}

/// Greedy word matching.
///
/// Each recognized word consumes the first remaining expected word that is
/// equal or more than [`WORD_MATCH_THRESHOLD`] similar. The match count is
/// divided by the average word count.
pub fn word_similarity(recognized: &[&str], expected: &[&str]) -> f64 {
    if recognized.is_empty() && expected.is_empty() {
        return 1.0;
    }
    if recognized.is_empty() || expected.is_empty() {
        return 0.0;
    }

    let mut remaining: Vec<&str> = expected.to_vec();
    let mut matches = 0;
    for word in recognized {
        let found = remaining
            .iter()
            .position(|w| w == word || char_similarity(word, w) > WORD_MATCH_THRESHOLD);
        if let Some(i) = found {
            remaining.remove(i);
            matches += 1;
        }
    }

    let avg = (recognized.len() + expected.len()) as f64 / 2.0;
    matches as f64 / avg
}

/// Combined similarity of two normalized strings.
///
/// Identical strings score 1; otherwise `0.7 * word + 0.3 * char`.
pub fn text_similarity(a: &str, b: &str) -> f64 {
    if a == b {
        return 1.0;
    }
    let wa: Vec<&str> = a.split_whitespace().collect();
    let wb: Vec<&str> = b.split_whitespace().collect();
    WORD_WEIGHT * word_similarity(&wa, &wb) + (1.0 - WORD_WEIGHT) * char_similarity(a, b)
}
