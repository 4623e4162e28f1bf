//! Keyword Extraction
//!
//! One tokenizer shared by the indexer and by query parsing, so a word
//! indexed from `heatedSeats` is found again by the query "heated seats".

use once_cell::sync::Lazy;
use regex::Regex;

static CAMEL_BOUNDARY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([a-z0-9])([A-Z])").expect("valid camel-case pattern"));

static WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\w+").expect("valid word pattern"));

/// Tokens shorter than this are dropped
const MIN_KEYWORD_LEN: usize = 3;

/// Split text into lowercase search terms.
///
/// camelCase, snake_case and kebab-case boundaries become word breaks.
/// Tokens of two characters or fewer are dropped and duplicates collapse to
/// their first occurrence.
pub fn extract_keywords(text: &str) -> Vec<String> {
    let spaced = CAMEL_BOUNDARY.replace_all(text, "$1 $2");
    let spaced = spaced.replace(['_', '-'], " ").to_lowercase();

    let mut keywords: Vec<String> = Vec::new();
    for token in WORD.find_iter(&spaced) {
        let token = token.as_str();
        if token.chars().count() >= MIN_KEYWORD_LEN && !keywords.iter().any(|k| k == token) {
            keywords.push(token.to_string());
        }
    }
    keywords
}
