// src/tokenize.rs
//! Word tokenizer shared by retrieval and scoring.
//!
//! A token is a maximal run of Unicode letters, numbers or apostrophes, lowercased.
//! Everything else (punctuation, symbols, whitespace) separates tokens.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

static WORD_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\p{L}\p{N}']+").expect("word tokenizer regex"));

/// Lowercase `input` and return its word tokens in order (duplicates kept).
pub fn tokenize(input: &str) -> Vec<String> {
    let lowered = input.to_lowercase();
    WORD_RE
        .find_iter(&lowered)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Distinct tokens of `input`.
pub fn token_set(input: &str) -> HashSet<String> {
    tokenize(input).into_iter().collect()
}

/// Split a stored comma-joined tag string into trimmed, non-empty labels.
pub fn split_tags(raw: Option<&str>) -> Vec<&str> {
    raw.unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokenizer_basic() {
        let t = tokenize("I failed my test, again!");
        assert_eq!(t, vec!["i", "failed", "my", "test", "again"]);
    }

    #[test]
    fn keeps_apostrophes_and_numbers() {
        let t = tokenize("Don't quit in 2024...");
        assert_eq!(t, vec!["don't", "quit", "in", "2024"]);
    }

    #[test]
    fn empty_and_whitespace_yield_nothing() {
        assert!(tokenize("").is_empty());
        assert!(tokenize("   \t\n ").is_empty());
        assert!(tokenize("?!… —").is_empty());
    }

    #[test]
    fn unicode_letters_are_words() {
        let t = tokenize("Ztratil jsem PRÁCI; 失敗した");
        assert_eq!(t, vec!["ztratil", "jsem", "práci", "失敗した"]);
    }

    #[test]
    fn tags_are_trimmed_and_filtered() {
        assert_eq!(
            split_tags(Some(" failure, learning ,,resilience ")),
            vec!["failure", "learning", "resilience"]
        );
        assert!(split_tags(None).is_empty());
        assert!(split_tags(Some(" , ")).is_empty());
    }
}
