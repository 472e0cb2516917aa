// src/scoring.rs
//! Heuristic relevance score for one candidate against the query.
//!
//! score = overlap + hint bonus + 0.2 * confidence
//!
//! - `overlap`: distinct query tokens that also occur in text + author + tags.
//! - hint bonus: +1.5 for every hint entry whose prefix starts some query token while the
//!   candidate carries one of the entry's tags. Entries stack; there is no cap.
//! - a missing confidence counts as 0.

use std::collections::HashSet;

use crate::model::{Candidate, QuoteRecord};
use crate::tokenize::{split_tags, token_set};

pub const HINT_BONUS: f64 = 1.5;
pub const CONFIDENCE_WEIGHT: f64 = 0.2;

/// Query-token prefix → tags that usually help with it.
pub const KEYWORD_HINTS: &[(&str, &[&str])] = &[
    ("fail", &["failure", "learning", "resilience"]),
    ("mess", &["forgiveness", "learning", "humility", "resilience"]),
    ("sad", &["grief", "healing", "hope"]),
    ("anxious", &["courage", "calm", "focus"]),
    ("stress", &["calm", "focus", "discipline"]),
];

/// Score `item` for the raw `query` text.
pub fn score(query: &str, item: &QuoteRecord) -> f64 {
    let q_words = token_set(query);
    score_with_tokens(&q_words, item)
}

fn score_with_tokens(q_words: &HashSet<String>, item: &QuoteRecord) -> f64 {
    let haystack = format!(
        "{} {} {}",
        item.text,
        item.author.as_deref().unwrap_or_default(),
        item.tags.as_deref().unwrap_or_default()
    );
    let i_words = token_set(&haystack);
    let overlap = q_words.intersection(&i_words).count() as f64;

    let tags = split_tags(item.tags.as_deref());
    let mut bonus = 0.0;
    for (prefix, hinted) in KEYWORD_HINTS {
        let asked = q_words.iter().any(|w| w.starts_with(prefix));
        if asked && tags.iter().any(|t| hinted.contains(t)) {
            bonus += HINT_BONUS;
        }
    }

    let conf = item.confidence.unwrap_or(0.0);
    overlap + bonus + conf * CONFIDENCE_WEIGHT
}

/// Score every record and stable-sort by score, highest first.
pub fn score_and_sort(query: &str, records: Vec<QuoteRecord>) -> Vec<Candidate> {
    let q_words = token_set(query);
    let mut scored: Vec<Candidate> = records
        .into_iter()
        .map(|r| {
            let s = score_with_tokens(&q_words, &r);
            Candidate::with_score(r, s)
        })
        .collect();
    scored.sort_by(|a, b| b.score.total_cmp(&a.score));
    scored
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(id: &str, text: &str, author: Option<&str>, tags: &str, conf: Option<f64>) -> QuoteRecord {
        QuoteRecord {
            id: id.into(),
            text: text.into(),
            author: author.map(Into::into),
            source: None,
            year: None,
            tags: Some(tags.into()),
            is_public_domain: 0,
            confidence: conf,
        }
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn overlap_counts_distinct_words_once() {
        let r = rec("a", "test test test", None, "", None);
        assert!(approx(score("test test my test", &r), 1.0));
    }

    #[test]
    fn overlap_includes_author_and_tags() {
        let r = rec("a", "Keep going.", Some("Seneca"), "grit", None);
        assert!(approx(score("seneca grit", &r), 2.0));
    }

    #[test]
    fn hint_prefix_adds_bonus_when_tags_intersect() {
        let hinted = rec("a", "Begin again.", None, "failure, hope", None);
        let plain = rec("b", "Begin again.", None, "patience", None);
        // "failed" starts with "fail"; no word overlap with either text.
        assert!(approx(score("I failed", &hinted), 1.5));
        assert!(approx(score("I failed", &plain), 0.0));
    }

    #[test]
    fn hint_entries_stack() {
        // "resilience" is in both the fail and mess entries.
        let r = rec("a", "Rise.", None, "resilience", None);
        assert!(approx(score("failed and messed up", &r), 3.0));
    }

    #[test]
    fn tag_matching_is_exact_after_trim() {
        let r = rec("a", "Rise.", None, " failures ", None);
        assert!(approx(score("failing", &r), 0.0));
    }

    #[test]
    fn confidence_term_is_weighted() {
        let with = rec("a", "x", None, "", Some(4.0));
        let without = rec("b", "x", None, "", None);
        assert!(approx(score("nothing", &with), 0.8));
        assert!(approx(score("nothing", &without), 0.0));
    }

    #[test]
    fn sort_is_descending_and_stable() {
        let records = vec![
            rec("low", "zzz", None, "", Some(1.0)),
            rec("tie1", "zzz", None, "", Some(2.0)),
            rec("high", "zzz", None, "", Some(5.0)),
            rec("tie2", "zzz", None, "", Some(2.0)),
        ];
        let ids: Vec<String> = score_and_sort("q", records)
            .into_iter()
            .map(|c| c.record.id)
            .collect();
        assert_eq!(ids, vec!["high", "tie1", "tie2", "low"]);
    }
}
