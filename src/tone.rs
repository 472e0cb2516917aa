// src/tone.rs
//! Tone re-ranking: candidates tagged with the requested tone move to the front.
//!
//! This is a stable partition, not a re-sort: inside the boosted and non-boosted groups
//! the incoming (score) order is kept. `Neutral` leaves the list untouched.

use crate::model::{Candidate, Tone};
use crate::tokenize::split_tags;

/// Tags that express each tone.
pub fn tone_tags(tone: Tone) -> &'static [&'static str] {
    match tone {
        Tone::Neutral => &[],
        Tone::Gentle => &["gentleness", "kindness", "support", "healing", "hope"],
        Tone::Tough => &["discipline", "grit", "stoicism", "duty", "perseverance"],
        Tone::Humor => &["humor", "wit"],
    }
}

pub fn apply_tone(mut items: Vec<Candidate>, tone: Tone) -> Vec<Candidate> {
    let wanted = tone_tags(tone);
    if wanted.is_empty() {
        return items;
    }

    for it in items.iter_mut() {
        let hit = split_tags(it.record.tags.as_deref())
            .iter()
            .any(|t| wanted.contains(t));
        it.tone_boost = if hit { 1.0 } else { 0.0 };
    }

    items.sort_by(|a, b| b.tone_boost.total_cmp(&a.tone_boost));
    items
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::QuoteRecord;

    fn cand(id: &str, tags: &str, score: f64) -> Candidate {
        Candidate::with_score(
            QuoteRecord {
                id: id.into(),
                text: format!("text {id}"),
                author: None,
                source: None,
                year: None,
                tags: Some(tags.into()),
                is_public_domain: 0,
                confidence: None,
            },
            score,
        )
    }

    fn ids(v: &[Candidate]) -> Vec<&str> {
        v.iter().map(|c| c.record.id.as_str()).collect()
    }

    #[test]
    fn neutral_returns_input_unchanged() {
        let input = vec![cand("a", "humor", 3.0), cand("b", "grit", 2.0), cand("c", "", 1.0)];
        let out = apply_tone(input.clone(), Tone::Neutral);
        assert_eq!(out, input);
    }

    #[test]
    fn gentle_partitions_and_keeps_relative_order() {
        let input = vec![
            cand("a", "grit", 5.0),
            cand("b", "hope, grief", 4.0),
            cand("c", "failure", 3.0),
            cand("d", "kindness", 2.0),
        ];
        let out = apply_tone(input, Tone::Gentle);
        assert_eq!(ids(&out), vec!["b", "d", "a", "c"]);
        assert_eq!(out[0].tone_boost, 1.0);
        assert_eq!(out[2].tone_boost, 0.0);
        // Scores are untouched.
        assert_eq!(out[0].score, 4.0);
    }

    #[test]
    fn never_filters() {
        let input = vec![cand("a", "", 1.0), cand("b", "wit", 0.5)];
        let out = apply_tone(input, Tone::Humor);
        assert_eq!(ids(&out), vec!["b", "a"]);
    }

    #[test]
    fn tough_matches_whole_tags_only() {
        let input = vec![cand("a", "gritty", 2.0), cand("b", "duty", 1.0)];
        let out = apply_tone(input, Tone::Tough);
        assert_eq!(ids(&out), vec!["b", "a"]);
        assert_eq!(out[1].tone_boost, 0.0);
    }
}
