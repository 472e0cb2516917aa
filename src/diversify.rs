// src/diversify.rs
//! Final top-k selection with a penalty for repeated authors.
//!
//! Walk the list in its incoming order and count how often each author has been seen
//! so far; every candidate gets
//!
//!   div_score = score - 0.5 * prior_count(author) + tone_boost
//!
//! and then the whole list is stable-sorted by `div_score` once. Counts come from the
//! pre-sort order, not from what has already been picked, so this is not a greedy
//! re-count after each pick.
//!
//! Trimmed empty or missing authors share the `"Unknown"` bucket.

use std::collections::{HashMap, HashSet};

use crate::model::Candidate;

pub const AUTHOR_REPEAT_PENALTY: f64 = 0.5;
pub const UNKNOWN_AUTHOR: &str = "Unknown";

fn author_key(c: &Candidate) -> &str {
    match c.record.author.as_deref().map(str::trim) {
        Some(a) if !a.is_empty() => a,
        _ => UNKNOWN_AUTHOR,
    }
}

/// Return at most `k` candidates with distinct ids, favouring author variety.
pub fn diversify(mut items: Vec<Candidate>, k: usize) -> Vec<Candidate> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    for it in items.iter_mut() {
        let count = seen.entry(author_key(it).to_string()).or_insert(0);
        it.div_score = it.score - AUTHOR_REPEAT_PENALTY * (*count as f64) + it.tone_boost;
        *count += 1;
    }

    items.sort_by(|a, b| b.div_score.total_cmp(&a.div_score));

    let mut ids: HashSet<String> = HashSet::new();
    let mut out = Vec::with_capacity(k.min(items.len()));
    for it in items {
        if out.len() >= k {
            break;
        }
        if ids.insert(it.record.id.clone()) {
            out.push(it);
        }
    }
    out
}
