// src/search.rs
//! End-to-end search: retrieve → public-domain filter → score → tone → diversify.

use metrics::{counter, histogram};
use std::time::Instant;
use tracing::info;

use crate::config::SearchConfig;
use crate::diversify::diversify;
use crate::error::StoreError;
use crate::model::{QuoteResult, SearchQuery};
use crate::retrieve::retrieve;
use crate::scoring::score_and_sort;
use crate::store::QuoteSource;
use crate::tone::apply_tone;

/// Short, non-reversible id for a query so logs never carry user text.
pub(crate) fn anon_hash(text: &str) -> String {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    let digest = hasher.finalize();
    let mut out = String::with_capacity(12);
    for b in digest.iter().take(6) {
        use std::fmt::Write as _;
        let _ = write!(&mut out, "{:02x}", b);
    }
    out
}

/// Run the whole pipeline for one query.
pub fn search(
    source: &dyn QuoteSource,
    query: &SearchQuery,
    cfg: SearchConfig,
) -> Result<Vec<QuoteResult>, StoreError> {
    let started = Instant::now();
    let cfg = cfg.sanitized();

    let retrieval = retrieve(source, &query.text, cfg.candidate_limit)?;
    let tier = retrieval.tier;
    let mut records = retrieval.records;
    let candidates = records.len();

    if query.public_domain_only {
        records.retain(|r| r.is_public_domain());
    }

    let scored = score_and_sort(&query.text, records);
    let toned = apply_tone(scored, query.tone);
    let picks = diversify(toned, cfg.result_limit);
    let results: Vec<QuoteResult> = picks.into_iter().map(QuoteResult::from).collect();

    let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;
    counter!("search_requests_total").increment(1);
    counter!("search_tier_total", "tier" => tier).increment(1);
    histogram!("search_duration_ms").record(elapsed_ms);

    info!(
        target: "search",
        id = %anon_hash(&query.text),
        tier,
        tone = query.tone.as_str(),
        public_domain_only = query.public_domain_only,
        candidates,
        returned = results.len(),
        elapsed_ms,
        "search served"
    );

    Ok(results)
}
