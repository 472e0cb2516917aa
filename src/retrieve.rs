// src/retrieve.rs
//! Candidate retrieval as an ordered chain of tiers.
//!
//! 1. `exact`: FTS5 match requiring every query term.
//! 2. `substring`: any term as a substring of text, tags or author.
//! 3. `default`: the most confident quotes, so the caller never gets an empty page.
//!
//! The first tier returning rows wins; later tiers are not queried.

use crate::error::StoreError;
use crate::model::QuoteRecord;
use crate::store::QuoteSource;
use crate::tokenize::tokenize;

/// Hard ceiling on candidates pulled per query.
pub const MAX_CANDIDATES: usize = 200;
/// The default tier never returns more than this.
pub const DEFAULT_TIER_CAP: usize = 20;

/// One retrieval strategy in the fallback chain.
pub trait RetrievalTier: Sync {
    fn name(&self) -> &'static str;

    fn fetch(
        &self,
        source: &dyn QuoteSource,
        terms: &[String],
        limit: usize,
    ) -> Result<Vec<QuoteRecord>, StoreError>;
}

pub struct ExactIndexTier;
pub struct SubstringTier;
pub struct DefaultTier;

impl RetrievalTier for ExactIndexTier {
    fn name(&self) -> &'static str {
        "exact"
    }

    fn fetch(
        &self,
        source: &dyn QuoteSource,
        terms: &[String],
        limit: usize,
    ) -> Result<Vec<QuoteRecord>, StoreError> {
        match fts_expression(terms) {
            Some(expr) => source.match_fts(&expr, limit),
            None => Ok(Vec::new()),
        }
    }
}

impl RetrievalTier for SubstringTier {
    fn name(&self) -> &'static str {
        "substring"
    }

    fn fetch(
        &self,
        source: &dyn QuoteSource,
        terms: &[String],
        limit: usize,
    ) -> Result<Vec<QuoteRecord>, StoreError> {
        if terms.is_empty() {
            return Ok(Vec::new());
        }
        source.match_any_substring(terms, limit)
    }
}

impl RetrievalTier for DefaultTier {
    fn name(&self) -> &'static str {
        "default"
    }

    fn fetch(
        &self,
        source: &dyn QuoteSource,
        _terms: &[String],
        limit: usize,
    ) -> Result<Vec<QuoteRecord>, StoreError> {
        source.most_confident(limit.min(DEFAULT_TIER_CAP))
    }
}

/// The chain, in the order tiers are tried.
pub static TIERS: [&dyn RetrievalTier; 3] = [&ExactIndexTier, &SubstringTier, &DefaultTier];

/// Rows plus the name of the tier that produced them.
#[derive(Debug, Clone, PartialEq)]
pub struct Retrieval {
    pub tier: &'static str,
    pub records: Vec<QuoteRecord>,
}

/// Quote each term and join with `AND`. `None` when there are no terms.
///
/// Tokens only contain letters, numbers and apostrophes, so double quotes cannot
/// appear inside a term.
pub fn fts_expression(terms: &[String]) -> Option<String> {
    if terms.is_empty() {
        return None;
    }
    Some(
        terms
            .iter()
            .map(|t| format!("\"{t}\""))
            .collect::<Vec<_>>()
            .join(" AND "),
    )
}

/// Run the tier chain for `query`, returning at most `limit` rows (clamped to
/// [`MAX_CANDIDATES`]).
pub fn retrieve(
    source: &dyn QuoteSource,
    query: &str,
    limit: usize,
) -> Result<Retrieval, StoreError> {
    let terms = tokenize(query);
    let limit = limit.min(MAX_CANDIDATES);

    for tier in TIERS.iter() {
        let records = tier.fetch(source, &terms, limit)?;
        if !records.is_empty() {
            return Ok(Retrieval {
                tier: tier.name(),
                records,
            });
        }
    }

    Ok(Retrieval {
        tier: "none",
        records: Vec::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    fn rec(id: &str) -> QuoteRecord {
        QuoteRecord {
            id: id.to_string(),
            text: format!("quote {id}"),
            author: None,
            source: None,
            year: None,
            tags: None,
            is_public_domain: 0,
            confidence: Some(2.0),
        }
    }

    /// Canned rows per tier; records every call.
    #[derive(Default)]
    struct Scripted {
        fts: Vec<QuoteRecord>,
        substring: Vec<QuoteRecord>,
        default: Vec<QuoteRecord>,
        calls: RefCell<Vec<String>>,
    }

    impl QuoteSource for Scripted {
        fn match_fts(&self, expr: &str, limit: usize) -> Result<Vec<QuoteRecord>, StoreError> {
            self.calls.borrow_mut().push(format!("fts:{expr}:{limit}"));
            Ok(self.fts.iter().take(limit).cloned().collect())
        }

        fn match_any_substring(
            &self,
            terms: &[String],
            limit: usize,
        ) -> Result<Vec<QuoteRecord>, StoreError> {
            self.calls
                .borrow_mut()
                .push(format!("like:{}:{limit}", terms.join("|")));
            Ok(self.substring.iter().take(limit).cloned().collect())
        }

        fn most_confident(&self, limit: usize) -> Result<Vec<QuoteRecord>, StoreError> {
            self.calls.borrow_mut().push(format!("default:{limit}"));
            Ok(self.default.iter().take(limit).cloned().collect())
        }
    }

    #[test]
    fn fts_expression_quotes_and_joins() {
        let terms = vec!["i".to_string(), "failed".to_string(), "don't".to_string()];
        assert_eq!(
            fts_expression(&terms).as_deref(),
            Some("\"i\" AND \"failed\" AND \"don't\"")
        );
        assert_eq!(fts_expression(&[]), None);
    }

    #[test]
    fn exact_hit_short_circuits() {
        let src = Scripted {
            fts: vec![rec("a")],
            substring: vec![rec("b")],
            default: vec![rec("c")],
            ..Default::default()
        };
        let r = retrieve(&src, "Lost my job!", 200).unwrap();
        assert_eq!(r.tier, "exact");
        assert_eq!(r.records, vec![rec("a")]);
        assert_eq!(
            *src.calls.borrow(),
            vec!["fts:\"lost\" AND \"my\" AND \"job\":200".to_string()]
        );
    }

    #[test]
    fn substring_runs_when_exact_is_empty() {
        let src = Scripted {
            substring: vec![rec("b")],
            default: vec![rec("c")],
            ..Default::default()
        };
        let r = retrieve(&src, "lost job", 50).unwrap();
        assert_eq!(r.tier, "substring");
        assert_eq!(src.calls.borrow().len(), 2);
        assert_eq!(src.calls.borrow()[1], "like:lost|job:50");
    }

    #[test]
    fn empty_query_goes_straight_to_default() {
        let src = Scripted {
            fts: vec![rec("a")],
            substring: vec![rec("b")],
            default: (0..30).map(|i| rec(&i.to_string())).collect(),
            ..Default::default()
        };
        for q in ["", "   ", "?!"] {
            src.calls.borrow_mut().clear();
            let r = retrieve(&src, q, 200).unwrap();
            assert_eq!(r.tier, "default");
            assert_eq!(r.records.len(), DEFAULT_TIER_CAP);
            assert_eq!(*src.calls.borrow(), vec!["default:20".to_string()]);
        }
    }

    #[test]
    fn default_cap_respects_smaller_limit() {
        let src = Scripted {
            default: (0..30).map(|i| rec(&i.to_string())).collect(),
            ..Default::default()
        };
        let r = retrieve(&src, "nothing matches", 7).unwrap();
        assert_eq!(r.tier, "default");
        assert_eq!(r.records.len(), 7);
    }

    #[test]
    fn limit_is_clamped_to_ceiling() {
        let src = Scripted {
            fts: (0..300).map(|i| rec(&i.to_string())).collect(),
            ..Default::default()
        };
        let r = retrieve(&src, "anything", 10_000).unwrap();
        assert_eq!(r.records.len(), MAX_CANDIDATES);
    }

    #[test]
    fn empty_store_yields_no_rows() {
        let src = Scripted::default();
        let r = retrieve(&src, "hello", 200).unwrap();
        assert!(r.records.is_empty());
        assert_eq!(r.tier, "none");
    }
}
