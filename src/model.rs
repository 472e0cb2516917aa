// src/model.rs
//! Records, per-query candidates and the response shape.

use serde::{Deserialize, Serialize};

/// A stored quote as read from the `quotes` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteRecord {
    pub id: String,
    pub text: String,
    pub author: Option<String>,
    pub source: Option<String>,
    pub year: Option<i64>,
    /// Comma-joined lowercase labels, e.g. `"failure,learning"`.
    pub tags: Option<String>,
    /// Stored as 0/1.
    pub is_public_domain: i64,
    pub confidence: Option<f64>,
}

impl QuoteRecord {
    pub fn is_public_domain(&self) -> bool {
        self.is_public_domain == 1
    }
}

/// A record plus the ranking fields derived for one query.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub record: QuoteRecord,
    pub score: f64,
    /// 1.0 when the record's tags match the requested tone, else 0.0.
    pub tone_boost: f64,
    pub div_score: f64,
}

impl Candidate {
    pub fn new(record: QuoteRecord) -> Self {
        Self {
            record,
            score: 0.0,
            tone_boost: 0.0,
            div_score: 0.0,
        }
    }

    pub fn with_score(record: QuoteRecord, score: f64) -> Self {
        Self {
            score,
            ..Self::new(record)
        }
    }
}

/// Requested emotional register. Unknown labels fall back to `Neutral`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    #[default]
    Neutral,
    Gentle,
    Tough,
    Humor,
}

impl Tone {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "gentle" => Tone::Gentle,
            "tough" => Tone::Tough,
            "humor" => Tone::Humor,
            _ => Tone::Neutral,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Tone::Neutral => "neutral",
            Tone::Gentle => "gentle",
            Tone::Tough => "tough",
            Tone::Humor => "humor",
        }
    }
}

/// An accepted search request.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchQuery {
    pub text: String,
    pub tone: Tone,
    pub public_domain_only: bool,
}

impl SearchQuery {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            tone: Tone::Neutral,
            public_domain_only: false,
        }
    }

    pub fn tone(mut self, tone: Tone) -> Self {
        self.tone = tone;
        self
    }

    pub fn public_domain_only(mut self, on: bool) -> Self {
        self.public_domain_only = on;
        self
    }
}

/// One item of the `/api/search` response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteResult {
    pub id: String,
    pub text: String,
    pub author: Option<String>,
    pub source: Option<String>,
    pub year: Option<i64>,
    pub tags: Option<String>,
    pub is_public_domain: bool,
    pub confidence: Option<f64>,
}

impl From<Candidate> for QuoteResult {
    fn from(c: Candidate) -> Self {
        let is_public_domain = c.record.is_public_domain();
        let r = c.record;
        Self {
            id: r.id,
            text: r.text,
            author: r.author,
            source: r.source,
            year: r.year,
            tags: r.tags,
            is_public_domain,
            confidence: r.confidence,
        }
    }
}
