// src/model.rs
//! Data shapes read from the catalog and produced by the scorer.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One listing from the item catalog.
///
/// Only the columns the ranking flow reads are typed; every other column the
/// catalog returned (photo_url, city, created_at, ...) is kept in `extra` and
/// serialized back unchanged so callers receive the full row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateItem {
    pub id: String,
    pub title: String,
    pub category: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub estimated_value: Option<f64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CandidateItem {
    /// Minimal constructor, mostly for tests and fixtures.
    pub fn new(id: impl Into<String>, title: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            category: category.into(),
            description: None,
            price: None,
            estimated_value: None,
            extra: Map::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_price(mut self, price: f64) -> Self {
        self.price = Some(price);
        self
    }
}

/// A past "interest" record joined to the liked item's snapshot.
///
/// The record API returns the joined row under `items`; it is `null` when the
/// item was deleted or is hidden from the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreferenceSignal {
    pub item_id: String,
    #[serde(rename = "items", default)]
    pub liked_item: Option<CandidateItem>,
}

impl PreferenceSignal {
    pub fn liked(item: CandidateItem) -> Self {
        Self {
            item_id: item.id.clone(),
            liked_item: Some(item),
        }
    }
}

/// One relevance score returned by the external scorer. Never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreEntry {
    pub id: String,
    pub score: f64,
    pub reason: Option<String>,
}

/// Which path produced a ranking. Diagnostic only: the fallback and cold-start
/// orderings are identical.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankingSource {
    Scored,
    ColdStart,
    Fallback,
}

impl RankingSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            RankingSource::Scored => "scored",
            RankingSource::ColdStart => "cold-start",
            RankingSource::Fallback => "fallback",
        }
    }
}

/// Ordered, size-bounded output of one ranking pass.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedResult {
    pub items: Vec<CandidateItem>,
    pub source: RankingSource,
}
