// src/ranking.rs
//! Preference re-ranking: score the candidate pool against the caller's liked
//! items and keep the best `result_limit`.
//!
//! - No usable history: the pool comes back in its incoming (recency) order.
//! - Scoring failure of any kind (transport, status, timeout, unparseable
//!   reply): same recency order. Logged, never returned as an error.
//! - Scorer switched off: same recency order, without the failure log or count.
//! - Otherwise: stable sort by descending score. Ids the scorer skipped score
//!   0 and keep their relative order; ids the scorer invented are ignored.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::time::Instant;

use metrics::{counter, histogram};
use tracing::{debug, warn};

use crate::config::RankingLimits;
use crate::model::{CandidateItem, PreferenceSignal, RankedResult, RankingSource, ScoreEntry};
use crate::prompt::{build_prompt, liked_items};
use crate::scorer::{DynScorer, ScoringError};
use crate::scores::parse_scores;

/// Drop repeated ids, keeping the first occurrence.
pub fn dedup_by_id(pool: Vec<CandidateItem>) -> Vec<CandidateItem> {
    let mut seen = HashSet::with_capacity(pool.len());
    pool.into_iter()
        .filter(|it| seen.insert(it.id.clone()))
        .collect()
}

pub fn first_n(mut pool: Vec<CandidateItem>, n: usize) -> Vec<CandidateItem> {
    pool.truncate(n);
    pool
}

/// Stable-sort `pool` by descending score and keep the first `limit`.
pub fn apply_scores(
    pool: Vec<CandidateItem>,
    scores: &[ScoreEntry],
    limit: usize,
) -> Vec<CandidateItem> {
    // Later duplicates overwrite earlier ones.
    let by_id: HashMap<&str, f64> = scores.iter().map(|s| (s.id.as_str(), s.score)).collect();

    let mut keyed: Vec<(f64, CandidateItem)> = pool
        .into_iter()
        .map(|it| {
            let s = by_id.get(it.id.as_str()).copied().unwrap_or(0.0);
            (s, it)
        })
        .collect();

    // `sort_by` is stable: equal scores keep their incoming order.
    keyed.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(Ordering::Equal));

    keyed.into_iter().take(limit).map(|(_, it)| it).collect()
}

/// Scoring orchestration with a bounded external call.
#[derive(Clone)]
pub struct Ranker {
    scorer: DynScorer,
    limits: RankingLimits,
}

impl Ranker {
    pub fn new(scorer: DynScorer, limits: RankingLimits) -> Self {
        Self { scorer, limits }
    }

    pub fn limits(&self) -> &RankingLimits {
        &self.limits
    }

    pub fn scorer(&self) -> &DynScorer {
        &self.scorer
    }

    pub async fn rank(
        &self,
        pool: Vec<CandidateItem>,
        history: &[PreferenceSignal],
    ) -> RankedResult {
        let pool = dedup_by_id(first_n(pool, self.limits.candidate_limit));

        if liked_items(history).next().is_none() {
            debug!(candidates = pool.len(), "no liked items; skipping scorer");
            return RankedResult {
                items: first_n(pool, self.limits.result_limit),
                source: RankingSource::ColdStart,
            };
        }

        match self.score(&pool, history).await {
            Ok(scores) => {
                debug!(
                    candidates = pool.len(),
                    scored = scores.len(),
                    "scorer reply merged"
                );
                RankedResult {
                    items: apply_scores(pool, &scores, self.limits.result_limit),
                    source: RankingSource::Scored,
                }
            }
            Err(ScoringError::Disabled) => {
                debug!(provider = self.scorer.provider_name(), "scorer disabled; using recency order");
                RankedResult {
                    items: first_n(pool, self.limits.result_limit),
                    source: RankingSource::Fallback,
                }
            }
            Err(e) => {
                counter!("recommend_scoring_failures_total", "reason" => e.kind()).increment(1);
                warn!(
                    provider = self.scorer.provider_name(),
                    reason = e.kind(),
                    error = %e,
                    "scoring failed; using recency order"
                );
                RankedResult {
                    items: first_n(pool, self.limits.result_limit),
                    source: RankingSource::Fallback,
                }
            }
        }
    }

    async fn score(
        &self,
        pool: &[CandidateItem],
        history: &[PreferenceSignal],
    ) -> Result<Vec<ScoreEntry>, ScoringError> {
        let prompt = build_prompt(history, pool);
        let started = Instant::now();

        let timeout = self.limits.scoring_timeout;
        let reply = tokio::time::timeout(timeout, self.scorer.complete(&prompt)).await;
        histogram!("recommend_scoring_duration_ms").record(started.elapsed().as_secs_f64() * 1000.0);

        let reply = reply.map_err(|_| ScoringError::Timeout(timeout))??;
        Ok(parse_scores(&reply)?)
    }
}
