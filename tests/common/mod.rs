// tests/common/mod.rs
// In-process fakes for the service seams.
#![allow(dead_code)]

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use swap_recommender::catalog::{AuthError, CatalogError, CatalogStore, Caller, IdentityProvider};
use swap_recommender::config::RankingLimits;
use swap_recommender::scorer::{Scorer, ScoringError, ScoringPrompt};
use swap_recommender::{AppState, CandidateItem, PreferenceSignal, Ranker, RecommendationService};

pub const GOOD_TOKEN: &str = "good-token";
pub const USER_ID: &str = "user-1";

pub fn item(id: &str) -> CandidateItem {
    CandidateItem::new(id, format!("title {id}"), "Misc")
}

pub fn pool(n: usize) -> Vec<CandidateItem> {
    (0..n).map(|i| item(&format!("item-{i}"))).collect()
}

pub fn ids(items: &[CandidateItem]) -> Vec<String> {
    items.iter().map(|i| i.id.clone()).collect()
}

pub fn liked(n: usize) -> Vec<PreferenceSignal> {
    (0..n)
        .map(|i| {
            PreferenceSignal::liked(
                CandidateItem::new(format!("liked-{i}"), format!("liked {i}"), "Books")
                    .with_description("paperback"),
            )
        })
        .collect()
}

/// Accepts exactly one token.
pub struct StaticIdentity;

#[async_trait]
impl IdentityProvider for StaticIdentity {
    async fn authenticate(&self, token: &str) -> Result<Caller, AuthError> {
        if token == GOOD_TOKEN {
            Ok(Caller {
                user_id: USER_ID.to_string(),
                token: token.to_string(),
            })
        } else {
            Err(AuthError::Rejected(401))
        }
    }
}

#[derive(Default)]
pub struct StaticCatalog {
    pub candidates: Vec<CandidateItem>,
    pub history: Vec<PreferenceSignal>,
    pub fail_candidates: bool,
    pub fail_history: bool,
    pub requested_limits: std::sync::Mutex<Vec<(String, usize)>>,
}

#[async_trait]
impl CatalogStore for StaticCatalog {
    async fn active_candidates(
        &self,
        _caller: &Caller,
        limit: usize,
    ) -> Result<Vec<CandidateItem>, CatalogError> {
        self.requested_limits
            .lock()
            .unwrap()
            .push(("candidates".into(), limit));
        if self.fail_candidates {
            return Err(CatalogError::Status {
                status: 503,
                body: "catalog offline".into(),
            });
        }
        Ok(self.candidates.iter().take(limit).cloned().collect())
    }

    async fn liked_history(
        &self,
        _caller: &Caller,
        limit: usize,
    ) -> Result<Vec<PreferenceSignal>, CatalogError> {
        self.requested_limits
            .lock()
            .unwrap()
            .push(("history".into(), limit));
        if self.fail_history {
            return Err(CatalogError::Decode("interests: broken".into()));
        }
        Ok(self.history.iter().take(limit).cloned().collect())
    }
}

/// What a [`CountingScorer`] answers with.
#[derive(Clone)]
pub enum Reply {
    Text(String),
    Fail,
    Hang,
}

/// Scorer fake that records how often it was called.
pub struct CountingScorer {
    pub reply: Reply,
    pub calls: AtomicUsize,
    pub last_prompt: std::sync::Mutex<Option<ScoringPrompt>>,
}

impl CountingScorer {
    pub fn new(reply: Reply) -> Arc<Self> {
        Arc::new(Self {
            reply,
            calls: AtomicUsize::new(0),
            last_prompt: std::sync::Mutex::new(None),
        })
    }

    pub fn text(s: impl Into<String>) -> Arc<Self> {
        Self::new(Reply::Text(s.into()))
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Scorer for CountingScorer {
    fn complete<'a>(
        &'a self,
        prompt: &'a ScoringPrompt,
    ) -> Pin<Box<dyn Future<Output = Result<String, ScoringError>> + Send + 'a>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_prompt.lock().unwrap() = Some(prompt.clone());
        let reply = self.reply.clone();
        Box::pin(async move {
            match reply {
                Reply::Text(s) => Ok(s),
                Reply::Fail => Err(ScoringError::Transport("connection refused".into())),
                Reply::Hang => {
                    tokio::time::sleep(Duration::from_secs(30)).await;
                    Ok("[]".into())
                }
            }
        })
    }
    fn provider_name(&self) -> &'static str {
        "counting"
    }
}

pub fn fast_limits() -> RankingLimits {
    RankingLimits {
        scoring_timeout: Duration::from_millis(100),
        ..RankingLimits::default()
    }
}

pub fn ranker(scorer: Arc<CountingScorer>) -> Ranker {
    Ranker::new(scorer, fast_limits())
}

pub fn state(catalog: StaticCatalog, scorer: Arc<CountingScorer>) -> AppState {
    let service = RecommendationService::new(
        Arc::new(StaticIdentity),
        Arc::new(catalog),
        ranker(scorer),
    );
    AppState::new(service)
}

/// Scores as a JSON array reply, e.g. `[("a", 9.0)]`.
pub fn reply_for(scores: &[(&str, f64)]) -> String {
    let arr: Vec<serde_json::Value> = scores
        .iter()
        .map(|(id, s)| serde_json::json!({"id": id, "score": s, "reason": "test"}))
        .collect();
    serde_json::Value::Array(arr).to_string()
}

pub fn score_map(scores: &[(&str, f64)]) -> HashMap<String, f64> {
    scores.iter().map(|(id, s)| (id.to_string(), *s)).collect()
}
