// src/lib.rs
// Public library surface for the binary and integration tests.

pub mod api;
pub mod bootstrap;
pub mod catalog;
pub mod config;
pub mod error;
pub mod metrics;
pub mod model;
pub mod prompt;
pub mod ranking;
pub mod scorer;
pub mod scores;
pub mod service;
pub mod telemetry;

// ---- Re-exports for stable public API ----
pub use crate::api::{router, AppState};
pub use crate::model::{CandidateItem, PreferenceSignal, RankedResult, RankingSource, ScoreEntry};
pub use crate::ranking::Ranker;
pub use crate::service::RecommendationService;

use axum::Router;

/// Build the full router from the environment (`.env`, config files, env vars).
pub async fn app() -> anyhow::Result<Router> {
    let _ = dotenvy::dotenv();
    let cfg = config::AppConfig::from_env()?;
    let state = bootstrap::build_state(&cfg)?;
    Ok(router(state))
}
