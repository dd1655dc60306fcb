// src/bootstrap.rs
use std::sync::Arc;

use tracing::{info, warn};

use crate::api::AppState;
use crate::catalog::SupabaseBackend;
use crate::config::AppConfig;
use crate::metrics::Metrics;
use crate::model::{CandidateItem, PreferenceSignal};
use crate::prompt::build_prompt;
use crate::ranking::Ranker;
use crate::scorer::{build_scorer, DynScorer};
use crate::scores::parse_scores;
use crate::service::RecommendationService;

/// Wire the service graph from an already-resolved config.
pub fn build_state(cfg: &AppConfig) -> anyhow::Result<AppState> {
    // Safe diagnostics: never the key itself.
    info!(
        provider = %cfg.scorer.provider,
        enabled = cfg.scorer.enabled,
        model = %cfg.scorer.model,
        key_len = cfg.scorer.api_key.len(),
        candidate_limit = cfg.ranking.candidate_limit,
        result_limit = cfg.ranking.result_limit,
        "scorer config loaded"
    );

    let backend = Arc::new(SupabaseBackend::new(cfg.backend.clone())?);
    let scorer = build_scorer(&cfg.scorer)?;
    let ranker = Ranker::new(scorer, cfg.ranking);
    let service = RecommendationService::new(backend.clone(), backend, ranker);

    let mut state = AppState::new(service);
    if cfg.debug_routes {
        state = state.with_metrics(Metrics::init());
    }
    Ok(state)
}

/// One-off smoke test of the scorer with a tiny fixed prompt. Logs the outcome, never fails.
pub async fn quick_probe(scorer: &DynScorer) {
    let liked = CandidateItem::new("probe-liked", "Acoustic guitar", "Music")
        .with_description("Six-string, lightly used");
    let pool = vec![
        CandidateItem::new("probe-a", "Guitar strap", "Music").with_price(15.0),
        CandidateItem::new("probe-b", "Garden hose", "Garden").with_price(20.0),
    ];
    let prompt = build_prompt(&[PreferenceSignal::liked(liked)], &pool);

    match scorer.complete(&prompt).await {
        Ok(reply) => match parse_scores(&reply) {
            Ok(scores) => info!(
                provider = scorer.provider_name(),
                scored = scores.len(),
                "scorer probe ok"
            ),
            Err(e) => warn!(provider = scorer.provider_name(), error = %e, "scorer probe: unusable reply"),
        },
        Err(e) => warn!(provider = scorer.provider_name(), error = %e, "scorer probe failed"),
    }
}
