// src/service.rs
//! One recommendation request: authenticate, read pool + history, rank.

use std::sync::Arc;

use metrics::counter;
use tracing::{info, warn};

use crate::catalog::{CatalogStore, IdentityProvider};
use crate::error::ApiError;
use crate::model::RankedResult;
use crate::ranking::Ranker;
use crate::telemetry::anon_id;

#[derive(Clone)]
pub struct RecommendationService {
    identity: Arc<dyn IdentityProvider>,
    catalog: Arc<dyn CatalogStore>,
    ranker: Ranker,
}

impl RecommendationService {
    pub fn new(
        identity: Arc<dyn IdentityProvider>,
        catalog: Arc<dyn CatalogStore>,
        ranker: Ranker,
    ) -> Self {
        Self {
            identity,
            catalog,
            ranker,
        }
    }

    pub fn ranker(&self) -> &Ranker {
        &self.ranker
    }

    /// `bearer` is the raw token (without the `Bearer ` prefix), if any.
    pub async fn recommend(&self, bearer: Option<&str>) -> Result<RankedResult, ApiError> {
        let res = self.recommend_inner(bearer).await;
        let outcome = match &res {
            Ok(r) => r.source.as_str(),
            Err(ApiError::Unauthorized) => "unauthorized",
            Err(ApiError::Upstream(_)) => "upstream_error",
        };
        counter!("recommend_requests_total", "outcome" => outcome).increment(1);
        res
    }

    async fn recommend_inner(&self, bearer: Option<&str>) -> Result<RankedResult, ApiError> {
        let token = bearer.map(str::trim).filter(|t| !t.is_empty()).ok_or(ApiError::Unauthorized)?;

        let caller = self.identity.authenticate(token).await.map_err(|e| {
            warn!(error = %e, "authentication failed");
            ApiError::Unauthorized
        })?;
        let user = anon_id(&caller.user_id);

        let limits = *self.ranker.limits();
        let (pool, history) = tokio::join!(
            self.catalog.active_candidates(&caller, limits.candidate_limit),
            self.catalog.liked_history(&caller, limits.history_limit),
        );

        let pool = pool.map_err(|e| {
            warn!(%user, error = %e, "candidate read failed");
            e
        })?;
        // A broken history read only costs personalisation.
        let history = history.unwrap_or_else(|e| {
            warn!(%user, error = %e, "history read failed; ranking without preferences");
            Vec::new()
        });

        let ranked = self.ranker.rank(pool, &history).await;
        info!(
            %user,
            history = history.len(),
            returned = ranked.items.len(),
            source = ranked.source.as_str(),
            "recommendations served"
        );
        Ok(ranked)
    }
}
