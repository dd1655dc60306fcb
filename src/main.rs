//! swap-recommender — Binary Entrypoint
//! Boots the Axum HTTP server with the recommendation endpoint.

use anyhow::Context;
use shuttle_axum::ShuttleAxum;

use swap_recommender::{api, bootstrap, config::AppConfig, telemetry};

const ENV_SCORER_PROBE: &str = "SCORER_PROBE";

#[shuttle_runtime::main]
async fn axum() -> ShuttleAxum {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();

    telemetry::init_tracing();

    let cfg = AppConfig::from_env().context("resolving configuration")?;
    let state = bootstrap::build_state(&cfg).context("building service")?;

    if std::env::var(ENV_SCORER_PROBE).is_ok_and(|v| v == "1") {
        bootstrap::quick_probe(state.service.ranker().scorer()).await;
    }

    Ok(api::router(state).into())
}
