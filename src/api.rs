use axum::{
    extract::State,
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        HeaderMap, HeaderName, Method,
    },
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use tower_http::cors::{Any, CorsLayer};

use crate::error::ApiError;
use crate::metrics::Metrics;
use crate::service::RecommendationService;

pub const RANKING_SOURCE_HEADER: &str = "x-ranking-source";

#[derive(Clone)]
pub struct AppState {
    pub service: RecommendationService,
    /// When set, `/metrics` is mounted.
    pub metrics: Option<Metrics>,
}

impl AppState {
    pub fn new(service: RecommendationService) -> Self {
        Self {
            service,
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, metrics: Metrics) -> Self {
        self.metrics = Some(metrics);
        self
    }
}

/// Headers browsers may send on the cross-origin call from the web client.
fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            AUTHORIZATION,
            CONTENT_TYPE,
            HeaderName::from_static("x-client-info"),
            HeaderName::from_static("apikey"),
        ])
        .expose_headers([HeaderName::from_static(RANKING_SOURCE_HEADER)])
}

pub fn router(state: AppState) -> Router {
    let mut app = Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/items", get(recommend).post(recommend));

    if let Some(m) = &state.metrics {
        app = app.merge(m.router::<AppState>());
    }

    // CORS goes outermost so preflights and error responses carry the headers too.
    app.layer(cors_layer()).with_state(state)
}

/// Token from `Authorization: Bearer <token>`.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let raw = headers.get(AUTHORIZATION)?.to_str().ok()?.trim();
    let (scheme, token) = raw.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

async fn recommend(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    let ranked = state.service.recommend(bearer_token(&headers)).await?;
    Ok((
        [(RANKING_SOURCE_HEADER, ranked.source.as_str())],
        Json(ranked.items),
    ))
}
