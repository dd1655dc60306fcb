// src/catalog.rs
//! Reads against the managed backend: caller identity, the candidate pool, and
//! the caller's liked-item history.
//!
//! The backend exposes a PostgREST record API and a GoTrue-style auth API.
//! Every read is sent with the caller's own bearer token so row-level security
//! applies exactly as it would for the client app.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use thiserror::Error;

use crate::config::BackendConfig;
use crate::model::{CandidateItem, PreferenceSignal};

/// Columns of the liked item pulled through the `interests -> items` join.
pub const HISTORY_SELECT: &str = "item_id,items(id,title,category,description,price,estimated_value)";

const ERROR_BODY_MAX: usize = 200;

/// An authenticated caller. The token is kept to forward it on record reads.
#[derive(Clone, PartialEq, Eq)]
pub struct Caller {
    pub user_id: String,
    pub token: String,
}

impl fmt::Debug for Caller {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Caller")
            .field("user_id", &self.user_id)
            .field("token", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("missing bearer token")]
    MissingToken,
    #[error("token rejected by auth service (status {0})")]
    Rejected(u16),
    #[error("auth service unreachable: {0}")]
    Transport(String),
    #[error("unexpected auth payload: {0}")]
    Decode(String),
}

#[derive(Debug, Error)]
pub enum CatalogError {
    /// The wrapped error never carries the request URL, whose filters hold the user id.
    #[error("catalog request failed: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("catalog returned status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("catalog payload could not be decoded: {0}")]
    Decode(String),
}

impl CatalogError {
    fn transport(e: reqwest::Error) -> Self {
        CatalogError::Transport(e.without_url())
    }
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Resolve a bearer token to the user it belongs to.
    async fn authenticate(&self, token: &str) -> Result<Caller, AuthError>;
}

#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Active items not owned by the caller, newest first.
    async fn active_candidates(
        &self,
        caller: &Caller,
        limit: usize,
    ) -> Result<Vec<CandidateItem>, CatalogError>;

    /// The caller's most recent interest records joined to item snapshots.
    async fn liked_history(
        &self,
        caller: &Caller,
        limit: usize,
    ) -> Result<Vec<PreferenceSignal>, CatalogError>;
}

/// Record API + auth API client for a Supabase project.
pub struct SupabaseBackend {
    http: reqwest::Client,
    cfg: BackendConfig,
}

impl SupabaseBackend {
    pub fn new(cfg: BackendConfig) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("swap-recommender/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(Duration::from_secs(4))
            .timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self { http, cfg })
    }

    fn rest_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.cfg.base_url, table)
    }

    async fn select<T: DeserializeOwned>(
        &self,
        caller: &Caller,
        table: &str,
        query: &[(&str, String)],
    ) -> Result<Vec<T>, CatalogError> {
        let resp = self
            .http
            .get(self.rest_url(table))
            .header("apikey", &self.cfg.anon_key)
            .bearer_auth(&caller.token)
            .query(query)
            .send()
            .await
            .map_err(CatalogError::transport)?;

        let status = resp.status();
        let body = resp.text().await.map_err(CatalogError::transport)?;
        if !status.is_success() {
            return Err(CatalogError::Status {
                status: status.as_u16(),
                body: truncate(&body, ERROR_BODY_MAX),
            });
        }
        serde_json::from_str(&body).map_err(|e| CatalogError::Decode(format!("{table}: {e}")))
    }
}

#[async_trait]
impl IdentityProvider for SupabaseBackend {
    async fn authenticate(&self, token: &str) -> Result<Caller, AuthError> {
        #[derive(Deserialize)]
        struct AuthUser {
            id: String,
        }

        let token = token.trim();
        if token.is_empty() {
            return Err(AuthError::MissingToken);
        }

        let resp = self
            .http
            .get(format!("{}/auth/v1/user", self.cfg.base_url))
            .header("apikey", &self.cfg.anon_key)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| AuthError::Transport(e.without_url().to_string()))?;

        if !resp.status().is_success() {
            return Err(AuthError::Rejected(resp.status().as_u16()));
        }
        let user: AuthUser = resp
            .json()
            .await
            .map_err(|e| AuthError::Decode(e.to_string()))?;
        if user.id.is_empty() {
            return Err(AuthError::Decode("empty user id".to_string()));
        }

        Ok(Caller {
            user_id: user.id,
            token: token.to_string(),
        })
    }
}

#[async_trait]
impl CatalogStore for SupabaseBackend {
    async fn active_candidates(
        &self,
        caller: &Caller,
        limit: usize,
    ) -> Result<Vec<CandidateItem>, CatalogError> {
        let query = [
            ("select", "*".to_string()),
            ("status", "eq.active".to_string()),
            ("user_id", format!("neq.{}", caller.user_id)),
            ("order", "created_at.desc".to_string()),
            ("limit", limit.to_string()),
        ];
        self.select(caller, "items", &query).await
    }

    async fn liked_history(
        &self,
        caller: &Caller,
        limit: usize,
    ) -> Result<Vec<PreferenceSignal>, CatalogError> {
        let query = [
            ("select", HISTORY_SELECT.to_string()),
            ("user_id", format!("eq.{}", caller.user_id)),
            ("order", "created_at.desc".to_string()),
            ("limit", limit.to_string()),
        ];
        self.select(caller, "interests", &query).await
    }
}

fn truncate(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => format!("{}...", &s[..idx]),
        None => s.to_string(),
    }
}
