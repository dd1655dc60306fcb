// src/config/mod.rs
//! Process-wide configuration, resolved once at startup and passed down explicitly.

pub mod ranking;
pub mod scorer;

use anyhow::{Context, Result};
use std::env;

pub use ranking::RankingLimits;
pub use scorer::ScorerConfig;

pub const ENV_SUPABASE_URL: &str = "SUPABASE_URL";
pub const ENV_SUPABASE_ANON_KEY: &str = "SUPABASE_ANON_KEY";
pub const ENV_DEBUG_ROUTES: &str = "DEBUG_ROUTES";

/// Where the managed backend lives and the public key its APIs expect.
#[derive(Debug, Clone)]
pub struct BackendConfig {
    pub base_url: String,
    pub anon_key: String,
}

impl BackendConfig {
    pub fn new(base_url: impl Into<String>, anon_key: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            anon_key: anon_key.into(),
        }
    }

    pub fn from_env() -> Result<Self> {
        let url = env::var(ENV_SUPABASE_URL).with_context(|| format!("{ENV_SUPABASE_URL} not set"))?;
        let key = env::var(ENV_SUPABASE_ANON_KEY)
            .with_context(|| format!("{ENV_SUPABASE_ANON_KEY} not set"))?;
        if url.trim().is_empty() {
            anyhow::bail!("{ENV_SUPABASE_URL} is empty");
        }
        Ok(Self::new(url.trim(), key.trim()))
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub backend: BackendConfig,
    pub scorer: ScorerConfig,
    pub ranking: RankingLimits,
    /// Mount `/metrics`.
    pub debug_routes: bool,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            backend: BackendConfig::from_env()?,
            scorer: ScorerConfig::load_default()?,
            ranking: RankingLimits::load_default()?,
            debug_routes: env_flag(ENV_DEBUG_ROUTES),
        })
    }
}

pub(crate) fn env_flag(name: &str) -> bool {
    matches!(
        env::var(name).unwrap_or_default().trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
