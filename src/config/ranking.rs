// src/config/ranking.rs
//! Size and latency bounds for one ranking pass (`config/ranking.toml`).

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_RANKING_CONFIG_PATH: &str = "config/ranking.toml";
pub const ENV_RANKING_CONFIG_PATH: &str = "RANKING_CONFIG_PATH";

pub const DEFAULT_CANDIDATE_LIMIT: usize = 50;
pub const DEFAULT_HISTORY_LIMIT: usize = 20;
pub const DEFAULT_RESULT_LIMIT: usize = 20;
pub const DEFAULT_SCORING_TIMEOUT_MS: u64 = 12_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RankingLimits {
    /// Candidates fetched and sent to the scorer.
    pub candidate_limit: usize,
    /// Most recent liked items used as preference context.
    pub history_limit: usize,
    /// Items returned to the caller.
    pub result_limit: usize,
    pub scoring_timeout: Duration,
}

impl Default for RankingLimits {
    fn default() -> Self {
        Self {
            candidate_limit: DEFAULT_CANDIDATE_LIMIT,
            history_limit: DEFAULT_HISTORY_LIMIT,
            result_limit: DEFAULT_RESULT_LIMIT,
            scoring_timeout: Duration::from_millis(DEFAULT_SCORING_TIMEOUT_MS),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct RankingRoot {
    #[serde(default)]
    ranking: RankingSection,
}

#[derive(Debug, Default, Deserialize)]
struct RankingSection {
    candidate_limit: Option<usize>,
    history_limit: Option<usize>,
    result_limit: Option<usize>,
    scoring_timeout_ms: Option<u64>,
}

impl RankingLimits {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let root: RankingRoot = toml::from_str(s)?;
        let sec = root.ranking;
        let d = Self::default();

        // Zero is never a usable bound; treat it like "unset".
        let nz = |v: Option<usize>, dflt: usize| v.filter(|&n| n > 0).unwrap_or(dflt);
        Ok(Self {
            candidate_limit: nz(sec.candidate_limit, d.candidate_limit),
            history_limit: nz(sec.history_limit, d.history_limit),
            result_limit: nz(sec.result_limit, d.result_limit),
            scoring_timeout: sec
                .scoring_timeout_ms
                .filter(|&ms| ms > 0)
                .map(Duration::from_millis)
                .unwrap_or(d.scoring_timeout),
        })
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading ranking config from {}", path.display()))?;
        Self::from_toml_str(&content)
    }

    /// $RANKING_CONFIG_PATH, then `config/ranking.toml`, then built-in defaults.
    pub fn load_default() -> Result<Self> {
        if let Ok(p) = std::env::var(ENV_RANKING_CONFIG_PATH) {
            return Self::load_from(&PathBuf::from(p));
        }
        let p = PathBuf::from(DEFAULT_RANKING_CONFIG_PATH);
        if p.exists() {
            return Self::load_from(&p);
        }
        Ok(Self::default())
    }
}
