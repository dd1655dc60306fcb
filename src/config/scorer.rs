// src/config/scorer.rs
use serde::{Deserialize, Serialize};
use std::{env, fs, path::Path};

pub const DEFAULT_SCORER_CONFIG_PATH: &str = "config/scorer.json";
pub const ENV_SCORER_CONFIG_PATH: &str = "SCORER_CONFIG_PATH";
pub const ENV_SCORER_API_KEY: &str = "SCORER_API_KEY";

pub const DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}
fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}
fn default_temperature() -> f32 {
    0.2
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScorerConfig {
    pub enabled: bool,
    /// Only "openai" (any OpenAI-compatible chat completions endpoint) for now.
    pub provider: String,
    /// "ENV" means: read from SCORER_API_KEY
    pub api_key: String,
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

impl Default for ScorerConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            provider: "openai".to_string(),
            api_key: String::new(),
            endpoint: default_endpoint(),
            model: default_model(),
            temperature: default_temperature(),
        }
    }
}

impl ScorerConfig {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let data = fs::read_to_string(path)?;
        Self::from_json_str(&data)
    }

    /// $SCORER_CONFIG_PATH, then `config/scorer.json`. No file at all means a
    /// disabled scorer: every request gets the recency ordering.
    pub fn load_default() -> anyhow::Result<Self> {
        if let Ok(p) = env::var(ENV_SCORER_CONFIG_PATH) {
            return Self::load_from_file(&p)
                .map_err(|e| anyhow::anyhow!("loading scorer config from {p}: {e}"));
        }
        let p = Path::new(DEFAULT_SCORER_CONFIG_PATH);
        if p.exists() {
            return Self::load_from_file(p);
        }
        Ok(Self::default())
    }

    pub fn from_json_str(data: &str) -> anyhow::Result<Self> {
        let mut cfg: ScorerConfig = serde_json::from_str(data)?;

        cfg.provider = cfg.provider.trim().to_lowercase();
        if cfg.provider != "openai" {
            anyhow::bail!("Unsupported scorer provider in config: {}", cfg.provider);
        }

        // Resolve api key if "ENV"; a disabled scorer never needs one.
        if cfg.api_key.trim().eq_ignore_ascii_case("env") {
            cfg.api_key = match env::var(ENV_SCORER_API_KEY) {
                Ok(k) => k,
                Err(_) if !cfg.enabled => String::new(),
                Err(_) => anyhow::bail!("Missing {ENV_SCORER_API_KEY} env var"),
            };
        }

        if !(0.0..=2.0).contains(&cfg.temperature) {
            cfg.temperature = default_temperature();
        }
        if cfg.endpoint.trim().is_empty() {
            cfg.endpoint = default_endpoint();
        }

        Ok(cfg)
    }
}
