// src/scorer.rs
//! Scorer adapter: provider abstraction over the external inference call.
//!
//! A scorer only returns the raw completion text. Turning that text into
//! scores is the job of [`crate::scores`], so every provider shares one parse.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::ScorerConfig;
use crate::scores::ScoreParseError;

pub const ENV_AI_TEST_MODE: &str = "AI_TEST_MODE";

/// System instruction + user prompt for one scoring pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoringPrompt {
    pub system: String,
    pub user: String,
}

#[derive(Debug, Error)]
pub enum ScoringError {
    #[error("scorer disabled")]
    Disabled,
    #[error("scorer request failed: {0}")]
    Transport(String),
    #[error("scorer returned status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("scorer reply had no content")]
    EmptyReply,
    #[error("scorer timed out after {0:?}")]
    Timeout(Duration),
    #[error("scorer reply unusable: {0}")]
    Parse(#[from] ScoreParseError),
}

impl ScoringError {
    /// Short label for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            ScoringError::Disabled => "disabled",
            ScoringError::Transport(_) => "transport",
            ScoringError::Status { .. } => "status",
            ScoringError::EmptyReply => "empty",
            ScoringError::Timeout(_) => "timeout",
            ScoringError::Parse(_) => "parse",
        }
    }
}

pub trait Scorer: Send + Sync {
    /// Run one completion and return the reply text.
    fn complete<'a>(
        &'a self,
        prompt: &'a ScoringPrompt,
    ) -> Pin<Box<dyn Future<Output = Result<String, ScoringError>> + Send + 'a>>;
    /// Provider name for diagnostics.
    fn provider_name(&self) -> &'static str;
}

pub type DynScorer = Arc<dyn Scorer>;

/// Factory: build a scorer according to config and environment variables.
///
/// * `AI_TEST_MODE=mock` gives a scorer that answers `[]` (every candidate scores 0).
/// * `AI_TEST_MODE=error` gives a scorer that always fails.
/// * Else a disabled config gives [`DisabledScorer`].
/// * Else the chat completions provider.
pub fn build_scorer(cfg: &ScorerConfig) -> anyhow::Result<DynScorer> {
    match std::env::var(ENV_AI_TEST_MODE).as_deref() {
        Ok("mock") => return Ok(Arc::new(MockScorer::new("[]"))),
        Ok("error") => return Ok(Arc::new(FailingScorer)),
        _ => {}
    }

    if !cfg.enabled {
        return Ok(Arc::new(DisabledScorer));
    }
    Ok(Arc::new(ChatCompletionsScorer::new(cfg)?))
}

// ------------------------------------------------------------
// Chat completions provider
// ------------------------------------------------------------

/// Any OpenAI-compatible `/v1/chat/completions` endpoint.
pub struct ChatCompletionsScorer {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
    model: String,
    temperature: f32,
}

impl ChatCompletionsScorer {
    pub fn new(cfg: &ScorerConfig) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("swap-recommender/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(Duration::from_secs(4))
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self {
            http,
            endpoint: cfg.endpoint.clone(),
            api_key: cfg.api_key.clone(),
            model: cfg.model.clone(),
            temperature: cfg.temperature,
        })
    }

    async fn complete_impl(&self, prompt: &ScoringPrompt) -> Result<String, ScoringError> {
        #[derive(Serialize)]
        struct Msg<'a> {
            role: &'a str,
            content: &'a str,
        }
        #[derive(Serialize)]
        struct Req<'a> {
            model: &'a str,
            messages: Vec<Msg<'a>>,
            temperature: f32,
        }
        #[derive(Deserialize)]
        struct Resp {
            #[serde(default)]
            choices: Vec<Choice>,
        }
        #[derive(Deserialize)]
        struct Choice {
            message: ChoiceMsg,
        }
        #[derive(Deserialize)]
        struct ChoiceMsg {
            #[serde(default)]
            content: Option<String>,
        }

        if self.api_key.is_empty() {
            return Err(ScoringError::Disabled);
        }

        let req = Req {
            model: &self.model,
            messages: vec![
                Msg {
                    role: "system",
                    content: &prompt.system,
                },
                Msg {
                    role: "user",
                    content: &prompt.user,
                },
            ],
            temperature: self.temperature,
        };

        let resp = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&req)
            .send()
            .await
            .map_err(|e| ScoringError::Transport(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ScoringError::Status {
                status: status.as_u16(),
                body: body.chars().take(200).collect(),
            });
        }

        let body: Resp = resp
            .json()
            .await
            .map_err(|e| ScoringError::Transport(e.to_string()))?;
        body.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|c| !c.trim().is_empty())
            .ok_or(ScoringError::EmptyReply)
    }
}

impl Scorer for ChatCompletionsScorer {
    fn complete<'a>(
        &'a self,
        prompt: &'a ScoringPrompt,
    ) -> Pin<Box<dyn Future<Output = Result<String, ScoringError>> + Send + 'a>> {
        Box::pin(self.complete_impl(prompt))
    }
    fn provider_name(&self) -> &'static str {
        "openai"
    }
}

// ------------------------------------------------------------
// Local scorers
// ------------------------------------------------------------

/// Always fails with [`ScoringError::Disabled`]; every request falls back.
pub struct DisabledScorer;

impl Scorer for DisabledScorer {
    fn complete<'a>(
        &'a self,
        _prompt: &'a ScoringPrompt,
    ) -> Pin<Box<dyn Future<Output = Result<String, ScoringError>> + Send + 'a>> {
        Box::pin(async { Err(ScoringError::Disabled) })
    }
    fn provider_name(&self) -> &'static str {
        "disabled"
    }
}

/// Answers every prompt with the same reply text.
#[derive(Clone)]
pub struct MockScorer {
    pub reply: String,
}

impl MockScorer {
    pub fn new(reply: impl Into<String>) -> Self {
        Self {
            reply: reply.into(),
        }
    }
}

impl Scorer for MockScorer {
    fn complete<'a>(
        &'a self,
        _prompt: &'a ScoringPrompt,
    ) -> Pin<Box<dyn Future<Output = Result<String, ScoringError>> + Send + 'a>> {
        let out = self.reply.clone();
        Box::pin(async move { Ok(out) })
    }
    fn provider_name(&self) -> &'static str {
        "mock"
    }
}

/// Simulates an unreachable scorer.
pub struct FailingScorer;

impl Scorer for FailingScorer {
    fn complete<'a>(
        &'a self,
        _prompt: &'a ScoringPrompt,
    ) -> Pin<Box<dyn Future<Output = Result<String, ScoringError>> + Send + 'a>> {
        Box::pin(async { Err(ScoringError::Transport("simulated failure".to_string())) })
    }
    fn provider_name(&self) -> &'static str {
        "error"
    }
}
