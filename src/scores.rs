// src/scores.rs
//! Scorer reply parsing.
//!
//! Two stages, no partial recovery:
//! 1. extraction: body of the first ```` ```json ```` block, or of a bare fenced
//!    block that holds an array; else the span from the first `[` to the last
//!    `]`;
//! 2. structured parse of that span as a JSON array.
//!
//! Within a well-formed array the reading is lenient: elements without a string
//! `id` are skipped, extra fields are ignored, and a score that is not a finite
//! number (or a numeric string) counts as 0.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use thiserror::Error;

use crate::model::ScoreEntry;

static FENCED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)```([A-Za-z]*)\s*(.*?)\s*```").expect("fence regex"));

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScoreParseError {
    #[error("no JSON array in reply")]
    NoArray,
    #[error("invalid JSON array: {0}")]
    Malformed(String),
}

/// Stage 1: locate the JSON payload inside free-form reply text.
pub fn extract_payload(reply: &str) -> Result<&str, ScoreParseError> {
    for caps in FENCED.captures_iter(reply) {
        let lang = caps.get(1).map_or("", |m| m.as_str());
        let Some(body) = caps.get(2) else { continue };
        // Fences tagged with another language, or prose notes, are not the scores.
        if lang.eq_ignore_ascii_case("json") || (lang.is_empty() && body.as_str().starts_with('[')) {
            return Ok(body.as_str());
        }
    }
    let start = reply.find('[').ok_or(ScoreParseError::NoArray)?;
    let end = reply.rfind(']').ok_or(ScoreParseError::NoArray)?;
    if end < start {
        return Err(ScoreParseError::NoArray);
    }
    Ok(&reply[start..=end])
}

/// Stage 2: structured parse.
pub fn parse_payload(payload: &str) -> Result<Vec<ScoreEntry>, ScoreParseError> {
    let values: Vec<Value> =
        serde_json::from_str(payload).map_err(|e| ScoreParseError::Malformed(e.to_string()))?;

    Ok(values
        .into_iter()
        .filter_map(|v| {
            let obj = v.as_object()?;
            let id = obj.get("id")?.as_str()?.to_string();
            Some(ScoreEntry {
                id,
                score: coerce_score(obj.get("score")),
                reason: obj
                    .get("reason")
                    .and_then(Value::as_str)
                    .map(str::to_string),
            })
        })
        .collect())
}

pub fn parse_scores(reply: &str) -> Result<Vec<ScoreEntry>, ScoreParseError> {
    parse_payload(extract_payload(reply)?)
}

fn coerce_score(v: Option<&Value>) -> f64 {
    let n = match v {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    n.filter(|x| x.is_finite()).unwrap_or(0.0)
}
