// src/prompt.rs
//! Builds the scorer prompt from the liked-item and candidate projections.

use serde::Serialize;

use crate::model::{CandidateItem, PreferenceSignal};
use crate::scorer::ScoringPrompt;

pub const SYSTEM_INSTRUCTION: &str = "You are a recommendation engine. Analyze user preferences and score items accordingly. Always respond with valid JSON only.";

/// What the scorer sees of a liked item. Ids and prices are left out.
#[derive(Debug, Serialize)]
struct LikedProjection<'a> {
    category: &'a str,
    title: &'a str,
    description: &'a str,
}

#[derive(Debug, Serialize)]
struct CandidateProjection<'a> {
    id: &'a str,
    category: &'a str,
    title: &'a str,
    description: Option<&'a str>,
    price: Option<f64>,
}

/// Liked snapshots that carry preference information (missing snapshots are dropped).
pub fn liked_items(history: &[PreferenceSignal]) -> impl Iterator<Item = &CandidateItem> {
    history.iter().filter_map(|s| s.liked_item.as_ref())
}

pub fn build_prompt(history: &[PreferenceSignal], candidates: &[CandidateItem]) -> ScoringPrompt {
    let liked: Vec<LikedProjection<'_>> = liked_items(history)
        .map(|it| LikedProjection {
            category: &it.category,
            title: &it.title,
            description: it.description.as_deref().unwrap_or(""),
        })
        .collect();

    let pool: Vec<CandidateProjection<'_>> = candidates
        .iter()
        .map(|it| CandidateProjection {
            id: &it.id,
            category: &it.category,
            title: &it.title,
            description: it.description.as_deref(),
            price: it.price,
        })
        .collect();

    // Plain structs of strings/options: serialization cannot fail.
    let liked_json = serde_json::to_string_pretty(&liked).unwrap_or_else(|_| "[]".to_string());
    let pool_json = serde_json::to_string_pretty(&pool).unwrap_or_else(|_| "[]".to_string());

    let user = format!(
        "A user has liked these items:\n{liked_json}\n\n\
         From them, work out:\n\
         1. Which categories they prefer\n\
         2. What price range they seem comfortable with\n\
         3. Recurring themes or interests\n\
         4. Item characteristics they value\n\n\
         Then score each of the following items from 0 to 10 by how well it matches those preferences:\n\
         {pool_json}\n\n\
         Return ONLY a JSON array of objects shaped like: \
         [{{\"id\": \"item-id\", \"score\": 8.5, \"reason\": \"brief explanation\"}}]"
    );

    ScoringPrompt {
        system: SYSTEM_INSTRUCTION.to_string(),
        user,
    }
}
