//! Agent reasoning-trace types

use serde::{Deserialize, Serialize};

/// One step of an agent turn's reasoning trace
///
/// A turn's steps form a finite ordered sequence; steps are never mutated
/// after creation. Wire names follow the service (`step`, `thought`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThoughtStep {
    /// 1-indexed position within the turn
    #[serde(rename = "step")]
    pub sequence: u32,

    /// Short action tag, e.g. `analyze_intent`, `search_flights`
    pub action: String,

    /// Human-readable thought text
    #[serde(rename = "thought")]
    pub text: String,

    /// Server-side timestamp (ISO 8601)
    #[serde(default)]
    pub timestamp: String,
}

impl ThoughtStep {
    pub fn new(sequence: u32, action: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            sequence,
            action: action.into(),
            text: text.into(),
            timestamp: String::new(),
        }
    }
}
