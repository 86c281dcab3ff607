//! Judging request DTOs
//!
//! Score values, panel size and judge slots are checked by the engine, so
//! these map to the engine's own error codes rather than a generic
//! validation failure.

use serde::Deserialize;

use crate::models::AttemptRef;

/// One judge's score from a judge device
#[derive(Debug, Deserialize)]
pub struct ScoreRequest {
    pub judge_slot: u8,
    pub score: f64,
    /// Attempt shown on the device when the score was entered; required
    pub attempt: Option<AttemptRef>,
}

/// A whole panel entered at the scoring table
#[derive(Debug, Deserialize)]
pub struct PanelRequest {
    pub scores: Vec<f64>,
    pub attempt: Option<AttemptRef>,
}
