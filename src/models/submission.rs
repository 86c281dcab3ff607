//! Score submission model

use serde::{Deserialize, Serialize};

use super::AttemptRef;

/// A single judge's raw score for the current dive of a track
///
/// Transient: consumed by the track, only the value survives in the
/// attempt's score map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreSubmission {
    pub track_id: String,
    pub judge_slot: u8,
    pub value: f64,
    /// Attempt the judge was looking at; `None` targets whatever is current
    #[serde(default)]
    pub attempt: Option<AttemptRef>,
}

impl ScoreSubmission {
    pub fn new(track_id: impl Into<String>, judge_slot: u8, value: f64) -> Self {
        Self {
            track_id: track_id.into(),
            judge_slot,
            value,
            attempt: None,
        }
    }

    /// Pin the submission to a specific attempt
    pub fn for_attempt(mut self, attempt: AttemptRef) -> Self {
        self.attempt = Some(attempt);
        self
    }
}

/// A whole panel entered at once by the scoring table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PanelSubmission {
    pub track_id: String,
    /// Raw scores for slots 1..=n, in slot order
    pub scores: Vec<f64>,
    #[serde(default)]
    pub attempt: Option<AttemptRef>,
}

impl PanelSubmission {
    pub fn new(track_id: impl Into<String>, scores: Vec<f64>) -> Self {
        Self {
            track_id: track_id.into(),
            scores,
            attempt: None,
        }
    }
}

/// What happened to an accepted submission
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SubmissionOutcome {
    /// Meet is paused; the submission will be replayed on resume
    Queued,
    /// Stored; the panel is not complete yet
    Recorded { attempt: AttemptRef, received: usize },
    /// Completed the panel and finalized the dive
    Finalized {
        attempt: AttemptRef,
        judged_total: f64,
        round_points: f64,
    },
}
