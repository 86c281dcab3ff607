//! Judging response DTOs

use serde::Serialize;

use crate::models::SubmissionOutcome;

/// What became of a submitted score or panel
#[derive(Debug, Serialize)]
pub struct SubmissionResponse {
    pub track_id: String,
    #[serde(flatten)]
    pub outcome: SubmissionOutcome,
}
