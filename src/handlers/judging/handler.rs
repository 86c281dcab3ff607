//! Judging handler implementations

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{PanelSubmission, ScoreSubmission, SubmissionOutcome},
    services::MeetService,
    state::AppState,
};

use super::{
    request::{PanelRequest, ScoreRequest},
    response::SubmissionResponse,
};

/// Buffered submissions are accepted but not yet applied
fn status_for(outcome: &SubmissionOutcome) -> StatusCode {
    match outcome {
        SubmissionOutcome::Queued => StatusCode::ACCEPTED,
        _ => StatusCode::OK,
    }
}

/// Submit one judge's score for the current dive of a track
pub async fn submit_score(
    State(state): State<AppState>,
    Path((id, track_id)): Path<(Uuid, String)>,
    Json(payload): Json<ScoreRequest>,
) -> AppResult<(StatusCode, Json<SubmissionResponse>)> {
    let meet = state.meets().get(&id)?;
    let submission = ScoreSubmission {
        track_id: track_id.clone(),
        judge_slot: payload.judge_slot,
        value: payload.score,
        attempt: payload.attempt,
    };
    let outcome = MeetService::submit_remote_score(&meet, submission)?;

    Ok((
        status_for(&outcome),
        Json(SubmissionResponse { track_id, outcome }),
    ))
}

/// Enter the full panel for the current dive of a track
pub async fn submit_panel(
    State(state): State<AppState>,
    Path((id, track_id)): Path<(Uuid, String)>,
    Json(payload): Json<PanelRequest>,
) -> AppResult<(StatusCode, Json<SubmissionResponse>)> {
    let meet = state.meets().get(&id)?;
    let mut submission = PanelSubmission::new(track_id.clone(), payload.scores);
    submission.attempt = payload.attempt;
    let outcome = meet.orchestrator.submit_panel(submission)?;

    Ok((
        status_for(&outcome),
        Json(SubmissionResponse { track_id, outcome }),
    ))
}
