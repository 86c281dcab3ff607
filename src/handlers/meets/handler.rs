//! Meet handler implementations

use std::convert::Infallible;
use std::time::Duration;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::sse::{Event, KeepAlive, Sse},
    Json,
};
use futures::stream::{Stream, StreamExt};
use tokio_stream::wrappers::BroadcastStream;
use tracing::{debug, warn};
use uuid::Uuid;
use validator::Validate;

use crate::{
    engine::{CombinedGroup, MeetResults, MeetSnapshot, TrackSnapshot},
    error::{AppError, AppResult},
    services::MeetService,
    state::AppState,
};

use super::{
    request::{AnnouncerRequest, CreateMeetRequest},
    response::{
        AnnouncerResponse, MeetSummary, MeetsListResponse, ResumeResponse, SkipResponse,
        StatusResponse,
    },
};

/// List scheduled meets
pub async fn list_meets(State(state): State<AppState>) -> Json<MeetsListResponse> {
    let meets: Vec<MeetSummary> = state
        .meets()
        .list()
        .iter()
        .map(|m| MeetSummary::from(m.orchestrator.as_ref()))
        .collect();
    let total = meets.len();
    Json(MeetsListResponse { meets, total })
}

/// Schedule a new meet from its roster
pub async fn create_meet(
    State(state): State<AppState>,
    Json(mut payload): Json<CreateMeetRequest>,
) -> AppResult<(StatusCode, Json<MeetSummary>)> {
    payload.sanitize();
    payload.validate()?;

    let handle = MeetService::create_meet(state.meets(), state.config(), payload)?;
    Ok((
        StatusCode::CREATED,
        Json(MeetSummary::from(handle.orchestrator.as_ref())),
    ))
}

/// Full scoring-table view of a meet
pub async fn get_meet(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<MeetSnapshot>> {
    let meet = state.meets().get(&id)?;
    Ok(Json(meet.orchestrator.snapshot()))
}

/// Archive a completed meet
pub async fn delete_meet(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    MeetService::archive_meet(state.meets(), &id)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn start_meet(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<StatusResponse>> {
    let meet = state.meets().get(&id)?;
    meet.orchestrator.start()?;
    Ok(Json(StatusResponse {
        id,
        status: meet.orchestrator.status(),
    }))
}

pub async fn pause_meet(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<StatusResponse>> {
    let meet = state.meets().get(&id)?;
    meet.orchestrator.pause()?;
    Ok(Json(StatusResponse {
        id,
        status: meet.orchestrator.status(),
    }))
}

/// Resume a paused meet and replay what judges sent meanwhile
pub async fn resume_meet(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ResumeResponse>> {
    let meet = state.meets().get(&id)?;
    let report = meet.orchestrator.resume()?;
    Ok(Json(ResumeResponse {
        id,
        status: report.status,
        replayed: report.replayed,
        rejected: report.rejected,
    }))
}

pub async fn set_announcer(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<AnnouncerRequest>,
) -> AppResult<Json<AnnouncerResponse>> {
    let meet = state.meets().get(&id)?;
    meet.orchestrator.set_announcing(payload.enabled);
    Ok(Json(AnnouncerResponse {
        announcing: payload.enabled,
    }))
}

/// Events that run side by side, with each one's current diver
pub async fn get_combined_events(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Vec<CombinedGroup>>> {
    let meet = state.meets().get(&id)?;
    Ok(Json(meet.orchestrator.combined_events()))
}

/// Event and team standings, partial while the meet runs
pub async fn get_results(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<MeetResults>> {
    let meet = state.meets().get(&id)?;
    Ok(Json(meet.orchestrator.results()))
}

pub async fn get_track(
    State(state): State<AppState>,
    Path((id, track_id)): Path<(Uuid, String)>,
) -> AppResult<Json<TrackSnapshot>> {
    let meet = state.meets().get(&id)?;
    Ok(Json(meet.orchestrator.track_snapshot(&track_id)?))
}

/// Administrative skip of the diver on the board (no-show)
pub async fn skip_diver(
    State(state): State<AppState>,
    Path((id, track_id)): Path<(Uuid, String)>,
) -> AppResult<Json<SkipResponse>> {
    let meet = state.meets().get(&id)?;
    let current = meet.orchestrator.skip_current_diver(&track_id)?;
    Ok(Json(SkipResponse {
        track_id,
        current,
        meet_status: meet.orchestrator.status(),
    }))
}

/// Live notification stream for meets with live scoring
pub async fn live_feed(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Sse<impl Stream<Item = Result<Event, Infallible>>>> {
    let meet = state.meets().get(&id)?;
    let broadcaster = meet.live.ok_or_else(|| {
        AppError::InvalidState("live scoring is not enabled for this meet".to_string())
    })?;
    debug!(meet_id = %id, "Live feed client connected");

    let stream = BroadcastStream::new(broadcaster.subscribe()).filter_map(|result| async move {
        match result {
            Ok(envelope) => match Event::default()
                .event(envelope.notification.kind())
                .json_data(&envelope)
            {
                Ok(event) => Some(Ok(event)),
                Err(e) => {
                    warn!("Failed to serialize notification: {}", e);
                    None
                }
            },
            // Lagged subscribers skip ahead
            Err(e) => {
                warn!("Live feed lagged: {}", e);
                None
            }
        }
    });

    Ok(Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    ))
}
