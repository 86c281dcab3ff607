//! Meet response DTOs

use chrono::NaiveDate;
use serde::Serialize;
use uuid::Uuid;

use crate::engine::{DiverView, MeetOrchestrator, ReplayRejection};
use crate::models::MeetStatus;

/// Meet summary for list views and creation
#[derive(Debug, Serialize)]
pub struct MeetSummary {
    pub id: Uuid,
    pub name: String,
    pub location: String,
    pub date: NaiveDate,
    pub status: MeetStatus,
    pub track_ids: Vec<String>,
}

impl From<&MeetOrchestrator> for MeetSummary {
    fn from(meet: &MeetOrchestrator) -> Self {
        let snapshot = meet.snapshot();
        Self {
            id: snapshot.session.id,
            name: snapshot.session.name,
            location: snapshot.session.location,
            date: snapshot.session.date,
            status: snapshot.session.status,
            track_ids: snapshot.tracks.into_iter().map(|t| t.id).collect(),
        }
    }
}

/// Meet list response
#[derive(Debug, Serialize)]
pub struct MeetsListResponse {
    pub meets: Vec<MeetSummary>,
    pub total: usize,
}

/// Lifecycle transition response
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub id: Uuid,
    pub status: MeetStatus,
}

/// Resume response with the outcome of the replayed buffer
#[derive(Debug, Serialize)]
pub struct ResumeResponse {
    pub id: Uuid,
    pub status: MeetStatus,
    pub replayed: usize,
    pub rejected: Vec<ReplayRejection>,
}

/// Skip response
#[derive(Debug, Serialize)]
pub struct SkipResponse {
    pub track_id: String,
    /// New diver on the board; `None` once the event is over
    pub current: Option<DiverView>,
    pub meet_status: MeetStatus,
}

/// Announcer toggle response
#[derive(Debug, Serialize)]
pub struct AnnouncerResponse {
    pub announcing: bool,
}
