//! Meet request DTOs

use chrono::NaiveDate;
use serde::Deserialize;
use validator::Validate;

use crate::constants::{
    MAX_EVENT_NAME_LENGTH, MAX_JUDGE_COUNT, MAX_MEET_LOCATION_LENGTH, MAX_MEET_NAME_LENGTH,
    MAX_PERSON_NAME_LENGTH,
};
use crate::models::{Board, Division, ScoringPolicy};
use crate::utils::sanitize_string;

/// Schedule a meet from its finalized roster
#[derive(Debug, Deserialize, Validate)]
pub struct CreateMeetRequest {
    #[validate(length(min = 1, max = MAX_MEET_NAME_LENGTH))]
    pub name: String,

    #[validate(length(min = 1, max = MAX_MEET_LOCATION_LENGTH))]
    pub location: String,

    pub date: NaiveDate,

    /// Panel size; the configured default when omitted
    #[validate(range(min = 1, max = MAX_JUDGE_COUNT))]
    pub judge_count: Option<usize>,

    #[serde(default)]
    pub remote_judging: bool,

    #[serde(default)]
    pub announcing: bool,

    #[serde(default)]
    pub live_scoring: bool,

    /// Groups of event ids that run side by side
    #[serde(default)]
    pub event_combinations: Vec<Vec<String>>,

    #[serde(default)]
    pub scoring_policy: ScoringPolicy,

    #[validate(nested)]
    pub events: Vec<EventRequest>,

    #[validate(nested)]
    #[serde(default)]
    pub entries: Vec<EntryRequest>,
}

impl CreateMeetRequest {
    /// Strip control characters and surrounding whitespace from free text
    ///
    /// Runs before validation so a name of only control characters is
    /// rejected as empty.
    pub fn sanitize(&mut self) {
        self.name = sanitize_string(&self.name);
        self.location = sanitize_string(&self.location);
        for event in &mut self.events {
            event.name = sanitize_string(&event.name);
        }
        for entry in &mut self.entries {
            entry.name = sanitize_string(&entry.name);
            entry.team = sanitize_string(&entry.team);
            for dive in &mut entry.dives {
                dive.number = dive.number.trim().to_uppercase();
                dive.name = sanitize_string(&dive.name);
            }
        }
    }
}

/// One event of the meet
#[derive(Debug, Deserialize, Validate)]
pub struct EventRequest {
    #[validate(length(min = 1, max = 64))]
    pub id: String,

    #[validate(length(min = 1, max = MAX_EVENT_NAME_LENGTH))]
    pub name: String,

    pub division: Division,
    pub board: Board,

    /// Number of dives on every sheet of this event
    pub dive_count: usize,
}

/// A diver entered in one event with their dive sheet
#[derive(Debug, Deserialize, Validate)]
pub struct EntryRequest {
    pub event_id: String,

    #[validate(length(min = 1, max = 64))]
    pub participant_id: String,

    #[validate(length(min = 1, max = MAX_PERSON_NAME_LENGTH))]
    pub name: String,

    #[validate(length(max = MAX_PERSON_NAME_LENGTH))]
    #[serde(default)]
    pub team: String,

    #[validate(nested)]
    pub dives: Vec<DiveRequest>,
}

/// One line of a dive sheet
#[derive(Debug, Deserialize, Validate)]
pub struct DiveRequest {
    #[validate(length(min = 1, max = 8))]
    pub number: String,

    #[validate(length(max = MAX_EVENT_NAME_LENGTH))]
    #[serde(default)]
    pub name: String,

    #[validate(range(exclusive_min = 0.0, max = 5.0))]
    pub difficulty: f64,
}

/// Mute or unmute the announcer
#[derive(Debug, Deserialize)]
pub struct AnnouncerRequest {
    pub enabled: bool,
}
