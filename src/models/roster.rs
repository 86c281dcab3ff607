//! Roster snapshot handed to the engine when a meet is scheduled

use serde::{Deserialize, Serialize};

/// Finalized events and entries for one meet
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MeetRoster {
    pub events: Vec<EventDefinition>,
    pub entries: Vec<RosterEntry>,
}

/// A selected event, e.g. "Men's 3m 6-dive"
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventDefinition {
    pub id: String,
    pub name: String,
    pub division: Division,
    pub board: Board,
    /// Required length of every dive sheet in this event
    pub dive_count: usize,
    /// Position in the meet's running order
    #[serde(default)]
    pub order: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Division {
    Mens,
    Womens,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Board {
    #[serde(rename = "1m")]
    OneMeter,
    #[serde(rename = "3m")]
    ThreeMeter,
    #[serde(rename = "platform")]
    Platform,
}

impl std::fmt::Display for Board {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OneMeter => write!(f, "1m"),
            Self::ThreeMeter => write!(f, "3m"),
            Self::Platform => write!(f, "platform"),
        }
    }
}

/// One diver's entry into one event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RosterEntry {
    pub event_id: String,
    pub participant_id: String,
    pub name: String,
    pub team: String,
    pub dives: Vec<DiveEntry>,
}

/// One line of a dive sheet
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiveEntry {
    pub number: String,
    pub name: String,
    pub difficulty: f64,
}
