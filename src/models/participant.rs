//! Participant and dive attempt models

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A diver entered in one event, with a fixed dive sheet
#[derive(Debug, Clone, Serialize)]
pub struct Participant {
    pub id: String,
    pub name: String,
    pub team: String,
    pub dives: Vec<DiveAttempt>,
}

impl Participant {
    /// Sum of round points over every scored dive
    pub fn total_points(&self) -> f64 {
        self.dives.iter().filter_map(|d| d.round_points).sum()
    }

    /// Number of dives that received a final score
    pub fn dives_scored(&self) -> usize {
        self.dives.iter().filter(|d| d.completed).count()
    }
}

/// One dive on a participant's sheet
#[derive(Debug, Clone, Serialize)]
pub struct DiveAttempt {
    /// Dive code, e.g. "105C"
    pub number: String,
    pub name: String,
    /// Degree of difficulty
    pub difficulty: f64,
    pub completed: bool,
    /// Passed over by an administrative skip; never scored
    pub skipped: bool,
    /// Raw scores keyed by judge slot
    pub scores: BTreeMap<u8, f64>,
    /// Aggregated judge score
    pub judged_total: Option<f64>,
    /// Judged total after the meet's scoring policy
    pub round_points: Option<f64>,
}

impl DiveAttempt {
    pub fn new(number: String, name: String, difficulty: f64) -> Self {
        Self {
            number,
            name,
            difficulty,
            completed: false,
            skipped: false,
            scores: BTreeMap::new(),
            judged_total: None,
            round_points: None,
        }
    }

    /// Completed or skipped; no further scores are accepted
    pub fn is_closed(&self) -> bool {
        self.completed || self.skipped
    }

    /// Raw scores in judge-slot order
    pub fn raw_scores(&self) -> Vec<f64> {
        self.scores.values().copied().collect()
    }
}

/// Position of an attempt within a track: (participant index, dive index)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttemptRef {
    pub participant_index: usize,
    pub dive_index: usize,
}

impl AttemptRef {
    pub fn new(participant_index: usize, dive_index: usize) -> Self {
        Self {
            participant_index,
            dive_index,
        }
    }
}

impl std::fmt::Display for AttemptRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.participant_index, self.dive_index)
    }
}
