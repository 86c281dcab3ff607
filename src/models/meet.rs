//! Meet session model

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::constants::{MAX_JUDGE_COUNT, TRIM_THRESHOLD};
use crate::error::{AppError, AppResult};

/// A scheduled meet and its lifecycle state
///
/// Mutated only by the orchestrator that owns it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeetSession {
    pub id: Uuid,
    pub name: String,
    pub location: String,
    pub date: NaiveDate,
    pub status: MeetStatus,
    pub settings: MeetSettings,
}

impl MeetSession {
    /// Create a new session in the `Setup` state
    pub fn new(name: String, location: String, date: NaiveDate, settings: MeetSettings) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            location,
            date,
            status: MeetStatus::Setup,
            settings,
        }
    }
}

/// Meet lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MeetStatus {
    Setup,
    Running,
    Paused,
    Completed,
}

impl std::fmt::Display for MeetStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Setup => write!(f, "setup"),
            Self::Running => write!(f, "running"),
            Self::Paused => write!(f, "paused"),
            Self::Completed => write!(f, "completed"),
        }
    }
}

/// How a dive's judged total becomes the points it adds to the diver's total
///
/// The judged total is always computed the same way; whether it is then
/// weighted by degree of difficulty is a choice made per meet.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoringPolicy {
    /// Round points equal the judged total
    #[default]
    JudgedTotal,
    /// Round points are the judged total multiplied by DD
    DifficultyMultiplied,
}

impl ScoringPolicy {
    /// Compute round points, rounded to hundredths
    pub fn apply(self, judged_total: f64, difficulty: f64) -> f64 {
        let points = match self {
            Self::JudgedTotal => judged_total,
            Self::DifficultyMultiplied => judged_total * difficulty,
        };
        (points * 100.0).round() / 100.0
    }
}

/// Meet configuration snapshot, fixed once the meet is created
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeetSettings {
    pub judge_count: usize,
    #[serde(default = "default_trim_threshold")]
    pub trim_threshold: usize,
    #[serde(default)]
    pub remote_judging: bool,
    #[serde(default)]
    pub announcing: bool,
    #[serde(default)]
    pub live_scoring: bool,
    /// Groups of track ids that run side by side (presentation only)
    #[serde(default)]
    pub event_combinations: Vec<Vec<String>>,
    #[serde(default)]
    pub scoring_policy: ScoringPolicy,
}

fn default_trim_threshold() -> usize {
    TRIM_THRESHOLD
}

impl MeetSettings {
    /// Settings for a panel of `judge_count` with every optional feature off
    pub fn with_judges(judge_count: usize) -> Self {
        Self {
            judge_count,
            trim_threshold: TRIM_THRESHOLD,
            remote_judging: false,
            announcing: false,
            live_scoring: false,
            event_combinations: Vec::new(),
            scoring_policy: ScoringPolicy::default(),
        }
    }

    /// Check the judging rules the engine supports
    pub fn validate_rules(&self) -> AppResult<()> {
        if self.judge_count == 0 || self.judge_count > MAX_JUDGE_COUNT {
            return Err(AppError::Validation(format!(
                "judge count must be between 1 and {}, got {}",
                MAX_JUDGE_COUNT, self.judge_count
            )));
        }
        if self.trim_threshold != TRIM_THRESHOLD {
            return Err(AppError::Validation(format!(
                "trim threshold is fixed at {}",
                TRIM_THRESHOLD
            )));
        }
        Ok(())
    }
}
