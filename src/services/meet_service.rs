//! Meet service
//!
//! Keeps the live orchestrator of every scheduled meet and turns HTTP
//! payloads into engine calls.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::info;
use uuid::Uuid;

use crate::{
    config::Config,
    engine::{BroadcastNotifier, MeetOrchestrator, NotifierSet},
    error::{AppError, AppResult},
    handlers::meets::request::CreateMeetRequest,
    models::{
        DiveEntry, EventDefinition, MeetRoster, MeetSession, MeetSettings, MeetStatus, RosterEntry,
        ScoreSubmission, SubmissionOutcome,
    },
};

/// A scheduled meet and its optional live feed
#[derive(Clone)]
pub struct MeetHandle {
    pub orchestrator: Arc<MeetOrchestrator>,
    /// Present when the meet was created with live scoring on
    pub live: Option<BroadcastNotifier>,
}

/// In-memory index of scheduled meets
#[derive(Default)]
pub struct MeetRegistry {
    meets: RwLock<HashMap<Uuid, MeetHandle>>,
}

impl MeetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, handle: MeetHandle) {
        self.meets.write().insert(handle.orchestrator.id(), handle);
    }

    pub fn get(&self, id: &Uuid) -> AppResult<MeetHandle> {
        self.meets
            .read()
            .get(id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("meet {}", id)))
    }

    pub fn remove(&self, id: &Uuid) -> Option<MeetHandle> {
        self.meets.write().remove(id)
    }

    /// All meets, oldest first by date then name
    pub fn list(&self) -> Vec<MeetHandle> {
        let mut meets: Vec<MeetHandle> = self.meets.read().values().cloned().collect();
        meets.sort_by_cached_key(|m| {
            let snapshot = m.orchestrator.snapshot();
            (snapshot.session.date, snapshot.session.name)
        });
        meets
    }

    pub fn len(&self) -> usize {
        self.meets.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.meets.read().is_empty()
    }
}

/// Meet service for business logic
pub struct MeetService;

impl MeetService {
    /// Build the session and roster from a sanitized request and register
    /// the meet
    pub fn create_meet(
        registry: &MeetRegistry,
        config: &Config,
        payload: CreateMeetRequest,
    ) -> AppResult<MeetHandle> {
        let judge_count = payload
            .judge_count
            .unwrap_or(config.judging.default_judge_count);
        if judge_count > config.judging.max_judge_count {
            return Err(AppError::Validation(format!(
                "judge count must be at most {}",
                config.judging.max_judge_count
            )));
        }

        let mut settings = MeetSettings::with_judges(judge_count);
        settings.remote_judging = payload.remote_judging;
        settings.announcing = payload.announcing;
        settings.live_scoring = payload.live_scoring;
        settings.event_combinations = payload.event_combinations;
        settings.scoring_policy = payload.scoring_policy;

        let roster = MeetRoster {
            events: payload
                .events
                .into_iter()
                .zip(0u32..)
                .map(|(e, order)| EventDefinition {
                    id: e.id,
                    name: e.name,
                    division: e.division,
                    board: e.board,
                    dive_count: e.dive_count,
                    order,
                })
                .collect(),
            entries: payload
                .entries
                .into_iter()
                .map(|e| RosterEntry {
                    event_id: e.event_id,
                    participant_id: e.participant_id,
                    name: e.name,
                    team: e.team,
                    dives: e
                        .dives
                        .into_iter()
                        .map(|d| DiveEntry {
                            number: d.number,
                            name: d.name,
                            difficulty: d.difficulty,
                        })
                        .collect(),
                })
                .collect(),
        };

        let session = MeetSession::new(payload.name, payload.location, payload.date, settings);

        let mut notifiers = NotifierSet::new();
        let live = session
            .settings
            .live_scoring
            .then(|| BroadcastNotifier::new(config.notifications.channel_capacity));
        if let Some(broadcaster) = &live {
            notifiers.add(Arc::new(broadcaster.clone()));
        }

        let orchestrator = Arc::new(MeetOrchestrator::new(session, &roster, notifiers)?);
        let handle = MeetHandle { orchestrator, live };
        registry.insert(handle.clone());

        info!(meet_id = %handle.orchestrator.id(), total_meets = registry.len(), "Meet created");
        Ok(handle)
    }

    /// Drop a finished meet from the registry
    ///
    /// Its live feed closes once the last handle goes away.
    pub fn archive_meet(registry: &MeetRegistry, id: &Uuid) -> AppResult<()> {
        let handle = registry.get(id)?;
        let status = handle.orchestrator.status();
        if status != MeetStatus::Completed {
            return Err(AppError::InvalidState(format!(
                "cannot archive a meet that is {}",
                status
            )));
        }
        registry.remove(id);
        info!(meet_id = %id, total_meets = registry.len(), "Meet archived");
        Ok(())
    }

    /// Per-judge submission from a judge device
    ///
    /// Only open for meets that run remote judging; otherwise scores come in
    /// through panel entry at the scoring table. Devices must name the
    /// attempt they scored so a resent score cannot land on the next diver.
    pub fn submit_remote_score(
        handle: &MeetHandle,
        submission: ScoreSubmission,
    ) -> AppResult<SubmissionOutcome> {
        if !handle.orchestrator.settings().remote_judging {
            return Err(AppError::InvalidState(
                "remote judging is not enabled for this meet".to_string(),
            ));
        }
        if submission.attempt.is_none() {
            return Err(AppError::Validation(
                "attempt is required for judge device submissions".to_string(),
            ));
        }
        handle.orchestrator.submit_score(submission)
    }
}
