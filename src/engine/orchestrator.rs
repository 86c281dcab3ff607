//! Meet orchestration
//!
//! [`MeetOrchestrator`] owns every piece of mutable state of one meet: the
//! session and its lifecycle, one [`EventTrack`] per event, and the buffer
//! of submissions received while paused.
//!
//! Locking:
//! - `session` is the lifecycle gate. Scoring calls hold it shared, so
//!   judges on different events never wait for each other; start, pause,
//!   resume and completion hold it exclusively.
//! - Each track sits behind its own mutex. Store, aggregate, advance and the
//!   notifications that follow happen under that one lock, so two judges
//!   racing on the same dive cannot both complete it.
//! - Lock order is always session, then track, then pause buffer.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use serde::Serialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::engine::notifier::{
    AnnouncerNotifier, Notification, NotificationEnvelope, Notifier, NotifierSet,
};
use crate::engine::results::{self, MeetResults};
use crate::engine::track::{DiverView, EventTrack, ScoreRecord};
use crate::error::{AppError, AppResult};
use crate::models::{
    AttemptRef, Board, Division, MeetRoster, MeetSession, MeetSettings, MeetStatus,
    PanelSubmission, RosterEntry, ScoreSubmission, SubmissionOutcome,
};
use crate::utils::{now_utc, validate_score};
use crate::utils::validation::{validate_difficulty, validate_track_id};

/// A submission held back while the meet is paused
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BufferedSubmission {
    Score(ScoreSubmission),
    Panel(PanelSubmission),
}

impl BufferedSubmission {
    fn track_id(&self) -> &str {
        match self {
            Self::Score(s) => &s.track_id,
            Self::Panel(p) => &p.track_id,
        }
    }
}

/// A buffered submission that failed when replayed
#[derive(Debug, Clone, Serialize)]
pub struct ReplayRejection {
    pub submission: BufferedSubmission,
    pub code: &'static str,
    pub message: String,
}

/// Outcome of resuming a paused meet
#[derive(Debug, Clone, Serialize)]
pub struct ResumeReport {
    pub replayed: usize,
    pub rejected: Vec<ReplayRejection>,
    pub status: MeetStatus,
}

/// Scoring-table view of one track
#[derive(Debug, Clone, Serialize)]
pub struct TrackSnapshot {
    pub id: String,
    pub name: String,
    pub division: Division,
    pub board: Board,
    pub terminal: bool,
    pub current: Option<DiverView>,
    pub on_deck: Option<DiverView>,
    /// Judge slots that have scored the current dive
    pub slots_received: Vec<u8>,
    pub dives_closed: usize,
    pub dives_total: usize,
}

impl TrackSnapshot {
    fn of(track: &EventTrack) -> Self {
        let current = track.pointer().and_then(|p| track.describe(p));
        let on_deck = track.on_deck().and_then(|p| track.describe(p));
        let slots_received = track
            .current_diver()
            .map(|(_, dive)| dive.scores.keys().copied().collect())
            .unwrap_or_default();
        let (dives_closed, dives_total) = track.progress();

        Self {
            id: track.id().to_string(),
            name: track.name().to_string(),
            division: track.division(),
            board: track.board(),
            terminal: track.is_terminal(),
            current,
            on_deck,
            slots_received,
            dives_closed,
            dives_total,
        }
    }
}

/// Tracks that run side by side
#[derive(Debug, Clone, Serialize)]
pub struct CombinedGroup {
    pub tracks: Vec<TrackSnapshot>,
}

/// Full serialisable view of a meet
#[derive(Debug, Clone, Serialize)]
pub struct MeetSnapshot {
    pub session: MeetSession,
    pub announcing: bool,
    pub queued_submissions: usize,
    pub tracks: Vec<TrackSnapshot>,
}

/// Owner and single writer of one meet's state
pub struct MeetOrchestrator {
    meet_id: Uuid,
    settings: MeetSettings,
    session: RwLock<MeetSession>,
    /// Track ids in running order
    order: Vec<String>,
    tracks: HashMap<String, Mutex<EventTrack>>,
    /// Tracks that have not reached their terminal position
    remaining: AtomicUsize,
    paused: Mutex<VecDeque<BufferedSubmission>>,
    notifiers: NotifierSet,
    announcer: Arc<AnnouncerNotifier>,
    sequence: AtomicU64,
}

impl MeetOrchestrator {
    /// Build a meet in `Setup` from its session and roster snapshot
    ///
    /// The roster is validated here: unknown events, sheets of the wrong
    /// length and combination groups naming unknown tracks are rejected.
    pub fn new(session: MeetSession, roster: &MeetRoster, mut notifiers: NotifierSet) -> AppResult<Self> {
        session.settings.validate_rules()?;
        if session.status != MeetStatus::Setup {
            return Err(AppError::InvalidState(format!(
                "a new meet must be in setup, not {}",
                session.status
            )));
        }

        let mut events = roster.events.clone();
        events.sort_by_key(|e| e.order);

        let mut seen = HashSet::new();
        for event in &events {
            validate_track_id(&event.id).map_err(|msg| AppError::Validation(format!("{}: '{}'", msg, event.id)))?;
            if !seen.insert(event.id.as_str()) {
                return Err(AppError::Validation(format!("duplicate event id '{}'", event.id)));
            }
        }

        for entry in &roster.entries {
            let event = events
                .iter()
                .find(|e| e.id == entry.event_id)
                .ok_or_else(|| {
                    AppError::NotFound(format!(
                        "event '{}' for participant '{}'",
                        entry.event_id, entry.participant_id
                    ))
                })?;
            if entry.dives.len() != event.dive_count {
                return Err(AppError::Validation(format!(
                    "participant '{}' has {} dives on the sheet for '{}', expected {}",
                    entry.participant_id,
                    entry.dives.len(),
                    event.id,
                    event.dive_count
                )));
            }
            for dive in &entry.dives {
                validate_difficulty(dive.difficulty).map_err(|msg| {
                    AppError::Validation(format!("{} ({} for '{}')", msg, dive.number, entry.participant_id))
                })?;
            }
        }

        for group in &session.settings.event_combinations {
            if let Some(unknown) = group.iter().find(|id| !seen.contains(id.as_str())) {
                return Err(AppError::Validation(format!(
                    "event combination references unknown event '{}'",
                    unknown
                )));
            }
        }

        let mut tracks = HashMap::new();
        let mut order = Vec::with_capacity(events.len());
        for event in &events {
            let entries: Vec<&RosterEntry> = roster
                .entries
                .iter()
                .filter(|e| e.event_id == event.id)
                .collect();
            order.push(event.id.clone());
            tracks.insert(event.id.clone(), Mutex::new(EventTrack::new(event, &entries)));
        }

        let announcer = Arc::new(AnnouncerNotifier::new(session.settings.announcing));
        notifiers.add(announcer.clone());

        info!(
            meet_id = %session.id,
            events = order.len(),
            entries = roster.entries.len(),
            judges = session.settings.judge_count,
            "Meet scheduled"
        );

        Ok(Self {
            meet_id: session.id,
            settings: session.settings.clone(),
            session: RwLock::new(session),
            order,
            tracks,
            remaining: AtomicUsize::new(0),
            paused: Mutex::new(VecDeque::new()),
            notifiers,
            announcer,
            sequence: AtomicU64::new(0),
        })
    }

    pub fn id(&self) -> Uuid {
        self.meet_id
    }

    pub fn status(&self) -> MeetStatus {
        self.session.read().status
    }

    pub fn settings(&self) -> &MeetSettings {
        &self.settings
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Setup -> Running
    ///
    /// `NotReady` if there are no events, or an event has no participants or
    /// no dives.
    pub fn start(&self) -> AppResult<()> {
        let mut session = self.session.write();
        if session.status != MeetStatus::Setup {
            return Err(AppError::InvalidState(format!(
                "cannot start a meet that is {}",
                session.status
            )));
        }
        if self.order.is_empty() {
            return Err(AppError::NotReady("no events are configured".to_string()));
        }
        for id in &self.order {
            let track = self.tracks[id].lock();
            if track.participants().is_empty() {
                return Err(AppError::NotReady(format!("event '{}' has no participants", id)));
            }
            if track.has_empty_sheet() {
                return Err(AppError::NotReady(format!("event '{}' has no dives", id)));
            }
        }

        self.remaining.store(self.order.len(), Ordering::SeqCst);
        session.status = MeetStatus::Running;
        info!(meet_id = %self.meet_id, name = %session.name, "Meet started");
        self.emit(Notification::MeetStarted {
            name: session.name.clone(),
            location: session.location.clone(),
        });
        Ok(())
    }

    /// Running -> Paused; later submissions are buffered
    pub fn pause(&self) -> AppResult<()> {
        let mut session = self.session.write();
        if session.status != MeetStatus::Running {
            return Err(AppError::InvalidState(format!(
                "cannot pause a meet that is {}",
                session.status
            )));
        }
        // Every track is terminal and completion is about to land
        if self.remaining.load(Ordering::SeqCst) == 0 {
            self.mark_completed(&mut session);
            return Err(AppError::InvalidState(
                "cannot pause a meet whose events are all complete".to_string(),
            ));
        }
        session.status = MeetStatus::Paused;
        info!(meet_id = %self.meet_id, "Meet paused");
        self.emit(Notification::MeetPaused);
        Ok(())
    }

    /// Paused -> Running, replaying buffered submissions in arrival order
    ///
    /// The replay runs before any new submission is admitted.
    pub fn resume(&self) -> AppResult<ResumeReport> {
        let mut session = self.session.write();
        if session.status != MeetStatus::Paused {
            return Err(AppError::InvalidState(format!(
                "cannot resume a meet that is {}",
                session.status
            )));
        }

        let buffered: Vec<BufferedSubmission> = self.paused.lock().drain(..).collect();
        session.status = MeetStatus::Running;
        info!(meet_id = %self.meet_id, buffered = buffered.len(), "Meet resumed");
        self.emit(Notification::MeetResumed {
            replayed: buffered.len(),
        });

        let replayed = buffered.len();
        let mut rejected = Vec::new();
        for submission in buffered {
            match self.apply(&submission) {
                Ok((_, meet_done)) => {
                    if meet_done {
                        self.mark_completed(&mut session);
                    }
                }
                Err(e) => {
                    warn!(
                        meet_id = %self.meet_id,
                        track_id = %submission.track_id(),
                        error = %e,
                        "Buffered submission rejected on replay"
                    );
                    rejected.push(ReplayRejection {
                        submission,
                        code: e.error_code(),
                        message: e.to_string(),
                    });
                }
            }
        }

        Ok(ResumeReport {
            replayed,
            rejected,
            status: session.status,
        })
    }

    // =========================================================================
    // Scoring
    // =========================================================================

    /// Record one judge's score for a track's current dive
    ///
    /// Finalizes and advances the track when this is the last score of the
    /// panel. While paused the submission is checked and buffered.
    pub fn submit_score(&self, submission: ScoreSubmission) -> AppResult<SubmissionOutcome> {
        self.admit(BufferedSubmission::Score(submission))
    }

    /// Record a full panel for a track's current dive in one step
    pub fn submit_panel(&self, submission: PanelSubmission) -> AppResult<SubmissionOutcome> {
        self.admit(BufferedSubmission::Panel(submission))
    }

    /// Administrative skip of a track's current dive (no-show)
    ///
    /// Returns the new current diver, if any.
    pub fn skip_current_diver(&self, track_id: &str) -> AppResult<Option<DiverView>> {
        let session = self.session.read();
        if session.status != MeetStatus::Running {
            return Err(AppError::InvalidState(format!(
                "cannot skip a diver while the meet is {}",
                session.status
            )));
        }

        let (next, meet_done) = {
            let mut track = self.track(track_id)?.lock();
            let (skipped, next) = track.skip_current()?;
            // The skipped attempt is still addressable for its view
            let diver = track.describe(skipped).ok_or_else(|| {
                AppError::Internal(anyhow::anyhow!("skipped attempt {} vanished", skipped))
            })?;
            info!(
                meet_id = %self.meet_id,
                track_id = %track_id,
                participant = %diver.participant_name,
                dive = %diver.dive_number,
                "Diver skipped"
            );
            self.emit(Notification::DiverSkipped {
                track_id: track_id.to_string(),
                diver,
            });
            let meet_done = self.after_move(&track, next);
            (next.and_then(|p| track.describe(p)), meet_done)
        };

        drop(session);
        if meet_done {
            self.complete();
        }
        Ok(next)
    }

    /// Mute or unmute the announcer for the rest of the meet
    pub fn set_announcing(&self, enabled: bool) {
        self.announcer.set_enabled(enabled);
        info!(meet_id = %self.meet_id, enabled, "Announcer toggled");
    }

    // =========================================================================
    // Views
    // =========================================================================

    /// Event-combination groups with the live state of each member track
    pub fn combined_events(&self) -> Vec<CombinedGroup> {
        self.settings
            .event_combinations
            .iter()
            .map(|group| CombinedGroup {
                tracks: group
                    .iter()
                    .filter_map(|id| self.tracks.get(id))
                    .map(|t| TrackSnapshot::of(&t.lock()))
                    .collect(),
            })
            .collect()
    }

    pub fn track_snapshot(&self, track_id: &str) -> AppResult<TrackSnapshot> {
        Ok(TrackSnapshot::of(&self.track(track_id)?.lock()))
    }

    pub fn snapshot(&self) -> MeetSnapshot {
        let session = self.session.read().clone();
        MeetSnapshot {
            session,
            announcing: self.announcer.is_enabled(),
            queued_submissions: self.paused.lock().len(),
            tracks: self
                .order
                .iter()
                .map(|id| TrackSnapshot::of(&self.tracks[id].lock()))
                .collect(),
        }
    }

    /// Event and team standings as of now
    pub fn results(&self) -> MeetResults {
        let events = self
            .order
            .iter()
            .map(|id| results::event_results(&self.tracks[id].lock()))
            .collect();
        MeetResults::from_events(events)
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn admit(&self, submission: BufferedSubmission) -> AppResult<SubmissionOutcome> {
        let session = self.session.read();
        match session.status {
            MeetStatus::Running => {}
            MeetStatus::Paused => {
                self.precheck(&submission)?;
                let mut queue = self.paused.lock();
                queue.push_back(submission);
                debug!(meet_id = %self.meet_id, queued = queue.len(), "Submission buffered while paused");
                return Ok(SubmissionOutcome::Queued);
            }
            status => {
                return Err(AppError::InvalidState(format!(
                    "cannot accept scores while the meet is {}",
                    status
                )));
            }
        }

        let result = self.apply(&submission);
        drop(session);

        match result {
            Ok((outcome, meet_done)) => {
                if meet_done {
                    self.complete();
                }
                Ok(outcome)
            }
            Err(e) => {
                warn!(
                    meet_id = %self.meet_id,
                    track_id = %submission.track_id(),
                    error = %e,
                    "Submission rejected"
                );
                Err(e)
            }
        }
    }

    /// Checks that do not depend on the dive being current, so a bad
    /// submission is refused at once even while paused
    fn precheck(&self, submission: &BufferedSubmission) -> AppResult<()> {
        let track = self.track(submission.track_id())?.lock();
        let attempt = match submission {
            BufferedSubmission::Score(s) => {
                if s.judge_slot == 0 || usize::from(s.judge_slot) > self.settings.judge_count {
                    return Err(AppError::NotFound(format!(
                        "judge slot {} (panel has slots 1..={})",
                        s.judge_slot, self.settings.judge_count
                    )));
                }
                validate_score(s.value)
                    .map_err(|msg| AppError::InvalidScore(format!("{}: {}", msg, s.value)))?;
                s.attempt
            }
            BufferedSubmission::Panel(p) => {
                if p.scores.len() != self.settings.judge_count {
                    return Err(AppError::InvalidScore(format!(
                        "expected {} scores, got {}",
                        self.settings.judge_count,
                        p.scores.len()
                    )));
                }
                for &value in &p.scores {
                    validate_score(value)
                        .map_err(|msg| AppError::InvalidScore(format!("{}: {}", msg, value)))?;
                }
                p.attempt
            }
        };
        if let Some(r) = attempt {
            let exists = track
                .participants()
                .get(r.participant_index)
                .is_some_and(|p| r.dive_index < p.dives.len());
            if !exists {
                return Err(AppError::NotFound(format!(
                    "attempt {} does not exist on track '{}'",
                    r,
                    track.id()
                )));
            }
        }
        Ok(())
    }

    /// Store, maybe finalize, maybe advance; atomic under the track lock
    ///
    /// The flag is true when this call moved the last track to terminal.
    fn apply(&self, submission: &BufferedSubmission) -> AppResult<(SubmissionOutcome, bool)> {
        let mut track = self.track(submission.track_id())?.lock();
        let judge_count = self.settings.judge_count;
        let policy = self.settings.scoring_policy;

        let (target, record) = match submission {
            BufferedSubmission::Score(s) => {
                let target = track.resolve_target(s.attempt)?;
                let record = track.record_score(target, s.judge_slot, s.value, judge_count, policy)?;
                debug!(
                    meet_id = %self.meet_id,
                    track_id = %s.track_id,
                    judge_slot = s.judge_slot,
                    score = s.value,
                    attempt = %target,
                    "Score recorded"
                );
                (target, record)
            }
            BufferedSubmission::Panel(p) => {
                let target = track.resolve_target(p.attempt)?;
                let record = track.record_panel(target, &p.scores, judge_count, policy)?;
                (target, record)
            }
        };

        match record {
            ScoreRecord::Pending { received } => Ok((
                SubmissionOutcome::Recorded {
                    attempt: target,
                    received,
                },
                false,
            )),
            ScoreRecord::Finalized {
                judged_total,
                round_points,
            } => {
                let meet_done = self.finish_attempt(&mut track, target, judged_total, round_points)?;
                Ok((
                    SubmissionOutcome::Finalized {
                        attempt: target,
                        judged_total,
                        round_points,
                    },
                    meet_done,
                ))
            }
        }
    }

    fn finish_attempt(
        &self,
        track: &mut EventTrack,
        target: AttemptRef,
        judged_total: f64,
        round_points: f64,
    ) -> AppResult<bool> {
        let diver = track.describe(target).ok_or_else(|| {
            AppError::Internal(anyhow::anyhow!("finalized attempt {} vanished", target))
        })?;
        let scores = track
            .current_diver()
            .map(|(_, dive)| dive.raw_scores())
            .unwrap_or_default();

        info!(
            meet_id = %self.meet_id,
            track_id = %track.id(),
            participant = %diver.participant_name,
            dive = %diver.dive_number,
            judged_total,
            round_points,
            "Dive finalized"
        );
        self.emit(Notification::ScoreFinalized {
            track_id: track.id().to_string(),
            diver,
            scores,
            judged_total,
            round_points,
        });

        let next = track.advance()?;
        Ok(self.after_move(track, next))
    }

    /// Announce where the pointer went; true if the meet just ran out of
    /// active tracks
    fn after_move(&self, track: &EventTrack, next: Option<AttemptRef>) -> bool {
        match next.and_then(|p| track.describe(p)) {
            Some(diver) => {
                self.emit(Notification::DiverAdvanced {
                    track_id: track.id().to_string(),
                    diver,
                });
                false
            }
            None => {
                info!(meet_id = %self.meet_id, track_id = %track.id(), "Event completed");
                self.emit(Notification::EventCompleted {
                    track_id: track.id().to_string(),
                    track_name: track.name().to_string(),
                });
                self.remaining.fetch_sub(1, Ordering::SeqCst) == 1
            }
        }
    }

    fn complete(&self) {
        let mut session = self.session.write();
        self.mark_completed(&mut session);
    }

    fn mark_completed(&self, session: &mut MeetSession) {
        if session.status == MeetStatus::Completed {
            return;
        }
        session.status = MeetStatus::Completed;
        info!(meet_id = %self.meet_id, "Meet completed");
        self.emit(Notification::MeetCompleted);
    }

    fn track(&self, track_id: &str) -> AppResult<&Mutex<EventTrack>> {
        self.tracks
            .get(track_id)
            .ok_or_else(|| AppError::NotFound(format!("track '{}'", track_id)))
    }

    fn emit(&self, notification: Notification) {
        let envelope = NotificationEnvelope {
            meet_id: self.meet_id,
            sequence: self.sequence.fetch_add(1, Ordering::SeqCst),
            at: now_utc(),
            notification,
        };
        self.notifiers.notify(&envelope);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::track::tests::{entry, event};
    use chrono::NaiveDate;

    #[derive(Default)]
    struct Recorder {
        seen: Mutex<Vec<NotificationEnvelope>>,
    }

    impl Recorder {
        fn kinds(&self) -> Vec<&'static str> {
            self.seen
                .lock()
                .iter()
                .map(|e| e.notification.kind())
                .collect()
        }

        fn count(&self, kind: &str) -> usize {
            self.kinds().into_iter().filter(|k| *k == kind).count()
        }
    }

    impl Notifier for Recorder {
        fn notify(&self, envelope: &NotificationEnvelope) {
            self.seen.lock().push(envelope.clone());
        }
    }

    fn settings(judges: usize) -> MeetSettings {
        MeetSettings::with_judges(judges)
    }

    fn session(settings: MeetSettings) -> MeetSession {
        MeetSession::new(
            "Spring Championship".to_string(),
            "Aquatic Center".to_string(),
            NaiveDate::from_ymd_opt(2026, 4, 18).unwrap(),
            settings,
        )
    }

    /// One women's 1m event with the given divers, one dive each
    fn single_event(divers: &[&str], dives: usize) -> MeetRoster {
        MeetRoster {
            events: vec![event("w1m", dives)],
            entries: divers
                .iter()
                .map(|d| entry("w1m", d, "Central", dives))
                .collect(),
        }
    }

    fn meet(settings: MeetSettings, roster: &MeetRoster) -> (MeetOrchestrator, Arc<Recorder>) {
        let recorder = Arc::new(Recorder::default());
        let mut sinks = NotifierSet::new();
        sinks.add(recorder.clone());
        let orchestrator = MeetOrchestrator::new(session(settings), roster, sinks).unwrap();
        (orchestrator, recorder)
    }

    fn score(o: &MeetOrchestrator, track: &str, values: &[f64]) -> Vec<SubmissionOutcome> {
        (1u8..)
            .zip(values)
            .map(|(slot, &v)| o.submit_score(ScoreSubmission::new(track, slot, v)).unwrap())
            .collect()
    }

    #[test]
    fn test_full_meet_runs_to_completion() {
        let (o, rec) = meet(settings(3), &single_event(&["Emma", "Sophia"], 1));
        o.start().unwrap();
        assert_eq!(o.status(), MeetStatus::Running);

        let outcomes = score(&o, "w1m", &[6.0, 7.0, 7.5]);
        assert_eq!(
            outcomes[1],
            SubmissionOutcome::Recorded {
                attempt: AttemptRef::new(0, 0),
                received: 2
            }
        );
        assert_eq!(
            outcomes[2],
            SubmissionOutcome::Finalized {
                attempt: AttemptRef::new(0, 0),
                judged_total: 20.5,
                round_points: 20.5
            }
        );

        let snap = o.track_snapshot("w1m").unwrap();
        assert_eq!(snap.current.unwrap().participant_name, "Sophia");
        assert!(snap.on_deck.is_none());

        score(&o, "w1m", &[5.0, 5.0, 5.0]);
        assert_eq!(o.status(), MeetStatus::Completed);
        assert_eq!(
            rec.kinds(),
            vec![
                "meet_started",
                "score_finalized",
                "diver_advanced",
                "score_finalized",
                "event_completed",
                "meet_completed"
            ]
        );

        let sequences: Vec<u64> = rec.seen.lock().iter().map(|e| e.sequence).collect();
        assert_eq!(sequences, (0..6).collect::<Vec<_>>());

        let err = o
            .submit_score(ScoreSubmission::new("w1m", 1, 6.0))
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidState(_)));

        let results = o.results();
        assert_eq!(results.events[0].standings[0].name, "Emma");
        assert!(results.events[0].complete);
    }

    #[test]
    fn test_trimmed_panel_of_five() {
        let (o, _) = meet(settings(5), &single_event(&["Michael"], 2));
        o.start().unwrap();
        let outcomes = score(&o, "w1m", &[9.0, 6.5, 7.0, 7.5, 10.0]);
        assert!(matches!(
            outcomes[4],
            SubmissionOutcome::Finalized { judged_total, .. } if judged_total == 23.5
        ));
    }

    #[test]
    fn test_difficulty_multiplied_policy() {
        let mut s = settings(3);
        s.scoring_policy = crate::models::ScoringPolicy::DifficultyMultiplied;
        let (o, _) = meet(s, &single_event(&["Emma"], 1));
        o.start().unwrap();
        let outcomes = score(&o, "w1m", &[6.0, 7.0, 7.5]);
        // First dive on the sheet has DD 1.2
        assert_eq!(
            outcomes[2],
            SubmissionOutcome::Finalized {
                attempt: AttemptRef::new(0, 0),
                judged_total: 20.5,
                round_points: 24.6
            }
        );
    }

    #[test]
    fn test_start_requires_a_ready_meet() {
        let (o, _) = meet(settings(3), &MeetRoster::default());
        assert!(matches!(o.start(), Err(AppError::NotReady(_))));
        assert_eq!(o.status(), MeetStatus::Setup);

        let empty_event = MeetRoster {
            events: vec![event("w1m", 1)],
            entries: Vec::new(),
        };
        let (o, _) = meet(settings(3), &empty_event);
        assert!(matches!(o.start(), Err(AppError::NotReady(_))));

        let (o, _) = meet(settings(3), &single_event(&["Emma"], 0));
        assert!(matches!(o.start(), Err(AppError::NotReady(_))));

        let (o, _) = meet(settings(3), &single_event(&["Emma"], 1));
        o.start().unwrap();
        assert!(matches!(o.start(), Err(AppError::InvalidState(_))));
    }

    #[test]
    fn test_roster_is_validated_on_creation() {
        let mut roster = single_event(&["Emma"], 2);
        roster.entries[0].dives.pop();
        let err = MeetOrchestrator::new(session(settings(3)), &roster, NotifierSet::new()).err();
        assert!(matches!(err, Some(AppError::Validation(_))));

        let mut roster = single_event(&["Emma"], 1);
        roster.entries[0].event_id = "m3m".to_string();
        let err = MeetOrchestrator::new(session(settings(3)), &roster, NotifierSet::new()).err();
        assert!(matches!(err, Some(AppError::NotFound(_))));

        let mut s = settings(3);
        s.event_combinations = vec![vec!["w1m".to_string(), "m1m".to_string()]];
        let err = MeetOrchestrator::new(session(s), &single_event(&["Emma"], 1), NotifierSet::new()).err();
        assert!(matches!(err, Some(AppError::Validation(_))));
    }

    #[test]
    fn test_submissions_outside_running_are_rejected() {
        let (o, _) = meet(settings(3), &single_event(&["Emma"], 1));
        let err = o
            .submit_score(ScoreSubmission::new("w1m", 1, 6.0))
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidState(_)));
        assert!(matches!(o.pause(), Err(AppError::InvalidState(_))));
        assert!(matches!(o.resume(), Err(AppError::InvalidState(_))));
        assert!(matches!(o.skip_current_diver("w1m"), Err(AppError::InvalidState(_))));
    }

    #[test]
    fn test_rejections_leave_state_untouched() {
        let (o, rec) = meet(settings(3), &single_event(&["Emma"], 1));
        o.start().unwrap();
        o.submit_score(ScoreSubmission::new("w1m", 2, 6.0)).unwrap();

        let err = o
            .submit_score(ScoreSubmission::new("w1m", 2, 8.0))
            .unwrap_err();
        assert!(matches!(err, AppError::DuplicateSubmission { slot: 2 }));
        assert!(matches!(
            o.submit_score(ScoreSubmission::new("w1m", 4, 8.0)),
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            o.submit_score(ScoreSubmission::new("w1m", 1, 10.5)),
            Err(AppError::InvalidScore(_))
        ));
        assert!(matches!(
            o.submit_score(ScoreSubmission::new("m3m", 1, 8.0)),
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            o.submit_score(ScoreSubmission::new("w1m", 1, 8.0).for_attempt(AttemptRef::new(5, 0))),
            Err(AppError::NotFound(_))
        ));

        let snap = o.track_snapshot("w1m").unwrap();
        assert_eq!(snap.slots_received, vec![2]);
        assert_eq!(rec.kinds(), vec!["meet_started"]);
    }

    #[test]
    fn test_stale_attempt_is_refused() {
        let (o, _) = meet(settings(3), &single_event(&["Emma"], 2));
        o.start().unwrap();
        score(&o, "w1m", &[6.0, 6.0, 6.0]);

        let err = o
            .submit_score(ScoreSubmission::new("w1m", 1, 7.0).for_attempt(AttemptRef::new(0, 0)))
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidState(_)));

        let outcome = o
            .submit_score(ScoreSubmission::new("w1m", 1, 7.0).for_attempt(AttemptRef::new(0, 1)))
            .unwrap();
        assert!(matches!(outcome, SubmissionOutcome::Recorded { received: 1, .. }));
    }

    #[test]
    fn test_panel_entry() {
        let (o, _) = meet(settings(3), &single_event(&["Emma", "Sophia"], 1));
        o.start().unwrap();
        assert!(matches!(
            o.submit_panel(PanelSubmission::new("w1m", vec![6.0, 7.0])),
            Err(AppError::InvalidScore(_))
        ));
        let outcome = o
            .submit_panel(PanelSubmission::new("w1m", vec![6.0, 7.0, 7.5]))
            .unwrap();
        assert!(matches!(outcome, SubmissionOutcome::Finalized { judged_total, .. } if judged_total == 20.5));
        assert_eq!(
            o.track_snapshot("w1m").unwrap().current.unwrap().participant_name,
            "Sophia"
        );
    }

    #[test]
    fn test_pause_buffers_and_resume_replays_in_order() {
        let (o, rec) = meet(settings(3), &single_event(&["Emma", "Sophia"], 1));
        o.start().unwrap();
        o.submit_score(ScoreSubmission::new("w1m", 1, 6.0)).unwrap();
        o.pause().unwrap();

        assert_eq!(
            o.submit_score(ScoreSubmission::new("w1m", 2, 7.0)).unwrap(),
            SubmissionOutcome::Queued
        );
        assert_eq!(
            o.submit_score(ScoreSubmission::new("w1m", 3, 7.5)).unwrap(),
            SubmissionOutcome::Queued
        );
        // Nothing moves while paused
        assert_eq!(o.track_snapshot("w1m").unwrap().slots_received, vec![1]);
        assert_eq!(o.snapshot().queued_submissions, 2);

        // Obviously bad input is refused at once, not buffered
        assert!(matches!(
            o.submit_score(ScoreSubmission::new("w1m", 1, 7.3)),
            Err(AppError::InvalidScore(_))
        ));
        assert!(matches!(
            o.submit_score(ScoreSubmission::new("w1m", 9, 7.0)),
            Err(AppError::NotFound(_))
        ));

        let report = o.resume().unwrap();
        assert_eq!(report.replayed, 2);
        assert!(report.rejected.is_empty());
        assert_eq!(report.status, MeetStatus::Running);
        assert_eq!(o.snapshot().queued_submissions, 0);

        let results = o.results();
        let emma = results.events[0]
            .standings
            .iter()
            .find(|s| s.name == "Emma")
            .unwrap();
        assert_eq!(emma.total_points, 20.5);
        assert_eq!(
            o.track_snapshot("w1m").unwrap().current.unwrap().participant_name,
            "Sophia"
        );
        assert_eq!(
            rec.kinds(),
            vec![
                "meet_started",
                "meet_paused",
                "meet_resumed",
                "score_finalized",
                "diver_advanced"
            ]
        );
    }

    #[test]
    fn test_replay_failures_are_reported_not_fatal() {
        let (o, _) = meet(settings(3), &single_event(&["Emma"], 1));
        o.start().unwrap();
        o.pause().unwrap();
        o.submit_score(ScoreSubmission::new("w1m", 1, 6.0)).unwrap();
        o.submit_score(ScoreSubmission::new("w1m", 1, 6.5)).unwrap();
        o.submit_score(ScoreSubmission::new("w1m", 2, 7.0)).unwrap();

        let report = o.resume().unwrap();
        assert_eq!(report.replayed, 3);
        assert_eq!(report.rejected.len(), 1);
        assert_eq!(report.rejected[0].code, "DUPLICATE_SUBMISSION");
        assert_eq!(o.track_snapshot("w1m").unwrap().slots_received, vec![1, 2]);
    }

    #[test]
    fn test_replay_can_complete_the_meet() {
        let (o, rec) = meet(settings(3), &single_event(&["Emma"], 1));
        o.start().unwrap();
        o.pause().unwrap();
        score(&o, "w1m", &[6.0, 7.0, 7.5]);

        let report = o.resume().unwrap();
        assert_eq!(report.status, MeetStatus::Completed);
        assert_eq!(o.status(), MeetStatus::Completed);
        assert_eq!(rec.count("meet_completed"), 1);
    }

    #[test]
    fn test_pause_refused_once_every_event_is_done() {
        let (o, rec) = meet(settings(3), &single_event(&["Emma"], 1));
        o.start().unwrap();
        // Last track closed by a submitter that has not yet taken the write lock
        o.remaining.store(0, Ordering::SeqCst);

        assert!(matches!(o.pause().unwrap_err(), AppError::InvalidState(_)));
        assert_eq!(o.status(), MeetStatus::Completed);
        assert_eq!(rec.count("meet_paused"), 0);
        assert_eq!(rec.count("meet_completed"), 1);

        o.complete();
        assert_eq!(rec.count("meet_completed"), 1);
    }

    #[test]
    fn test_skipping_last_dive_completes_meet() {
        let (o, rec) = meet(settings(3), &single_event(&["Emma", "Sophia"], 1));
        o.start().unwrap();

        let next = o.skip_current_diver("w1m").unwrap();
        assert_eq!(next.unwrap().participant_name, "Sophia");

        let next = o.skip_current_diver("w1m").unwrap();
        assert!(next.is_none());
        assert_eq!(o.status(), MeetStatus::Completed);
        assert_eq!(rec.count("diver_skipped"), 2);
        assert_eq!(rec.count("event_completed"), 1);
        assert_eq!(rec.count("meet_completed"), 1);

        let results = o.results();
        assert!(results.events[0].standings.iter().all(|s| s.dives_scored == 0));
    }

    #[test]
    fn test_concurrent_judges_finalize_exactly_once() {
        let (o, rec) = meet(settings(5), &single_event(&["Emma", "Sophia"], 1));
        o.start().unwrap();

        let outcomes: Vec<SubmissionOutcome> = std::thread::scope(|s| {
            let handles: Vec<_> = (1u8..=5)
                .map(|slot| {
                    let o = &o;
                    s.spawn(move || {
                        o.submit_score(
                            ScoreSubmission::new("w1m", slot, 7.0)
                                .for_attempt(AttemptRef::new(0, 0)),
                        )
                        .unwrap()
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        let finalized = outcomes
            .iter()
            .filter(|o| matches!(o, SubmissionOutcome::Finalized { .. }))
            .count();
        assert_eq!(finalized, 1);
        assert_eq!(rec.count("score_finalized"), 1);
        assert_eq!(
            o.track_snapshot("w1m").unwrap().current.unwrap().attempt,
            AttemptRef::new(1, 0)
        );
    }

    #[test]
    fn test_parallel_tracks_complete_meet_once() {
        let roster = MeetRoster {
            events: vec![event("w1m", 2), event("m3m", 2)],
            entries: vec![
                entry("w1m", "Emma", "Central", 2),
                entry("w1m", "Sophia", "Oak Ridge", 2),
                entry("m3m", "Liam", "Central", 2),
                entry("m3m", "Noah", "Westside", 2),
            ],
        };
        let (o, rec) = meet(settings(3), &roster);
        o.start().unwrap();

        std::thread::scope(|s| {
            for track in ["w1m", "m3m"] {
                for slot in 1u8..=3 {
                    let o = &o;
                    s.spawn(move || {
                        // Each judge scores every dive of the event as it comes up
                        let mut scored = 0;
                        while scored < 4 {
                            match o.submit_score(ScoreSubmission::new(track, slot, 6.0)) {
                                Ok(_) => scored += 1,
                                Err(AppError::DuplicateSubmission { .. }) => std::thread::yield_now(),
                                Err(e) => panic!("unexpected error: {e}"),
                            }
                        }
                    });
                }
            }
        });

        assert_eq!(o.status(), MeetStatus::Completed);
        assert_eq!(rec.count("score_finalized"), 8);
        assert_eq!(rec.count("event_completed"), 2);
        assert_eq!(rec.count("meet_completed"), 1);
        assert!(o.results().events.iter().all(|e| e.complete));
    }

    #[test]
    fn test_combined_events_view() {
        let roster = MeetRoster {
            events: vec![event("w1m", 1), event("m1m", 1), event("w3m", 1)],
            entries: vec![
                entry("w1m", "Emma", "Central", 1),
                entry("m1m", "Liam", "Central", 1),
                entry("w3m", "Sophia", "Oak Ridge", 1),
            ],
        };
        let mut s = settings(3);
        s.event_combinations = vec![vec!["w1m".to_string(), "m1m".to_string()]];
        let (o, _) = meet(s, &roster);
        o.start().unwrap();

        let groups = o.combined_events();
        assert_eq!(groups.len(), 1);
        let ids: Vec<&str> = groups[0].tracks.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["w1m", "m1m"]);
        assert_eq!(groups[0].tracks[1].current.as_ref().unwrap().participant_name, "Liam");
    }

    #[test]
    fn test_announcer_toggle_is_reflected_in_snapshot() {
        let (o, _) = meet(settings(3), &single_event(&["Emma"], 1));
        assert!(!o.snapshot().announcing);
        o.set_announcing(true);
        assert!(o.snapshot().announcing);
    }
}
