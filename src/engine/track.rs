//! Event tracks
//!
//! An [`EventTrack`] is the dive queue of one event: participants in running
//! order, each with a fixed dive sheet, and a pointer to the dive being
//! performed. The pointer only moves forward, one attempt at a time, either
//! after the current attempt has been scored or through an explicit skip.
//! `None` is the terminal "no current diver" position.

use serde::Serialize;

use crate::engine::aggregator;
use crate::error::{AppError, AppResult};
use crate::models::{
    AttemptRef, Board, DiveAttempt, Division, EventDefinition, Participant, RosterEntry,
    ScoringPolicy,
};
use crate::utils::validate_score;

/// Result of storing one raw score
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScoreRecord {
    /// Stored; waiting for the rest of the panel
    Pending { received: usize },
    /// The panel is complete and the attempt is finalized
    Finalized { judged_total: f64, round_points: f64 },
}

/// Presentation view of one diver and dive, used for notifications and
/// snapshots
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiverView {
    pub attempt: AttemptRef,
    pub participant_id: String,
    pub participant_name: String,
    pub team: String,
    pub dive_number: String,
    pub dive_name: String,
    pub difficulty: f64,
}

/// One independently-progressing event
#[derive(Debug, Clone)]
pub struct EventTrack {
    id: String,
    name: String,
    division: Division,
    board: Board,
    participants: Vec<Participant>,
    pointer: Option<AttemptRef>,
}

impl EventTrack {
    /// Build a track from an event definition and its entries, in roster order
    pub fn new(event: &EventDefinition, entries: &[&RosterEntry]) -> Self {
        let participants = entries
            .iter()
            .map(|entry| Participant {
                id: entry.participant_id.clone(),
                name: entry.name.clone(),
                team: entry.team.clone(),
                dives: entry
                    .dives
                    .iter()
                    .map(|d| DiveAttempt::new(d.number.clone(), d.name.clone(), d.difficulty))
                    .collect(),
            })
            .collect();

        let mut track = Self {
            id: event.id.clone(),
            name: event.name.clone(),
            division: event.division,
            board: event.board,
            participants,
            pointer: None,
        };
        track.pointer = track.first_from(0);
        track
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn division(&self) -> Division {
        self.division
    }

    pub fn board(&self) -> Board {
        self.board
    }

    pub fn participants(&self) -> &[Participant] {
        &self.participants
    }

    /// Current position, `None` once the track is terminal
    pub fn pointer(&self) -> Option<AttemptRef> {
        self.pointer
    }

    pub fn is_terminal(&self) -> bool {
        self.pointer.is_none()
    }

    /// True when some participant has an empty dive sheet
    pub fn has_empty_sheet(&self) -> bool {
        self.participants.iter().any(|p| p.dives.is_empty())
    }

    /// Total number of attempts and how many are closed (scored or skipped)
    pub fn progress(&self) -> (usize, usize) {
        let dives = self.participants.iter().flat_map(|p| p.dives.iter());
        let (total, closed) = dives.fold((0, 0), |(total, closed), d| {
            (total + 1, closed + usize::from(d.is_closed()))
        });
        (closed, total)
    }

    /// The diver on the board and the dive they are performing
    pub fn current_diver(&self) -> Option<(&Participant, &DiveAttempt)> {
        self.pointer.and_then(|p| self.lookup(p))
    }

    /// Position of the attempt immediately after the current one
    pub fn on_deck(&self) -> Option<AttemptRef> {
        self.pointer.and_then(|p| self.next_after(p))
    }

    /// The attempt immediately after the current one
    pub fn on_deck_diver(&self) -> Option<(&Participant, &DiveAttempt)> {
        self.on_deck().and_then(|p| self.lookup(p))
    }

    /// Build a presentation view of the attempt at `attempt`
    pub fn describe(&self, attempt: AttemptRef) -> Option<DiverView> {
        self.lookup(attempt).map(|(participant, dive)| DiverView {
            attempt,
            participant_id: participant.id.clone(),
            participant_name: participant.name.clone(),
            team: participant.team.clone(),
            dive_number: dive.number.clone(),
            dive_name: dive.name.clone(),
            difficulty: dive.difficulty,
        })
    }

    /// Move past the current attempt once it has been scored
    ///
    /// Returns the new pointer; `None` means the event is complete.
    pub fn advance(&mut self) -> AppResult<Option<AttemptRef>> {
        let current = self.require_current()?;
        if !self.attempt(current).completed {
            return Err(AppError::InvalidState(format!(
                "cannot advance track '{}': attempt {} has not been scored",
                self.id, current
            )));
        }
        self.pointer = self.next_after(current);
        Ok(self.pointer)
    }

    /// Administrative skip: close the current attempt without a score
    ///
    /// Returns the skipped attempt and the new pointer.
    pub fn skip_current(&mut self) -> AppResult<(AttemptRef, Option<AttemptRef>)> {
        let current = self.require_current()?;
        self.check_open(current)?;
        self.attempt_mut(current).skipped = true;
        self.pointer = self.next_after(current);
        Ok((current, self.pointer))
    }

    /// Resolve which attempt a submission is aimed at
    ///
    /// Without an explicit reference this is the current attempt. An explicit
    /// reference outside the dive sheets is `NotFound`; one that is not the
    /// current attempt is stale and `InvalidState`.
    pub fn resolve_target(&self, requested: Option<AttemptRef>) -> AppResult<AttemptRef> {
        if let Some(r) = requested {
            if self.lookup(r).is_none() {
                return Err(AppError::NotFound(format!(
                    "attempt {} does not exist on track '{}'",
                    r, self.id
                )));
            }
        }
        let current = self.require_current()?;
        match requested {
            Some(r) if r != current => Err(AppError::InvalidState(format!(
                "attempt {} is not the current dive on track '{}' (current is {})",
                r, self.id, current
            ))),
            _ => Ok(current),
        }
    }

    /// Store one judge's raw score for `target`
    ///
    /// Finalizes the attempt when the panel reaches `judge_count`. Nothing is
    /// written when an error is returned.
    pub fn record_score(
        &mut self,
        target: AttemptRef,
        judge_slot: u8,
        value: f64,
        judge_count: usize,
        policy: ScoringPolicy,
    ) -> AppResult<ScoreRecord> {
        check_slot(judge_slot, judge_count)?;
        validate_score(value).map_err(|msg| AppError::InvalidScore(format!("{}: {}", msg, value)))?;
        self.check_open(target)?;

        let attempt = self.attempt_mut(target);
        if attempt.scores.contains_key(&judge_slot) {
            return Err(AppError::DuplicateSubmission { slot: judge_slot });
        }

        let received = attempt.scores.len() + 1;
        if received < judge_count {
            attempt.scores.insert(judge_slot, value);
            return Ok(ScoreRecord::Pending { received });
        }

        let mut panel = attempt.raw_scores();
        panel.push(value);
        let judged_total = aggregator::aggregate(&panel, judge_count)?;
        attempt.scores.insert(judge_slot, value);
        Ok(finalize(attempt, judged_total, policy))
    }

    /// Store a whole panel for `target` at once (scoring-table entry)
    ///
    /// Scores are assigned to slots 1..=n in order. All-or-nothing.
    pub fn record_panel(
        &mut self,
        target: AttemptRef,
        scores: &[f64],
        judge_count: usize,
        policy: ScoringPolicy,
    ) -> AppResult<ScoreRecord> {
        self.check_open(target)?;
        let attempt = self.attempt_mut(target);
        if !attempt.scores.is_empty() {
            return Err(AppError::InvalidState(format!(
                "attempt {} already has {} individual judge scores",
                target,
                attempt.scores.len()
            )));
        }

        let judged_total = aggregator::aggregate(scores, judge_count)?;
        for (slot, &value) in (1u8..).zip(scores) {
            attempt.scores.insert(slot, value);
        }
        Ok(finalize(attempt, judged_total, policy))
    }

    fn require_current(&self) -> AppResult<AttemptRef> {
        self.pointer.ok_or_else(|| {
            AppError::InvalidState(format!("track '{}' has no current diver", self.id))
        })
    }

    fn check_open(&self, target: AttemptRef) -> AppResult<()> {
        let attempt = self
            .lookup(target)
            .map(|(_, a)| a)
            .ok_or_else(|| AppError::NotFound(format!("attempt {} on track '{}'", target, self.id)))?;
        if attempt.is_closed() {
            return Err(AppError::InvalidState(format!(
                "attempt {} on track '{}' is already closed",
                target, self.id
            )));
        }
        Ok(())
    }

    fn lookup(&self, r: AttemptRef) -> Option<(&Participant, &DiveAttempt)> {
        let participant = self.participants.get(r.participant_index)?;
        let dive = participant.dives.get(r.dive_index)?;
        Some((participant, dive))
    }

    // Only called with references already checked by `lookup`.
    fn attempt(&self, r: AttemptRef) -> &DiveAttempt {
        &self.participants[r.participant_index].dives[r.dive_index]
    }

    fn attempt_mut(&mut self, r: AttemptRef) -> &mut DiveAttempt {
        &mut self.participants[r.participant_index].dives[r.dive_index]
    }

    /// Next dive of the same participant, else the first dive of the next
    /// participant with a non-empty sheet
    fn next_after(&self, r: AttemptRef) -> Option<AttemptRef> {
        let dives = self.participants.get(r.participant_index)?.dives.len();
        if r.dive_index + 1 < dives {
            return Some(AttemptRef::new(r.participant_index, r.dive_index + 1));
        }
        self.first_from(r.participant_index + 1)
    }

    fn first_from(&self, participant_index: usize) -> Option<AttemptRef> {
        self.participants
            .iter()
            .enumerate()
            .skip(participant_index)
            .find(|(_, p)| !p.dives.is_empty())
            .map(|(i, _)| AttemptRef::new(i, 0))
    }
}

fn check_slot(judge_slot: u8, judge_count: usize) -> AppResult<()> {
    if judge_slot == 0 || usize::from(judge_slot) > judge_count {
        return Err(AppError::NotFound(format!(
            "judge slot {} (panel has slots 1..={})",
            judge_slot, judge_count
        )));
    }
    Ok(())
}

fn finalize(attempt: &mut DiveAttempt, judged_total: f64, policy: ScoringPolicy) -> ScoreRecord {
    let round_points = policy.apply(judged_total, attempt.difficulty);
    attempt.judged_total = Some(judged_total);
    attempt.round_points = Some(round_points);
    attempt.completed = true;
    ScoreRecord::Finalized {
        judged_total,
        round_points,
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::models::DiveEntry;

    pub(crate) fn event(id: &str, dive_count: usize) -> EventDefinition {
        EventDefinition {
            id: id.to_string(),
            name: format!("Event {}", id),
            division: Division::Womens,
            board: Board::OneMeter,
            dive_count,
            order: 0,
        }
    }

    pub(crate) fn entry(event_id: &str, who: &str, team: &str, dives: usize) -> RosterEntry {
        RosterEntry {
            event_id: event_id.to_string(),
            participant_id: who.to_lowercase(),
            name: who.to_string(),
            team: team.to_string(),
            dives: (0..dives)
                .map(|i| DiveEntry {
                    number: format!("10{}C", i + 1),
                    name: format!("Forward dive {}", i + 1),
                    difficulty: 1.2 + i as f64 * 0.2,
                })
                .collect(),
        }
    }

    fn track(sheets: &[usize]) -> EventTrack {
        let entries: Vec<RosterEntry> = sheets
            .iter()
            .enumerate()
            .map(|(i, &n)| entry("t1", &format!("Diver{}", i), "Central", n))
            .collect();
        let refs: Vec<&RosterEntry> = entries.iter().collect();
        EventTrack::new(&event("t1", 2), &refs)
    }

    fn score_all(track: &mut EventTrack, scores: &[f64]) -> ScoreRecord {
        let target = track.resolve_target(None).unwrap();
        let mut last = None;
        for (slot, &value) in (1u8..).zip(scores) {
            last = Some(
                track
                    .record_score(target, slot, value, scores.len(), ScoringPolicy::JudgedTotal)
                    .unwrap(),
            );
        }
        last.unwrap()
    }

    #[test]
    fn test_current_and_on_deck_roll_over() {
        let t = track(&[2, 1]);
        let (p, d) = t.current_diver().unwrap();
        assert_eq!(p.name, "Diver0");
        assert_eq!(d.number, "101C");

        let (p, d) = t.on_deck_diver().unwrap();
        assert_eq!(p.name, "Diver0");
        assert_eq!(d.number, "102C");
    }

    #[test]
    fn test_on_deck_moves_to_next_participant() {
        let mut t = track(&[1, 2]);
        assert_eq!(t.on_deck_diver().unwrap().0.name, "Diver1");

        score_all(&mut t, &[6.0, 7.0, 7.5]);
        assert_eq!(t.advance().unwrap(), Some(AttemptRef::new(1, 0)));
        assert_eq!(t.on_deck_diver().unwrap().1.number, "102C");

        score_all(&mut t, &[6.0, 7.0, 7.5]);
        t.advance().unwrap();
        assert!(t.on_deck_diver().is_none());
        assert!(t.current_diver().is_some());
    }

    #[test]
    fn test_advance_requires_completed_attempt() {
        let mut t = track(&[2]);
        let before = t.pointer();
        assert!(matches!(t.advance(), Err(AppError::InvalidState(_))));
        assert_eq!(t.pointer(), before);

        let target = t.resolve_target(None).unwrap();
        t.record_score(target, 1, 6.0, 3, ScoringPolicy::JudgedTotal)
            .unwrap();
        assert!(matches!(t.advance(), Err(AppError::InvalidState(_))));
        assert_eq!(t.pointer(), before);
    }

    #[test]
    fn test_advance_to_terminal_then_rejects() {
        let mut t = track(&[1]);
        score_all(&mut t, &[6.0, 7.0, 7.5]);
        assert_eq!(t.advance().unwrap(), None);
        assert!(t.is_terminal());
        assert!(t.current_diver().is_none());
        assert!(matches!(t.advance(), Err(AppError::InvalidState(_))));
    }

    #[test]
    fn test_panel_finalizes_once() {
        let mut t = track(&[2]);
        let record = score_all(&mut t, &[6.0, 7.0, 7.5]);
        assert_eq!(
            record,
            ScoreRecord::Finalized {
                judged_total: 20.5,
                round_points: 20.5
            }
        );

        // Same attempt, before advancing: closed
        let target = t.pointer().unwrap();
        let err = t
            .record_score(target, 2, 9.0, 3, ScoringPolicy::JudgedTotal)
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidState(_)));
        assert_eq!(t.current_diver().unwrap().1.judged_total, Some(20.5));
    }

    #[test]
    fn test_duplicate_slot_leaves_attempt_untouched() {
        let mut t = track(&[1]);
        let target = t.resolve_target(None).unwrap();
        t.record_score(target, 2, 6.0, 3, ScoringPolicy::JudgedTotal)
            .unwrap();
        let err = t
            .record_score(target, 2, 8.0, 3, ScoringPolicy::JudgedTotal)
            .unwrap_err();
        assert!(matches!(err, AppError::DuplicateSubmission { slot: 2 }));
        assert_eq!(t.current_diver().unwrap().1.scores.get(&2), Some(&6.0));
    }

    #[test]
    fn test_bad_slot_and_score() {
        let mut t = track(&[1]);
        let target = t.resolve_target(None).unwrap();
        assert!(matches!(
            t.record_score(target, 4, 6.0, 3, ScoringPolicy::JudgedTotal),
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            t.record_score(target, 0, 6.0, 3, ScoringPolicy::JudgedTotal),
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            t.record_score(target, 1, 6.2, 3, ScoringPolicy::JudgedTotal),
            Err(AppError::InvalidScore(_))
        ));
        assert!(t.current_diver().unwrap().1.scores.is_empty());
    }

    #[test]
    fn test_resolve_target_addressing() {
        let t = track(&[2]);
        assert_eq!(
            t.resolve_target(Some(AttemptRef::new(0, 0))).unwrap(),
            AttemptRef::new(0, 0)
        );
        assert!(matches!(
            t.resolve_target(Some(AttemptRef::new(0, 1))),
            Err(AppError::InvalidState(_))
        ));
        assert!(matches!(
            t.resolve_target(Some(AttemptRef::new(3, 0))),
            Err(AppError::NotFound(_))
        ));
    }

    #[test]
    fn test_skip_last_dive_is_terminal() {
        let mut t = track(&[1]);
        let (skipped, next) = t.skip_current().unwrap();
        assert_eq!(skipped, AttemptRef::new(0, 0));
        assert_eq!(next, None);
        assert!(t.is_terminal());
        assert!(t.participants()[0].dives[0].skipped);
        assert_eq!(t.progress(), (1, 1));
        assert!(matches!(t.skip_current(), Err(AppError::InvalidState(_))));
    }

    #[test]
    fn test_record_panel_is_atomic() {
        let mut t = track(&[1]);
        let target = t.resolve_target(None).unwrap();
        assert!(matches!(
            t.record_panel(target, &[9.0, 6.5, 7.0, 7.5, 11.0], 5, ScoringPolicy::JudgedTotal),
            Err(AppError::InvalidScore(_))
        ));
        assert!(t.current_diver().unwrap().1.scores.is_empty());

        let record = t
            .record_panel(target, &[9.0, 6.5, 7.0, 7.5, 10.0], 5, ScoringPolicy::JudgedTotal)
            .unwrap();
        assert_eq!(
            record,
            ScoreRecord::Finalized {
                judged_total: 23.5,
                round_points: 23.5
            }
        );
        assert_eq!(t.current_diver().unwrap().1.scores.len(), 5);
    }

    #[test]
    fn test_empty_sheets_are_passed_over() {
        let t = track(&[0, 1]);
        assert_eq!(t.pointer(), Some(AttemptRef::new(1, 0)));
        assert!(t.has_empty_sheet());

        let empty = track(&[]);
        assert!(empty.is_terminal());
        assert!(empty.on_deck_diver().is_none());
    }
}
