//! Event and team standings

use std::cmp::Ordering;
use std::collections::HashMap;

use serde::Serialize;

use crate::constants::PLACEMENT_POINTS;
use crate::engine::track::EventTrack;

/// One diver's place in an event
#[derive(Debug, Clone, Serialize)]
pub struct EventStanding {
    /// Competition rank; tied totals share a rank
    pub rank: usize,
    pub participant_id: String,
    pub name: String,
    pub team: String,
    pub total_points: f64,
    pub dives_scored: usize,
}

/// Standings of one event, partial until the track is terminal
#[derive(Debug, Clone, Serialize)]
pub struct EventResults {
    pub track_id: String,
    pub track_name: String,
    pub complete: bool,
    pub standings: Vec<EventStanding>,
}

/// A team's placement points summed over all events
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamStanding {
    pub team: String,
    pub points: u32,
}

/// Results of a whole meet
#[derive(Debug, Clone, Serialize)]
pub struct MeetResults {
    pub events: Vec<EventResults>,
    pub teams: Vec<TeamStanding>,
}

impl MeetResults {
    pub fn from_events(events: Vec<EventResults>) -> Self {
        let teams = team_standings(&events);
        Self { events, teams }
    }
}

/// Rank the participants of a track by total points
pub fn event_results(track: &EventTrack) -> EventResults {
    let mut rows: Vec<EventStanding> = track
        .participants()
        .iter()
        .map(|p| EventStanding {
            rank: 0,
            participant_id: p.id.clone(),
            name: p.name.clone(),
            team: p.team.clone(),
            total_points: p.total_points(),
            dives_scored: p.dives_scored(),
        })
        .collect();

    rows.sort_by(|a, b| {
        b.total_points
            .total_cmp(&a.total_points)
            .then_with(|| a.name.cmp(&b.name))
    });

    let mut previous: Option<(f64, usize)> = None;
    for (index, row) in rows.iter_mut().enumerate() {
        row.rank = match previous {
            Some((total, rank)) if total.total_cmp(&row.total_points) == Ordering::Equal => rank,
            _ => index + 1,
        };
        previous = Some((row.total_points, row.rank));
    }

    EventResults {
        track_id: track.id().to_string(),
        track_name: track.name().to_string(),
        complete: track.is_terminal(),
        standings: rows,
    }
}

/// Award placement points per event and total them by team
///
/// 1st through 8th earn 9, 7, 6, 5, 4, 3, 2, 1; tied divers each earn the
/// points of the place they share.
pub fn team_standings(events: &[EventResults]) -> Vec<TeamStanding> {
    let mut totals: HashMap<&str, u32> = HashMap::new();
    for event in events {
        for row in &event.standings {
            let points = PLACEMENT_POINTS.get(row.rank - 1).copied().unwrap_or(0);
            *totals.entry(row.team.as_str()).or_insert(0) += points;
        }
    }

    let mut teams: Vec<TeamStanding> = totals
        .into_iter()
        .map(|(team, points)| TeamStanding {
            team: team.to_string(),
            points,
        })
        .collect();
    teams.sort_by(|a, b| b.points.cmp(&a.points).then_with(|| a.team.cmp(&b.team)));
    teams
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::track::tests::{entry, event};
    use crate::models::{RosterEntry, ScoringPolicy};

    fn scored_track(id: &str, divers: &[(&str, &str, [f64; 3])]) -> EventTrack {
        let entries: Vec<RosterEntry> = divers
            .iter()
            .map(|(name, team, _)| entry(id, name, team, 1))
            .collect();
        let refs: Vec<&RosterEntry> = entries.iter().collect();
        let mut track = EventTrack::new(&event(id, 1), &refs);
        for (_, _, panel) in divers {
            let target = track.resolve_target(None).unwrap();
            track
                .record_panel(target, panel, 3, ScoringPolicy::JudgedTotal)
                .unwrap();
            track.advance().unwrap();
        }
        track
    }

    #[test]
    fn test_event_ranking_with_tie() {
        let track = scored_track(
            "w1m",
            &[
                ("Emma", "Central", [6.0, 6.0, 6.0]),
                ("Michael", "Westside", [7.0, 7.0, 7.0]),
                ("Sophia", "Oak Ridge", [6.0, 6.0, 6.0]),
            ],
        );
        let results = event_results(&track);
        assert!(results.complete);
        let ranks: Vec<(usize, &str)> = results
            .standings
            .iter()
            .map(|s| (s.rank, s.name.as_str()))
            .collect();
        assert_eq!(ranks, vec![(1, "Michael"), (2, "Emma"), (2, "Sophia")]);
    }

    #[test]
    fn test_team_standings_from_placements() {
        let a = event_results(&scored_track(
            "w1m",
            &[
                ("Emma", "Central", [8.0, 8.0, 8.0]),
                ("Michael", "Westside", [7.0, 7.0, 7.0]),
            ],
        ));
        let b = event_results(&scored_track(
            "m3m",
            &[
                ("Liam", "Central", [5.0, 5.0, 5.0]),
                ("Noah", "Westside", [6.0, 6.0, 6.0]),
            ],
        ));
        let teams = team_standings(&[a, b]);
        assert_eq!(
            teams,
            vec![
                TeamStanding { team: "Central".to_string(), points: 16 },
                TeamStanding { team: "Westside".to_string(), points: 16 },
            ]
        );
    }

    #[test]
    fn test_places_past_eighth_earn_nothing() {
        let divers: Vec<(String, [f64; 3])> = (0..9)
            .map(|i| (format!("Diver{}", i), [9.0 - i as f64 * 0.5; 3]))
            .collect();
        let borrowed: Vec<(&str, &str, [f64; 3])> = divers
            .iter()
            .map(|(n, p)| (n.as_str(), n.as_str(), *p))
            .collect();
        let results = event_results(&scored_track("w3m", &borrowed));
        let teams = team_standings(&[results]);
        let last = teams.iter().find(|t| t.team == "Diver8").unwrap();
        assert_eq!(last.points, 0);
        assert_eq!(teams[0].points, 9);
    }
}
