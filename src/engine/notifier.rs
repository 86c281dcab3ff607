//! Meet notifications and their sinks
//!
//! The orchestrator emits a [`Notification`] on every state transition and
//! hands it to its sinks. Sinks are presentation-only collaborators: they
//! must not block and they own no engine state. Delivery is fire-and-forget.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::broadcast;
use tracing::{debug, info};
use uuid::Uuid;

use crate::engine::track::DiverView;

/// Something that happened in a running meet
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Notification {
    MeetStarted {
        name: String,
        location: String,
    },
    MeetPaused,
    MeetResumed {
        replayed: usize,
    },
    ScoreFinalized {
        track_id: String,
        diver: DiverView,
        scores: Vec<f64>,
        judged_total: f64,
        round_points: f64,
    },
    DiverAdvanced {
        track_id: String,
        diver: DiverView,
    },
    DiverSkipped {
        track_id: String,
        diver: DiverView,
    },
    EventCompleted {
        track_id: String,
        track_name: String,
    },
    MeetCompleted,
}

impl Notification {
    /// Wire name of the notification, same as its serialized `type`
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MeetStarted { .. } => "meet_started",
            Self::MeetPaused => "meet_paused",
            Self::MeetResumed { .. } => "meet_resumed",
            Self::ScoreFinalized { .. } => "score_finalized",
            Self::DiverAdvanced { .. } => "diver_advanced",
            Self::DiverSkipped { .. } => "diver_skipped",
            Self::EventCompleted { .. } => "event_completed",
            Self::MeetCompleted => "meet_completed",
        }
    }
}

/// A notification stamped with its meet and emission order
#[derive(Debug, Clone, Serialize)]
pub struct NotificationEnvelope {
    pub meet_id: Uuid,
    /// Increases by one per notification within a meet
    pub sequence: u64,
    pub at: DateTime<Utc>,
    #[serde(flatten)]
    pub notification: Notification,
}

/// A consumer of meet notifications
pub trait Notifier: Send + Sync {
    /// Must return promptly; never fails the caller
    fn notify(&self, envelope: &NotificationEnvelope);
}

/// Fans a notification out to every registered sink
#[derive(Clone, Default)]
pub struct NotifierSet {
    sinks: Vec<Arc<dyn Notifier>>,
}

impl NotifierSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, sink: Arc<dyn Notifier>) {
        self.sinks.push(sink);
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}

impl Notifier for NotifierSet {
    fn notify(&self, envelope: &NotificationEnvelope) {
        for sink in &self.sinks {
            sink.notify(envelope);
        }
    }
}

/// Live-scoring sink: publishes every notification on a broadcast channel
///
/// Lossy by design of the channel: slow subscribers see `Lagged` and skip
/// ahead, the engine is never held up.
#[derive(Clone)]
pub struct BroadcastNotifier {
    tx: broadcast::Sender<NotificationEnvelope>,
}

impl BroadcastNotifier {
    /// Create a new broadcaster buffering up to `capacity` notifications
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        info!("Live broadcaster initialized with capacity {}", capacity);
        Self { tx }
    }

    /// Subscribe to notifications emitted from now on
    pub fn subscribe(&self) -> broadcast::Receiver<NotificationEnvelope> {
        self.tx.subscribe()
    }

    /// Number of live subscribers
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Notifier for BroadcastNotifier {
    fn notify(&self, envelope: &NotificationEnvelope) {
        // No subscribers is not an error for a live feed
        if let Ok(count) = self.tx.send(envelope.clone()) {
            debug!(sequence = envelope.sequence, "Broadcast notification to {} subscribers", count);
        }
    }
}

/// Announcer sink: turns notifications into spoken lines
///
/// The speech backend is outside the engine; lines are emitted through
/// `tracing` under the `announcer` target. Can be muted mid-meet.
pub struct AnnouncerNotifier {
    enabled: AtomicBool,
}

impl AnnouncerNotifier {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled: AtomicBool::new(enabled),
        }
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Relaxed);
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }

    /// The line the announcer reads for a notification, if any
    pub fn announcement(notification: &Notification) -> Option<String> {
        match notification {
            Notification::MeetStarted { name, location } => {
                Some(format!("Welcome to the {} at {}", name, location))
            }
            Notification::DiverAdvanced { diver, .. } => Some(format!(
                "{} will now perform {} {} with a difficulty of {:.1}",
                diver.participant_name, diver.dive_number, diver.dive_name, diver.difficulty
            )),
            Notification::ScoreFinalized {
                scores,
                judged_total,
                ..
            } => {
                let read_out = scores
                    .iter()
                    .map(|s| s.to_string())
                    .collect::<Vec<_>>()
                    .join(", ");
                Some(format!(
                    "The scores are {} for a total of {}",
                    read_out, judged_total
                ))
            }
            Notification::EventCompleted { track_name, .. } => {
                Some(format!("That concludes the {}", track_name))
            }
            Notification::MeetCompleted => Some("That concludes today's meet".to_string()),
            Notification::MeetPaused
            | Notification::MeetResumed { .. }
            | Notification::DiverSkipped { .. } => None,
        }
    }
}

impl Notifier for AnnouncerNotifier {
    fn notify(&self, envelope: &NotificationEnvelope) {
        if !self.is_enabled() {
            return;
        }
        if let Some(line) = Self::announcement(&envelope.notification) {
            info!(target: "announcer", meet_id = %envelope.meet_id, "{}", line);
        }
    }
}
