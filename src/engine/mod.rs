//! Meet execution engine
//!
//! Everything that decides what happens during a live meet lives here and
//! is independent of the HTTP layer:
//! - `aggregator`: judged totals from a panel of raw scores
//! - `track`: one event's dive queue and its pointer
//! - `orchestrator`: lifecycle, submissions and concurrency for a meet
//! - `notifier`: outbound notifications and their sinks
//! - `results`: event and team standings

pub mod aggregator;
pub mod notifier;
pub mod orchestrator;
pub mod results;
pub mod track;

pub use notifier::{
    AnnouncerNotifier, BroadcastNotifier, Notification, NotificationEnvelope, Notifier,
    NotifierSet,
};
pub use orchestrator::{
    BufferedSubmission, CombinedGroup, MeetOrchestrator, MeetSnapshot, ReplayRejection,
    ResumeReport, TrackSnapshot,
};
pub use results::{EventResults, EventStanding, MeetResults, TeamStanding};
pub use track::{DiverView, EventTrack};
