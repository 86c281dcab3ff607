//! Business logic services

pub mod meet_service;

pub use meet_service::{MeetHandle, MeetRegistry, MeetService};
