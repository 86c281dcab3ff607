//! Domain models
//!
//! This module contains all domain models used throughout the application.

pub mod meet;
pub mod participant;
pub mod roster;
pub mod submission;

pub use meet::*;
pub use participant::*;
pub use roster::*;
pub use submission::*;
