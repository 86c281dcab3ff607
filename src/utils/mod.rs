//! Utility functions

pub mod time;
pub mod validation;

pub use time::now_utc;
pub use validation::{sanitize_string, validate_score};
