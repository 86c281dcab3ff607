//! Input validation utilities

use crate::constants::{MAX_SCORE, MIN_SCORE, SCORE_INCREMENT};

/// Validate a raw judge score: within range and on a half-point step
pub fn validate_score(score: f64) -> Result<(), &'static str> {
    if !score.is_finite() {
        return Err("Score must be a finite number");
    }
    if !(MIN_SCORE..=MAX_SCORE).contains(&score) {
        return Err("Score must be between 0.0 and 10.0");
    }
    if (score / SCORE_INCREMENT).fract() != 0.0 {
        return Err("Score must be given in 0.5 increments");
    }
    Ok(())
}

/// Validate a dive's degree of difficulty
pub fn validate_difficulty(difficulty: f64) -> Result<(), &'static str> {
    if !difficulty.is_finite() || difficulty <= 0.0 {
        return Err("Degree of difficulty must be a positive number");
    }
    if difficulty > 5.0 {
        return Err("Degree of difficulty must be at most 5.0");
    }
    Ok(())
}

/// Validate a track identifier used in URLs and combination groups
pub fn validate_track_id(id: &str) -> Result<(), &'static str> {
    if id.is_empty() {
        return Err("Track id cannot be empty");
    }
    if id.len() > 64 {
        return Err("Track id must be at most 64 characters");
    }
    if !id
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        return Err("Track id can only contain letters, numbers, underscores, and hyphens");
    }
    Ok(())
}

/// Sanitize string input (remove control characters, trim whitespace)
pub fn sanitize_string(input: &str) -> String {
    input
        .chars()
        .filter(|c| !c.is_control() || *c == '\n' || *c == '\t')
        .collect::<String>()
        .trim()
        .to_string()
}
