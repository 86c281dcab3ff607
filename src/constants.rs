//! Application-wide constants
//!
//! This module contains all constant values used throughout the application.
//! Constants are grouped by their purpose for better organization.

// =============================================================================
// SERVER DEFAULTS
// =============================================================================

/// Default server host address
pub const DEFAULT_SERVER_HOST: &str = "0.0.0.0";

/// Default server port
pub const DEFAULT_SERVER_PORT: u16 = 8080;

/// Default log output format
pub const DEFAULT_LOG_FORMAT: &str = "pretty";

// =============================================================================
// JUDGING RULES
// =============================================================================

/// Lowest raw score a judge may award
pub const MIN_SCORE: f64 = 0.0;

/// Highest raw score a judge may award
pub const MAX_SCORE: f64 = 10.0;

/// Raw scores are awarded in half-point increments
pub const SCORE_INCREMENT: f64 = 0.5;

/// Panel size at which the single highest and lowest scores are dropped
pub const TRIM_THRESHOLD: usize = 5;

/// Default number of judges on a panel
pub const DEFAULT_JUDGE_COUNT: usize = 3;

/// Largest panel the engine accepts
pub const MAX_JUDGE_COUNT: usize = 9;

/// Team points awarded by finishing place within an event (1st, 2nd, ...)
pub const PLACEMENT_POINTS: &[u32] = &[9, 7, 6, 5, 4, 3, 2, 1];

// =============================================================================
// NOTIFICATIONS
// =============================================================================

/// Default buffer size of the live broadcast channel
pub const DEFAULT_NOTIFICATION_CHANNEL_CAPACITY: usize = 256;

// =============================================================================
// VALIDATION
// =============================================================================

/// Maximum meet name length
pub const MAX_MEET_NAME_LENGTH: u64 = 256;

/// Maximum meet location length
pub const MAX_MEET_LOCATION_LENGTH: u64 = 256;

/// Maximum event name length
pub const MAX_EVENT_NAME_LENGTH: u64 = 128;

/// Maximum participant / team name length
pub const MAX_PERSON_NAME_LENGTH: u64 = 128;

// =============================================================================
// API VERSIONING
// =============================================================================

/// Current API version
pub const API_VERSION: &str = "v1";

/// API base path
pub const API_BASE_PATH: &str = "/api/v1";
