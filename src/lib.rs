//! DiveMeet - Meet execution and scoring engine for diving competitions
//!
//! This library runs live diving meets: it keeps the dive queue of every
//! event, collects raw scores from a panel of judges (at the scoring table
//! or from remote judge devices), aggregates them into dive totals and
//! moves each event along as dives are scored.
//!
//! # Features
//!
//! - Several events running in parallel, each with its own dive queue
//! - Concurrent per-judge submission with exactly-once finalization
//! - Trimmed aggregation for panels of five or more judges
//! - Pause/resume with buffered submissions replayed in order
//! - Announcer lines and a live notification feed
//! - Event and team standings
//!
//! # Architecture
//!
//! - **Engine**: in-memory meet state and scoring rules
//! - **Services**: registry of live meets
//! - **Handlers**: HTTP request handlers (thin layer)
//! - **Models**: Domain models

pub mod config;
pub mod constants;
pub mod engine;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod state;
pub mod utils;

use axum::Router;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

// Re-export commonly used types
pub use config::Config;
pub use engine::MeetOrchestrator;
pub use error::{AppError, AppResult};
pub use state::AppState;

/// Build the full HTTP application around `state`
pub fn app(state: AppState) -> Router {
    Router::new()
        .nest(constants::API_BASE_PATH, handlers::routes())
        .layer(axum::middleware::from_fn(middleware::logging_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
