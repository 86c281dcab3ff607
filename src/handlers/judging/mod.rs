//! Judging handlers

mod handler;
pub mod request;
pub mod response;

pub use handler::*;
pub use request::*;
pub use response::*;

use axum::{routing::post, Router};

use crate::state::AppState;

/// Judging routes, nested under a meet
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/{id}/tracks/{track_id}/scores", post(handler::submit_score))
        .route("/{id}/tracks/{track_id}/panel", post(handler::submit_panel))
}
