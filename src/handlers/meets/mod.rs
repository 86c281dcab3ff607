//! Meet management handlers

mod handler;
pub mod request;
pub mod response;

pub use handler::*;
pub use request::*;
pub use response::*;

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::state::AppState;

/// Meet routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handler::list_meets))
        .route("/", post(handler::create_meet))
        .route("/{id}", get(handler::get_meet).delete(handler::delete_meet))
        // Lifecycle
        .route("/{id}/start", post(handler::start_meet))
        .route("/{id}/pause", post(handler::pause_meet))
        .route("/{id}/resume", post(handler::resume_meet))
        .route("/{id}/announcer", put(handler::set_announcer))
        // Views
        .route("/{id}/combined", get(handler::get_combined_events))
        .route("/{id}/results", get(handler::get_results))
        .route("/{id}/live", get(handler::live_feed))
        // Tracks
        .route("/{id}/tracks/{track_id}", get(handler::get_track))
        .route("/{id}/tracks/{track_id}/skip", post(handler::skip_diver))
}
