use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::shared::AppState;
use crate::{message, participant, presence};

/// Builds the HTTP router for the chat room
pub fn router(app_state: AppState) -> Router {
    Router::new()
        .route(
            "/status",
            get(presence::status_check).post(presence::heartbeat),
        )
        .route(
            "/participants",
            post(participant::create_participant).get(participant::list_participants),
        )
        .route(
            "/messages",
            post(message::create_message).get(message::list_messages),
        )
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}
