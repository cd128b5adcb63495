use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
};
use std::sync::Arc;
use tracing::instrument;

use super::service::PresenceService;
use crate::shared::{user_header, AppError, AppState};

/// Liveness check
///
/// GET /status
pub async fn status_check() -> &'static str {
    "ola"
}

/// HTTP handler for participant heartbeats
///
/// POST /status
/// Returns 404 when the `user` header is missing or names nobody
#[instrument(name = "heartbeat", skip(state, headers))]
pub async fn heartbeat(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<StatusCode, AppError> {
    let service = PresenceService::new(Arc::clone(&state.participant_repository));
    service.record_heartbeat(user_header(&headers)).await?;

    Ok(StatusCode::OK)
}
