use axum::{
    body::Bytes,
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use std::sync::Arc;
use tracing::{info, instrument, warn};

use super::{
    models::MessageModel,
    service::MessageService,
    types::MessagesQuery,
};
use crate::shared::{user_header, AppError, AppState};

/// HTTP handler for posting a message
///
/// POST /messages
/// Sender is taken from the `user` header. The body is read raw so the
/// registration check answers before any payload error does.
#[instrument(name = "create_message", skip(state, headers, body))]
pub async fn create_message(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<StatusCode, AppError> {
    let service = MessageService::new(
        Arc::clone(&state.message_repository),
        Arc::clone(&state.participant_repository),
    );
    service.post_message(user_header(&headers), &body).await?;

    Ok(StatusCode::CREATED)
}

/// HTTP handler for reading the messages visible to the requester
///
/// GET /messages?limit=N
#[instrument(name = "list_messages", skip(state, headers))]
pub async fn list_messages(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<MessagesQuery>,
) -> Result<Json<Vec<MessageModel>>, AppError> {
    let user = user_header(&headers).ok_or_else(|| {
        warn!("Messages requested without a user header");
        AppError::BadRequest("Missing user header".to_string())
    })?;
    let limit = query.limit()?;

    let service = MessageService::new(
        Arc::clone(&state.message_repository),
        Arc::clone(&state.participant_repository),
    );
    let messages = service.list_messages(user, limit).await?;

    info!(user = %user, message_count = messages.len(), "Messages listed");
    Ok(Json(messages))
}
