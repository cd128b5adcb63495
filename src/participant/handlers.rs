use axum::{body::Bytes, extract::State, http::StatusCode, Json};
use std::sync::Arc;
use tracing::{info, instrument};

use super::{models::ParticipantModel, service::ParticipantService, types::CreateParticipantRequest};
use crate::shared::{parse_json_body, AppError, AppState};

/// HTTP handler for registering a participant
///
/// POST /participants
/// Returns 201 on success, 409 when the name is taken
#[instrument(name = "create_participant", skip(state, body))]
pub async fn create_participant(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<StatusCode, AppError> {
    let request = parse_json_body::<CreateParticipantRequest>(&body)?;

    let service = ParticipantService::new(
        Arc::clone(&state.participant_repository),
        Arc::clone(&state.message_repository),
    );
    let participant = service.register(request).await?;

    info!(name = %participant.name, "Participant created");
    Ok(StatusCode::CREATED)
}

/// HTTP handler for listing participants
///
/// GET /participants
#[instrument(name = "list_participants", skip(state))]
pub async fn list_participants(
    State(state): State<AppState>,
) -> Result<Json<Vec<ParticipantModel>>, AppError> {
    let service = ParticipantService::new(
        Arc::clone(&state.participant_repository),
        Arc::clone(&state.message_repository),
    );
    let participants = service.list_participants().await?;

    info!(participant_count = participants.len(), "Participants listed");
    Ok(Json(participants))
}
