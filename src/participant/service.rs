use std::sync::Arc;
use tracing::{info, instrument, warn};

use super::{
    models::ParticipantModel,
    repository::{InsertParticipantResult, ParticipantRepository},
    types::CreateParticipantRequest,
};
use crate::message::{models::MessageModel, repository::MessageRepository};
use crate::shared::AppError;

/// Service for handling participant business logic
pub struct ParticipantService {
    repository: Arc<dyn ParticipantRepository + Send + Sync>,
    message_repository: Arc<dyn MessageRepository + Send + Sync>,
}

impl ParticipantService {
    pub fn new(
        repository: Arc<dyn ParticipantRepository + Send + Sync>,
        message_repository: Arc<dyn MessageRepository + Send + Sync>,
    ) -> Self {
        Self {
            repository,
            message_repository,
        }
    }

    /// Registers a participant and announces the join to the room
    #[instrument(skip(self))]
    pub async fn register(
        &self,
        request: CreateParticipantRequest,
    ) -> Result<ParticipantModel, AppError> {
        let name = request.validate()?;
        let participant = ParticipantModel::new(name);

        match self.repository.insert_participant(&participant).await? {
            InsertParticipantResult::Created => {}
            InsertParticipantResult::AlreadyExists => {
                warn!(name = %participant.name, "Participant name already registered");
                return Err(AppError::Conflict(format!(
                    "Name already registered: {}",
                    participant.name
                )));
            }
        }

        // The participant is already stored; a lost notice must not fail the registration
        if let Err(e) = self
            .message_repository
            .insert_message(&MessageModel::joined_notice(&participant.name))
            .await
        {
            warn!(name = %participant.name, error = %e, "Failed to announce participant join");
        }

        info!(name = %participant.name, "Participant registered");
        Ok(participant)
    }

    /// Lists every registered participant
    #[instrument(skip(self))]
    pub async fn list_participants(&self) -> Result<Vec<ParticipantModel>, AppError> {
        self.repository.list_participants().await
    }
}
