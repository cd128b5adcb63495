use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use super::{
    models::MessageModel,
    repository::MessageRepository,
    types::CreateMessageRequest,
};
use crate::participant::repository::ParticipantRepository;
use crate::shared::{parse_json_body, AppError};

/// Service for handling message business logic
pub struct MessageService {
    repository: Arc<dyn MessageRepository + Send + Sync>,
    participant_repository: Arc<dyn ParticipantRepository + Send + Sync>,
}

impl MessageService {
    pub fn new(
        repository: Arc<dyn MessageRepository + Send + Sync>,
        participant_repository: Arc<dyn ParticipantRepository + Send + Sync>,
    ) -> Self {
        Self {
            repository,
            participant_repository,
        }
    }

    /// Stores a message from a registered participant
    ///
    /// The sender must be registered before the body is even decoded, so an
    /// unknown sender never sees field-level or malformed-body errors.
    #[instrument(skip(self, body))]
    pub async fn post_message(
        &self,
        user: Option<&str>,
        body: &[u8],
    ) -> Result<MessageModel, AppError> {
        let user = match user {
            Some(user) if !user.is_empty() => user,
            _ => {
                warn!("Message posted without a user header");
                return Err(AppError::Unregistered(
                    "Sender is not a registered participant".to_string(),
                ));
            }
        };

        if self
            .participant_repository
            .get_participant(user)
            .await?
            .is_none()
        {
            warn!(user = %user, "Message posted by unregistered participant");
            return Err(AppError::Unregistered(format!(
                "{} is not a registered participant",
                user
            )));
        }

        let validated = parse_json_body::<CreateMessageRequest>(body)?.validate()?;
        let message = MessageModel::new(
            user.to_string(),
            validated.to,
            validated.text,
            validated.kind,
        );

        self.repository.insert_message(&message).await?;

        info!(from = %message.from, to = %message.to, kind = %message.kind, "Message stored");
        Ok(message)
    }

    /// Messages visible to `user`, trimmed to the last `limit` when given.
    /// A limit larger than the visible set yields nothing.
    #[instrument(skip(self))]
    pub async fn list_messages(
        &self,
        user: &str,
        limit: Option<usize>,
    ) -> Result<Vec<MessageModel>, AppError> {
        let mut messages = self.repository.list_visible_to(user).await?;

        if let Some(limit) = limit {
            if messages.len() < limit {
                messages.clear();
            } else {
                let skip = messages.len() - limit;
                messages.drain(..skip);
            }
        }

        debug!(user = %user, count = messages.len(), "Messages listed");
        Ok(messages)
    }
}
