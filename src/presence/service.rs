use std::sync::Arc;
use tracing::{debug, instrument, warn};

use crate::participant::{models::now_millis, repository::ParticipantRepository};
use crate::shared::AppError;

/// Service for tracking participant liveness
pub struct PresenceService {
    participant_repository: Arc<dyn ParticipantRepository + Send + Sync>,
}

impl PresenceService {
    pub fn new(participant_repository: Arc<dyn ParticipantRepository + Send + Sync>) -> Self {
        Self {
            participant_repository,
        }
    }

    /// Records a heartbeat for `user`
    #[instrument(skip(self))]
    pub async fn record_heartbeat(&self, user: Option<&str>) -> Result<(), AppError> {
        let user = user.ok_or_else(|| {
            warn!("Heartbeat without a user header");
            AppError::NotFound("Missing user header".to_string())
        })?;

        if !self
            .participant_repository
            .touch_participant(user, now_millis())
            .await?
        {
            warn!(user = %user, "Heartbeat from unknown participant");
            return Err(AppError::NotFound(format!(
                "{} is not a registered participant",
                user
            )));
        }

        debug!(user = %user, "Heartbeat recorded");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::participant::models::ParticipantModel;
    use crate::participant::repository::InMemoryParticipantRepository;

    #[tokio::test]
    async fn test_record_heartbeat_updates_last_status() {
        let stale = ParticipantModel {
            name: "Maria".to_string(),
            last_status: now_millis() - 60_000,
        };
        let repo = Arc::new(InMemoryParticipantRepository::with_participants(vec![
            stale.clone(),
        ]));
        let service = PresenceService::new(repo.clone());

        service.record_heartbeat(Some("Maria")).await.unwrap();

        let updated = repo.get_participant("Maria").await.unwrap().unwrap();
        assert!(updated.last_status > stale.last_status);
    }

    #[tokio::test]
    async fn test_record_heartbeat_without_user() {
        let service = PresenceService::new(Arc::new(InMemoryParticipantRepository::new()));

        let result = service.record_heartbeat(None).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_record_heartbeat_unknown_participant() {
        let repo = Arc::new(InMemoryParticipantRepository::new());
        let service = PresenceService::new(repo.clone());

        let result = service.record_heartbeat(Some("ghost")).await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
        assert_eq!(repo.participant_count(), 0);
    }
}
