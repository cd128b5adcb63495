use axum::{
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use thiserror::Error;

use crate::message::repository::MessageRepository;
use crate::participant::repository::ParticipantRepository;

/// Shared application state containing all dependencies
#[derive(Clone)]
pub struct AppState {
    pub participant_repository: Arc<dyn ParticipantRepository + Send + Sync>,
    pub message_repository: Arc<dyn MessageRepository + Send + Sync>,
}

impl AppState {
    pub fn new(
        participant_repository: Arc<dyn ParticipantRepository + Send + Sync>,
        message_repository: Arc<dyn MessageRepository + Send + Sync>,
    ) -> Self {
        Self {
            participant_repository,
            message_repository,
        }
    }
}

/// Header naming the participant making the request
pub const USER_HEADER: &str = "user";

/// Reads the `user` header, accepting UTF-8 names. Empty values count as absent.
pub fn user_header(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(USER_HEADER)
        .and_then(|value| std::str::from_utf8(value.as_bytes()).ok())
        .map(str::trim)
        .filter(|user| !user.is_empty())
}

/// Decodes a JSON request body. An empty body reads as `{}`.
///
/// Anything that is not a JSON object becomes a validation failure, so
/// malformed payloads get the same 422 treatment as invalid fields.
pub fn parse_json_body<T>(body: &[u8]) -> Result<T, AppError>
where
    T: DeserializeOwned + Default,
{
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }

    let not_an_object =
        || AppError::Validation(vec!["\"value\" must be of type object".to_string()]);

    match serde_json::from_slice::<serde_json::Value>(body) {
        Ok(value @ serde_json::Value::Object(_)) => {
            serde_json::from_value(value).map_err(|_| not_an_object())
        }
        _ => Err(not_an_object()),
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Validation failed: {}", .0.join(", "))]
    Validation(Vec<String>),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unregistered: {0}")]
    Unregistered(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            // Validation failures list every violated rule
            AppError::Validation(details) => {
                return (StatusCode::UNPROCESSABLE_ENTITY, Json(details)).into_response();
            }
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            AppError::Unregistered(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::DatabaseError(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Database error: {}", msg),
            ),
        };

        (status, error_message).into_response()
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::DatabaseError(err.to_string())
    }
}


#[cfg(test)]
pub mod test_utils {
    use super::*;
    use crate::message::models::MessageModel;
    use crate::message::repository::InMemoryMessageRepository;
    use crate::participant::models::ParticipantModel;
    use crate::participant::repository::{InMemoryParticipantRepository, InsertParticipantResult};
    use async_trait::async_trait;
    use std::time::Duration;

    /// Participant repository whose every operation fails - for exercising 500 paths
    pub struct FailingParticipantRepository;

    #[async_trait]
    impl ParticipantRepository for FailingParticipantRepository {
        async fn insert_participant(
            &self,
            _participant: &ParticipantModel,
        ) -> Result<InsertParticipantResult, AppError> {
            Err(AppError::DatabaseError("connection refused".to_string()))
        }
        async fn get_participant(&self, _name: &str) -> Result<Option<ParticipantModel>, AppError> {
            Err(AppError::DatabaseError("connection refused".to_string()))
        }
        async fn list_participants(&self) -> Result<Vec<ParticipantModel>, AppError> {
            Err(AppError::DatabaseError("connection refused".to_string()))
        }
        async fn touch_participant(&self, _name: &str, _now_ms: i64) -> Result<bool, AppError> {
            Err(AppError::DatabaseError("connection refused".to_string()))
        }
        async fn get_inactive_participants(
            &self,
            _inactivity_threshold: Duration,
        ) -> Result<Vec<String>, AppError> {
            Err(AppError::DatabaseError("connection refused".to_string()))
        }
        async fn remove_if_inactive(
            &self,
            _name: &str,
            _inactivity_threshold: Duration,
        ) -> Result<bool, AppError> {
            Err(AppError::DatabaseError("connection refused".to_string()))
        }
    }

    /// Message repository whose every operation fails
    pub struct FailingMessageRepository;

    #[async_trait]
    impl MessageRepository for FailingMessageRepository {
        async fn insert_message(&self, _message: &MessageModel) -> Result<(), AppError> {
            Err(AppError::DatabaseError("connection refused".to_string()))
        }
        async fn list_visible_to(&self, _user: &str) -> Result<Vec<MessageModel>, AppError> {
            Err(AppError::DatabaseError("connection refused".to_string()))
        }
    }

    /// Builder for creating AppState with overrides for testing
    pub struct AppStateBuilder {
        participant_repository: Option<Arc<dyn ParticipantRepository + Send + Sync>>,
        message_repository: Option<Arc<dyn MessageRepository + Send + Sync>>,
    }

    impl AppStateBuilder {
        pub fn new() -> Self {
            Self {
                participant_repository: None,
                message_repository: None,
            }
        }

        pub fn with_participant_repository(
            mut self,
            repo: Arc<dyn ParticipantRepository + Send + Sync>,
        ) -> Self {
            self.participant_repository = Some(repo);
            self
        }

        pub fn with_message_repository(
            mut self,
            repo: Arc<dyn MessageRepository + Send + Sync>,
        ) -> Self {
            self.message_repository = Some(repo);
            self
        }

        pub fn build(self) -> AppState {
            AppState {
                participant_repository: self
                    .participant_repository
                    .unwrap_or_else(|| Arc::new(InMemoryParticipantRepository::new())),
                message_repository: self
                    .message_repository
                    .unwrap_or_else(|| Arc::new(InMemoryMessageRepository::new())),
            }
        }
    }

    impl Default for AppStateBuilder {
        fn default() -> Self {
            Self::new()
        }
    }
}
