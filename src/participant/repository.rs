use async_trait::async_trait;
use sqlx::{PgPool, Row};
use std::sync::Mutex;
use std::time::Duration;
use tracing::{debug, instrument, warn};

use super::models::{now_millis, ParticipantModel};
use crate::shared::AppError;

/// Result of attempting to register a participant
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertParticipantResult {
    /// The participant was stored
    Created,
    /// A participant with the same name already exists, nothing was written
    AlreadyExists,
}

/// Trait for participant repository operations
#[async_trait]
pub trait ParticipantRepository {
    /// Atomically inserts the participant unless the name is already taken
    async fn insert_participant(
        &self,
        participant: &ParticipantModel,
    ) -> Result<InsertParticipantResult, AppError>;
    async fn get_participant(&self, name: &str) -> Result<Option<ParticipantModel>, AppError>;
    async fn list_participants(&self) -> Result<Vec<ParticipantModel>, AppError>;

    /// Atomically sets `last_status`, returns false when no participant matched
    async fn touch_participant(&self, name: &str, now_ms: i64) -> Result<bool, AppError>;

    /// Names of participants idle for longer than the threshold
    async fn get_inactive_participants(
        &self,
        inactivity_threshold: Duration,
    ) -> Result<Vec<String>, AppError>;

    /// Deletes the participant only if it is still idle past the threshold.
    /// Returns false when it was already gone or sent a heartbeat in the meantime.
    async fn remove_if_inactive(
        &self,
        name: &str,
        inactivity_threshold: Duration,
    ) -> Result<bool, AppError>;
}

/// In-memory implementation of ParticipantRepository for development and testing
///
/// Participants are kept in registration order. Data is lost when the
/// application restarts.
pub struct InMemoryParticipantRepository {
    participants: Mutex<Vec<ParticipantModel>>,
}

impl Default for InMemoryParticipantRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryParticipantRepository {
    /// Creates a new empty in-memory repository
    pub fn new() -> Self {
        Self {
            participants: Mutex::new(Vec::new()),
        }
    }

    /// Creates an in-memory repository with pre-populated participants
    pub fn with_participants(participants: Vec<ParticipantModel>) -> Self {
        Self {
            participants: Mutex::new(participants),
        }
    }

    /// Returns the current number of participants in the repository
    pub fn participant_count(&self) -> usize {
        self.participants.lock().unwrap().len()
    }
}

#[async_trait]
impl ParticipantRepository for InMemoryParticipantRepository {
    #[instrument(skip(self, participant))]
    async fn insert_participant(
        &self,
        participant: &ParticipantModel,
    ) -> Result<InsertParticipantResult, AppError> {
        debug!(name = %participant.name, "Inserting participant in memory");

        let mut participants = self.participants.lock().unwrap();
        if participants.iter().any(|p| p.name == participant.name) {
            debug!(name = %participant.name, "Participant already exists in memory");
            return Ok(InsertParticipantResult::AlreadyExists);
        }
        participants.push(participant.clone());

        debug!(name = %participant.name, "Participant inserted in memory");
        Ok(InsertParticipantResult::Created)
    }

    #[instrument(skip(self))]
    async fn get_participant(&self, name: &str) -> Result<Option<ParticipantModel>, AppError> {
        let participants = self.participants.lock().unwrap();
        Ok(participants.iter().find(|p| p.name == name).cloned())
    }

    #[instrument(skip(self))]
    async fn list_participants(&self) -> Result<Vec<ParticipantModel>, AppError> {
        debug!("Listing all participants in memory");

        let participants = self.participants.lock().unwrap();
        Ok(participants.clone())
    }

    #[instrument(skip(self))]
    async fn touch_participant(&self, name: &str, now_ms: i64) -> Result<bool, AppError> {
        let mut participants = self.participants.lock().unwrap();
        match participants.iter_mut().find(|p| p.name == name) {
            Some(participant) => {
                participant.last_status = now_ms;
                debug!(name = %name, last_status = now_ms, "Participant heartbeat recorded in memory");
                Ok(true)
            }
            None => {
                debug!(name = %name, "Participant not found for heartbeat in memory");
                Ok(false)
            }
        }
    }

    #[instrument(skip(self))]
    async fn get_inactive_participants(
        &self,
        inactivity_threshold: Duration,
    ) -> Result<Vec<String>, AppError> {
        let now = now_millis();
        let participants = self.participants.lock().unwrap();

        let inactive = participants
            .iter()
            .filter(|p| p.is_inactive(now, inactivity_threshold))
            .map(|p| p.name.clone())
            .collect::<Vec<_>>();

        debug!(count = inactive.len(), "Inactive participants found in memory");
        Ok(inactive)
    }

    #[instrument(skip(self))]
    async fn remove_if_inactive(
        &self,
        name: &str,
        inactivity_threshold: Duration,
    ) -> Result<bool, AppError> {
        let now = now_millis();
        let mut participants = self.participants.lock().unwrap();

        let position = participants
            .iter()
            .position(|p| p.name == name && p.is_inactive(now, inactivity_threshold));

        match position {
            Some(index) => {
                participants.remove(index);
                debug!(name = %name, "Inactive participant removed from memory");
                Ok(true)
            }
            None => {
                debug!(name = %name, "Participant gone or active again, skipping removal");
                Ok(false)
            }
        }
    }
}

/// PostgreSQL implementation of participant repository
///
/// Name uniqueness is enforced by the `participants` primary key.
pub struct PostgresParticipantRepository {
    pool: PgPool,
}

impl PostgresParticipantRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ParticipantRepository for PostgresParticipantRepository {
    #[instrument(skip(self, participant))]
    async fn insert_participant(
        &self,
        participant: &ParticipantModel,
    ) -> Result<InsertParticipantResult, AppError> {
        debug!(name = %participant.name, "Inserting participant in database");

        let result = sqlx::query(
            "INSERT INTO participants (name, last_status) VALUES ($1, $2) ON CONFLICT (name) DO NOTHING",
        )
        .bind(&participant.name)
        .bind(participant.last_status)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to insert participant in database");
            AppError::DatabaseError(e.to_string())
        })?;

        if result.rows_affected() == 0 {
            debug!(name = %participant.name, "Participant already exists in database");
            return Ok(InsertParticipantResult::AlreadyExists);
        }

        Ok(InsertParticipantResult::Created)
    }

    #[instrument(skip(self))]
    async fn get_participant(&self, name: &str) -> Result<Option<ParticipantModel>, AppError> {
        let row = sqlx::query("SELECT name, last_status FROM participants WHERE name = $1")
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                warn!(error = %e, name = %name, "Failed to fetch participant from database");
                AppError::DatabaseError(e.to_string())
            })?;

        Ok(row.map(|row| ParticipantModel {
            name: row.get("name"),
            last_status: row.get("last_status"),
        }))
    }

    #[instrument(skip(self))]
    async fn list_participants(&self) -> Result<Vec<ParticipantModel>, AppError> {
        debug!("Listing all participants in database");

        let rows = sqlx::query("SELECT name, last_status FROM participants ORDER BY name")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                warn!(error = %e, "Failed to list participants from database");
                AppError::DatabaseError(e.to_string())
            })?;

        Ok(rows
            .into_iter()
            .map(|row| ParticipantModel {
                name: row.get("name"),
                last_status: row.get("last_status"),
            })
            .collect())
    }

    #[instrument(skip(self))]
    async fn touch_participant(&self, name: &str, now_ms: i64) -> Result<bool, AppError> {
        let result = sqlx::query("UPDATE participants SET last_status = $2 WHERE name = $1")
            .bind(name)
            .bind(now_ms)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                warn!(error = %e, name = %name, "Failed to update participant heartbeat");
                AppError::DatabaseError(e.to_string())
            })?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self))]
    async fn get_inactive_participants(
        &self,
        inactivity_threshold: Duration,
    ) -> Result<Vec<String>, AppError> {
        let cutoff = now_millis() - inactivity_threshold.as_millis() as i64;

        let rows = sqlx::query("SELECT name FROM participants WHERE last_status < $1")
            .bind(cutoff)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                warn!(error = %e, "Failed to query inactive participants");
                AppError::DatabaseError(e.to_string())
            })?;

        Ok(rows
            .into_iter()
            .map(|row| row.get::<String, _>("name"))
            .collect())
    }

    #[instrument(skip(self))]
    async fn remove_if_inactive(
        &self,
        name: &str,
        inactivity_threshold: Duration,
    ) -> Result<bool, AppError> {
        let cutoff = now_millis() - inactivity_threshold.as_millis() as i64;

        let result = sqlx::query("DELETE FROM participants WHERE name = $1 AND last_status < $2")
            .bind(name)
            .bind(cutoff)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                warn!(error = %e, name = %name, "Failed to delete inactive participant");
                AppError::DatabaseError(e.to_string())
            })?;

        Ok(result.rows_affected() > 0)
    }
}
