use async_trait::async_trait;
use sqlx::{postgres::PgRow, PgPool, Row};
use std::sync::Mutex;
use tracing::{debug, instrument, warn};

use super::models::{MessageKind, MessageModel, BROADCAST_RECIPIENT};
use crate::shared::AppError;

/// Trait for message repository operations
///
/// Messages are append-only. Every listing returns them in insertion order.
#[async_trait]
pub trait MessageRepository {
    async fn insert_message(&self, message: &MessageModel) -> Result<(), AppError>;

    /// Messages sent by, addressed to, or broadcast to `user`
    async fn list_visible_to(&self, user: &str) -> Result<Vec<MessageModel>, AppError>;
}

/// In-memory implementation of MessageRepository for development and testing
pub struct InMemoryMessageRepository {
    messages: Mutex<Vec<MessageModel>>,
}

impl Default for InMemoryMessageRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryMessageRepository {
    /// Creates a new empty in-memory repository
    pub fn new() -> Self {
        Self {
            messages: Mutex::new(Vec::new()),
        }
    }

    /// Returns the current number of stored messages
    pub fn message_count(&self) -> usize {
        self.messages.lock().unwrap().len()
    }

    /// Snapshot of every stored message in insertion order
    pub fn messages(&self) -> Vec<MessageModel> {
        self.messages.lock().unwrap().clone()
    }
}

#[async_trait]
impl MessageRepository for InMemoryMessageRepository {
    #[instrument(skip(self, message))]
    async fn insert_message(&self, message: &MessageModel) -> Result<(), AppError> {
        debug!(from = %message.from, to = %message.to, kind = %message.kind, "Inserting message in memory");

        self.messages.lock().unwrap().push(message.clone());
        Ok(())
    }

    #[instrument(skip(self))]
    async fn list_visible_to(&self, user: &str) -> Result<Vec<MessageModel>, AppError> {
        let messages = self.messages.lock().unwrap();
        let visible = messages
            .iter()
            .filter(|m| m.is_visible_to(user))
            .cloned()
            .collect::<Vec<_>>();

        debug!(user = %user, count = visible.len(), "Visible messages collected from memory");
        Ok(visible)
    }
}

/// PostgreSQL implementation of message repository
pub struct PostgresMessageRepository {
    pool: PgPool,
}

impl PostgresMessageRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn message_from_row(row: PgRow) -> Result<MessageModel, AppError> {
    let kind: String = row.get("kind");
    let kind = kind.parse::<MessageKind>().map_err(|e| {
        warn!(error = %e, "Stored message has an unknown type");
        AppError::DatabaseError(e)
    })?;

    Ok(MessageModel {
        from: row.get("sender"),
        to: row.get("recipient"),
        text: row.get("text"),
        kind,
        time: row.get("time"),
    })
}

#[async_trait]
impl MessageRepository for PostgresMessageRepository {
    #[instrument(skip(self, message))]
    async fn insert_message(&self, message: &MessageModel) -> Result<(), AppError> {
        debug!(from = %message.from, to = %message.to, "Inserting message in database");

        sqlx::query(
            "INSERT INTO messages (sender, recipient, text, kind, time) VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(&message.from)
        .bind(&message.to)
        .bind(&message.text)
        .bind(message.kind.as_str())
        .bind(&message.time)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to insert message in database");
            AppError::DatabaseError(e.to_string())
        })?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn list_visible_to(&self, user: &str) -> Result<Vec<MessageModel>, AppError> {
        let rows = sqlx::query(
            "SELECT sender, recipient, text, kind, time FROM messages \
             WHERE sender = $1 OR recipient = $1 OR recipient = $2 ORDER BY id",
        )
        .bind(user)
        .bind(BROADCAST_RECIPIENT)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, user = %user, "Failed to list visible messages from database");
            AppError::DatabaseError(e.to_string())
        })?;

        rows.into_iter().map(message_from_row).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(from: &str, to: &str, text: &str) -> MessageModel {
        MessageModel::new(
            from.to_string(),
            to.to_string(),
            text.to_string(),
            MessageKind::Message,
        )
    }

    #[tokio::test]
    async fn test_messages_preserve_insertion_order() {
        let repo = InMemoryMessageRepository::new();
        for text in ["one", "two", "three"] {
            repo.insert_message(&message("Maria", "Todos", text))
                .await
                .unwrap();
        }

        let texts: Vec<String> = repo
            .messages()
            .into_iter()
            .map(|m| m.text)
            .collect();
        assert_eq!(texts, vec!["one", "two", "three"]);
    }

    #[tokio::test]
    async fn test_list_visible_to_filters_private_messages() {
        let repo = InMemoryMessageRepository::new();
        repo.insert_message(&message("Maria", "Todos", "broadcast"))
            .await
            .unwrap();
        repo.insert_message(&message("Maria", "João", "to joão"))
            .await
            .unwrap();
        repo.insert_message(&message("Ana", "Maria", "to maria"))
            .await
            .unwrap();
        repo.insert_message(&message("João", "Maria", "also to maria"))
            .await
            .unwrap();

        let for_ana: Vec<String> = repo
            .list_visible_to("Ana")
            .await
            .unwrap()
            .into_iter()
            .map(|m| m.text)
            .collect();
        assert_eq!(for_ana, vec!["broadcast", "to maria"]);

        let for_joao: Vec<String> = repo
            .list_visible_to("João")
            .await
            .unwrap()
            .into_iter()
            .map(|m| m.text)
            .collect();
        assert_eq!(for_joao, vec!["broadcast", "to joão", "also to maria"]);
    }

    #[tokio::test]
    async fn test_list_visible_to_empty_repository() {
        let repo = InMemoryMessageRepository::new();
        assert!(repo.list_visible_to("Maria").await.unwrap().is_empty());
        assert_eq!(repo.message_count(), 0);
    }
}
