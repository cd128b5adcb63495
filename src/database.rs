use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::{info, instrument};

use crate::shared::AppError;

const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS participants (
        name TEXT PRIMARY KEY,
        last_status BIGINT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS messages (
        id BIGSERIAL PRIMARY KEY,
        sender TEXT NOT NULL,
        recipient TEXT NOT NULL,
        text TEXT NOT NULL,
        kind TEXT NOT NULL,
        time TEXT NOT NULL
    )",
    "CREATE INDEX IF NOT EXISTS messages_recipient_idx ON messages (recipient)",
    "CREATE INDEX IF NOT EXISTS messages_sender_idx ON messages (sender)",
];

/// Connects to PostgreSQL and makes sure both tables exist
#[instrument(skip(database_url))]
pub async fn connect(database_url: &str) -> Result<PgPool, AppError> {
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await?;

    ensure_schema(&pool).await?;

    info!("Database connection established");
    Ok(pool)
}

/// Creates the `participants` and `messages` tables when missing
pub async fn ensure_schema(pool: &PgPool) -> Result<(), AppError> {
    for statement in SCHEMA {
        sqlx::query(statement).execute(pool).await?;
    }
    Ok(())
}
