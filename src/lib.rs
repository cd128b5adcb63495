// Library crate for the batepapo chat room server
// This file exposes the public API for integration tests

pub mod config;
pub mod database;
pub mod message;
pub mod participant;
pub mod presence;
pub mod routes;
pub mod shared;

// Re-export commonly used types for easier access in tests
pub use config::AppConfig;
pub use message::{models::MessageModel, repository::MessageRepository};
pub use participant::{models::ParticipantModel, repository::ParticipantRepository};
pub use routes::router;
pub use shared::{AppError, AppState};
