// Public API - what other modules can use
pub use handlers::{create_participant, list_participants};

// Internal modules
mod handlers;
pub mod models;
pub mod repository;
pub mod service;
pub mod types;
