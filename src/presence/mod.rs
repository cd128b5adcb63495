// Public API - what other modules can use
pub use handlers::{heartbeat, status_check};
pub use sweeper::{start_presence_sweep, sweep_inactive_participants, SweepConfig};

// Internal modules
mod handlers;
pub mod service;
mod sweeper;
