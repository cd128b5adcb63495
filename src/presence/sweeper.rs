use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{error, info, instrument, warn};

use crate::message::{models::MessageModel, repository::MessageRepository};
use crate::participant::repository::ParticipantRepository;
use crate::shared::AppError;

/// Configuration for the presence sweep
#[derive(Debug, Clone)]
pub struct SweepConfig {
    /// How often to run a sweep
    pub sweep_interval: Duration,
    /// How long a participant may stay silent before eviction
    pub inactivity_threshold: Duration,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            sweep_interval: Duration::from_millis(15_000),
            inactivity_threshold: Duration::from_millis(10_000),
        }
    }
}

/// Starts the background task that periodically evicts silent participants
#[instrument(skip(participant_repository, message_repository))]
pub async fn start_presence_sweep(
    participant_repository: Arc<dyn ParticipantRepository + Send + Sync>,
    message_repository: Arc<dyn MessageRepository + Send + Sync>,
    config: SweepConfig,
) {
    info!(
        sweep_interval_ms = config.sweep_interval.as_millis() as u64,
        inactivity_threshold_ms = config.inactivity_threshold.as_millis() as u64,
        "Starting presence sweep background task"
    );

    let mut sweep_interval = interval(config.sweep_interval);
    sweep_interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        sweep_interval.tick().await;

        match sweep_inactive_participants(
            &participant_repository,
            &message_repository,
            config.inactivity_threshold,
        )
        .await
        {
            Ok(0) => {}
            Ok(evicted_count) => {
                info!(evicted_count = evicted_count, "Presence sweep completed");
            }
            Err(e) => {
                error!(error = %e, "Presence sweep failed");
            }
        }
    }
}

/// Evicts participants idle past the threshold and announces each departure.
///
/// Candidates are handled one at a time. A failure on one participant is
/// logged and does not stop the rest of the sweep.
#[instrument(skip(participant_repository, message_repository))]
pub async fn sweep_inactive_participants(
    participant_repository: &Arc<dyn ParticipantRepository + Send + Sync>,
    message_repository: &Arc<dyn MessageRepository + Send + Sync>,
    inactivity_threshold: Duration,
) -> Result<usize, AppError> {
    let inactive_names = participant_repository
        .get_inactive_participants(inactivity_threshold)
        .await?;

    if inactive_names.is_empty() {
        return Ok(0);
    }

    info!(
        count = inactive_names.len(),
        "Found inactive participants to evict"
    );

    let mut evicted_count = 0;

    for name in inactive_names {
        match evict_participant(
            participant_repository,
            message_repository,
            &name,
            inactivity_threshold,
        )
        .await
        {
            Ok(true) => {
                evicted_count += 1;
                info!(name = %name, "Evicted inactive participant");
            }
            Ok(false) => {
                info!(name = %name, "Participant became active before eviction");
            }
            Err(e) => {
                warn!(name = %name, error = %e, "Failed to evict inactive participant");
            }
        }
    }

    Ok(evicted_count)
}

/// Removes one participant if still idle and posts the departure notice
async fn evict_participant(
    participant_repository: &Arc<dyn ParticipantRepository + Send + Sync>,
    message_repository: &Arc<dyn MessageRepository + Send + Sync>,
    name: &str,
    inactivity_threshold: Duration,
) -> Result<bool, AppError> {
    if !participant_repository
        .remove_if_inactive(name, inactivity_threshold)
        .await?
    {
        return Ok(false);
    }

    message_repository
        .insert_message(&MessageModel::left_notice(name))
        .await?;

    Ok(true)
}
