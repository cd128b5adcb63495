use batepapo::{
    config::AppConfig,
    database,
    message::repository::{InMemoryMessageRepository, PostgresMessageRepository},
    participant::repository::{InMemoryParticipantRepository, PostgresParticipantRepository},
    presence, router, AppState,
};
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> ExitCode {
    dotenv::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "batepapo=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "Invalid configuration");
            return ExitCode::FAILURE;
        }
    };

    info!("Starting batepapo chat server");

    // Storage must be ready before the listener accepts connections
    let app_state = match &config.database_url {
        Some(database_url) => match database::connect(database_url).await {
            Ok(pool) => AppState::new(
                Arc::new(PostgresParticipantRepository::new(pool.clone())),
                Arc::new(PostgresMessageRepository::new(pool)),
            ),
            Err(e) => {
                error!(error = %e, "Failed to connect to database");
                return ExitCode::FAILURE;
            }
        },
        None => {
            warn!("DATABASE_URL not set, using in-memory storage");
            AppState::new(
                Arc::new(InMemoryParticipantRepository::new()),
                Arc::new(InMemoryMessageRepository::new()),
            )
        }
    };

    tokio::spawn(presence::start_presence_sweep(
        Arc::clone(&app_state.participant_repository),
        Arc::clone(&app_state.message_repository),
        config.sweep.clone(),
    ));

    let app = router(app_state);

    let listener = match tokio::net::TcpListener::bind(config.bind_addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!(error = %e, bind_addr = %config.bind_addr, "Failed to bind listener");
            return ExitCode::FAILURE;
        }
    };
    info!(bind_addr = %config.bind_addr, "Server listening");

    if let Err(e) = axum::serve(listener, app).await {
        error!(error = %e, "Server terminated");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
