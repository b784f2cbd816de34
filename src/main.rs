use std::sync::Arc;

use property_marketplace::{
    app,
    features::wizard::sessions::WizardSessions,
    services::{database::Database, storage::BucketStorage},
    utilities::{app_state::AppState, config::Config, errors::AppError},
};
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), AppError> {
    let config = Config::init().await?;

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "property_marketplace={0},tower_http={0}",
                config.tracing_level
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let database = Database::new(&config).await?;
    database.migrate().await?;

    let storage = BucketStorage::from_config(&config).await?;

    let wizards = WizardSessions::default();
    let sweeper = wizards.spawn_sweeper(config.wizard_idle_ttl);

    let state = AppState {
        config: config.clone(),
        database,
        storage: Arc::new(storage),
        wizards,
    };

    let listener = tokio::net::TcpListener::bind(&config.server_addres).await?;
    info!("Listening on {}", config.server_addres);

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    sweeper.abort();
    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Received Ctrl-C, shutting down");
}
