use std::error::Error;

use finance_suite::api::{create_router, AppState};
use finance_suite::config::{ConfigLoader, ServerConfig};
use finance_suite::store::Database;
use finance_suite::tasks::{TaskQueue, DEFAULT_QUEUE_CAPACITY};
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "finance_suite=info,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let settings = ServerConfig::from_env()?;
    info!(
        server_addr = %settings.server_addr,
        config_dir = %settings.config_dir.display(),
        api_prefix = %settings.api_prefix,
        "Starting Finance Suite"
    );

    let config = ConfigLoader::load(&settings.config_dir)?;

    let database = Database::connect(
        &settings.database_url,
        settings.db_connect_attempts,
        settings.db_connect_delay,
    )
    .await?;

    let (tasks, worker) = TaskQueue::spawn(database.clone(), DEFAULT_QUEUE_CAPACITY);
    let router = create_router(
        AppState::new(config, database.clone(), tasks),
        &settings.api_prefix,
    );

    let listener = TcpListener::bind(&settings.server_addr).await?;
    info!(addr = %listener.local_addr()?, "Listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // The router held the last queue handle; the worker finishes what is
    // left and exits.
    info!("Draining background tasks");
    if let Err(e) = worker.await {
        warn!(error = %e, "Background worker ended abnormally");
    }
    database.close().await;
    info!("Shutdown complete");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Cannot listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
