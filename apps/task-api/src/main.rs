use axum_helpers::server::create_production_app;
use core_config::tracing::{init_tracing, install_color_eyre};
use database::postgres::{self, connect_from_config_with_retry};
use migration::Migrator;
use tracing::{error, info};

mod api;
mod config;
mod openapi;

use config::Config;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    // Before anything fallible
    install_color_eyre();

    let config = Config::from_env()?;
    init_tracing(&config.environment);

    let db = match config.database.clone() {
        Some(pg) => {
            let db = connect_from_config_with_retry(pg, None)
                .await
                .map_err(|e| eyre::eyre!("PostgreSQL connection failed: {}", e))?;
            postgres::run_migrations::<Migrator>(&db, config.app.name).await?;
            Some(db)
        }
        None => {
            info!("DATABASE_URL not set, storing tasks in memory");
            None
        }
    };

    let app = api::app(&config, db.clone())?;

    info!(
        timeout = ?config.shutdown_timeout,
        "Starting {} v{}", config.app.name, config.app.version
    );

    create_production_app(app, &config.server, config.shutdown_timeout, async move {
        if let Some(db) = db {
            info!("Closing PostgreSQL pool");
            if let Err(e) = db.close().await {
                error!("Error closing PostgreSQL: {}", e);
            }
        }
    })
    .await
    .map_err(|e| eyre::eyre!("Server error: {}", e))?;

    info!("Task API shutdown complete");
    Ok(())
}
