//! omni-server binary
//!
//! Storefront, kitchen display and sandbox APIs on one HTTP listener.

use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

use omni_server::{AppState, Config, api, logger};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Counter purge + JWKS refresh period
const MAINTENANCE_INTERVAL: Duration = Duration::from_secs(300);

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    // Load .env file
    let _ = dotenvy::dotenv();

    let config = Config::from_env()?;

    let json_logs = config
        .log_format
        .as_deref()
        .is_some_and(|f| f.eq_ignore_ascii_case("json"));
    logger::init_logger(json_logs, config.log_dir.as_deref())?;

    if let Some(dir) = &config.log_dir {
        match logger::cleanup_old_logs(Path::new(dir), logger::LOG_RETENTION_DAYS) {
            Ok(0) => {}
            Ok(n) => tracing::info!(removed = n, "Removed old log files"),
            Err(e) => tracing::warn!(error = %e, "Log cleanup failed"),
        }
    }

    tracing::info!(
        environment = %config.environment,
        demo_domain = %config.demo_domain,
        admin_domain = %config.admin_domain,
        "Starting omni-server"
    );

    let state = AppState::new(&config).await?;
    let _maintenance = state.spawn_maintenance(MAINTENANCE_INTERVAL);

    let app = api::create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.http_port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("omni-server HTTP listening on {addr}");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!("omni-server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
}
