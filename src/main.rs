use std::net::SocketAddr;

use tokio::signal;

use pelagica_server::api::{self, AppState};
use pelagica_server::config::ServerConfig;
use pelagica_server::logging::ServerLogger;

/// Graceful shutdown signal handler
/// Waits for Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            log::error!("Failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                log::error!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    log::info!("Shutdown signal received, server shutting down");
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = ServerConfig::from_env();

    ServerLogger::new(config.log_level, config.log_file.as_deref())?.install()?;
    for warning in ServerConfig::warnings(|key| std::env::var(key).ok()) {
        log::warn!("{warning}");
    }

    let state = match AppState::from_config(&config) {
        Ok(state) => state,
        Err(e) => {
            log::error!("Failed to initialize: {e}");
            return Err(e.into());
        }
    };

    let app = api::build_router(state, &config);

    let address = SocketAddr::new(config.host, config.port);
    log::info!("Pelagica backend listening on http://{address}");
    log::info!("  Config file: {}", config.config_path.display());
    log::info!("  Themes directory: {}", config.themes_dir.display());
    if config.auth_enabled {
        log::info!("  Authentication: enabled (Jellyfin administrators only)");
    } else {
        log::info!("  Authentication: disabled");
    }

    let listener = tokio::net::TcpListener::bind(address).await?;
    api::serve(listener, app, shutdown_signal()).await?;

    Ok(())
}
