//! Server binary for elarocks.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `elarocks.yaml` (or `$ELAROCKS_CONFIG`)
//! 2. Initialize structured logging (tracing)
//! 3. Connect to `PostgreSQL` (running migrations) and `Dragonfly`
//! 4. Build the GraphQL schema
//! 5. Build the proxy state, if the proxy is enabled
//! 6. Serve both until one of them fails

mod error;

use std::sync::Arc;

use elarocks_core::AppConfig;
use elarocks_graphql::{AppState, Backend, ServerConfig, build_schema, start_server};
use elarocks_proxy::{ProxyServerConfig, ProxyState, start_proxy};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::error::AppError;

/// Application entry point.
///
/// # Errors
///
/// Returns an error if any startup step fails or a server stops with an
/// error.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load configuration.
    let config = AppConfig::load().map_err(AppError::from)?;

    // 2. Initialize structured logging. RUST_LOG wins over the config file.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.level)),
        )
        .with_target(true)
        .init();

    info!("elarocks-server starting");
    info!(
        graphql_port = config.server.port,
        proxy_enabled = config.proxy.enabled,
        proxy_port = config.proxy.port,
        default_limit = config.pagination.default_limit,
        "Configuration loaded"
    );

    // 3. Connect to the stores.
    let backend = Backend::connect(&config.infrastructure)
        .await
        .map_err(AppError::from)?;
    info!(backend = backend.kind(), "Stores connected");

    // 4. Build the GraphQL schema.
    let schema = build_schema(Arc::new(backend), config.pagination);
    let app_state = Arc::new(AppState::new(schema));
    let server_config = ServerConfig::from(&config.server);

    // 5 + 6. Serve.
    if config.proxy.enabled {
        let proxy_state = ProxyState::new(&config.proxy.graphql_endpoint).map_err(|e| {
            AppError::Proxy {
                message: format!("{e}"),
            }
        })?;
        let proxy_config = ProxyServerConfig::from(&config.proxy);

        tokio::try_join!(
            async {
                start_server(&server_config, app_state)
                    .await
                    .map_err(AppError::from)
            },
            async {
                start_proxy(&proxy_config, Arc::new(proxy_state))
                    .await
                    .map_err(|e| AppError::Proxy {
                        message: format!("{e}"),
                    })
            },
        )?;
    } else {
        start_server(&server_config, app_state)
            .await
            .map_err(AppError::from)?;
    }

    info!("elarocks-server shutdown complete");
    Ok(())
}
