//! Proxy HTTP server lifecycle.

use std::net::SocketAddr;
use std::sync::Arc;

use elarocks_core::config::ProxySection;
use tokio::net::TcpListener;
use tracing::info;

use crate::router::build_router;
use crate::state::ProxyState;

/// Bind address of the proxy.
#[derive(Debug, Clone)]
pub struct ProxyServerConfig {
    /// Host address to bind to.
    pub host: String,
    /// TCP port to listen on.
    pub port: u16,
}

impl Default for ProxyServerConfig {
    fn default() -> Self {
        Self {
            host: String::from("0.0.0.0"),
            port: 3000,
        }
    }
}

impl From<&ProxySection> for ProxyServerConfig {
    fn from(section: &ProxySection) -> Self {
        Self {
            host: section.host.clone(),
            port: section.port,
        }
    }
}

/// Start the proxy and serve until the process ends.
///
/// # Errors
///
/// Returns [`ProxyServerError`] if the listener cannot bind or serving
/// fails.
pub async fn start_proxy(
    config: &ProxyServerConfig,
    state: Arc<ProxyState>,
) -> Result<(), ProxyServerError> {
    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .map_err(|e| ProxyServerError::Bind(format!("invalid address: {e}")))?;

    let endpoint = state.client.endpoint().to_owned();
    let router = build_router(state);

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| ProxyServerError::Bind(format!("bind failed on {addr}: {e}")))?;

    info!(%addr, upstream = endpoint.as_str(), "Proxy listening");

    axum::serve(listener, router)
        .await
        .map_err(|e| ProxyServerError::Serve(format!("serve error: {e}")))?;

    Ok(())
}

/// Errors that can occur when starting or running the proxy.
#[derive(Debug, thiserror::Error)]
pub enum ProxyServerError {
    /// Failed to bind to the network address.
    #[error("bind error: {0}")]
    Bind(String),

    /// The server hit a fatal error while serving.
    #[error("serve error: {0}")]
    Serve(String),
}
