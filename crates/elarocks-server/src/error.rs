//! Error types for the server binary.

/// Top-level error for the server binary.
///
/// Each variant wraps a subsystem error so `main` can propagate with `?`.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: elarocks_core::ConfigError,
    },

    /// Connecting to a store or migrating it failed.
    #[error("store error: {source}")]
    Store {
        /// The underlying data layer error.
        #[from]
        source: elarocks_db::DbError,
    },

    /// The GraphQL server failed.
    #[error("GraphQL server error: {source}")]
    Graphql {
        /// The underlying server error.
        #[from]
        source: elarocks_graphql::ServerError,
    },

    /// The proxy failed to start or serve.
    #[error("proxy error: {message}")]
    Proxy {
        /// Description of the proxy failure.
        message: String,
    },
}
