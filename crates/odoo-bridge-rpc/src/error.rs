//! Error types for the record-store client.

use thiserror::Error;

/// Result alias for record-store operations.
pub type RpcResult<T> = Result<T, RpcError>;

/// Error that can occur while talking to the remote store.
#[derive(Debug, Error)]
pub enum RpcError {
    /// A required environment variable is unset or blank.
    #[error("missing environment variable: {0}")]
    MissingEnv(&'static str),

    /// The configured endpoint URL could not be parsed.
    #[error("invalid endpoint URL '{url}': {message}")]
    InvalidUrl { url: String, message: String },

    /// The target host does not match the allow-list and no override was given.
    #[error("blocked target host '{host}', expected '{expected}'; use --allow-any-host only when intentional")]
    HostBlocked { host: String, expected: String },

    /// The server rejected the configured credentials.
    #[error("authentication failed for database '{db}'")]
    AuthenticationFailed { db: String },

    /// Transport-level failure (connection, timeout, body decoding).
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server returned a JSON-RPC error member.
    #[error("server fault: {message}")]
    Fault { message: String },

    /// The response was well-formed JSON but not the shape we expect.
    #[error("unexpected response payload: {0}")]
    UnexpectedPayload(String),
}
