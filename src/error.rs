//! Error types shared by the outbound clients

use thiserror::Error;

/// Failure while talking to an external collaborator.
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected response: {0}")]
    InvalidResponse(String),

    #[error("{0} is not configured")]
    NotConfigured(&'static str),

    #[error("authentication failed: {0}")]
    Auth(String),
}

/// Outcome of a failed access grant. The `Display` text is echoed to the webhook caller.
#[derive(Debug, Error)]
pub enum GrantError {
    #[error("directory service not configured (missing API key or base URL)")]
    NotConfigured,

    #[error("user not found for {email}")]
    UserNotFound { email: String },

    #[error("failed to list directory users: {0}")]
    Lookup(String),

    #[error("failed to update plan for user {user_id}: {reason}")]
    Update { user_id: String, reason: String },
}

/// Startup configuration problems.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read credentials file {path}: {source}")]
    CredentialsRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed credentials file {path}: {source}")]
    CredentialsParse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid service-account private key: {0}")]
    InvalidPrivateKey(#[source] jsonwebtoken::errors::Error),

    #[error("invalid URL for {name}: {source}")]
    InvalidUrl {
        name: &'static str,
        #[source]
        source: url::ParseError,
    },
}

pub type Result<T> = std::result::Result<T, RelayError>;
