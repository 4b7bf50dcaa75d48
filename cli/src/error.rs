//! CLI errors

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    /// Server answered with an error body
    #[error("{code} ({status}): {message}")]
    Api {
        status: u16,
        code: String,
        message: String,
    },

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("no token configured; run `kvq user new --save` or set KVQ_TOKEN")]
    MissingToken,

    #[error("config error: {0}")]
    Config(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Stable error code from the server, if any
    pub fn api_code(&self) -> Option<&str> {
        match self {
            CliError::Api { code, .. } => Some(code),
            _ => None,
        }
    }
}
