use std::path::PathBuf;

use thiserror::Error;
use txproc_core::{ConfigError, ModelError};

pub type Result<T> = std::result::Result<T, ClientError>;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Network error calling {endpoint}: {source}")]
    Transport {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Cannot encode request for {endpoint}: {source}")]
    Encode {
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Malformed response from {endpoint}: {source}")]
    Decode {
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Unexpected payload from {endpoint}: {source}")]
    InvalidPayload {
        endpoint: String,
        #[source]
        source: ModelError,
    },

    #[error("API error (status {status}): {body}")]
    Backend { status: u16, body: String },

    #[error("Storage rejected upload (status {status}): {body}")]
    Upload { status: u16, body: String },

    #[error("Precondition failed: {0}")]
    Precondition(String),

    #[error("Cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl ClientError {
    /// Malformed JSON or a payload missing required fields.
    pub fn is_decode(&self) -> bool {
        matches!(
            self,
            ClientError::Decode { .. } | ClientError::InvalidPayload { .. }
        )
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, ClientError::Transport { .. })
    }
}
