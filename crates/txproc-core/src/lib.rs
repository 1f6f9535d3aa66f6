//! txproc core library
//!
//! Configuration, domain models and the wire-to-domain mapping shared by the
//! API client and the CLI.

pub mod config;
pub mod error;
pub mod models;

// Re-export commonly used types
pub use config::{mask_secret, ClientConfig, DEFAULT_CONFIG_PATH};
pub use error::{ConfigError, ModelError};
pub use models::{
    AttachmentId, JobId, ProcessJob, ProcessRequest, StorageHeaders, UploadGrant, UploadIntent,
    WorkerState, WorkerStatus, CSV_CONTENT_TYPE, UPLOAD_ENTITY,
};
