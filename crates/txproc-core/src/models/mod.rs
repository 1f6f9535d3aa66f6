//! Data models for the upload-and-process workflow
//!
//! Every backend response arrives wrapped as `{"data": ...}`. Each payload is
//! first decoded into a loose `*Wire` shape where every field is optional, then
//! mapped into the domain type, which is where required fields are enforced.

mod ids;
mod process;
mod upload;
mod worker;

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::error::ModelError;

pub use ids::{AttachmentId, JobId};
pub use process::{ProcessJob, ProcessJobWire, ProcessRequest};
pub use upload::{
    StorageHeaders, StorageHeadersWire, UploadGrant, UploadGrantWire, UploadIntent,
    CSV_CONTENT_TYPE, UPLOAD_ENTITY,
};
pub use worker::{WorkerState, WorkerStatus, WorkerStatusWire};

/// `{"data": T}` wrapper used by every backend endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope<T> {
    pub data: T,
}

/// Empty strings are treated as absent.
pub(crate) fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// RFC 3339 timestamp that may be missing, null or empty.
pub(crate) fn parse_timestamp(
    field: &'static str,
    value: Option<String>,
) -> Result<Option<DateTime<Utc>>, ModelError> {
    match non_empty(value) {
        None => Ok(None),
        Some(raw) => DateTime::parse_from_rfc3339(&raw)
            .map(|ts| Some(ts.with_timezone(&Utc)))
            .map_err(|_| ModelError::InvalidTimestamp { field, value: raw }),
    }
}
