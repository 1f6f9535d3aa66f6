use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{non_empty, parse_timestamp, AttachmentId, JobId};
use crate::error::ModelError;

/// Body of `POST /api/v1/client/process`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProcessRequest {
    pub attachment_id: AttachmentId,
}

/// Processing job enqueued for an attachment. Its id is the worker id polled
/// by the monitor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessJob {
    pub id: JobId,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub created_by: Option<String>,
    pub updated_by: Option<String>,
    pub attachment_id: Option<AttachmentId>,
    pub status: String,
    pub error_message: Option<String>,
    pub ended_at: Option<DateTime<Utc>>,
    pub operation: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProcessJobWire {
    pub id: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
    pub created_by: Option<String>,
    pub updated_by: Option<String>,
    pub attachment_id: Option<String>,
    pub status: Option<String>,
    pub error_message: Option<String>,
    pub ended_at: Option<String>,
    pub operation: Option<String>,
}

impl TryFrom<ProcessJobWire> for ProcessJob {
    type Error = ModelError;

    fn try_from(wire: ProcessJobWire) -> Result<Self, Self::Error> {
        Ok(Self {
            id: JobId::parse(wire.id.unwrap_or_default())?,
            created_at: parse_timestamp("created_at", wire.created_at)?,
            updated_at: parse_timestamp("updated_at", wire.updated_at)?,
            created_by: non_empty(wire.created_by),
            updated_by: non_empty(wire.updated_by),
            attachment_id: non_empty(wire.attachment_id)
                .map(AttachmentId::parse)
                .transpose()?,
            status: wire.status.unwrap_or_default(),
            error_message: non_empty(wire.error_message),
            ended_at: parse_timestamp("ended_at", wire.ended_at)?,
            operation: non_empty(wire.operation),
        })
    }
}
