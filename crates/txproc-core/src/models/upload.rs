use serde::{Deserialize, Serialize};

use super::{non_empty, AttachmentId};
use crate::error::ModelError;

/// MIME type of every file sent through this workflow.
pub const CSV_CONTENT_TYPE: &str = "text/csv";

/// Value of `X-Amz-Meta-Entity` identifying this client to the storage layer.
pub const UPLOAD_ENTITY: &str = "tx-processor";

/// Body of `POST /api/v1/client/file`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadIntent {
    pub content_type: String,
    pub filename: String,
}

impl UploadIntent {
    pub fn csv(filename: impl Into<String>) -> Self {
        Self {
            content_type: CSV_CONTENT_TYPE.to_string(),
            filename: filename.into(),
        }
    }
}

/// Object-storage metadata the backend expects on the pre-signed PUT.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StorageHeaders {
    pub content_type: String,
    pub entity: String,
    pub entity_id: String,
    pub filename: String,
    pub public: String,
    pub uploader: String,
}

/// Upload record returned by the registrar, carrying the pre-signed URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadGrant {
    pub id: AttachmentId,
    pub entity: Option<String>,
    pub entity_id: Option<String>,
    pub filename: Option<String>,
    pub pre_signed_url: String,
    pub headers: StorageHeaders,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StorageHeadersWire {
    #[serde(rename = "x-amz-meta-content-type", default)]
    pub content_type: Option<String>,
    #[serde(rename = "x-amz-meta-entity", default)]
    pub entity: Option<String>,
    #[serde(rename = "x-amz-meta-entity-id", default)]
    pub entity_id: Option<String>,
    #[serde(rename = "x-amz-meta-filename", default)]
    pub filename: Option<String>,
    #[serde(rename = "x-amz-meta-public", default)]
    pub public: Option<String>,
    #[serde(rename = "x-amz-meta-uploader", default)]
    pub uploader: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UploadGrantWire {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub entity: Option<String>,
    #[serde(default)]
    pub entity_id: Option<String>,
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub pre_signed_url: Option<String>,
    #[serde(default)]
    pub headers: Option<StorageHeadersWire>,
}

impl From<StorageHeadersWire> for StorageHeaders {
    fn from(wire: StorageHeadersWire) -> Self {
        Self {
            content_type: wire.content_type.unwrap_or_default(),
            entity: wire.entity.unwrap_or_default(),
            entity_id: wire.entity_id.unwrap_or_default(),
            filename: wire.filename.unwrap_or_default(),
            public: wire.public.unwrap_or_default(),
            uploader: wire.uploader.unwrap_or_default(),
        }
    }
}

impl TryFrom<UploadGrantWire> for UploadGrant {
    type Error = ModelError;

    fn try_from(wire: UploadGrantWire) -> Result<Self, Self::Error> {
        let id = AttachmentId::parse(wire.id.unwrap_or_default())?;
        let pre_signed_url =
            non_empty(wire.pre_signed_url).ok_or(ModelError::MissingField("pre_signed_url"))?;

        Ok(Self {
            id,
            entity: non_empty(wire.entity),
            entity_id: non_empty(wire.entity_id),
            filename: non_empty(wire.filename),
            pre_signed_url,
            headers: wire.headers.unwrap_or_default().into(),
        })
    }
}
