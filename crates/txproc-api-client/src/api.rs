//! Domain methods for the tx-processor API client.
//!
//! Each method decodes the `{"data": ...}` envelope into the loose wire shape
//! from `txproc_core::models` and maps it into the domain type.

use std::path::Path;

use txproc_core::models::{
    Envelope, ProcessJobWire, UploadGrantWire, WorkerStatusWire,
};
use txproc_core::{
    AttachmentId, JobId, ModelError, ProcessJob, ProcessRequest, UploadGrant, UploadIntent,
    WorkerStatus, CSV_CONTENT_TYPE, UPLOAD_ENTITY,
};

use crate::{ApiClient, ClientError, Result};

pub const FILE_PATH: &str = "/api/v1/client/file";
pub const PROCESS_PATH: &str = "/api/v1/client/process";
pub const WORKER_PATH: &str = "/api/v1/client/tx-worker";

/// How a non-2xx answer from the pre-signed storage URL is treated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UploadStatusPolicy {
    /// Fail the transfer with [`ClientError::Upload`].
    #[default]
    Strict,
    /// Log a warning and carry on, as long as the request itself went through.
    Lenient,
}

/// Outcome of the storage PUT.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferReceipt {
    pub bytes: u64,
    pub status: u16,
}

/// Metadata headers for the storage PUT. Entity id, filename and uploader
/// are passed through from the grant untouched.
pub fn storage_headers(grant: &UploadGrant) -> Vec<(&'static str, String)> {
    vec![
        ("X-Amz-Meta-Entity", UPLOAD_ENTITY.to_string()),
        ("X-Amz-Meta-Entity-Id", grant.headers.entity_id.clone()),
        ("X-Amz-Meta-Filename", grant.headers.filename.clone()),
        ("X-Amz-Meta-Uploader", grant.headers.uploader.clone()),
        ("X-Amz-Meta-Content-Type", CSV_CONTENT_TYPE.to_string()),
        ("X-Amz-Meta-Public", "false".to_string()),
        ("Content-Type", CSV_CONTENT_TYPE.to_string()),
    ]
}

fn map_payload<W, D>(endpoint: &str, wire: W) -> Result<D>
where
    D: TryFrom<W, Error = ModelError>,
{
    D::try_from(wire).map_err(|source| ClientError::InvalidPayload {
        endpoint: endpoint.to_string(),
        source,
    })
}

impl ApiClient {
    /// Create an upload record and obtain the pre-signed URL for it.
    pub async fn register_upload(&self, intent: &UploadIntent) -> Result<UploadGrant> {
        let envelope: Envelope<UploadGrantWire> = self.post_json(FILE_PATH, intent).await?;
        let grant: UploadGrant = map_payload(FILE_PATH, envelope.data)?;

        tracing::info!(
            attachment_id = %grant.id,
            filename = %intent.filename,
            "Upload registered"
        );
        Ok(grant)
    }

    /// Read the whole file into memory and PUT it to the grant's pre-signed URL.
    pub async fn transfer_file(
        &self,
        file_path: &Path,
        grant: &UploadGrant,
        policy: UploadStatusPolicy,
    ) -> Result<TransferReceipt> {
        let buffer = tokio::fs::read(file_path)
            .await
            .map_err(|source| ClientError::Io {
                path: file_path.to_path_buf(),
                source,
            })?;
        let bytes = buffer.len() as u64;

        let mut request = self.client().put(&grant.pre_signed_url).body(buffer);
        for (name, value) in storage_headers(grant) {
            request = request.header(name, value);
        }

        // The pre-signed URL embeds credentials, keep it out of error messages.
        let response = request
            .send()
            .await
            .map_err(|source| ClientError::Transport {
                endpoint: "pre-signed upload".to_string(),
                source: source.without_url(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            match policy {
                UploadStatusPolicy::Strict => {
                    return Err(ClientError::Upload {
                        status: status.as_u16(),
                        body,
                    });
                }
                UploadStatusPolicy::Lenient => {
                    tracing::warn!(
                        attachment_id = %grant.id,
                        status = status.as_u16(),
                        "Storage answered with an error status, continuing"
                    );
                }
            }
        }

        tracing::info!(attachment_id = %grant.id, bytes, "File uploaded");
        Ok(TransferReceipt {
            bytes,
            status: status.as_u16(),
        })
    }

    /// Enqueue server-side processing of an uploaded attachment.
    pub async fn trigger_processing(&self, attachment_id: &AttachmentId) -> Result<ProcessJob> {
        let body = ProcessRequest {
            attachment_id: attachment_id.clone(),
        };
        let envelope: Envelope<ProcessJobWire> = self.post_json(PROCESS_PATH, &body).await?;
        let job: ProcessJob = map_payload(PROCESS_PATH, envelope.data)?;

        tracing::info!(attachment_id = %attachment_id, job_id = %job.id, "Processing enqueued");
        Ok(job)
    }

    /// Fetch one snapshot of a tx-worker.
    pub async fn worker_status(&self, job_id: &JobId) -> Result<WorkerStatus> {
        let path = format!("{}/{}", WORKER_PATH, job_id);
        let envelope: Envelope<WorkerStatusWire> = self.get(&path).await?;
        Ok(envelope.data.into_status(job_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use txproc_core::StorageHeaders;

    fn grant() -> UploadGrant {
        UploadGrant {
            id: AttachmentId::parse("att-1").unwrap(),
            entity: Some("something-else".to_string()),
            entity_id: Some("ent-9".to_string()),
            filename: Some("data.csv".to_string()),
            pre_signed_url: "https://bucket.example.com/data.csv".to_string(),
            headers: StorageHeaders {
                content_type: "application/octet-stream".to_string(),
                entity: "something-else".to_string(),
                entity_id: "ent-9".to_string(),
                filename: "2022/05/data.csv".to_string(),
                public: "true".to_string(),
                uploader: "user-3".to_string(),
            },
        }
    }

    fn header<'a>(headers: &'a [(&'static str, String)], name: &str) -> &'a str {
        headers
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| v.as_str())
            .unwrap()
    }

    #[test]
    fn storage_headers_pass_grant_values_through() {
        let headers = storage_headers(&grant());
        assert_eq!(header(&headers, "X-Amz-Meta-Entity-Id"), "ent-9");
        assert_eq!(header(&headers, "X-Amz-Meta-Filename"), "2022/05/data.csv");
        assert_eq!(header(&headers, "X-Amz-Meta-Uploader"), "user-3");
    }

    #[test]
    fn storage_headers_fix_entity_content_type_and_visibility() {
        let headers = storage_headers(&grant());
        assert_eq!(header(&headers, "X-Amz-Meta-Entity"), "tx-processor");
        assert_eq!(header(&headers, "X-Amz-Meta-Content-Type"), "text/csv");
        assert_eq!(header(&headers, "X-Amz-Meta-Public"), "false");
        assert_eq!(header(&headers, "Content-Type"), "text/csv");
        assert_eq!(headers.len(), 7);
    }

    #[test]
    fn upload_policy_defaults_to_strict() {
        assert_eq!(UploadStatusPolicy::default(), UploadStatusPolicy::Strict);
    }
}
