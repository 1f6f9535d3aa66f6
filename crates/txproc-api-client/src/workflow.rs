//! Workflow coordinator: register → transfer → settle → trigger → (monitor).
//!
//! The first failing step aborts the run. Nothing already done upstream is
//! rolled back.

use std::path::Path;
use std::time::Duration;

use tokio::time::sleep;
use txproc_core::{ProcessJob, UploadGrant, UploadIntent, CSV_CONTENT_TYPE};

use crate::api::{TransferReceipt, UploadStatusPolicy};
use crate::monitor::{MonitorOptions, MonitorOutcome};
use crate::report::{Reporter, Step, WorkflowEvent};
use crate::{ApiClient, ClientError, Result};

/// Wait between the storage upload and the processing request, so the object
/// is visible to the backend.
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_secs(5);

const SETTLE_TICK: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkflowOptions {
    pub content_type: String,
    pub settle_delay: Duration,
    pub upload_policy: UploadStatusPolicy,
    /// Poll the worker after triggering when set.
    pub monitor: Option<MonitorOptions>,
}

impl Default for WorkflowOptions {
    fn default() -> Self {
        Self {
            content_type: CSV_CONTENT_TYPE.to_string(),
            settle_delay: DEFAULT_SETTLE_DELAY,
            upload_policy: UploadStatusPolicy::default(),
            monitor: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct WorkflowReport {
    pub grant: UploadGrant,
    pub transfer: TransferReceipt,
    pub job: ProcessJob,
    pub monitor: Option<MonitorOutcome>,
}

pub struct Workflow<'a> {
    client: &'a ApiClient,
    options: WorkflowOptions,
}

impl<'a> Workflow<'a> {
    pub fn new(client: &'a ApiClient, options: WorkflowOptions) -> Self {
        Self { client, options }
    }

    /// Run one local file through the pipeline.
    pub async fn run(&self, file_path: &Path, reporter: &mut dyn Reporter) -> Result<WorkflowReport> {
        let filename = registered_filename(file_path).await?;

        reporter.report(WorkflowEvent::StepStarted(Step::RegisterUpload));
        let intent = UploadIntent {
            content_type: self.options.content_type.clone(),
            filename,
        };
        let grant = self.client.register_upload(&intent).await?;
        reporter.report(WorkflowEvent::UploadRegistered {
            attachment_id: grant.id.clone(),
            entity_id: grant.entity_id.clone(),
        });

        reporter.report(WorkflowEvent::StepStarted(Step::TransferFile));
        let transfer = self
            .client
            .transfer_file(file_path, &grant, self.options.upload_policy)
            .await?;
        reporter.report(WorkflowEvent::FileTransferred {
            bytes: transfer.bytes,
            status: transfer.status,
        });

        self.settle(reporter).await;

        reporter.report(WorkflowEvent::StepStarted(Step::TriggerProcessing));
        let job = self.client.trigger_processing(&grant.id).await?;
        reporter.report(WorkflowEvent::ProcessingQueued {
            job_id: job.id.clone(),
        });

        let monitor = match &self.options.monitor {
            Some(options) => {
                reporter.report(WorkflowEvent::StepStarted(Step::MonitorWorker));
                Some(self.client.monitor_worker(&job.id, options, reporter).await?)
            }
            None => None,
        };

        Ok(WorkflowReport {
            grant,
            transfer,
            job,
            monitor,
        })
    }

    async fn settle(&self, reporter: &mut dyn Reporter) {
        let mut remaining = self.options.settle_delay;
        reporter.report(WorkflowEvent::Settling { delay: remaining });
        while !remaining.is_zero() {
            let tick = remaining.min(SETTLE_TICK);
            sleep(tick).await;
            remaining -= tick;
            reporter.report(WorkflowEvent::SettleTick { remaining });
        }
    }
}

/// The name sent to the backend is the last path component of an existing file.
async fn registered_filename(file_path: &Path) -> Result<String> {
    let metadata = tokio::fs::metadata(file_path).await.map_err(|_| {
        ClientError::Precondition(format!("file not found: {}", file_path.display()))
    })?;
    if !metadata.is_file() {
        return Err(ClientError::Precondition(format!(
            "not a regular file: {}",
            file_path.display()
        )));
    }

    file_path
        .file_name()
        .and_then(|n| n.to_str())
        .map(str::to_string)
        .ok_or_else(|| {
            ClientError::Precondition(format!("invalid file name: {}", file_path.display()))
        })
}
