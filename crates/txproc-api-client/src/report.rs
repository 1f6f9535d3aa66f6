//! Progress events emitted by the coordinator and the worker monitor.
//!
//! Reporting is observational only: a reporter cannot influence the workflow.

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::time::Duration;

use txproc_core::{AttachmentId, JobId, WorkerState};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    RegisterUpload,
    TransferFile,
    TriggerProcessing,
    MonitorWorker,
}

impl Step {
    pub fn number(&self) -> u8 {
        match self {
            Step::RegisterUpload => 1,
            Step::TransferFile => 2,
            Step::TriggerProcessing => 3,
            Step::MonitorWorker => 4,
        }
    }
}

impl Display for Step {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Step::RegisterUpload => write!(f, "create upload request"),
            Step::TransferFile => write!(f, "upload file"),
            Step::TriggerProcessing => write!(f, "process file"),
            Step::MonitorWorker => write!(f, "monitor worker"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkflowEvent {
    StepStarted(Step),
    UploadRegistered {
        attachment_id: AttachmentId,
        entity_id: Option<String>,
    },
    FileTransferred {
        bytes: u64,
        status: u16,
    },
    Settling {
        delay: Duration,
    },
    SettleTick {
        remaining: Duration,
    },
    ProcessingQueued {
        job_id: JobId,
    },
    WorkerWaiting {
        state: WorkerState,
    },
    /// Emitted once, on the first `running` snapshot.
    WorkerProgressStarted {
        total: u64,
    },
    WorkerProgress {
        processed: u64,
        total: u64,
    },
    WorkerFinished,
    WorkerTimedOut {
        polls: u32,
        elapsed: Duration,
    },
}

pub trait Reporter {
    fn report(&mut self, event: WorkflowEvent);
}

/// Discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopReporter;

impl Reporter for NoopReporter {
    fn report(&mut self, _event: WorkflowEvent) {}
}

/// Collects events in order; handy in tests.
impl Reporter for Vec<WorkflowEvent> {
    fn report(&mut self, event: WorkflowEvent) {
        self.push(event);
    }
}
