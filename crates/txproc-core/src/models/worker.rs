use std::fmt::{Display, Formatter, Result as FmtResult};

use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::{non_empty, parse_timestamp, AttachmentId, JobId};

/// Lifecycle reported by the backend for a tx-worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkerState {
    Created,
    Init,
    Running,
    Finished,
    /// Any status this client does not know about, kept verbatim.
    Other(String),
}

impl WorkerState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, WorkerState::Finished)
    }
}

impl From<&str> for WorkerState {
    fn from(s: &str) -> Self {
        match s {
            "created" => WorkerState::Created,
            "init" => WorkerState::Init,
            "running" => WorkerState::Running,
            "finished" => WorkerState::Finished,
            other => WorkerState::Other(other.to_string()),
        }
    }
}

impl Display for WorkerState {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            WorkerState::Created => write!(f, "created"),
            WorkerState::Init => write!(f, "init"),
            WorkerState::Running => write!(f, "running"),
            WorkerState::Finished => write!(f, "finished"),
            WorkerState::Other(s) => write!(f, "{}", s),
        }
    }
}

/// Snapshot of `GET /api/v1/client/tx-worker/{id}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerStatus {
    pub id: JobId,
    pub status: WorkerState,
    pub processed: u64,
    pub total: u64,
    pub attachment_id: Option<AttachmentId>,
    pub operation: Option<String>,
    pub error_message: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub ended_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WorkerStatusWire {
    pub id: Option<String>,
    pub status: Option<String>,
    /// The backend spells this key `proccesed`.
    pub proccesed: Option<i64>,
    pub processed: Option<i64>,
    pub total: Option<i64>,
    pub attachment_id: Option<String>,
    pub operation: Option<String>,
    pub error_message: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
    pub ended_at: Option<String>,
}

impl WorkerStatusWire {
    /// Map a snapshot of the worker polled as `polled_id`. A missing id falls
    /// back to `polled_id`; unreadable timestamps and attachment ids become `None`.
    pub fn into_status(self, polled_id: &JobId) -> WorkerStatus {
        let status = self.status.unwrap_or_default();
        WorkerStatus {
            id: non_empty(self.id)
                .and_then(|id| JobId::parse(id).ok())
                .unwrap_or_else(|| polled_id.clone()),
            status: WorkerState::from(status.as_str()),
            processed: self.processed.or(self.proccesed).unwrap_or(0).max(0) as u64,
            total: self.total.unwrap_or(0).max(0) as u64,
            attachment_id: non_empty(self.attachment_id)
                .and_then(|id| AttachmentId::parse(id).ok()),
            operation: non_empty(self.operation),
            error_message: non_empty(self.error_message),
            created_at: lenient_timestamp("created_at", self.created_at),
            updated_at: lenient_timestamp("updated_at", self.updated_at),
            ended_at: lenient_timestamp("ended_at", self.ended_at),
        }
    }
}

fn lenient_timestamp(field: &'static str, value: Option<String>) -> Option<DateTime<Utc>> {
    parse_timestamp(field, value).unwrap_or_else(|err| {
        tracing::warn!(error = %err, "Ignoring unreadable worker timestamp");
        None
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn map(value: serde_json::Value) -> WorkerStatus {
        let wire: WorkerStatusWire = serde_json::from_value(value).unwrap();
        wire.into_status(&JobId::parse("job-7").unwrap())
    }

    #[test]
    fn state_parses_known_and_unknown_values() {
        assert_eq!(WorkerState::from("created"), WorkerState::Created);
        assert_eq!(WorkerState::from("init"), WorkerState::Init);
        assert_eq!(WorkerState::from("running"), WorkerState::Running);
        assert_eq!(WorkerState::from("finished"), WorkerState::Finished);
        assert_eq!(
            WorkerState::from("error"),
            WorkerState::Other("error".to_string())
        );
        assert!(WorkerState::Finished.is_terminal());
        assert!(!WorkerState::Other("error".to_string()).is_terminal());
    }

    #[test]
    fn status_reads_backend_spelling_of_processed() {
        let status = map(json!({
            "id": "job-7",
            "status": "running",
            "proccesed": 40,
            "total": 100,
            "error_message": "",
            "ended_at": ""
        }));
        assert_eq!(status.status, WorkerState::Running);
        assert_eq!(status.processed, 40);
        assert_eq!(status.total, 100);
        assert_eq!(status.error_message, None);
        assert_eq!(status.ended_at, None);
    }

    #[test]
    fn status_accepts_corrected_spelling() {
        let status = map(json!({ "id": "job-7", "status": "running", "processed": 3, "total": 9 }));
        assert_eq!(status.processed, 3);
    }

    #[test]
    fn negative_counters_clamp_to_zero() {
        let status = map(json!({ "id": "job-7", "status": "init", "proccesed": -1, "total": -5 }));
        assert_eq!(status.processed, 0);
        assert_eq!(status.total, 0);
    }

    #[test]
    fn display_round_trips_status_text() {
        assert_eq!(WorkerState::Running.to_string(), "running");
        assert_eq!(WorkerState::Other("paused".to_string()).to_string(), "paused");
    }

    #[test]
    fn both_spellings_prefer_processed() {
        let status = map(json!({ "id": "job-7", "status": "running", "proccesed": 2, "processed": 5, "total": 9 }));
        assert_eq!(status.processed, 5);
    }

    #[test]
    fn missing_id_falls_back_to_polled_id() {
        let status = map(json!({ "status": "finished" }));
        assert_eq!(status.id.as_str(), "job-7");
        assert_eq!(status.status, WorkerState::Finished);
    }

    #[test]
    fn unreadable_timestamps_become_none() {
        let status = map(json!({
            "id": "job-7",
            "status": "finished",
            "created_at": "2022-05-01 10:00:00",
            "ended_at": "2022-05-01T10:00:09Z"
        }));
        assert_eq!(status.created_at, None);
        assert!(status.ended_at.is_some());
    }
}
