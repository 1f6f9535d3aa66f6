//! Worker monitor: polls a tx-worker until it reports `finished`.
//!
//! The transition table lives in [`MonitorState::observe`], which does no I/O.
//! [`ApiClient::monitor_worker`] wraps it in a poll loop bounded by an optional
//! poll count and an optional wall-clock timeout.

use std::time::Duration;

use tokio::time::{sleep, Instant};
use txproc_core::{JobId, WorkerState, WorkerStatus};

use crate::report::{Reporter, WorkflowEvent};
use crate::{ApiClient, Result};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);
pub const DEFAULT_MONITOR_TIMEOUT: Duration = Duration::from_secs(30 * 60);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitorOptions {
    /// Delay between two status requests.
    pub interval: Duration,
    /// Stop after this many polls. `None` means no limit.
    pub max_polls: Option<u32>,
    /// Stop once this much time has passed. `None` means no limit.
    pub timeout: Option<Duration>,
}

impl Default for MonitorOptions {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            max_polls: None,
            timeout: Some(DEFAULT_MONITOR_TIMEOUT),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MonitorOutcome {
    Finished(WorkerStatus),
    TimedOut {
        polls: u32,
        elapsed: Duration,
        last_status: Option<WorkerStatus>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Continue,
    Finished,
}

/// Progress indicator as last reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub processed: u64,
    pub total: u64,
}

#[derive(Debug, Default, Clone)]
pub struct MonitorState {
    progress: Option<Progress>,
}

impl MonitorState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn progress(&self) -> Option<Progress> {
        self.progress
    }

    /// Apply one status snapshot and report what changed.
    pub fn observe(&mut self, status: &WorkerStatus, reporter: &mut dyn Reporter) -> Transition {
        if status.status.is_terminal() {
            if let Some(progress) = self.progress.as_mut() {
                progress.processed = progress.total;
                reporter.report(WorkflowEvent::WorkerProgress {
                    processed: progress.total,
                    total: progress.total,
                });
            }
            reporter.report(WorkflowEvent::WorkerFinished);
            return Transition::Finished;
        }

        match &status.status {
            WorkerState::Running => {
                if self.progress.is_none() {
                    reporter.report(WorkflowEvent::WorkerProgressStarted {
                        total: status.total,
                    });
                }
                let progress = self.progress.get_or_insert(Progress {
                    processed: 0,
                    total: status.total,
                });
                progress.processed = status.processed;
                reporter.report(WorkflowEvent::WorkerProgress {
                    processed: progress.processed,
                    total: progress.total,
                });
                Transition::Continue
            }
            WorkerState::Created | WorkerState::Init => {
                reporter.report(WorkflowEvent::WorkerWaiting {
                    state: status.status.clone(),
                });
                Transition::Continue
            }
            other => {
                tracing::debug!(worker_id = %status.id, status = %other, "Unrecognised worker status");
                Transition::Continue
            }
        }
    }
}

impl ApiClient {
    /// Poll `GET /api/v1/client/tx-worker/{id}` until the worker finishes or a
    /// limit from `options` is hit. Transport and decode faults end the loop
    /// with an error.
    pub async fn monitor_worker(
        &self,
        job_id: &JobId,
        options: &MonitorOptions,
        reporter: &mut dyn Reporter,
    ) -> Result<MonitorOutcome> {
        let started = Instant::now();
        let mut state = MonitorState::new();
        let mut polls: u32 = 0;
        let mut last_status = None;

        loop {
            let status = self.worker_status(job_id).await?;
            polls += 1;
            tracing::debug!(
                worker_id = %job_id,
                poll = polls,
                status = %status.status,
                processed = status.processed,
                total = status.total,
                "Worker status"
            );

            if state.observe(&status, reporter) == Transition::Finished {
                tracing::info!(worker_id = %job_id, polls, "Worker finished");
                return Ok(MonitorOutcome::Finished(status));
            }
            last_status = Some(status);

            let elapsed = started.elapsed();
            let polls_exhausted = options.max_polls.is_some_and(|max| polls >= max);
            let time_exhausted = options
                .timeout
                .is_some_and(|timeout| elapsed + options.interval > timeout);
            if polls_exhausted || time_exhausted {
                tracing::warn!(worker_id = %job_id, polls, ?elapsed, "Worker monitor gave up");
                reporter.report(WorkflowEvent::WorkerTimedOut { polls, elapsed });
                return Ok(MonitorOutcome::TimedOut {
                    polls,
                    elapsed,
                    last_status,
                });
            }

            sleep(options.interval).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(status: &str, processed: u64, total: u64) -> WorkerStatus {
        WorkerStatus {
            id: JobId::parse("job-7").unwrap(),
            status: WorkerState::from(status),
            processed,
            total,
            attachment_id: None,
            operation: None,
            error_message: None,
            created_at: None,
            updated_at: None,
            ended_at: None,
        }
    }

    #[test]
    fn created_waits_without_progress() {
        let mut state = MonitorState::new();
        let mut events: Vec<WorkflowEvent> = Vec::new();

        let transition = state.observe(&snapshot("created", 0, 0), &mut events);

        assert_eq!(transition, Transition::Continue);
        assert_eq!(state.progress(), None);
        assert_eq!(
            events,
            vec![WorkflowEvent::WorkerWaiting {
                state: WorkerState::Created
            }]
        );
    }

    #[test]
    fn init_also_waits() {
        let mut state = MonitorState::new();
        let mut events: Vec<WorkflowEvent> = Vec::new();
        state.observe(&snapshot("init", 0, 0), &mut events);
        assert_eq!(
            events,
            vec![WorkflowEvent::WorkerWaiting {
                state: WorkerState::Init
            }]
        );
    }

    #[test]
    fn running_initialises_progress_once() {
        let mut state = MonitorState::new();
        let mut events: Vec<WorkflowEvent> = Vec::new();

        state.observe(&snapshot("running", 40, 100), &mut events);
        assert_eq!(
            state.progress(),
            Some(Progress {
                processed: 40,
                total: 100
            })
        );

        state.observe(&snapshot("running", 70, 120), &mut events);
        assert_eq!(
            state.progress(),
            Some(Progress {
                processed: 70,
                total: 100
            })
        );

        let started = events
            .iter()
            .filter(|e| matches!(e, WorkflowEvent::WorkerProgressStarted { .. }))
            .count();
        assert_eq!(started, 1);
        assert_eq!(events[0], WorkflowEvent::WorkerProgressStarted { total: 100 });
    }

    #[test]
    fn finished_forces_progress_to_maximum() {
        let mut state = MonitorState::new();
        let mut events: Vec<WorkflowEvent> = Vec::new();

        state.observe(&snapshot("running", 40, 100), &mut events);
        events.clear();
        let transition = state.observe(&snapshot("finished", 90, 100), &mut events);

        assert_eq!(transition, Transition::Finished);
        assert_eq!(
            state.progress(),
            Some(Progress {
                processed: 100,
                total: 100
            })
        );
        assert_eq!(
            events,
            vec![
                WorkflowEvent::WorkerProgress {
                    processed: 100,
                    total: 100
                },
                WorkflowEvent::WorkerFinished,
            ]
        );
    }

    #[test]
    fn finished_without_progress_only_reports_finish() {
        let mut state = MonitorState::new();
        let mut events: Vec<WorkflowEvent> = Vec::new();
        let transition = state.observe(&snapshot("finished", 0, 0), &mut events);
        assert_eq!(transition, Transition::Finished);
        assert_eq!(state.progress(), None);
        assert_eq!(events, vec![WorkflowEvent::WorkerFinished]);
    }

    #[test]
    fn unknown_status_is_ignored() {
        let mut state = MonitorState::new();
        let mut events: Vec<WorkflowEvent> = Vec::new();
        let transition = state.observe(&snapshot("error", 0, 0), &mut events);
        assert_eq!(transition, Transition::Continue);
        assert!(events.is_empty());
    }
}
