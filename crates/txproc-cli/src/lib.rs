use std::io::Write;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use txproc_api_client::{MonitorOptions, Reporter, WorkflowEvent};

/// Initialize tracing for the CLI. Logs go to stderr so step output on stdout
/// stays readable; the default level is `warn`, override with `RUST_LOG`.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
}

/// Build monitor options from CLI values. A timeout of zero disables it.
pub fn monitor_options(
    poll_interval_ms: u64,
    max_polls: Option<u32>,
    timeout_secs: u64,
) -> MonitorOptions {
    MonitorOptions {
        interval: Duration::from_millis(poll_interval_ms),
        max_polls,
        timeout: (timeout_secs > 0).then(|| Duration::from_secs(timeout_secs)),
    }
}

/// Console text for events that map to whole lines.
pub fn event_line(event: &WorkflowEvent) -> Option<String> {
    match event {
        WorkflowEvent::StepStarted(step) => Some(format!("step {}: {}", step.number(), step)),
        WorkflowEvent::UploadRegistered {
            attachment_id,
            entity_id,
        } => Some(format!(
            " - attachment_id: {}\n - entity_id: {}",
            attachment_id,
            entity_id.as_deref().unwrap_or("-")
        )),
        WorkflowEvent::FileTransferred { bytes, .. } => {
            Some(format!(" - upload done ({} bytes)", bytes))
        }
        WorkflowEvent::ProcessingQueued { job_id } => Some(format!(" - job_id: {}", job_id)),
        WorkflowEvent::WorkerWaiting { .. } => Some("waiting for worker to start".to_string()),
        WorkflowEvent::WorkerTimedOut { polls, elapsed } => Some(format!(
            "worker not finished after {} polls ({}s)",
            polls,
            elapsed.as_secs()
        )),
        _ => None,
    }
}

/// Prints step lines to stdout and drives a progress bar while the worker runs.
#[derive(Default)]
pub struct ConsoleReporter {
    bar: Option<ProgressBar>,
}

impl ConsoleReporter {
    pub fn new() -> Self {
        Self::default()
    }

    fn line(&self, text: &str) {
        match &self.bar {
            Some(bar) if !bar.is_finished() => bar.println(text),
            _ => println!("{}", text),
        }
    }
}

impl Reporter for ConsoleReporter {
    fn report(&mut self, event: WorkflowEvent) {
        match event {
            WorkflowEvent::Settling { delay } => {
                print!(" - waiting {} secs", delay.as_secs());
                if delay.is_zero() {
                    println!();
                }
                let _ = std::io::stdout().flush();
            }
            WorkflowEvent::SettleTick { remaining } => {
                if remaining.is_zero() {
                    println!(".");
                } else {
                    print!(".");
                    let _ = std::io::stdout().flush();
                }
            }
            WorkflowEvent::WorkerProgressStarted { total } => {
                let bar = ProgressBar::new(total);
                bar.set_style(
                    ProgressStyle::with_template(
                        "{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({percent}%)",
                    )
                    .unwrap_or_else(|_| ProgressStyle::default_bar())
                    .progress_chars("=> "),
                );
                self.bar = Some(bar);
            }
            WorkflowEvent::WorkerProgress { processed, .. } => {
                if let Some(bar) = &self.bar {
                    bar.set_position(processed);
                }
            }
            WorkflowEvent::WorkerFinished => {
                if let Some(bar) = &self.bar {
                    bar.finish();
                }
            }
            other => {
                if let Some(text) = event_line(&other) {
                    self.line(&text);
                }
            }
        }
    }
}
