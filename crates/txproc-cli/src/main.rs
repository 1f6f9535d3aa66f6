//! txproc: upload a CSV file to the tx-processor API and process it.
//!
//! Reads `{api_host, api_port, api_proto, api_key}` from `config.json` (or
//! `--config` / `TXPROC_CONFIG`). Any `TXPROC_API_*` variable overrides the file.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context};
use clap::Parser;
use txproc_api_client::{ApiClient, MonitorOutcome, UploadStatusPolicy, Workflow, WorkflowOptions};
use txproc_cli::{init_tracing, monitor_options, ConsoleReporter};
use txproc_core::{ClientConfig, DEFAULT_CONFIG_PATH};

#[derive(Parser)]
#[command(name = "txproc", about = "Upload a CSV file and process it with tx-processor")]
struct Cli {
    /// File to process
    #[arg(long)]
    file: PathBuf,
    /// Monitor worker results until the worker finishes
    #[arg(long)]
    monitor: bool,
    /// Path to the JSON config file
    #[arg(long, env = "TXPROC_CONFIG", default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,
    /// Seconds to wait between upload and processing
    #[arg(long, default_value_t = 5)]
    settle_secs: u64,
    /// Delay between worker status polls, in milliseconds
    #[arg(long, default_value_t = 1000, value_parser = clap::value_parser!(u64).range(1..))]
    poll_interval_ms: u64,
    /// Give up monitoring after this many polls
    #[arg(long)]
    max_polls: Option<u32>,
    /// Give up monitoring after this many seconds (0 = never)
    #[arg(long, default_value_t = 1800)]
    monitor_timeout_secs: u64,
    /// Do not fail when storage answers the upload with an error status
    #[arg(long)]
    lenient_upload: bool,
}

impl Cli {
    fn workflow_options(&self) -> WorkflowOptions {
        WorkflowOptions {
            settle_delay: Duration::from_secs(self.settle_secs),
            upload_policy: if self.lenient_upload {
                UploadStatusPolicy::Lenient
            } else {
                UploadStatusPolicy::Strict
            },
            monitor: self.monitor.then(|| {
                monitor_options(
                    self.poll_interval_ms,
                    self.max_polls,
                    self.monitor_timeout_secs,
                )
            }),
            ..WorkflowOptions::default()
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();

    println!("Upload-and-process / tx-processor client");

    if !cli.file.is_file() {
        bail!("file not found: {}", cli.file.display());
    }

    let config = ClientConfig::load(&cli.config)
        .with_context(|| format!("Cannot load config from {}", cli.config.display()))?;

    if cli.monitor {
        println!("Monitor is enabled!");
    }

    let client = ApiClient::new(config).context("Failed to create API client")?;

    println!("API file upload started");
    println!(" - API-KEY is: {}", client.config().masked_key());
    println!(" - API host : {}\n", client.config().api_host);
    let mut reporter = ConsoleReporter::new();
    let report = Workflow::new(&client, cli.workflow_options())
        .run(&cli.file, &mut reporter)
        .await?;

    tracing::info!(
        attachment_id = %report.grant.id,
        job_id = %report.job.id,
        bytes = report.transfer.bytes,
        "Workflow completed"
    );

    match report.monitor {
        Some(MonitorOutcome::Finished(_)) => println!("end"),
        Some(MonitorOutcome::TimedOut { polls, elapsed, .. }) => bail!(
            "worker {} did not finish after {} polls ({}s)",
            report.job.id,
            polls,
            elapsed.as_secs()
        ),
        None => {}
    }

    Ok(())
}
