//! Holographic consensus daemon: replays governance scenarios through a
//! single-writer sequencer and prints every emitted event as a JSON line.

mod config;
mod error;
mod scenario;
mod sequencer;

use anyhow::Context;
use clap::Parser;
use config::DaemonConfig;
use holo_governance::GovernanceEvent;
use holo_types::AccountId;
use holo_utils::{format_duration, LogFormat};
use scenario::Scenario;
use sequencer::Simulation;
use serde::Serialize;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "holo-daemon", about = "Holographic consensus governance daemon")]
struct Cli {
    /// Path to a TOML configuration file. File settings are the base; CLI
    /// flags and env vars override them.
    #[arg(long, env = "HOLO_CONFIG")]
    config: Option<PathBuf>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, env = "HOLO_LOG_LEVEL")]
    log_level: Option<String>,

    /// Log format: "human" or "json".
    #[arg(long, env = "HOLO_LOG_FORMAT")]
    log_format: Option<LogFormat>,

    /// Account holding escrowed stakes.
    #[arg(long, env = "HOLO_ESCROW_ACCOUNT")]
    escrow_account: Option<String>,

    /// Sequencer command queue bound.
    #[arg(long, env = "HOLO_CHANNEL_CAPACITY")]
    channel_capacity: Option<usize>,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Replay a JSON scenario and print events as JSON lines.
    Run {
        /// Scenario file.
        #[arg(long, env = "HOLO_SCENARIO")]
        scenario: PathBuf,

        /// Stop at the first failing step instead of reporting it and continuing.
        #[arg(long)]
        fail_fast: bool,

        /// Write a bincode snapshot of the governance store after the run.
        #[arg(long)]
        snapshot_out: Option<PathBuf>,
    },
    /// Print the effective configuration as TOML.
    Config,
}

#[derive(Serialize)]
struct EventLine<'a> {
    step: usize,
    #[serde(flatten)]
    event: &'a GovernanceEvent,
}

#[derive(Serialize)]
struct ReportLine {
    report: sequencer::Report,
}

#[derive(Serialize)]
struct ErrorLine {
    step: usize,
    error: String,
}

impl Cli {
    fn resolve_config(&self) -> anyhow::Result<DaemonConfig> {
        let mut config = match &self.config {
            Some(path) => DaemonConfig::from_toml_file(path)
                .with_context(|| format!("loading {}", path.display()))?,
            None => DaemonConfig::default(),
        };
        if let Some(level) = &self.log_level {
            config.log_level = level.clone();
        }
        if let Some(format) = self.log_format {
            config.log_format = format;
        }
        if let Some(escrow) = &self.escrow_account {
            config.escrow_account = escrow.clone();
        }
        if let Some(capacity) = self.channel_capacity {
            config.channel_capacity = capacity;
        }
        config.validate()?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = cli.resolve_config()?;
    holo_utils::init_logging(config.log_format, &config.log_level)?;

    match cli.command {
        Command::Config => {
            print!("{}", config.to_toml_string()?);
        }
        Command::Run {
            scenario,
            fail_fast,
            snapshot_out,
        } => {
            let scenario = Scenario::from_file(&scenario)
                .with_context(|| format!("loading {}", scenario.display()))?;
            run(config, scenario, fail_fast, snapshot_out).await?;
        }
    }

    Ok(())
}

async fn run(
    config: DaemonConfig,
    scenario: Scenario,
    fail_fast: bool,
    snapshot_out: Option<PathBuf>,
) -> anyhow::Result<()> {
    let params = &config.params;
    tracing::info!(
        queue_period = %format_duration(params.queue_period_secs),
        boost_period = %format_duration(params.boost_period_secs),
        pended_period = %format_duration(params.pended_boost_period_secs),
        steps = scenario.steps.len(),
        "starting scenario"
    );

    let simulation = Simulation::new(
        config.params.clone(),
        AccountId::new(config.escrow_account.as_str()),
        scenario.start_time,
    )?;
    let (handle, task) = sequencer::spawn(simulation, config.channel_capacity);

    let steps = scenario.steps.clone();
    handle.seed(scenario).await?;

    let mut failures = 0usize;
    for (index, step) in steps.into_iter().enumerate() {
        let result = handle.apply(step).await;
        for event in handle.drain_events().await? {
            println!("{}", serde_json::to_string(&EventLine { step: index, event: &event })?);
        }
        if let Err(err) = result {
            failures += 1;
            tracing::warn!(step = index, error = %err, "step failed");
            println!(
                "{}",
                serde_json::to_string(&ErrorLine {
                    step: index,
                    error: err.to_string(),
                })?
            );
            if fail_fast {
                return Err(err).with_context(|| format!("step {index} failed"));
            }
        }
    }

    let report = handle.report().await?;
    println!("{}", serde_json::to_string(&ReportLine { report })?);

    if let Some(path) = snapshot_out {
        handle.save_store(path.clone()).await?;
        tracing::info!(path = %path.display(), "store snapshot written");
    }

    drop(handle);
    task.await?;
    tracing::info!(failures, "scenario finished");
    Ok(())
}
