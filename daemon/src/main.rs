//! Quorum daemon: replays governance command logs and inspects snapshots.

mod replay;

use anyhow::Context;
use clap::Parser;
use quorum_governance::GovernanceSnapshot;
use quorum_node::{GovernorConfig, LogFormat};
use quorum_types::Timepoint;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "quorum-daemon", about = "Token-weighted governance engine")]
struct Cli {
    /// Log level: "trace", "debug", "info", "warn", "error".
    /// Defaults to the config file's value, then "info".
    #[arg(long, global = true, env = "QUORUM_LOG_LEVEL")]
    log_level: Option<String>,

    /// Log format: "human" or "json".
    #[arg(long, global = true, env = "QUORUM_LOG_FORMAT")]
    log_format: Option<LogFormat>,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Apply a JSON-lines request log and print the resulting proposals.
    Replay {
        /// Governor configuration (TOML).
        #[arg(long, env = "QUORUM_CONFIG")]
        config: PathBuf,

        /// One JSON request per line.
        #[arg(long)]
        log: PathBuf,

        /// Start from this snapshot instead of an empty ledger.
        #[arg(long)]
        resume: Option<PathBuf>,

        /// Write a snapshot of the final state here.
        #[arg(long)]
        snapshot_out: Option<PathBuf>,

        /// Timepoint to derive proposal states at (defaults to the last one applied).
        #[arg(long)]
        at: Option<u64>,

        /// Stop at the first rejected request.
        #[arg(long)]
        strict: bool,
    },
    /// Print the proposals held in a snapshot.
    Inspect {
        #[arg(long)]
        snapshot: PathBuf,

        /// Timepoint to derive proposal states at (defaults to the snapshot's clock).
        #[arg(long)]
        at: Option<u64>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match &cli.command {
        Command::Replay { config, .. } => Some(
            GovernorConfig::from_toml_file(config)
                .with_context(|| format!("loading {}", config.display()))?,
        ),
        Command::Inspect { .. } => None,
    };

    let level = cli
        .log_level
        .clone()
        .or_else(|| config.as_ref().map(|c| c.log_level.clone()))
        .unwrap_or_else(|| "info".to_string());
    let format = cli
        .log_format
        .or_else(|| config.as_ref().map(|c| c.log_format))
        .unwrap_or_default();
    quorum_node::init_logging(format, &level)?;

    match cli.command {
        Command::Replay {
            log,
            resume,
            snapshot_out,
            at,
            strict,
            ..
        } => {
            let config = config.context("replay needs a configuration")?;
            let options = replay::ReplayOptions {
                resume,
                snapshot_out,
                at: at.map(Timepoint::new),
                strict,
            };
            let summary = replay::run(&config, &log, &options, std::io::stdout().lock()).await?;
            tracing::info!(
                applied = summary.applied,
                rejected = summary.rejected,
                proposals = summary.proposals,
                "replay finished"
            );
        }
        Command::Inspect { snapshot, at } => {
            let bytes = std::fs::read(&snapshot)
                .with_context(|| format!("reading {}", snapshot.display()))?;
            let snap = GovernanceSnapshot::from_bytes(&bytes)?;
            let at = at.map(Timepoint::new).unwrap_or(snap.taken_at);
            tracing::info!(hash = %snap.hash_hex(), taken_at = %snap.taken_at, "snapshot verified");
            let views = snap.proposal_views(at);
            println!("{}", serde_json::to_string_pretty(&views)?);
        }
    }

    Ok(())
}
