//! Drive a governance node from a JSON-lines request log.

use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use quorum_executor::{ContractHost, ParameterStore};
use quorum_governance::{GovernanceEngine, GovernanceSnapshot, Outcome, ProposalView, Request};
use quorum_node::{EventBus, GovernanceNode, GovernorConfig, NodeError};
use quorum_types::Timepoint;
use serde::Serialize;

pub struct ReplayOptions {
    pub resume: Option<PathBuf>,
    pub snapshot_out: Option<PathBuf>,
    pub at: Option<Timepoint>,
    pub strict: bool,
}

/// One output line per applied or rejected request.
#[derive(Serialize)]
struct LineReport<'a> {
    line: usize,
    op: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    outcome: Option<&'a Outcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

#[derive(Serialize)]
struct ProposalTable<'a> {
    at: Timepoint,
    proposals: &'a [ProposalView],
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct ReplaySummary {
    pub applied: usize,
    pub rejected: usize,
    pub proposals: usize,
}

/// The executor described by `config`: a funded treasury plus the
/// configured parameter stores.
fn build_host(config: &GovernorConfig) -> anyhow::Result<ContractHost> {
    let mut host = ContractHost::new(config.treasury);
    host.fund_treasury(config.treasury_funds)?;
    for at in &config.parameter_stores {
        host.register(*at, Box::new(ParameterStore::new()))?;
    }
    Ok(host)
}

fn build_engine(config: &GovernorConfig, resume: Option<&Path>) -> anyhow::Result<GovernanceEngine<ContractHost>> {
    let host = build_host(config)?;
    match resume {
        Some(path) => {
            let bytes = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
            let snap = GovernanceSnapshot::from_bytes(&bytes)?;
            if snap.params != config.params {
                tracing::warn!("snapshot parameters differ from the configuration; using the snapshot's");
            }
            tracing::info!(hash = %snap.hash_hex(), taken_at = %snap.taken_at, "resuming from snapshot");
            Ok(snap.restore(host)?)
        }
        None => Ok(GovernanceEngine::new(
            config.params.clone(),
            config.owner,
            config.guardian,
            host,
        )?),
    }
}

/// Replay `log`, writing one JSON line per request and then the final
/// proposal table to `out`.
pub async fn run<W: Write>(
    config: &GovernorConfig,
    log: &Path,
    options: &ReplayOptions,
    mut out: W,
) -> anyhow::Result<ReplaySummary> {
    let engine = build_engine(config, options.resume.as_deref())?;

    let mut bus = EventBus::new();
    bus.subscribe(Box::new(|record| {
        tracing::debug!(seq = record.seq, at = %record.at, event = ?record.event, "event");
    }));
    let node = GovernanceNode::spawn_with_config(engine, bus, config);
    let handle = node.handle();

    let file = std::fs::File::open(log).with_context(|| format!("opening {}", log.display()))?;
    let mut summary = ReplaySummary::default();
    for (index, line) in BufReader::new(file).lines().enumerate() {
        let number = index + 1;
        let line = line.with_context(|| format!("reading line {number}"))?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let request: Request =
            serde_json::from_str(line).with_context(|| format!("line {number}: malformed request"))?;
        let op = request.command.name();

        match handle.submit(request).await {
            Ok(outcome) => {
                summary.applied += 1;
                let report = LineReport {
                    line: number,
                    op,
                    outcome: Some(&outcome),
                    error: None,
                };
                serde_json::to_writer(&mut out, &report)?;
                writeln!(out)?;
            }
            Err(NodeError::Governance(e)) => {
                summary.rejected += 1;
                let report = LineReport {
                    line: number,
                    op,
                    outcome: None,
                    error: Some(e.to_string()),
                };
                serde_json::to_writer(&mut out, &report)?;
                writeln!(out)?;
                if options.strict {
                    node.shutdown().await?;
                    bail!("line {number}: {op} rejected: {e}");
                }
            }
            Err(e) => return Err(e.into()),
        }
    }

    let engine = node.shutdown().await?;
    let at = options.at.unwrap_or_else(|| engine.ledger().clock());
    let views = engine.proposal_views(at);
    summary.proposals = views.len();
    serde_json::to_writer_pretty(
        &mut out,
        &ProposalTable {
            at,
            proposals: &views,
        },
    )?;
    writeln!(out)?;

    if let Some(path) = &options.snapshot_out {
        let snap = GovernanceSnapshot::capture(&engine)?;
        std::fs::write(path, snap.to_bytes()?).with_context(|| format!("writing {}", path.display()))?;
        tracing::info!(path = %path.display(), hash = %snap.hash_hex(), "snapshot written");
    }
    Ok(summary)
}
