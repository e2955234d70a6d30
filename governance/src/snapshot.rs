//! Governance snapshots: the full engine state at a point in time.
//!
//! A snapshot lets a node restart without replaying its command log. The
//! hash is Blake2b-256 over the bincode encoding of every other field, so a
//! loaded snapshot can be checked before it is trusted.

use quorum_ledger::VotingLedger;
use quorum_types::{Address, GovernorParams, Timepoint};
use serde::{Deserialize, Serialize};

use crate::engine::GovernanceEngine;
use crate::error::GovernanceError;
use crate::executor::ActionExecutor;
use crate::lifecycle::derive_state;
use crate::proposal::ProposalView;
use crate::store::ProposalStore;

pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GovernanceSnapshot {
    /// Blake2b-256 of the remaining fields.
    pub hash: [u8; 32],
    pub version: u32,
    /// Ledger clock when the snapshot was taken.
    pub taken_at: Timepoint,
    pub params: GovernorParams,
    pub guardian: Option<Address>,
    pub ledger: VotingLedger,
    pub proposals: ProposalStore,
    /// Sequence number of the next event.
    pub next_seq: u64,
}

/// Borrowed view of the hashed fields, in encoding order.
#[derive(Serialize)]
struct Hashed<'a> {
    version: u32,
    taken_at: Timepoint,
    params: &'a GovernorParams,
    guardian: &'a Option<Address>,
    ledger: &'a VotingLedger,
    proposals: &'a ProposalStore,
    next_seq: u64,
}

impl GovernanceSnapshot {
    /// Capture the engine's current state.
    pub fn capture<X: ActionExecutor>(engine: &GovernanceEngine<X>) -> Result<Self, GovernanceError> {
        let mut snap = Self {
            hash: [0u8; 32],
            version: SNAPSHOT_VERSION,
            taken_at: engine.ledger().clock(),
            params: engine.params().clone(),
            guardian: engine.guardian(),
            ledger: engine.ledger().clone(),
            proposals: engine.proposals().clone(),
            next_seq: engine.next_seq(),
        };
        snap.hash = snap.compute_hash()?;
        Ok(snap)
    }

    fn compute_hash(&self) -> Result<[u8; 32], GovernanceError> {
        let body = bincode::serialize(&Hashed {
            version: self.version,
            taken_at: self.taken_at,
            params: &self.params,
            guardian: &self.guardian,
            ledger: &self.ledger,
            proposals: &self.proposals,
            next_seq: self.next_seq,
        })
        .map_err(|e| GovernanceError::CorruptSnapshot(e.to_string()))?;
        Ok(quorum_crypto::blake2b_256(&body))
    }

    /// Whether the stored hash matches the contents.
    pub fn verify(&self) -> bool {
        self.version == SNAPSHOT_VERSION
            && matches!(self.compute_hash(), Ok(hash) if hash == self.hash)
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, GovernanceError> {
        bincode::serialize(self).map_err(|e| GovernanceError::CorruptSnapshot(e.to_string()))
    }

    /// Decode and verify a snapshot.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, GovernanceError> {
        let snap: Self = bincode::deserialize(bytes)
            .map_err(|e| GovernanceError::CorruptSnapshot(e.to_string()))?;
        if !snap.verify() {
            return Err(GovernanceError::CorruptSnapshot(format!(
                "hash mismatch (version {})",
                snap.version
            )));
        }
        Ok(snap)
    }

    pub fn hash_hex(&self) -> String {
        hex::encode(self.hash)
    }

    /// Every proposal with its state at `now`, without rebuilding an engine.
    pub fn proposal_views(&self, now: Timepoint) -> Vec<ProposalView> {
        self.proposals
            .iter()
            .map(|p| {
                let supply = self.ledger.total_supply_at(p.snapshot);
                ProposalView {
                    state: derive_state(p, now, &self.params, supply),
                    quorum: self.params.quorum_for(supply),
                    proposal: p.clone(),
                }
            })
            .collect()
    }

    /// Rebuild an engine around `executor`.
    pub fn restore<X: ActionExecutor>(self, executor: X) -> Result<GovernanceEngine<X>, GovernanceError> {
        if !self.verify() {
            return Err(GovernanceError::CorruptSnapshot("hash mismatch".into()));
        }
        GovernanceEngine::from_parts(
            self.params,
            self.guardian,
            self.ledger,
            self.proposals,
            executor,
            self.next_seq,
        )
    }
}
