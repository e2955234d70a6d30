//! Read-only view of the engine, published after every applied request.
//!
//! Readers hold an `Arc` to an immutable copy, so queries never wait on the
//! command loop and the loop never waits on readers.

use quorum_governance::{
    lifecycle::derive_state, ActionExecutor, GovernanceEngine, GovernanceError, ProposalStore,
    ProposalView,
};
use quorum_ledger::VotingLedger;
use quorum_types::{Address, GovernorParams, ProposalId, ProposalState, Timepoint, TokenAmount};

#[derive(Clone, Debug)]
pub struct GovernanceView {
    /// Sequence number of the next event at publication time.
    pub next_seq: u64,
    params: GovernorParams,
    ledger: VotingLedger,
    proposals: ProposalStore,
}

impl GovernanceView {
    pub fn capture<X: ActionExecutor>(engine: &GovernanceEngine<X>) -> Self {
        Self {
            next_seq: engine.next_seq(),
            params: engine.params().clone(),
            ledger: engine.ledger().clone(),
            proposals: engine.proposals().clone(),
        }
    }

    /// Latest timepoint the engine had applied.
    pub fn clock(&self) -> Timepoint {
        self.ledger.clock()
    }

    pub fn params(&self) -> &GovernorParams {
        &self.params
    }

    pub fn ledger(&self) -> &VotingLedger {
        &self.ledger
    }

    pub fn voting_power_at(&self, account: &Address, t: Timepoint) -> TokenAmount {
        self.ledger.voting_power_at(account, t)
    }

    pub fn total_supply_at(&self, t: Timepoint) -> TokenAmount {
        self.ledger.total_supply_at(t)
    }

    pub fn quorum(&self, t: Timepoint) -> TokenAmount {
        self.params.quorum_for(self.ledger.total_supply_at(t))
    }

    pub fn proposal_ids(&self) -> Vec<ProposalId> {
        self.proposals.ids()
    }

    pub fn state(&self, id: &ProposalId, now: Timepoint) -> Result<ProposalState, GovernanceError> {
        let proposal = self.proposals.get(id)?;
        let supply = self.ledger.total_supply_at(proposal.snapshot);
        Ok(derive_state(proposal, now, &self.params, supply))
    }

    pub fn proposal(&self, id: &ProposalId, now: Timepoint) -> Result<ProposalView, GovernanceError> {
        let proposal = self.proposals.get(id)?;
        Ok(ProposalView {
            state: self.state(id, now)?,
            quorum: self.quorum(proposal.snapshot),
            proposal: proposal.clone(),
        })
    }
}
