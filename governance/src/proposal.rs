//! Governance proposals and their recorded lifecycle.

use im::OrdMap;
use quorum_types::{Address, Bytes, ProposalId, ProposalState, Timepoint, TokenAmount, VoteSupport};
use serde::{Deserialize, Serialize};

/// One action in a proposal's batch.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Call {
    pub target: Address,
    /// Native value sent along with the call.
    pub value: TokenAmount,
    pub calldata: Bytes,
}

/// Weighted vote totals.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tally {
    pub against: TokenAmount,
    pub for_votes: TokenAmount,
    pub abstain: TokenAmount,
}

impl Tally {
    /// Participation counted toward quorum.
    pub fn quorum_votes(&self) -> TokenAmount {
        self.for_votes.saturating_add(self.abstain)
    }

    pub fn majority_for(&self) -> bool {
        self.for_votes > self.against
    }

    pub fn total(&self) -> TokenAmount {
        self.quorum_votes().saturating_add(self.against)
    }

    /// Add `weight` to the bucket for `support`.
    ///
    /// Tallies are bounded by the snapshot supply, so the sum cannot wrap.
    pub(crate) fn add(&mut self, support: VoteSupport, weight: TokenAmount) {
        let bucket = match support {
            VoteSupport::Against => &mut self.against,
            VoteSupport::For => &mut self.for_votes,
            VoteSupport::Abstain => &mut self.abstain,
        };
        *bucket = bucket.saturating_add(weight);
    }
}

/// A recorded ballot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ballot {
    /// The account that submitted the vote (differs from the ballot key when
    /// a delegator votes on its delegatee's behalf).
    pub cast_by: Address,
    pub support: VoteSupport,
    pub weight: TokenAmount,
    pub at: Timepoint,
}

/// Transitions that only happen through explicit calls.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordedState {
    /// No explicit transition yet; state is derived from clock and tally.
    #[default]
    Open,
    Queued { eta: Timepoint },
    Executed { at: Timepoint },
    Canceled { at: Timepoint },
}

/// A governance proposal. Parameters are immutable after creation; only the
/// tally, the ballots and the recorded state change.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proposal {
    pub id: ProposalId,
    pub proposer: Address,
    pub calls: Vec<Call>,
    pub description: String,
    pub description_hash: [u8; 32],
    pub created_at: Timepoint,
    /// Voting power is measured as of this timepoint.
    pub snapshot: Timepoint,
    /// Last timepoint at which votes are accepted.
    pub deadline: Timepoint,
    pub tally: Tally,
    /// Ballots keyed by the account whose power was cast.
    pub(crate) ballots: OrdMap<Address, Ballot>,
    pub recorded: RecordedState,
}

impl Proposal {
    pub fn targets(&self) -> impl Iterator<Item = &Address> {
        self.calls.iter().map(|c| &c.target)
    }

    pub fn values(&self) -> impl Iterator<Item = TokenAmount> + '_ {
        self.calls.iter().map(|c| c.value)
    }

    pub fn calldatas(&self) -> impl Iterator<Item = &Bytes> {
        self.calls.iter().map(|c| &c.calldata)
    }

    pub fn ballot(&self, account: &Address) -> Option<&Ballot> {
        self.ballots.get(account)
    }

    pub fn has_voted(&self, account: &Address) -> bool {
        self.ballots.contains_key(account)
    }

    pub fn voter_count(&self) -> usize {
        self.ballots.len()
    }

    /// Timelock expiry, once queued.
    pub fn eta(&self) -> Option<Timepoint> {
        match self.recorded {
            RecordedState::Queued { eta } => Some(eta),
            _ => None,
        }
    }
}

/// A proposal together with its state at the time of the query.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposalView {
    pub state: ProposalState,
    /// Quorum required, computed from the snapshot supply.
    pub quorum: TokenAmount,
    pub proposal: Proposal,
}
