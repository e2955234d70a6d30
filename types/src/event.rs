//! Notifications emitted by every state-changing operation.

use serde::{Deserialize, Serialize};

use crate::{Address, ProposalId, ProposalState, Timepoint, TokenAmount, VoteSupport};

/// Ledger- and governance-level events, in the order they happened.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Event {
    /// Tokens moved. Mints carry `from == Address::ZERO`.
    Transfer {
        from: Address,
        to: Address,
        amount: TokenAmount,
    },
    /// The minting role changed hands.
    OwnershipTransferred { previous: Address, new: Address },
    /// A holder pointed its voting power at a different delegatee.
    DelegateChanged {
        delegator: Address,
        from_delegate: Address,
        to_delegate: Address,
    },
    /// A delegatee's checkpointed voting power changed.
    DelegateVotesChanged {
        delegate: Address,
        previous: TokenAmount,
        new: TokenAmount,
    },
    ProposalCreated {
        id: ProposalId,
        proposer: Address,
        snapshot: Timepoint,
        deadline: Timepoint,
        description: String,
    },
    VoteCast {
        voter: Address,
        id: ProposalId,
        support: VoteSupport,
        weight: TokenAmount,
    },
    /// An explicit transition (queued, executed, canceled).
    ProposalStateChanged { id: ProposalId, state: ProposalState },
}

/// An event stamped with its position in the mutation sequence.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    pub seq: u64,
    pub at: Timepoint,
    pub event: Event,
}
