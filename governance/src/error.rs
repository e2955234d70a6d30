use quorum_ledger::LedgerError;
use quorum_types::{Address, ProposalId, ProposalState, Timepoint, TokenAmount, TypesError};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GovernanceError {
    #[error("ledger error: {0}")]
    Ledger(#[from] LedgerError),

    #[error("invalid parameters: {0}")]
    InvalidParams(TypesError),

    #[error("proposer {proposer} has {power} votes, threshold is {threshold}")]
    InsufficientProposerPower {
        proposer: Address,
        power: TokenAmount,
        threshold: TokenAmount,
    },

    #[error("proposal {0} already exists")]
    DuplicateProposal(ProposalId),

    #[error("proposal {0} not found")]
    UnknownProposal(ProposalId),

    #[error("a proposal needs at least one call")]
    EmptyProposal,

    #[error("call sequences differ in length: {targets} targets, {values} values, {calldatas} calldatas")]
    InvalidProposalLength {
        targets: usize,
        values: usize,
        calldatas: usize,
    },

    #[error("timepoint overflow while scheduling proposal")]
    TimepointOverflow,

    #[error("proposal {id} is {state}, voting requires active")]
    NotActive { id: ProposalId, state: ProposalState },

    #[error("{voter} has already voted on proposal {id}")]
    AlreadyVoted { id: ProposalId, voter: Address },

    #[error("proposal {id} is {state}, queueing requires succeeded")]
    NotSucceeded { id: ProposalId, state: ProposalState },

    #[error("proposal {id} is {state}, execution requires queued")]
    NotQueued { id: ProposalId, state: ProposalState },

    #[error("proposal {id} timelock runs until {eta}, now {now}")]
    TimelockNotElapsed {
        id: ProposalId,
        eta: Timepoint,
        now: Timepoint,
    },

    #[error("proposal {id} reverted at call {index}: {reason}")]
    ExecutionReverted {
        id: ProposalId,
        index: usize,
        reason: String,
    },

    #[error("proposal {0} has already been executed")]
    AlreadyExecuted(ProposalId),

    #[error("{caller} may not cancel proposal {id}")]
    Unauthorized { id: ProposalId, caller: Address },

    #[error("proposal {id} is {state} and can no longer be canceled")]
    NotCancelable { id: ProposalId, state: ProposalState },

    #[error("corrupt snapshot: {0}")]
    CorruptSnapshot(String),
}
