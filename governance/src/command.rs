//! Serializable governance requests.
//!
//! Every mutating engine operation has a [`Command`] form so that a whole
//! session can be recorded as JSON lines and replayed deterministically.

use quorum_types::{Address, Bytes, ProposalId, Timepoint, TokenAmount, VoteSupport};
use serde::{Deserialize, Serialize};

use crate::engine::GovernanceEngine;
use crate::error::GovernanceError;
use crate::executor::ActionExecutor;

/// A command issued by `caller` at timepoint `at`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Request {
    pub at: Timepoint,
    pub caller: Address,
    pub command: Command,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Command {
    Mint {
        to: Address,
        amount: TokenAmount,
    },
    Transfer {
        to: Address,
        amount: TokenAmount,
    },
    Delegate {
        to: Address,
    },
    TransferOwnership {
        new_owner: Address,
    },
    Propose {
        targets: Vec<Address>,
        values: Vec<TokenAmount>,
        calldatas: Vec<Bytes>,
        description: String,
    },
    CastVote {
        proposal: ProposalId,
        support: VoteSupport,
    },
    Queue {
        proposal: ProposalId,
    },
    Execute {
        proposal: ProposalId,
    },
    Cancel {
        proposal: ProposalId,
    },
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::Mint { .. } => "mint",
            Command::Transfer { .. } => "transfer",
            Command::Delegate { .. } => "delegate",
            Command::TransferOwnership { .. } => "transfer_ownership",
            Command::Propose { .. } => "propose",
            Command::CastVote { .. } => "cast_vote",
            Command::Queue { .. } => "queue",
            Command::Execute { .. } => "execute",
            Command::Cancel { .. } => "cancel",
        }
    }
}

/// What a successful command produced.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Minted,
    Transferred,
    Delegated { previous: Address },
    OwnershipTransferred,
    Proposed { id: ProposalId },
    Voted { weight: TokenAmount },
    Queued { eta: Timepoint },
    Executed { results: Vec<Bytes> },
    Canceled,
}

impl<X: ActionExecutor> GovernanceEngine<X> {
    /// Dispatch a request to the matching operation.
    pub fn apply(&mut self, request: Request) -> Result<Outcome, GovernanceError> {
        let Request {
            at,
            caller,
            command,
        } = request;
        match command {
            Command::Mint { to, amount } => {
                self.mint(&caller, &to, amount, at).map(|_| Outcome::Minted)
            }
            Command::Transfer { to, amount } => self
                .transfer(&caller, &to, amount, at)
                .map(|_| Outcome::Transferred),
            Command::Delegate { to } => self
                .delegate(&caller, &to, at)
                .map(|previous| Outcome::Delegated { previous }),
            Command::TransferOwnership { new_owner } => self
                .transfer_ownership(&caller, &new_owner, at)
                .map(|_| Outcome::OwnershipTransferred),
            Command::Propose {
                targets,
                values,
                calldatas,
                description,
            } => self
                .propose(&caller, targets, values, calldatas, description, at)
                .map(|id| Outcome::Proposed { id }),
            Command::CastVote { proposal, support } => self
                .cast_vote(&caller, &proposal, support, at)
                .map(|weight| Outcome::Voted { weight }),
            Command::Queue { proposal } => {
                self.queue(&proposal, at).map(|eta| Outcome::Queued { eta })
            }
            Command::Execute { proposal } => self
                .execute(&proposal, at)
                .map(|results| Outcome::Executed { results }),
            Command::Cancel { proposal } => self
                .cancel(&proposal, &caller, at)
                .map(|_| Outcome::Canceled),
        }
    }
}
