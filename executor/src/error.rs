//! Contract host errors.

use quorum_types::{Address, TokenAmount};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ExecutorError {
    #[error("treasury holds {available}, call needs {needed}")]
    InsufficientTreasury {
        needed: TokenAmount,
        available: TokenAmount,
    },

    #[error("balance overflow crediting {0}")]
    Overflow(Address),

    #[error("no contract at {0} to receive calldata")]
    NoContract(Address),

    #[error("contract {target} reverted: {reason}")]
    Reverted { target: Address, reason: String },

    #[error("a contract is already registered at {0}")]
    AlreadyRegistered(Address),
}
