//! Errors raised while parsing or validating fundamental types.

use thiserror::Error;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum TypesError {
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("invalid proposal id: {0}")]
    InvalidProposalId(String),

    #[error("invalid governor parameters: {0}")]
    InvalidParams(String),
}
