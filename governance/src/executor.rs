//! The seam to whatever actually performs a proposal's calls.

use quorum_types::Bytes;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::proposal::Call;

/// Why a batch stopped.
#[derive(Clone, Debug, Error, PartialEq, Eq, Serialize, Deserialize)]
#[error("call {index} failed: {reason}")]
pub struct BatchFailure {
    /// Position of the failing call in the batch.
    pub index: usize,
    pub reason: String,
}

/// Runs a batch of calls as one unit.
///
/// Implementations must be all-or-nothing: when any call fails, the effects
/// of the calls before it are discarded and the error names the failing
/// index. On success the return data of every call is returned in order.
pub trait ActionExecutor {
    fn run_batch(&mut self, calls: &[Call]) -> Result<Vec<Bytes>, BatchFailure>;
}

impl<X: ActionExecutor + ?Sized> ActionExecutor for Box<X> {
    fn run_batch(&mut self, calls: &[Call]) -> Result<Vec<Bytes>, BatchFailure> {
        (**self).run_batch(calls)
    }
}
