//! Checkpointed voting-power ledger.
//!
//! Every holder's balance, every delegatee's voting power and the total supply
//! are kept as append-only histories of `(timepoint, value)` checkpoints, so
//! "what was X's power at T" is a binary search rather than a replay.
//! Voting power follows delegation: a holder's balance accrues to the stream
//! of whichever address it currently delegates to (itself by default).

pub mod checkpoint;
pub mod delegation;
pub mod error;
pub mod ledger;

pub use checkpoint::{Checkpoint, CheckpointHistory};
pub use delegation::{DelegationChange, DelegationRegistry};
pub use error::LedgerError;
pub use ledger::VotingLedger;
