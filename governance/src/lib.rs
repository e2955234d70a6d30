//! Token-weighted governance.
//!
//! Lifecycle: Pending → Active → Defeated | Succeeded → Queued → Executed | Expired,
//! with Canceled reachable while Pending or Active.
//!
//! Key principle: voting power is read from the ledger's checkpoints at each
//! proposal's snapshot, so tokens moved after the snapshot carry no weight on it.
//! Only explicit transitions (queue, execute, cancel) are recorded; every other
//! state is recomputed from the clock and the tally on demand.

pub mod command;
pub mod engine;
pub mod error;
pub mod executor;
pub mod lifecycle;
pub mod proposal;
pub mod snapshot;
pub mod store;

pub use command::{Command, Outcome, Request};
pub use engine::GovernanceEngine;
pub use error::GovernanceError;
pub use executor::{ActionExecutor, BatchFailure};
pub use proposal::{Ballot, Call, Proposal, ProposalView, RecordedState, Tally};
pub use snapshot::GovernanceSnapshot;
pub use store::ProposalStore;
