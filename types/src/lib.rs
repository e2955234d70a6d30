//! Fundamental types for the quorum governance engine.
//!
//! This crate defines the core types shared across every other crate in the workspace:
//! addresses, token amounts, opaque byte payloads, timepoints, proposal ids, governor parameters,
//! proposal state enums and the event vocabulary.

pub mod address;
pub mod amount;
pub mod bytes;
pub mod error;
pub mod event;
pub mod hash;
pub mod params;
pub mod state;
pub mod time;

pub use address::Address;
pub use amount::TokenAmount;
pub use bytes::Bytes;
pub use error::TypesError;
pub use event::{Event, EventRecord};
pub use hash::ProposalId;
pub use params::{GovernorParams, VoteWeighting, BPS_DENOMINATOR};
pub use state::{ProposalState, VoteSupport};
pub use time::Timepoint;
