//! Hashing primitives for the quorum governance engine.
//!
//! - **Blake2b-256** for content hashing
//! - Proposal ids derived from the call batch and the description hash

pub mod hash;

pub use hash::{blake2b_256, blake2b_256_multi, hash_description, hash_proposal};
