//! Nullable infrastructure for deterministic testing.
//!
//! The engine's outside world is the clock that stamps requests and the
//! executor that runs proposal batches. This crate provides test-friendly
//! versions of both that:
//! - Return deterministic values
//! - Can be controlled programmatically
//! - Record what they were asked to do
//!
//! Usage: swap real implementations for nullables in tests.

pub mod clock;
pub mod executor;

pub use clock::NullClock;
pub use executor::{ExecutedBatches, NullExecutor};
