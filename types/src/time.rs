//! Timepoint type used throughout the engine.
//!
//! A timepoint is an externally supplied monotonic counter (block number or
//! timestamp, the engine does not care which). The engine never reads a clock
//! itself; every mutation carries the timepoint it happens at.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A point on the governance clock.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Timepoint(u64);

impl Timepoint {
    /// Time zero.
    pub const GENESIS: Self = Self(0);

    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn get(&self) -> u64 {
        self.0
    }

    /// The timepoint `delta` steps later, or `None` past the end of the clock.
    pub fn checked_add(self, delta: u64) -> Option<Self> {
        self.0.checked_add(delta).map(Self)
    }

    pub fn saturating_add(self, delta: u64) -> Self {
        Self(self.0.saturating_add(delta))
    }

    /// The immediately preceding timepoint; `None` at genesis.
    pub fn prev(self) -> Option<Self> {
        self.0.checked_sub(1).map(Self)
    }

    /// Steps elapsed since this timepoint (relative to `now`).
    pub fn elapsed_since(&self, now: Timepoint) -> u64 {
        now.0.saturating_sub(self.0)
    }
}

impl fmt::Display for Timepoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t{}", self.0)
    }
}

impl From<u64> for Timepoint {
    fn from(value: u64) -> Self {
        Self(value)
    }
}
