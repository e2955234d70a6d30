//! Append-only `(timepoint, value)` histories with logarithmic lookup.
//!
//! Histories are persistent vectors: cloning one shares its storage, so a
//! copy of the ledger handed to readers costs nothing until it diverges.

use std::cmp::Ordering;

use im::Vector;
use quorum_types::{Timepoint, TokenAmount};
use serde::{Deserialize, Serialize};

use crate::LedgerError;

/// The value of a quantity as of a timepoint.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Checkpoint {
    pub at: Timepoint,
    pub value: TokenAmount,
}

/// An ordered history of checkpoints for one quantity.
///
/// Timepoints are strictly increasing. A write at the timepoint of the last
/// checkpoint replaces its value instead of appending, so several mutations
/// within one step leave a single checkpoint behind.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CheckpointHistory {
    checkpoints: Vector<Checkpoint>,
}

impl CheckpointHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `value` as of `at`. Returns `(previous latest, value)`.
    pub fn push(
        &mut self,
        at: Timepoint,
        value: TokenAmount,
    ) -> Result<(TokenAmount, TokenAmount), LedgerError> {
        match self.checkpoints.back_mut() {
            Some(last) if last.at > at => Err(LedgerError::StaleTimepoint {
                at,
                latest: last.at,
            }),
            Some(last) if last.at == at => {
                let previous = last.value;
                last.value = value;
                Ok((previous, value))
            }
            Some(last) => {
                let previous = last.value;
                self.checkpoints.push_back(Checkpoint { at, value });
                Ok((previous, value))
            }
            None => {
                self.checkpoints.push_back(Checkpoint { at, value });
                Ok((TokenAmount::ZERO, value))
            }
        }
    }

    /// Value of the latest checkpoint with `at <= t`, or zero if there is none.
    pub fn upper_lookup(&self, t: Timepoint) -> TokenAmount {
        let idx = self
            .checkpoints
            .binary_search_by(|c| {
                if c.at <= t {
                    Ordering::Less
                } else {
                    Ordering::Greater
                }
            })
            .unwrap_or_else(|idx| idx);
        idx.checked_sub(1)
            .and_then(|i| self.checkpoints.get(i))
            .map(|c| c.value)
            .unwrap_or(TokenAmount::ZERO)
    }

    /// Current value (zero for an empty history).
    pub fn latest(&self) -> TokenAmount {
        self.checkpoints
            .back()
            .map(|c| c.value)
            .unwrap_or(TokenAmount::ZERO)
    }

    pub fn latest_checkpoint(&self) -> Option<&Checkpoint> {
        self.checkpoints.back()
    }

    pub fn get(&self, pos: usize) -> Option<&Checkpoint> {
        self.checkpoints.get(pos)
    }

    pub fn len(&self) -> usize {
        self.checkpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.checkpoints.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Checkpoint> {
        self.checkpoints.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(n: u64) -> Timepoint {
        Timepoint::new(n)
    }

    fn amt(n: u128) -> TokenAmount {
        TokenAmount::new(n)
    }

    #[test]
    fn empty_history_reads_zero() {
        let h = CheckpointHistory::new();
        assert_eq!(h.upper_lookup(t(0)), TokenAmount::ZERO);
        assert_eq!(h.upper_lookup(t(u64::MAX)), TokenAmount::ZERO);
        assert_eq!(h.latest(), TokenAmount::ZERO);
        assert!(h.is_empty());
    }

    #[test]
    fn lookup_is_a_step_function() {
        let mut h = CheckpointHistory::new();
        h.push(t(10), amt(100)).unwrap();
        h.push(t(20), amt(250)).unwrap();
        h.push(t(35), amt(40)).unwrap();

        assert_eq!(h.upper_lookup(t(9)), amt(0));
        assert_eq!(h.upper_lookup(t(10)), amt(100));
        assert_eq!(h.upper_lookup(t(19)), amt(100));
        assert_eq!(h.upper_lookup(t(20)), amt(250));
        assert_eq!(h.upper_lookup(t(34)), amt(250));
        assert_eq!(h.upper_lookup(t(35)), amt(40));
        assert_eq!(h.upper_lookup(t(1_000)), amt(40));
    }

    #[test]
    fn same_timepoint_overwrites() {
        let mut h = CheckpointHistory::new();
        h.push(t(5), amt(1)).unwrap();
        let (prev, new) = h.push(t(5), amt(7)).unwrap();
        assert_eq!((prev, new), (amt(1), amt(7)));
        assert_eq!(h.len(), 1);
        assert_eq!(h.upper_lookup(t(5)), amt(7));
    }

    #[test]
    fn earlier_timepoint_rejected() {
        let mut h = CheckpointHistory::new();
        h.push(t(5), amt(1)).unwrap();
        let err = h.push(t(4), amt(2)).unwrap_err();
        assert_eq!(
            err,
            LedgerError::StaleTimepoint {
                at: t(4),
                latest: t(5)
            }
        );
        assert_eq!(h.latest(), amt(1));
    }

    #[test]
    fn push_reports_previous_value() {
        let mut h = CheckpointHistory::new();
        assert_eq!(h.push(t(1), amt(3)).unwrap(), (amt(0), amt(3)));
        assert_eq!(h.push(t(2), amt(9)).unwrap(), (amt(3), amt(9)));
        assert_eq!(h.get(1), Some(&Checkpoint { at: t(2), value: amt(9) }));
    }

    #[test]
    fn lookup_over_many_checkpoints() {
        let mut h = CheckpointHistory::new();
        for i in 0..1_000u64 {
            h.push(t(i * 3), amt(u128::from(i))).unwrap();
        }
        assert_eq!(h.upper_lookup(t(0)), amt(0));
        assert_eq!(h.upper_lookup(t(301)), amt(100));
        assert_eq!(h.upper_lookup(t(2_997)), amt(999));
    }
}
