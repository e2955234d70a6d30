//! Nullable executor: records proposal batches instead of running them.

use quorum_governance::{ActionExecutor, BatchFailure, Call};
use quorum_types::Bytes;
use std::sync::{Arc, Mutex};

/// Shared log of every batch that completed.
pub type ExecutedBatches = Arc<Mutex<Vec<Vec<Call>>>>;

/// An executor that succeeds by default and can be told to revert.
///
/// Thread-safe so it can be moved into a node task while the test keeps a
/// handle on the log.
#[derive(Default)]
pub struct NullExecutor {
    executed: ExecutedBatches,
    fail_at: Option<(usize, String)>,
}

impl NullExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Revert every batch at call `index` with `reason`.
    pub fn failing_at(index: usize, reason: impl Into<String>) -> Self {
        Self {
            fail_at: Some((index, reason.into())),
            ..Self::default()
        }
    }

    /// Stop reverting.
    pub fn recover(&mut self) {
        self.fail_at = None;
    }

    /// A handle on the log of completed batches.
    pub fn executed(&self) -> ExecutedBatches {
        Arc::clone(&self.executed)
    }

    pub fn batch_count(&self) -> usize {
        self.executed.lock().map(|log| log.len()).unwrap_or(0)
    }
}

impl ActionExecutor for NullExecutor {
    fn run_batch(&mut self, calls: &[Call]) -> Result<Vec<Bytes>, BatchFailure> {
        if let Some((index, reason)) = &self.fail_at {
            if *index < calls.len() {
                return Err(BatchFailure {
                    index: *index,
                    reason: reason.clone(),
                });
            }
        }
        if let Ok(mut log) = self.executed.lock() {
            log.push(calls.to_vec());
        }
        Ok(calls.iter().map(|c| c.calldata.clone()).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quorum_types::{Address, TokenAmount};

    fn call(data: &[u8]) -> Call {
        Call {
            target: Address::from_low_u64(1),
            value: TokenAmount::ZERO,
            calldata: Bytes::from(data),
        }
    }

    #[test]
    fn records_and_echoes() {
        let mut exec = NullExecutor::new();
        let out = exec.run_batch(&[call(b"a"), call(b"b")]).unwrap();
        assert_eq!(out, vec![Bytes::from(&b"a"[..]), Bytes::from(&b"b"[..])]);
        assert_eq!(exec.batch_count(), 1);
        assert_eq!(exec.executed().lock().unwrap()[0].len(), 2);
    }

    #[test]
    fn fails_at_configured_index() {
        let mut exec = NullExecutor::failing_at(1, "nope");
        let err = exec.run_batch(&[call(b"a"), call(b"b")]).unwrap_err();
        assert_eq!(err.index, 1);
        assert_eq!(exec.batch_count(), 0);

        // Shorter batches never reach the failing index.
        assert!(exec.run_batch(&[call(b"a")]).is_ok());
        exec.recover();
        assert!(exec.run_batch(&[call(b"a"), call(b"b")]).is_ok());
        assert_eq!(exec.batch_count(), 2);
    }
}
