//! Nullable clock: deterministic timepoints for testing.

use quorum_types::Timepoint;
use std::cell::Cell;

/// A deterministic clock for testing.
///
/// Time only advances when you tell it to.
pub struct NullClock {
    current: Cell<u64>,
}

impl NullClock {
    pub fn new(initial: u64) -> Self {
        Self {
            current: Cell::new(initial),
        }
    }

    /// Get the current timepoint.
    pub fn now(&self) -> Timepoint {
        Timepoint::new(self.current.get())
    }

    /// Advance by `steps` and return the new timepoint.
    pub fn advance(&self, steps: u64) -> Timepoint {
        self.current.set(self.current.get() + steps);
        self.now()
    }

    /// Advance by one step.
    pub fn tick(&self) -> Timepoint {
        self.advance(1)
    }

    /// Set the clock to a specific timepoint.
    pub fn set(&self, at: u64) {
        self.current.set(at);
    }
}

impl Default for NullClock {
    fn default() -> Self {
        Self::new(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advances_only_on_request() {
        let clock = NullClock::new(5);
        assert_eq!(clock.now(), Timepoint::new(5));
        assert_eq!(clock.tick(), Timepoint::new(6));
        assert_eq!(clock.advance(10), Timepoint::new(16));
        clock.set(2);
        assert_eq!(clock.now(), Timepoint::new(2));
    }
}
