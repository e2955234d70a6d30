//! Proposal lifecycle states and vote options.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Where a proposal stands in its lifecycle.
///
/// `Pending`, `Active`, `Defeated`, `Succeeded` and `Expired` are derived from
/// the clock and the tally; `Queued`, `Executed` and `Canceled` are the result
/// of explicit calls and are recorded on the proposal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProposalState {
    /// Created; voting has not opened yet (now ≤ snapshot).
    Pending,
    /// Voting is open (snapshot < now ≤ deadline).
    Active,
    /// Withdrawn by the proposer or the guardian before voting closed.
    Canceled,
    /// Voting closed without quorum or without a For majority.
    Defeated,
    /// Voting closed with quorum and a For majority; not queued yet.
    Succeeded,
    /// Waiting out the timelock.
    Queued,
    /// The grace window after the timelock passed without execution.
    Expired,
    /// The call batch ran successfully.
    Executed,
}

impl ProposalState {
    /// Whether no further transition can ever leave this state.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Defeated | Self::Executed | Self::Expired | Self::Canceled
        )
    }

    /// Whether the proposer or guardian may still cancel.
    pub fn is_cancelable(&self) -> bool {
        matches!(self, Self::Pending | Self::Active)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Active => "active",
            Self::Canceled => "canceled",
            Self::Defeated => "defeated",
            Self::Succeeded => "succeeded",
            Self::Queued => "queued",
            Self::Expired => "expired",
            Self::Executed => "executed",
        }
    }
}

impl fmt::Display for ProposalState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A ballot option.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VoteSupport {
    Against,
    For,
    /// Counts toward quorum but not toward the For/Against comparison.
    Abstain,
}

impl fmt::Display for VoteSupport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Against => "against",
            Self::For => "for",
            Self::Abstain => "abstain",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_states() {
        assert!(ProposalState::Defeated.is_terminal());
        assert!(ProposalState::Executed.is_terminal());
        assert!(ProposalState::Expired.is_terminal());
        assert!(ProposalState::Canceled.is_terminal());
        assert!(!ProposalState::Queued.is_terminal());
        assert!(!ProposalState::Succeeded.is_terminal());
    }

    #[test]
    fn only_pending_and_active_cancel() {
        assert!(ProposalState::Pending.is_cancelable());
        assert!(ProposalState::Active.is_cancelable());
        assert!(!ProposalState::Succeeded.is_cancelable());
        assert!(!ProposalState::Queued.is_cancelable());
    }
}
