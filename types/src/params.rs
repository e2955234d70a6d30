//! Governor parameters: timing, thresholds and vote-weighting policy.

use serde::{Deserialize, Serialize};

use crate::amount::TokenAmount;
use crate::error::TypesError;

/// Basis points denominator (10 000 bps = 100%).
pub const BPS_DENOMINATOR: u32 = 10_000;

/// How a ballot's weight is resolved at the proposal snapshot.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VoteWeighting {
    /// The voter's own checkpoint stream: the power others delegated to it,
    /// including its own balance when self-delegated. A holder that delegated
    /// away votes with zero weight. Ballots are tracked per voter.
    #[default]
    Delegatee,
    /// The snapshot power of the voter's current delegatee. Ballots are
    /// tracked per delegatee, so a delegatee's power is cast at most once,
    /// either by the delegatee or by any one of its delegators.
    ResolvedDelegate,
}

/// Parameters of the proposal state machine.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GovernorParams {
    /// Steps between proposal creation and the snapshot.
    pub voting_delay: u64,

    /// Steps between the snapshot and the voting deadline. Must be at least 1.
    pub voting_period: u64,

    /// Voting power a proposer needs at the step before proposing.
    pub proposal_threshold: TokenAmount,

    /// Required For + Abstain participation as a fraction of snapshot supply (bps).
    pub quorum_bps: u32,

    /// Steps between queueing and the earliest execution.
    pub timelock_delay: u64,

    /// Steps after the timelock during which execution is still allowed.
    pub grace_period: u64,

    pub vote_weighting: VoteWeighting,
}

impl GovernorParams {
    /// Reject parameter sets the state machine cannot honour.
    pub fn validate(&self) -> Result<(), TypesError> {
        if self.voting_period == 0 {
            return Err(TypesError::InvalidParams(
                "voting_period must be at least 1".into(),
            ));
        }
        if self.quorum_bps > BPS_DENOMINATOR {
            return Err(TypesError::InvalidParams(format!(
                "quorum_bps {} exceeds {}",
                self.quorum_bps, BPS_DENOMINATOR
            )));
        }
        Ok(())
    }

    /// Quorum for a given snapshot supply.
    pub fn quorum_for(&self, supply: TokenAmount) -> TokenAmount {
        supply.mul_bps(self.quorum_bps)
    }
}

impl Default for GovernorParams {
    fn default() -> Self {
        Self {
            voting_delay: 1,
            voting_period: 50_400,
            proposal_threshold: TokenAmount::ZERO,
            quorum_bps: 400,
            timelock_delay: 172_800,
            grace_period: 1_209_600,
            vote_weighting: VoteWeighting::Delegatee,
        }
    }
}
