//! Derived proposal state.
//!
//! Status is a pure function of the clock, the proposal's recorded
//! transitions, its tally and the total supply at its snapshot. Nothing here
//! mutates; the engine calls it whenever a transition needs to be checked.

use quorum_types::{GovernorParams, ProposalState, Timepoint, TokenAmount};

use crate::proposal::{Proposal, RecordedState, Tally};

/// For + Abstain reached the quorum for the snapshot supply.
pub fn quorum_reached(tally: &Tally, params: &GovernorParams, snapshot_supply: TokenAmount) -> bool {
    tally.quorum_votes() >= params.quorum_for(snapshot_supply)
}

/// Quorum reached and strictly more For than Against.
pub fn vote_succeeded(tally: &Tally, params: &GovernorParams, snapshot_supply: TokenAmount) -> bool {
    quorum_reached(tally, params, snapshot_supply) && tally.majority_for()
}

/// The state of `proposal` at `now`.
pub fn derive_state(
    proposal: &Proposal,
    now: Timepoint,
    params: &GovernorParams,
    snapshot_supply: TokenAmount,
) -> ProposalState {
    match proposal.recorded {
        RecordedState::Executed { .. } => return ProposalState::Executed,
        RecordedState::Canceled { .. } => return ProposalState::Canceled,
        RecordedState::Queued { eta } => {
            return if now > eta.saturating_add(params.grace_period) {
                ProposalState::Expired
            } else {
                ProposalState::Queued
            };
        }
        RecordedState::Open => {}
    }

    if now <= proposal.snapshot {
        ProposalState::Pending
    } else if now <= proposal.deadline {
        ProposalState::Active
    } else if vote_succeeded(&proposal.tally, params, snapshot_supply) {
        ProposalState::Succeeded
    } else {
        ProposalState::Defeated
    }
}
