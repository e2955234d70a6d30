//! Core governance engine: drives proposals through their lifecycle against
//! the checkpointed voting ledger.
//!
//! The engine owns the ledger, the proposal store and the executor and adds
//! no state of its own beyond an outbox of events. Every mutation is checked
//! completely before anything is written: a returned error means nothing
//! changed, including the clock.

use quorum_crypto::{hash_description, hash_proposal};
use quorum_ledger::VotingLedger;
use quorum_types::{
    Address, Bytes, Event, EventRecord, GovernorParams, ProposalId, ProposalState, Timepoint,
    TokenAmount, VoteSupport, VoteWeighting,
};
use tracing::{debug, info, warn};

use crate::error::GovernanceError;
use crate::executor::ActionExecutor;
use crate::lifecycle::derive_state;
use crate::proposal::{Ballot, Call, Proposal, ProposalView, RecordedState, Tally};
use crate::store::ProposalStore;

pub struct GovernanceEngine<X> {
    params: GovernorParams,
    /// May cancel any proposal that is still pending or active.
    guardian: Option<Address>,
    ledger: VotingLedger,
    proposals: ProposalStore,
    executor: X,
    outbox: Vec<EventRecord>,
    next_seq: u64,
}

impl<X: ActionExecutor> GovernanceEngine<X> {
    /// A fresh engine with an empty ledger minted by `owner`.
    pub fn new(
        params: GovernorParams,
        owner: Address,
        guardian: Option<Address>,
        executor: X,
    ) -> Result<Self, GovernanceError> {
        Self::from_parts(
            params,
            guardian,
            VotingLedger::new(owner),
            ProposalStore::new(),
            executor,
            0,
        )
    }

    /// Reassemble an engine from previously captured state.
    pub fn from_parts(
        params: GovernorParams,
        guardian: Option<Address>,
        ledger: VotingLedger,
        proposals: ProposalStore,
        executor: X,
        next_seq: u64,
    ) -> Result<Self, GovernanceError> {
        params.validate().map_err(GovernanceError::InvalidParams)?;
        Ok(Self {
            params,
            guardian,
            ledger,
            proposals,
            executor,
            outbox: Vec::new(),
            next_seq,
        })
    }

    // ── Token operations ─────────────────────────────────────────────────

    pub fn mint(
        &mut self,
        caller: &Address,
        to: &Address,
        amount: TokenAmount,
        now: Timepoint,
    ) -> Result<(), GovernanceError> {
        self.ledger.mint(caller, to, amount, now)?;
        self.collect_ledger_events(now);
        Ok(())
    }

    pub fn transfer(
        &mut self,
        from: &Address,
        to: &Address,
        amount: TokenAmount,
        now: Timepoint,
    ) -> Result<(), GovernanceError> {
        self.ledger.transfer(from, to, amount, now)?;
        self.collect_ledger_events(now);
        Ok(())
    }

    /// Delegate `holder`'s voting power to `to` (zero address = self).
    pub fn delegate(
        &mut self,
        holder: &Address,
        to: &Address,
        now: Timepoint,
    ) -> Result<Address, GovernanceError> {
        let previous = self.ledger.delegate(holder, to, now)?;
        self.collect_ledger_events(now);
        Ok(previous)
    }

    pub fn transfer_ownership(
        &mut self,
        caller: &Address,
        new_owner: &Address,
        now: Timepoint,
    ) -> Result<(), GovernanceError> {
        self.ledger.transfer_ownership(caller, new_owner, now)?;
        self.collect_ledger_events(now);
        Ok(())
    }

    // ── Proposal lifecycle ───────────────────────────────────────────────

    /// Create a proposal from parallel call sequences.
    ///
    /// The proposer needs at least the proposal threshold in voting power as
    /// of the step before `now`, so power gained in the proposing step itself
    /// does not count.
    pub fn propose(
        &mut self,
        proposer: &Address,
        targets: Vec<Address>,
        values: Vec<TokenAmount>,
        calldatas: Vec<Bytes>,
        description: String,
        now: Timepoint,
    ) -> Result<ProposalId, GovernanceError> {
        self.ledger.check_clock(now)?;
        if targets.len() != values.len() || targets.len() != calldatas.len() {
            return Err(GovernanceError::InvalidProposalLength {
                targets: targets.len(),
                values: values.len(),
                calldatas: calldatas.len(),
            });
        }
        if targets.is_empty() {
            return Err(GovernanceError::EmptyProposal);
        }

        let power = now
            .prev()
            .map(|t| self.ledger.voting_power_at(proposer, t))
            .unwrap_or(TokenAmount::ZERO);
        if power < self.params.proposal_threshold {
            warn!(proposer = %proposer, power = %power, threshold = %self.params.proposal_threshold, "proposal rejected");
            return Err(GovernanceError::InsufficientProposerPower {
                proposer: *proposer,
                power,
                threshold: self.params.proposal_threshold,
            });
        }

        let description_hash = hash_description(&description);
        let id = hash_proposal(&targets, &values, &calldatas, &description_hash);
        if self.proposals.contains(&id) {
            return Err(GovernanceError::DuplicateProposal(id));
        }

        let snapshot = now
            .checked_add(self.params.voting_delay)
            .ok_or(GovernanceError::TimepointOverflow)?;
        let deadline = snapshot
            .checked_add(self.params.voting_period)
            .ok_or(GovernanceError::TimepointOverflow)?;

        let calls = targets
            .into_iter()
            .zip(values)
            .zip(calldatas)
            .map(|((target, value), calldata)| Call {
                target,
                value,
                calldata,
            })
            .collect();
        let proposal = Proposal {
            id,
            proposer: *proposer,
            calls,
            description: description.clone(),
            description_hash,
            created_at: now,
            snapshot,
            deadline,
            tally: Tally::default(),
            ballots: Default::default(),
            recorded: RecordedState::Open,
        };
        self.proposals.insert(proposal)?;
        self.ledger.advance_clock(now)?;

        self.emit(
            now,
            Event::ProposalCreated {
                id,
                proposer: *proposer,
                snapshot,
                deadline,
                description,
            },
        );
        info!(id = %id, proposer = %proposer, snapshot = %snapshot, deadline = %deadline, "proposal created");
        Ok(id)
    }

    /// Cast a ballot and return the weight it carried.
    pub fn cast_vote(
        &mut self,
        voter: &Address,
        id: &ProposalId,
        support: VoteSupport,
        now: Timepoint,
    ) -> Result<TokenAmount, GovernanceError> {
        self.ledger.check_clock(now)?;
        let state = self.state(id, now)?;
        if state != ProposalState::Active {
            return Err(GovernanceError::NotActive { id: *id, state });
        }

        let snapshot = self.proposals.get(id)?.snapshot;
        // Delegation is resolved as of the snapshot, like the power itself:
        // delegating after the snapshot confers nothing on this proposal.
        let key = match self.params.vote_weighting {
            VoteWeighting::Delegatee => *voter,
            VoteWeighting::ResolvedDelegate => self.ledger.delegate_at(voter, snapshot),
        };
        let weight = self.ledger.voting_power_at(&key, snapshot);

        let proposal = self.proposals.get_mut(id)?;
        if proposal.has_voted(&key) {
            return Err(GovernanceError::AlreadyVoted {
                id: *id,
                voter: key,
            });
        }
        proposal.tally.add(support, weight);
        proposal.ballots.insert(
            key,
            Ballot {
                cast_by: *voter,
                support,
                weight,
                at: now,
            },
        );
        self.ledger.advance_clock(now)?;

        self.emit(
            now,
            Event::VoteCast {
                voter: *voter,
                id: *id,
                support,
                weight,
            },
        );
        debug!(id = %id, voter = %voter, support = %support, weight = %weight, "vote cast");
        Ok(weight)
    }

    /// Start the timelock on a succeeded proposal. Returns the earliest
    /// execution timepoint.
    pub fn queue(&mut self, id: &ProposalId, now: Timepoint) -> Result<Timepoint, GovernanceError> {
        self.ledger.check_clock(now)?;
        let state = self.state(id, now)?;
        if state != ProposalState::Succeeded {
            return Err(GovernanceError::NotSucceeded { id: *id, state });
        }
        let eta = now
            .checked_add(self.params.timelock_delay)
            .ok_or(GovernanceError::TimepointOverflow)?;

        self.proposals.get_mut(id)?.recorded = RecordedState::Queued { eta };
        self.ledger.advance_clock(now)?;
        self.emit(
            now,
            Event::ProposalStateChanged {
                id: *id,
                state: ProposalState::Queued,
            },
        );
        info!(id = %id, eta = %eta, "proposal queued");
        Ok(eta)
    }

    /// Run a queued proposal's batch once its timelock has elapsed.
    ///
    /// A failing batch leaves the proposal queued so it can be retried
    /// within the grace period.
    pub fn execute(&mut self, id: &ProposalId, now: Timepoint) -> Result<Vec<Bytes>, GovernanceError> {
        self.ledger.check_clock(now)?;
        let state = self.state(id, now)?;
        match state {
            ProposalState::Executed => return Err(GovernanceError::AlreadyExecuted(*id)),
            ProposalState::Queued => {}
            _ => return Err(GovernanceError::NotQueued { id: *id, state }),
        }

        let proposal = self.proposals.get(id)?;
        if let Some(eta) = proposal.eta() {
            if now < eta {
                return Err(GovernanceError::TimelockNotElapsed { id: *id, eta, now });
            }
        }

        let results = match self.executor.run_batch(&proposal.calls) {
            Ok(results) => results,
            Err(failure) => {
                warn!(id = %id, index = failure.index, reason = %failure.reason, "execution reverted");
                return Err(GovernanceError::ExecutionReverted {
                    id: *id,
                    index: failure.index,
                    reason: failure.reason,
                });
            }
        };

        self.proposals.get_mut(id)?.recorded = RecordedState::Executed { at: now };
        self.ledger.advance_clock(now)?;
        self.emit(
            now,
            Event::ProposalStateChanged {
                id: *id,
                state: ProposalState::Executed,
            },
        );
        info!(id = %id, calls = results.len(), "proposal executed");
        Ok(results)
    }

    /// Withdraw a proposal that is still pending or active. Only the
    /// proposer or the guardian may cancel.
    pub fn cancel(
        &mut self,
        id: &ProposalId,
        caller: &Address,
        now: Timepoint,
    ) -> Result<(), GovernanceError> {
        self.ledger.check_clock(now)?;
        let state = self.state(id, now)?;
        let proposer = self.proposals.get(id)?.proposer;
        if *caller != proposer && Some(*caller) != self.guardian {
            return Err(GovernanceError::Unauthorized {
                id: *id,
                caller: *caller,
            });
        }
        if !state.is_cancelable() {
            return Err(GovernanceError::NotCancelable { id: *id, state });
        }

        self.proposals.get_mut(id)?.recorded = RecordedState::Canceled { at: now };
        self.ledger.advance_clock(now)?;
        self.emit(
            now,
            Event::ProposalStateChanged {
                id: *id,
                state: ProposalState::Canceled,
            },
        );
        info!(id = %id, caller = %caller, "proposal canceled");
        Ok(())
    }

    // ── Queries ──────────────────────────────────────────────────────────

    /// State of a proposal at `now`.
    pub fn state(&self, id: &ProposalId, now: Timepoint) -> Result<ProposalState, GovernanceError> {
        let proposal = self.proposals.get(id)?;
        Ok(self.state_of(proposal, now))
    }

    fn state_of(&self, proposal: &Proposal, now: Timepoint) -> ProposalState {
        let supply = self.ledger.total_supply_at(proposal.snapshot);
        derive_state(proposal, now, &self.params, supply)
    }

    /// Full record plus derived state.
    pub fn proposal(&self, id: &ProposalId, now: Timepoint) -> Result<ProposalView, GovernanceError> {
        let proposal = self.proposals.get(id)?;
        Ok(ProposalView {
            state: self.state_of(proposal, now),
            quorum: self.quorum(proposal.snapshot),
            proposal: proposal.clone(),
        })
    }

    /// All proposals with their state at `now`, oldest first.
    pub fn proposal_views(&self, now: Timepoint) -> Vec<ProposalView> {
        self.proposals
            .iter()
            .map(|p| ProposalView {
                state: self.state_of(p, now),
                quorum: self.quorum(p.snapshot),
                proposal: p.clone(),
            })
            .collect()
    }

    pub fn proposal_ids(&self) -> Vec<ProposalId> {
        self.proposals.ids()
    }

    /// `(against, for, abstain)` totals.
    pub fn proposal_votes(
        &self,
        id: &ProposalId,
    ) -> Result<(TokenAmount, TokenAmount, TokenAmount), GovernanceError> {
        let tally = self.proposals.get(id)?.tally;
        Ok((tally.against, tally.for_votes, tally.abstain))
    }

    pub fn has_voted(&self, id: &ProposalId, account: &Address) -> Result<bool, GovernanceError> {
        Ok(self.proposals.get(id)?.has_voted(account))
    }

    pub fn proposal_eta(&self, id: &ProposalId) -> Result<Option<Timepoint>, GovernanceError> {
        Ok(self.proposals.get(id)?.eta())
    }

    /// Quorum required for a snapshot taken at `t`.
    pub fn quorum(&self, t: Timepoint) -> TokenAmount {
        self.params.quorum_for(self.ledger.total_supply_at(t))
    }

    pub fn voting_power_at(&self, account: &Address, t: Timepoint) -> TokenAmount {
        self.ledger.voting_power_at(account, t)
    }

    pub fn total_supply_at(&self, t: Timepoint) -> TokenAmount {
        self.ledger.total_supply_at(t)
    }

    pub fn delegate_of(&self, holder: &Address) -> Address {
        self.ledger.delegate_of(holder)
    }

    pub fn params(&self) -> &GovernorParams {
        &self.params
    }

    pub fn guardian(&self) -> Option<Address> {
        self.guardian
    }

    pub fn ledger(&self) -> &VotingLedger {
        &self.ledger
    }

    pub fn proposals(&self) -> &ProposalStore {
        &self.proposals
    }

    pub fn executor(&self) -> &X {
        &self.executor
    }

    pub fn executor_mut(&mut self) -> &mut X {
        &mut self.executor
    }

    /// Sequence number the next event will carry.
    pub fn next_seq(&self) -> u64 {
        self.next_seq
    }

    // ── Events ───────────────────────────────────────────────────────────

    /// Take the events recorded since the last call, oldest first.
    pub fn drain_events(&mut self) -> Vec<EventRecord> {
        std::mem::take(&mut self.outbox)
    }

    fn emit(&mut self, at: Timepoint, event: Event) {
        self.outbox.push(EventRecord {
            seq: self.next_seq,
            at,
            event,
        });
        self.next_seq += 1;
    }

    fn collect_ledger_events(&mut self, at: Timepoint) {
        for event in self.ledger.drain_events() {
            self.emit(at, event);
        }
    }
}
