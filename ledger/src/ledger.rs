//! The voting ledger: balances, delegated voting power and total supply,
//! each recorded as a checkpoint history.
//!
//! Every mutation first validates everything that can fail (clock, role,
//! balances, overflow) and only then writes, so a failed call leaves no trace.

use im::OrdMap;
use quorum_types::{Address, Event, Timepoint, TokenAmount};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::checkpoint::{Checkpoint, CheckpointHistory};
use crate::delegation::DelegationRegistry;
use crate::LedgerError;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct VotingLedger {
    /// The only account allowed to mint.
    owner: Address,
    /// Latest timepoint any mutation happened at.
    clock: Timepoint,
    balances: OrdMap<Address, CheckpointHistory>,
    /// Voting power per delegatee.
    votes: OrdMap<Address, CheckpointHistory>,
    total_supply: CheckpointHistory,
    delegation: DelegationRegistry,
    /// Events not yet collected by [`VotingLedger::drain_events`].
    #[serde(skip)]
    events: Vec<Event>,
}

impl VotingLedger {
    pub fn new(owner: Address) -> Self {
        Self {
            owner,
            clock: Timepoint::GENESIS,
            balances: OrdMap::new(),
            votes: OrdMap::new(),
            total_supply: CheckpointHistory::new(),
            delegation: DelegationRegistry::new(),
            events: Vec::new(),
        }
    }

    // ── Clock ────────────────────────────────────────────────────────────

    /// Move the ledger clock to `now`, rejecting timepoints from the past.
    ///
    /// Governance mutations call this too, so that nothing can be written at
    /// or before a snapshot once voting on it has opened.
    pub fn advance_clock(&mut self, now: Timepoint) -> Result<(), LedgerError> {
        self.check_clock(now)?;
        self.clock = now;
        Ok(())
    }

    pub fn clock(&self) -> Timepoint {
        self.clock
    }

    pub fn check_clock(&self, now: Timepoint) -> Result<(), LedgerError> {
        if now < self.clock {
            return Err(LedgerError::StaleTimepoint {
                at: now,
                latest: self.clock,
            });
        }
        Ok(())
    }

    // ── Mutations ────────────────────────────────────────────────────────

    /// Create `amount` new tokens for `to`. Only the owner may mint.
    pub fn mint(
        &mut self,
        caller: &Address,
        to: &Address,
        amount: TokenAmount,
        now: Timepoint,
    ) -> Result<(), LedgerError> {
        self.check_clock(now)?;
        if *caller != self.owner {
            warn!(caller = %caller, "mint rejected: caller is not the owner");
            return Err(LedgerError::Unauthorized { caller: *caller });
        }
        if to.is_zero() {
            return Err(LedgerError::ZeroAddress);
        }
        let supply = self
            .total_supply
            .latest()
            .checked_add(amount)
            .ok_or(LedgerError::Overflow { account: *to })?;
        let balance = self
            .balance_of(to)
            .checked_add(amount)
            .ok_or(LedgerError::Overflow { account: *to })?;

        self.clock = now;
        self.events.push(Event::Transfer {
            from: Address::ZERO,
            to: *to,
            amount,
        });
        if !amount.is_zero() {
            self.total_supply.push(now, supply)?;
            self.balances.entry(*to).or_insert_with(CheckpointHistory::new).push(now, balance)?;
            let delegatee = self.delegation.delegate_of(to);
            self.move_voting_power(None, Some(delegatee), amount, now)?;
        }
        info!(to = %to, amount = %amount, supply = %supply, at = %now, "minted");
        Ok(())
    }

    /// Move `amount` tokens from `from` to `to`, carrying voting power between
    /// their delegatees.
    pub fn transfer(
        &mut self,
        from: &Address,
        to: &Address,
        amount: TokenAmount,
        now: Timepoint,
    ) -> Result<(), LedgerError> {
        self.check_clock(now)?;
        if to.is_zero() {
            return Err(LedgerError::ZeroAddress);
        }
        let from_balance = self.balance_of(from);
        let debited =
            from_balance
                .checked_sub(amount)
                .ok_or(LedgerError::InsufficientBalance {
                    account: *from,
                    balance: from_balance,
                    needed: amount,
                })?;

        self.clock = now;
        self.events.push(Event::Transfer {
            from: *from,
            to: *to,
            amount,
        });
        if from != to && !amount.is_zero() {
            // Conservation bounds every balance by the total supply.
            let credited = self.balance_of(to).saturating_add(amount);
            self.balances.entry(*from).or_insert_with(CheckpointHistory::new).push(now, debited)?;
            self.balances.entry(*to).or_insert_with(CheckpointHistory::new).push(now, credited)?;
            let src = self.delegation.delegate_of(from);
            let dst = self.delegation.delegate_of(to);
            self.move_voting_power(Some(src), Some(dst), amount, now)?;
        }
        debug!(from = %from, to = %to, amount = %amount, at = %now, "transferred");
        Ok(())
    }

    /// Point `holder`'s voting power at `to` (the zero address means self).
    ///
    /// The holder's whole current balance moves from the old delegatee's
    /// stream to the new one at `now`. Re-delegating to the current delegatee
    /// is a no-op. Returns the previous delegatee.
    pub fn delegate(
        &mut self,
        holder: &Address,
        to: &Address,
        now: Timepoint,
    ) -> Result<Address, LedgerError> {
        self.check_clock(now)?;
        let target = if to.is_zero() { *holder } else { *to };
        let previous = self.delegation.delegate_of(holder);
        self.clock = now;
        if previous == target {
            return Ok(previous);
        }

        self.delegation.set_delegate(holder, &target, now);
        self.events.push(Event::DelegateChanged {
            delegator: *holder,
            from_delegate: previous,
            to_delegate: target,
        });
        let balance = self.balance_of(holder);
        self.move_voting_power(Some(previous), Some(target), balance, now)?;
        info!(holder = %holder, from = %previous, to = %target, weight = %balance, "delegate changed");
        Ok(previous)
    }

    /// Hand the minting role to `new_owner`.
    pub fn transfer_ownership(
        &mut self,
        caller: &Address,
        new_owner: &Address,
        now: Timepoint,
    ) -> Result<(), LedgerError> {
        self.check_clock(now)?;
        if *caller != self.owner {
            return Err(LedgerError::Unauthorized { caller: *caller });
        }
        if new_owner.is_zero() {
            return Err(LedgerError::ZeroAddress);
        }
        self.clock = now;
        let previous = std::mem::replace(&mut self.owner, *new_owner);
        self.events.push(Event::OwnershipTransferred {
            previous,
            new: *new_owner,
        });
        info!(previous = %previous, new = %new_owner, "ownership transferred");
        Ok(())
    }

    /// Subtract from `src`'s stream and add to `dst`'s, both at `now`.
    ///
    /// `None` stands for the mint side. Callers have already validated the
    /// clock and the amounts: a delegatee's power always covers the balances
    /// delegated to it and never exceeds the total supply.
    fn move_voting_power(
        &mut self,
        src: Option<Address>,
        dst: Option<Address>,
        amount: TokenAmount,
        now: Timepoint,
    ) -> Result<(), LedgerError> {
        if src == dst || amount.is_zero() {
            return Ok(());
        }
        if let Some(src) = src {
            let history = self.votes.entry(src).or_insert_with(CheckpointHistory::new);
            let value = history.latest().saturating_sub(amount);
            let (previous, new) = history.push(now, value)?;
            self.events.push(Event::DelegateVotesChanged {
                delegate: src,
                previous,
                new,
            });
        }
        if let Some(dst) = dst {
            let history = self.votes.entry(dst).or_insert_with(CheckpointHistory::new);
            let value = history.latest().saturating_add(amount);
            let (previous, new) = history.push(now, value)?;
            self.events.push(Event::DelegateVotesChanged {
                delegate: dst,
                previous,
                new,
            });
        }
        Ok(())
    }

    /// Take the events recorded since the last call, oldest first.
    pub fn drain_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    // ── Queries ──────────────────────────────────────────────────────────

    pub fn owner(&self) -> Address {
        self.owner
    }

    pub fn balance_of(&self, holder: &Address) -> TokenAmount {
        self.balances
            .get(holder)
            .map(CheckpointHistory::latest)
            .unwrap_or(TokenAmount::ZERO)
    }

    pub fn balance_at(&self, holder: &Address, t: Timepoint) -> TokenAmount {
        self.balances
            .get(holder)
            .map(|h| h.upper_lookup(t))
            .unwrap_or(TokenAmount::ZERO)
    }

    pub fn total_supply(&self) -> TokenAmount {
        self.total_supply.latest()
    }

    pub fn total_supply_at(&self, t: Timepoint) -> TokenAmount {
        self.total_supply.upper_lookup(t)
    }

    /// Current voting power of `account` as a delegatee.
    pub fn votes_of(&self, account: &Address) -> TokenAmount {
        self.votes
            .get(account)
            .map(CheckpointHistory::latest)
            .unwrap_or(TokenAmount::ZERO)
    }

    /// Voting power of `account` as of `t`: the latest checkpoint at or
    /// before `t`, zero if none. Values for `t` beyond the ledger clock are
    /// provisional until the clock passes `t`.
    pub fn voting_power_at(&self, account: &Address, t: Timepoint) -> TokenAmount {
        self.votes
            .get(account)
            .map(|h| h.upper_lookup(t))
            .unwrap_or(TokenAmount::ZERO)
    }

    pub fn delegate_of(&self, holder: &Address) -> Address {
        self.delegation.delegate_of(holder)
    }

    /// Delegatee of `holder` as of `t`. Like [`Self::voting_power_at`], the
    /// answer for `t` beyond the ledger clock is provisional.
    pub fn delegate_at(&self, holder: &Address, t: Timepoint) -> Address {
        self.delegation.delegate_at(holder, t)
    }

    pub fn delegators_of(&self, delegatee: &Address) -> Vec<Address> {
        self.delegation.delegators_of(delegatee)
    }

    pub fn num_checkpoints(&self, account: &Address) -> usize {
        self.votes.get(account).map(CheckpointHistory::len).unwrap_or(0)
    }

    pub fn checkpoint(&self, account: &Address, pos: usize) -> Option<Checkpoint> {
        self.votes.get(account).and_then(|h| h.get(pos)).copied()
    }

    /// Every address that ever held a balance.
    pub fn holders(&self) -> impl Iterator<Item = &Address> {
        self.balances.keys()
    }

    /// Every address that ever had voting power.
    pub fn delegatees(&self) -> impl Iterator<Item = &Address> {
        self.votes.keys()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(n: u64) -> Address {
        Address::from_low_u64(n)
    }

    fn amt(n: u128) -> TokenAmount {
        TokenAmount::new(n)
    }

    fn t(n: u64) -> Timepoint {
        Timepoint::new(n)
    }

    const OWNER: u64 = 1;
    const ALICE: u64 = 10;
    const BOB: u64 = 11;
    const CAROL: u64 = 12;

    fn ledger() -> VotingLedger {
        VotingLedger::new(addr(OWNER))
    }

    #[test]
    fn mint_credits_balance_supply_and_votes() {
        let mut l = ledger();
        l.mint(&addr(OWNER), &addr(ALICE), amt(1_000), t(1)).unwrap();

        assert_eq!(l.balance_of(&addr(ALICE)), amt(1_000));
        assert_eq!(l.total_supply(), amt(1_000));
        assert_eq!(l.votes_of(&addr(ALICE)), amt(1_000));
        assert_eq!(l.voting_power_at(&addr(ALICE), t(0)), amt(0));
        assert_eq!(l.voting_power_at(&addr(ALICE), t(1)), amt(1_000));
        assert_eq!(l.total_supply_at(t(0)), amt(0));
    }

    #[test]
    fn mint_emits_transfer_from_zero() {
        let mut l = ledger();
        l.mint(&addr(OWNER), &addr(ALICE), amt(100), t(1)).unwrap();
        let events = l.drain_events();
        assert_eq!(
            events[0],
            Event::Transfer {
                from: Address::ZERO,
                to: addr(ALICE),
                amount: amt(100)
            }
        );
        assert!(events.contains(&Event::DelegateVotesChanged {
            delegate: addr(ALICE),
            previous: amt(0),
            new: amt(100)
        }));
        assert!(l.drain_events().is_empty());
    }

    #[test]
    fn non_owner_cannot_mint() {
        let mut l = ledger();
        let err = l
            .mint(&addr(ALICE), &addr(BOB), amt(100), t(1))
            .unwrap_err();
        assert_eq!(err, LedgerError::Unauthorized { caller: addr(ALICE) });
        assert_eq!(l.total_supply(), amt(0));
        assert!(l.drain_events().is_empty());
    }

    #[test]
    fn mint_overflow_rejected_without_side_effects() {
        let mut l = ledger();
        l.mint(&addr(OWNER), &addr(ALICE), TokenAmount::MAX, t(1))
            .unwrap();
        let err = l.mint(&addr(OWNER), &addr(BOB), amt(1), t(2)).unwrap_err();
        assert_eq!(err, LedgerError::Overflow { account: addr(BOB) });
        assert_eq!(l.total_supply(), TokenAmount::MAX);
        assert_eq!(l.balance_of(&addr(BOB)), amt(0));
        assert_eq!(l.clock(), t(1));
    }

    #[test]
    fn transfer_moves_votes_between_delegatees() {
        let mut l = ledger();
        l.mint(&addr(OWNER), &addr(ALICE), amt(1_000), t(1)).unwrap();
        l.transfer(&addr(ALICE), &addr(BOB), amt(300), t(2)).unwrap();

        assert_eq!(l.balance_of(&addr(ALICE)), amt(700));
        assert_eq!(l.balance_of(&addr(BOB)), amt(300));
        assert_eq!(l.voting_power_at(&addr(ALICE), t(1)), amt(1_000));
        assert_eq!(l.voting_power_at(&addr(ALICE), t(2)), amt(700));
        assert_eq!(l.voting_power_at(&addr(BOB), t(1)), amt(0));
        assert_eq!(l.voting_power_at(&addr(BOB), t(2)), amt(300));
        assert_eq!(l.total_supply(), amt(1_000));
    }

    #[test]
    fn transfer_insufficient_balance() {
        let mut l = ledger();
        l.mint(&addr(OWNER), &addr(ALICE), amt(10), t(1)).unwrap();
        let err = l
            .transfer(&addr(ALICE), &addr(BOB), amt(11), t(2))
            .unwrap_err();
        assert_eq!(
            err,
            LedgerError::InsufficientBalance {
                account: addr(ALICE),
                balance: amt(10),
                needed: amt(11)
            }
        );
        assert_eq!(l.balance_of(&addr(ALICE)), amt(10));
    }

    #[test]
    fn transfer_within_shared_delegatee_keeps_votes() {
        let mut l = ledger();
        l.mint(&addr(OWNER), &addr(ALICE), amt(500), t(1)).unwrap();
        l.delegate(&addr(ALICE), &addr(CAROL), t(2)).unwrap();
        l.delegate(&addr(BOB), &addr(CAROL), t(2)).unwrap();
        let before = l.num_checkpoints(&addr(CAROL));

        l.transfer(&addr(ALICE), &addr(BOB), amt(200), t(3)).unwrap();
        assert_eq!(l.votes_of(&addr(CAROL)), amt(500));
        assert_eq!(l.num_checkpoints(&addr(CAROL)), before);
    }

    #[test]
    fn self_transfer_is_noop() {
        let mut l = ledger();
        l.mint(&addr(OWNER), &addr(ALICE), amt(50), t(1)).unwrap();
        l.transfer(&addr(ALICE), &addr(ALICE), amt(50), t(2)).unwrap();
        assert_eq!(l.balance_of(&addr(ALICE)), amt(50));
        assert_eq!(l.num_checkpoints(&addr(ALICE)), 1);
    }

    #[test]
    fn delegate_moves_existing_balance() {
        let mut l = ledger();
        l.mint(&addr(OWNER), &addr(ALICE), amt(400), t(1)).unwrap();
        let prev = l.delegate(&addr(ALICE), &addr(BOB), t(5)).unwrap();

        assert_eq!(prev, addr(ALICE));
        assert_eq!(l.delegate_of(&addr(ALICE)), addr(BOB));
        assert_eq!(l.voting_power_at(&addr(ALICE), t(4)), amt(400));
        assert_eq!(l.voting_power_at(&addr(ALICE), t(5)), amt(0));
        assert_eq!(l.voting_power_at(&addr(BOB), t(5)), amt(400));
        assert_eq!(l.balance_of(&addr(BOB)), amt(0));
        assert_eq!(l.delegators_of(&addr(BOB)), vec![addr(ALICE)]);
    }

    #[test]
    fn delegate_to_zero_means_self() {
        let mut l = ledger();
        l.mint(&addr(OWNER), &addr(ALICE), amt(400), t(1)).unwrap();
        l.delegate(&addr(ALICE), &addr(BOB), t(2)).unwrap();
        l.delegate(&addr(ALICE), &Address::ZERO, t(3)).unwrap();
        assert_eq!(l.delegate_of(&addr(ALICE)), addr(ALICE));
        assert_eq!(l.votes_of(&addr(ALICE)), amt(400));
        assert_eq!(l.votes_of(&addr(BOB)), amt(0));
    }

    #[test]
    fn self_delegation_is_idempotent() {
        let mut l = ledger();
        l.mint(&addr(OWNER), &addr(ALICE), amt(400), t(1)).unwrap();
        l.drain_events();
        l.delegate(&addr(ALICE), &addr(ALICE), t(2)).unwrap();
        l.delegate(&addr(ALICE), &Address::ZERO, t(3)).unwrap();
        assert!(l.drain_events().is_empty());
        assert_eq!(l.num_checkpoints(&addr(ALICE)), 1);
    }

    #[test]
    fn minting_to_delegator_credits_delegatee() {
        let mut l = ledger();
        l.delegate(&addr(ALICE), &addr(BOB), t(1)).unwrap();
        l.mint(&addr(OWNER), &addr(ALICE), amt(70), t(2)).unwrap();
        assert_eq!(l.votes_of(&addr(BOB)), amt(70));
        assert_eq!(l.votes_of(&addr(ALICE)), amt(0));
    }

    #[test]
    fn stale_timepoint_rejected() {
        let mut l = ledger();
        l.mint(&addr(OWNER), &addr(ALICE), amt(1), t(10)).unwrap();
        let err = l.mint(&addr(OWNER), &addr(ALICE), amt(1), t(9)).unwrap_err();
        assert_eq!(
            err,
            LedgerError::StaleTimepoint {
                at: t(9),
                latest: t(10)
            }
        );
        assert!(l.advance_clock(t(9)).is_err());
        assert!(l.advance_clock(t(10)).is_ok());
    }

    #[test]
    fn same_step_mutations_share_one_checkpoint() {
        let mut l = ledger();
        l.mint(&addr(OWNER), &addr(ALICE), amt(100), t(3)).unwrap();
        l.mint(&addr(OWNER), &addr(ALICE), amt(50), t(3)).unwrap();
        assert_eq!(l.num_checkpoints(&addr(ALICE)), 1);
        assert_eq!(l.voting_power_at(&addr(ALICE), t(3)), amt(150));
        assert_eq!(
            l.checkpoint(&addr(ALICE), 0),
            Some(Checkpoint {
                at: t(3),
                value: amt(150)
            })
        );
    }

    #[test]
    fn zero_address_cannot_receive() {
        let mut l = ledger();
        assert_eq!(
            l.mint(&addr(OWNER), &Address::ZERO, amt(1), t(1)),
            Err(LedgerError::ZeroAddress)
        );
    }

    #[test]
    fn ownership_transfer() {
        let mut l = ledger();
        l.transfer_ownership(&addr(OWNER), &addr(ALICE), t(1)).unwrap();
        assert_eq!(l.owner(), addr(ALICE));
        assert!(l.mint(&addr(OWNER), &addr(BOB), amt(1), t(2)).is_err());
        assert!(l.mint(&addr(ALICE), &addr(BOB), amt(1), t(2)).is_ok());
        assert!(l
            .transfer_ownership(&addr(BOB), &addr(BOB), t(3))
            .is_err());
    }

    #[test]
    fn delegate_at_is_point_in_time() {
        let mut l = ledger();
        l.mint(&addr(OWNER), &addr(ALICE), amt(50), t(1)).unwrap();
        l.delegate(&addr(ALICE), &addr(BOB), t(3)).unwrap();
        l.delegate(&addr(ALICE), &Address::ZERO, t(6)).unwrap();

        assert_eq!(l.delegate_at(&addr(ALICE), t(2)), addr(ALICE));
        assert_eq!(l.delegate_at(&addr(ALICE), t(3)), addr(BOB));
        assert_eq!(l.delegate_at(&addr(ALICE), t(5)), addr(BOB));
        assert_eq!(l.delegate_at(&addr(ALICE), t(6)), addr(ALICE));
        assert_eq!(l.voting_power_at(&addr(BOB), t(5)), amt(50));
        assert_eq!(l.delegate_at(&addr(CAROL), t(5)), addr(CAROL));
    }

    #[test]
    fn clones_are_independent() {
        let mut l = ledger();
        l.mint(&addr(OWNER), &addr(ALICE), amt(10), t(1)).unwrap();
        let before = l.clone();
        l.mint(&addr(OWNER), &addr(ALICE), amt(5), t(2)).unwrap();
        l.delegate(&addr(ALICE), &addr(BOB), t(3)).unwrap();

        assert_eq!(before.balance_of(&addr(ALICE)), amt(10));
        assert_eq!(before.delegate_of(&addr(ALICE)), addr(ALICE));
        assert_eq!(before.num_checkpoints(&addr(ALICE)), 1);
        assert_eq!(l.votes_of(&addr(BOB)), amt(15));
    }
}
