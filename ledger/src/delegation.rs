//! Delegation registry: which address exercises each holder's voting power.
//!
//! A holder with no entry is self-delegated. Only explicit delegations to a
//! different address are stored, alongside a reverse index from delegatee to
//! its direct delegators. Delegation is one hop: the delegatee's own
//! delegation does not forward the power it receives.
//!
//! Every change is also appended to the holder's delegation history, so the
//! delegatee as of a past timepoint can be looked up the same way voting
//! power can. Only the history is serialized; the current mapping and the
//! reverse index are rebuilt from it.
//!
//! The registry only records the mapping. Moving checkpointed power between
//! delegatee streams is the ledger's job (see [`crate::VotingLedger::delegate`]).

use std::cmp::Ordering;

use im::{OrdMap, OrdSet, Vector};
use quorum_types::{Address, Timepoint};
use serde::{Deserialize, Serialize};

/// `holder` delegated to `to` as of `at`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelegationChange {
    pub at: Timepoint,
    pub to: Address,
}

type History = OrdMap<Address, Vector<DelegationChange>>;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "History", into = "History")]
pub struct DelegationRegistry {
    /// holder → delegatee, for holders not delegating to themselves.
    delegations: OrdMap<Address, Address>,
    /// delegatee → direct delegators.
    reverse: OrdMap<Address, OrdSet<Address>>,
    /// Every delegation change per holder, oldest first.
    history: History,
}

impl DelegationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The address currently accruing `holder`'s voting power.
    pub fn delegate_of(&self, holder: &Address) -> Address {
        self.delegations.get(holder).copied().unwrap_or(*holder)
    }

    /// The address accruing `holder`'s voting power as of `t`: the latest
    /// change at or before `t`, or the holder itself if there is none.
    pub fn delegate_at(&self, holder: &Address, t: Timepoint) -> Address {
        let Some(changes) = self.history.get(holder) else {
            return *holder;
        };
        let idx = changes
            .binary_search_by(|c| {
                if c.at <= t {
                    Ordering::Less
                } else {
                    Ordering::Greater
                }
            })
            .unwrap_or_else(|idx| idx);
        match idx.checked_sub(1).and_then(|i| changes.get(i)) {
            Some(change) => change.to,
            None => *holder,
        }
    }

    /// Point `holder` at `to` as of `at` and return the previous delegatee.
    ///
    /// `to == holder` restores the default self-delegation. Callers supply
    /// non-decreasing timepoints; a second change at the same timepoint
    /// replaces the first.
    pub fn set_delegate(&mut self, holder: &Address, to: &Address, at: Timepoint) -> Address {
        let previous = self.delegate_of(holder);
        if previous == *to {
            return previous;
        }

        if let Some(old_to) = self.delegations.remove(holder) {
            if let Some(set) = self.reverse.get_mut(&old_to) {
                set.remove(holder);
                if set.is_empty() {
                    self.reverse.remove(&old_to);
                }
            }
        }

        if to != holder {
            self.delegations.insert(*holder, *to);
            self.reverse
                .entry(*to)
                .or_insert_with(OrdSet::new)
                .insert(*holder);
        }

        let changes = self.history.entry(*holder).or_insert_with(Vector::new);
        match changes.back_mut() {
            Some(last) if last.at == at => last.to = *to,
            _ => changes.push_back(DelegationChange { at, to: *to }),
        }
        previous
    }

    /// Holders that explicitly delegated to `delegatee` (excluding itself).
    pub fn delegators_of(&self, delegatee: &Address) -> Vec<Address> {
        self.reverse
            .get(delegatee)
            .map(|s| s.iter().copied().collect())
            .unwrap_or_default()
    }

    pub fn is_self_delegated(&self, holder: &Address) -> bool {
        !self.delegations.contains_key(holder)
    }

    /// Number of holders delegating to someone else.
    pub fn explicit_count(&self) -> usize {
        self.delegations.len()
    }

    /// Delegation changes recorded for `holder`, oldest first.
    pub fn history_of(&self, holder: &Address) -> Vec<DelegationChange> {
        self.history
            .get(holder)
            .map(|changes| changes.iter().copied().collect())
            .unwrap_or_default()
    }
}

impl From<History> for DelegationRegistry {
    fn from(history: History) -> Self {
        let mut delegations = OrdMap::new();
        let mut reverse = OrdMap::<Address, OrdSet<Address>>::new();
        for (holder, changes) in history.iter() {
            if let Some(last) = changes.back() {
                if last.to != *holder {
                    delegations.insert(*holder, last.to);
                    reverse
                        .entry(last.to)
                        .or_insert_with(OrdSet::new)
                        .insert(*holder);
                }
            }
        }
        Self {
            delegations,
            reverse,
            history,
        }
    }
}

impl From<DelegationRegistry> for History {
    fn from(registry: DelegationRegistry) -> Self {
        registry.history
    }
}
