use proptest::prelude::*;

use quorum_ledger::VotingLedger;
use quorum_types::{Address, Timepoint, TokenAmount};

const OWNER: u64 = 1;

#[derive(Clone, Debug)]
enum Op {
    Mint { to: u64, amount: u128 },
    Transfer { from: u64, to: u64, amount: u128 },
    Delegate { holder: u64, to: u64 },
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (2u64..7, 0u128..10_000).prop_map(|(to, amount)| Op::Mint { to, amount }),
        (2u64..7, 2u64..7, 0u128..5_000)
            .prop_map(|(from, to, amount)| Op::Transfer { from, to, amount }),
        // 0 maps to the zero address, i.e. back to self.
        (2u64..7, 0u64..7).prop_map(|(holder, to)| Op::Delegate { holder, to }),
    ]
}

fn addr(n: u64) -> Address {
    if n == 0 {
        Address::ZERO
    } else {
        Address::from_low_u64(n)
    }
}

fn run(ops: &[(Op, u64)]) -> (VotingLedger, u64) {
    let mut ledger = VotingLedger::new(addr(OWNER));
    let mut now = 0u64;
    for (op, step) in ops {
        now += step;
        let at = Timepoint::new(now);
        // Failures (e.g. insufficient balance) are part of the input space.
        let _ = match op {
            Op::Mint { to, amount } => {
                ledger.mint(&addr(OWNER), &addr(*to), TokenAmount::new(*amount), at)
            }
            Op::Transfer { from, to, amount } => {
                ledger.transfer(&addr(*from), &addr(*to), TokenAmount::new(*amount), at)
            }
            Op::Delegate { holder, to } => {
                ledger.delegate(&addr(*holder), &addr(*to), at).map(|_| ())
            }
        };
    }
    (ledger, now)
}

proptest! {
    /// Balances and delegated voting power both sum to the total supply at every timepoint.
    #[test]
    fn supply_is_conserved_at_every_timepoint(
        ops in prop::collection::vec((op_strategy(), 0u64..3), 1..60)
    ) {
        let (ledger, end) = run(&ops);
        let holders: Vec<Address> = ledger.holders().copied().collect();
        let delegatees: Vec<Address> = ledger.delegatees().copied().collect();

        for t in 0..=end + 1 {
            let at = Timepoint::new(t);
            let supply = ledger.total_supply_at(at);
            let balances: TokenAmount = holders.iter().map(|h| ledger.balance_at(h, at)).sum();
            let votes: TokenAmount = delegatees.iter().map(|d| ledger.voting_power_at(d, at)).sum();
            prop_assert_eq!(balances, supply);
            prop_assert_eq!(votes, supply);
        }
    }

    /// Each delegatee's current power equals the balances of the holders delegating to it.
    #[test]
    fn votes_match_delegated_balances(
        ops in prop::collection::vec((op_strategy(), 0u64..3), 1..60)
    ) {
        let (ledger, _) = run(&ops);
        let holders: Vec<Address> = ledger.holders().copied().collect();
        for delegatee in ledger.delegatees() {
            let expected: TokenAmount = holders
                .iter()
                .filter(|h| ledger.delegate_of(h) == *delegatee)
                .map(|h| ledger.balance_of(h))
                .sum();
            prop_assert_eq!(ledger.votes_of(delegatee), expected);
        }
    }

    /// Historical lookups are pure: later mutations never change the past.
    #[test]
    fn history_is_immutable(
        prefix in prop::collection::vec((op_strategy(), 0u64..3), 1..30),
        suffix in prop::collection::vec((op_strategy(), 1u64..3), 1..30),
    ) {
        let (before, end) = run(&prefix);
        let mut all = prefix.clone();
        all.extend(suffix);
        let (after, _) = run(&all);

        for t in 0..end {
            let at = Timepoint::new(t);
            prop_assert_eq!(before.total_supply_at(at), after.total_supply_at(at));
            for d in before.delegatees() {
                prop_assert_eq!(before.voting_power_at(d, at), after.voting_power_at(d, at));
                prop_assert_eq!(before.voting_power_at(d, at), before.voting_power_at(d, at));
            }
        }
    }
}
