//! The contract host: native balances plus registered contracts, with
//! all-or-nothing batch execution.

use std::collections::BTreeMap;
use std::fmt;

use quorum_governance::{ActionExecutor, BatchFailure, Call};
use quorum_types::{Address, Bytes, TokenAmount};
use tracing::{debug, info, warn};

use crate::contract::{CallContext, Contract};
use crate::error::ExecutorError;

/// Everything a batch can change. Cloned to stage a batch.
#[derive(Clone, Default)]
struct HostState {
    balances: BTreeMap<Address, TokenAmount>,
    contracts: BTreeMap<Address, Box<dyn Contract>>,
}

impl HostState {
    fn balance(&self, account: &Address) -> TokenAmount {
        self.balances.get(account).copied().unwrap_or(TokenAmount::ZERO)
    }

    fn move_value(&mut self, from: &Address, to: &Address, value: TokenAmount) -> Result<(), ExecutorError> {
        if value.is_zero() || from == to {
            return Ok(());
        }
        let available = self.balance(from);
        let debited = available
            .checked_sub(value)
            .ok_or(ExecutorError::InsufficientTreasury {
                needed: value,
                available,
            })?;
        let credited = self
            .balance(to)
            .checked_add(value)
            .ok_or(ExecutorError::Overflow(*to))?;
        self.balances.insert(*from, debited);
        self.balances.insert(*to, credited);
        Ok(())
    }

    /// Run one call: move its value, then dispatch calldata if any.
    fn apply(&mut self, treasury: &Address, call: &Call) -> Result<Bytes, ExecutorError> {
        self.move_value(treasury, &call.target, call.value)?;
        match self.contracts.get_mut(&call.target) {
            Some(contract) => {
                let ctx = CallContext {
                    caller: *treasury,
                    this: call.target,
                    value: call.value,
                };
                contract
                    .call(&ctx, &call.calldata)
                    .map_err(|reason| ExecutorError::Reverted {
                        target: call.target,
                        reason,
                    })
            }
            None if call.calldata.is_empty() => Ok(Bytes::default()),
            None => Err(ExecutorError::NoContract(call.target)),
        }
    }
}

/// Executes proposal batches on behalf of the governor's treasury.
pub struct ContractHost {
    treasury: Address,
    state: HostState,
    batches_committed: u64,
}

impl ContractHost {
    pub fn new(treasury: Address) -> Self {
        Self {
            treasury,
            state: HostState::default(),
            batches_committed: 0,
        }
    }

    /// Credit the treasury, e.g. from fees collected outside governance.
    pub fn fund_treasury(&mut self, amount: TokenAmount) -> Result<(), ExecutorError> {
        let funded = self
            .treasury_balance()
            .checked_add(amount)
            .ok_or(ExecutorError::Overflow(self.treasury))?;
        self.state.balances.insert(self.treasury, funded);
        Ok(())
    }

    pub fn register(&mut self, at: Address, contract: Box<dyn Contract>) -> Result<(), ExecutorError> {
        if self.state.contracts.contains_key(&at) {
            return Err(ExecutorError::AlreadyRegistered(at));
        }
        debug!(at = %at, kind = contract.kind(), "contract registered");
        self.state.contracts.insert(at, contract);
        Ok(())
    }

    pub fn treasury(&self) -> Address {
        self.treasury
    }

    pub fn treasury_balance(&self) -> TokenAmount {
        self.state.balance(&self.treasury)
    }

    pub fn balance_of(&self, account: &Address) -> TokenAmount {
        self.state.balance(account)
    }

    pub fn is_contract(&self, at: &Address) -> bool {
        self.state.contracts.contains_key(at)
    }

    /// Issue a read-only call against a copy of the contract.
    pub fn query(&self, at: &Address, calldata: &[u8]) -> Result<Bytes, ExecutorError> {
        let mut contract = self
            .state
            .contracts
            .get(at)
            .ok_or(ExecutorError::NoContract(*at))?
            .box_clone();
        let ctx = CallContext {
            caller: self.treasury,
            this: *at,
            value: TokenAmount::ZERO,
        };
        contract
            .call(&ctx, calldata)
            .map_err(|reason| ExecutorError::Reverted { target: *at, reason })
    }

    pub fn batches_committed(&self) -> u64 {
        self.batches_committed
    }
}

impl ActionExecutor for ContractHost {
    fn run_batch(&mut self, calls: &[Call]) -> Result<Vec<Bytes>, BatchFailure> {
        let mut staged = self.state.clone();
        let mut results = Vec::with_capacity(calls.len());
        for (index, call) in calls.iter().enumerate() {
            match staged.apply(&self.treasury, call) {
                Ok(data) => results.push(data),
                Err(e) => {
                    warn!(index, target = %call.target, error = %e, "batch rolled back");
                    return Err(BatchFailure {
                        index,
                        reason: e.to_string(),
                    });
                }
            }
        }
        self.state = staged;
        self.batches_committed += 1;
        info!(calls = calls.len(), treasury = %self.treasury_balance(), "batch committed");
        Ok(results)
    }
}

impl fmt::Debug for ContractHost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContractHost")
            .field("treasury", &self.treasury)
            .field("treasury_balance", &self.treasury_balance())
            .field("contracts", &self.state.contracts.len())
            .field("batches_committed", &self.batches_committed)
            .finish()
    }
}
