use quorum_types::{Address, Timepoint, TokenAmount};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("account {caller} is not authorized to mint")]
    Unauthorized { caller: Address },

    #[error("insufficient balance on {account}: have {balance}, need {needed}")]
    InsufficientBalance {
        account: Address,
        balance: TokenAmount,
        needed: TokenAmount,
    },

    #[error("amount overflows the supply of {account}")]
    Overflow { account: Address },

    #[error("the zero address cannot hold tokens")]
    ZeroAddress,

    #[error("timepoint {at} is earlier than the latest recorded timepoint {latest}")]
    StaleTimepoint { at: Timepoint, latest: Timepoint },
}
