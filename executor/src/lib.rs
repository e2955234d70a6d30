//! Contract host for executing approved proposals.
//!
//! The governor's treasury holds native value; registered contracts are
//! opaque call targets. A batch runs against a staged copy of the host and
//! is committed only when every call succeeds.

pub mod contract;
pub mod error;
pub mod host;

pub use contract::{CallContext, Contract, ParameterStore};
pub use error::ExecutorError;
pub use host::ContractHost;
