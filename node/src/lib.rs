//! Governance node: runs the engine as a single-writer service.
//!
//! The node is the coordinator that:
//! - Serialises every mutating request through one task
//! - Publishes an immutable read view after each request
//! - Fans engine events out to in-process listeners and async subscribers
//! - Loads configuration and sets up structured logging

pub mod config;
pub mod error;
pub mod event_bus;
pub mod logging;
pub mod service;
pub mod view;

pub use config::GovernorConfig;
pub use error::NodeError;
pub use event_bus::EventBus;
pub use logging::{init_logging, LogFormat};
pub use service::{GovernanceNode, NodeHandle};
pub use view::GovernanceView;
