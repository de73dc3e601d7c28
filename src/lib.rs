//! arb-nft-bridge: deployment and first-use bootstrap of an L1/L2 NFT gateway pair
//!
//! This crate provides:
//!
//! - **Deployment** - Deploys both gateways and both mirrored tokens, wires them
//!   together and persists their addresses through a [`registry::DeploymentLedger`]
//! - **Gas Estimation** - Prices an L1→L2 retryable call so the L2 execution is fundable
//! - **Registration** - Idempotent registration of the L1→L2 token mapping
//! - **Deposit** - Mints a token on L1 and bridges it to L2 (never idempotent)
//! - **Ticket Tracking** - Follows the resulting retryable ticket to a terminal status
//!
//! The workflows only see the chains through the traits in [`chain`]; the
//! [`evm`] module implements them on top of alloy.

pub mod bootstrap;
pub mod chain;
pub mod config;
pub mod deploy;
pub mod deposit;
pub mod error;
pub mod estimator;
pub mod events;
pub mod evm;
pub mod registration;
pub mod registry;
pub mod retryable;
pub mod tracker;
pub mod types;

#[cfg(test)]
pub(crate) mod testing;

pub use bootstrap::{Bootstrap, BootstrapOutcome};
pub use config::Config;
pub use error::BridgeError;
pub use events::{EventSink, TracingSink, WorkflowEvent};
pub use registry::{DeploymentLedger, JsonFileLedger, MemoryLedger};
pub use types::{
    DeploymentRecord, GasEstimate, L2CallRequest, OriginReceipt, RegistrationState,
    RetryableTicket, TicketStatus, TrackedTicket,
};
