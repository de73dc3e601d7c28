//! Shared types for the bridge workflows

use alloy::primitives::{Address, Bytes, Log, B256, U256};
use alloy::rpc::types::TransactionReceipt;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::BridgeError;

/// Addresses of one deployed bridge instance
///
/// Serialized as the four camelCase keys of the deployments file. Any other
/// key makes the file malformed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct DeploymentRecord {
    pub l1_token_address: Address,
    pub l2_token_address: Address,
    pub l1_gateway_address: Address,
    pub l2_gateway_address: Address,
}

/// A prospective L1→L2 call, consumed by the gas estimator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct L2CallRequest {
    /// L2 contract the message executes against
    pub to: Address,
    /// L1 contract that sends the message
    pub from: Address,
    pub data: Bytes,
    pub l2_call_value: U256,
    pub excess_fee_refund_address: Address,
    pub call_value_refund_address: Address,
}

impl L2CallRequest {
    /// A zero-value call from the L1 gateway to the L2 gateway, refunding everything to `refund`
    pub fn gateway_call(record: &DeploymentRecord, data: Bytes, refund: Address) -> Self {
        Self {
            to: record.l2_gateway_address,
            from: record.l1_gateway_address,
            data,
            l2_call_value: U256::ZERO,
            excess_fee_refund_address: refund,
            call_value_refund_address: refund,
        }
    }
}

/// Funding parameters for a retryable ticket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GasEstimate {
    pub max_submission_cost: U256,
    pub gas_limit: U256,
    pub max_fee_per_gas: U256,
    /// Value to attach to the L1 transaction
    pub deposit: U256,
}

impl GasEstimate {
    /// Minimum deposit needed to fund the L2 execution, excluding any call value
    pub fn execution_cost(&self) -> U256 {
        self.gas_limit
            .saturating_mul(self.max_fee_per_gas)
            .saturating_add(self.max_submission_cost)
    }
}

/// Whether the L1 gateway already maps a token to L2
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrationState {
    Unregistered,
    Registered(Address),
}

impl RegistrationState {
    /// Interpret the gateway's `l1ToL2Token` answer; the zero address means unregistered
    pub fn from_mapping(l2_token: Address) -> Self {
        if l2_token.is_zero() {
            RegistrationState::Unregistered
        } else {
            RegistrationState::Registered(l2_token)
        }
    }
}

impl fmt::Display for RegistrationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistrationState::Unregistered => write!(f, "unregistered"),
            RegistrationState::Registered(addr) => write!(f, "registered({})", addr),
        }
    }
}

/// The mined L1 transaction a workflow submitted
#[derive(Debug, Clone, PartialEq)]
pub struct OriginReceipt {
    pub tx_hash: B256,
    pub block_number: Option<u64>,
    pub success: bool,
    pub logs: Vec<Log>,
}

impl OriginReceipt {
    /// Fail with `TransactionReverted` unless the transaction succeeded
    pub fn ensure_success(self, call: &'static str) -> Result<Self, BridgeError> {
        if self.success {
            Ok(self)
        } else {
            Err(BridgeError::TransactionReverted {
                call,
                tx_hash: self.tx_hash,
            })
        }
    }
}

impl From<&TransactionReceipt> for OriginReceipt {
    fn from(receipt: &TransactionReceipt) -> Self {
        Self {
            tx_hash: receipt.transaction_hash,
            block_number: receipt.block_number,
            success: receipt.status(),
            logs: receipt
                .inner
                .logs()
                .iter()
                .map(|log| log.inner.clone())
                .collect(),
        }
    }
}

/// Delivery status of a retryable ticket on L2
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TicketStatus {
    /// Not yet visible on L2, or auto-redeem not yet mined
    Pending,
    /// Ticket exists on L2 but has not executed; can still be redeemed manually
    CreatedPendingExecution,
    /// Executed successfully on L2
    Redeemed,
    /// Ticket creation failed, or its execution reverted
    Failed,
    /// Lifetime ended without a successful redeem
    Expired,
}

impl TicketStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, TicketStatus::Pending)
    }

    /// Only `Redeemed` counts as a completed bridge operation
    pub fn is_success(&self) -> bool {
        matches!(self, TicketStatus::Redeemed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TicketStatus::Pending => "pending",
            TicketStatus::CreatedPendingExecution => "created_pending_execution",
            TicketStatus::Redeemed => "redeemed",
            TicketStatus::Failed => "failed",
            TicketStatus::Expired => "expired",
        }
    }
}

impl fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single in-flight L1→L2 message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryableTicket {
    /// L2 creation transaction hash of the ticket
    pub id: B256,
    pub message_number: U256,
    /// L1 transaction that emitted the message
    pub origin_tx: B256,
}

/// A ticket together with the terminal status it reached
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackedTicket {
    pub ticket: RetryableTicket,
    pub status: TicketStatus,
}
