//! Workflow status events
//!
//! Every state transition of the registration and deposit workflows is
//! reported as a [`WorkflowEvent`] through an [`EventSink`]. The default sink
//! renders them as structured `tracing` records.

use alloy::primitives::{Address, B256, U256};
use tracing::{debug, info, warn};

use crate::types::{DeploymentRecord, GasEstimate, RegistrationState, TicketStatus};

/// Which gateway call a cross-chain message belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallKind {
    Registration,
    Deposit,
}

impl CallKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CallKind::Registration => "registration",
            CallKind::Deposit => "deposit",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum WorkflowEvent {
    RegistryLoaded {
        record: DeploymentRecord,
    },
    RegistrationChecked {
        l1_token: Address,
        state: RegistrationState,
    },
    TokenMinted {
        token_id: U256,
        tx_hash: B256,
    },
    EstimateComputed {
        call: CallKind,
        estimate: GasEstimate,
    },
    TransactionSubmitted {
        call: CallKind,
        tx_hash: B256,
    },
    TicketIdentified {
        ticket_id: B256,
        message_number: U256,
        /// Number of retryable messages in the transaction; only the first is tracked
        candidates: usize,
    },
    TicketStatusChanged {
        ticket_id: B256,
        status: TicketStatus,
    },
}

pub trait EventSink: Send + Sync {
    fn emit(&self, event: &WorkflowEvent);
}

/// Renders events as `tracing` records
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn emit(&self, event: &WorkflowEvent) {
        match event {
            WorkflowEvent::RegistryLoaded { record } => {
                debug!(
                    l1_token = %record.l1_token_address,
                    l2_token = %record.l2_token_address,
                    l1_gateway = %record.l1_gateway_address,
                    l2_gateway = %record.l2_gateway_address,
                    "Deployment registry loaded"
                );
            }
            WorkflowEvent::RegistrationChecked { l1_token, state } => {
                info!(l1_token = %l1_token, state = %state, "Registration checked");
            }
            WorkflowEvent::TokenMinted { token_id, tx_hash } => {
                info!(token_id = %token_id, tx_hash = %tx_hash, "Minted new token on L1");
            }
            WorkflowEvent::EstimateComputed { call, estimate } => {
                info!(
                    call = call.as_str(),
                    max_submission_cost = %estimate.max_submission_cost,
                    gas_limit = %estimate.gas_limit,
                    max_fee_per_gas = %estimate.max_fee_per_gas,
                    deposit = %estimate.deposit,
                    "Gas estimate computed"
                );
            }
            WorkflowEvent::TransactionSubmitted { call, tx_hash } => {
                info!(call = call.as_str(), tx_hash = %tx_hash, "L1 transaction mined");
            }
            WorkflowEvent::TicketIdentified {
                ticket_id,
                message_number,
                candidates,
            } => {
                if *candidates > 1 {
                    warn!(
                        ticket_id = %ticket_id,
                        candidates = candidates,
                        "Multiple retryable messages in transaction, tracking the first"
                    );
                }
                info!(
                    ticket_id = %ticket_id,
                    message_number = %message_number,
                    "Waiting for retryable ticket on L2"
                );
            }
            WorkflowEvent::TicketStatusChanged { ticket_id, status } => match status {
                TicketStatus::Pending | TicketStatus::Redeemed => {
                    info!(
                        ticket_id = %ticket_id,
                        status = %status,
                        "Retryable ticket status changed"
                    );
                }
                _ => {
                    warn!(
                        ticket_id = %ticket_id,
                        status = %status,
                        "Retryable ticket status changed"
                    );
                }
            },
        }
    }
}
