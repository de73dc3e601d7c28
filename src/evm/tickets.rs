//! L2 ticket lookups

use alloy::contract::Error as ContractError;
use alloy::primitives::{Bytes, B256};
use alloy::providers::Provider;
use alloy::rpc::types::TransactionReceipt;
use alloy::sol_types::{SolError, SolEvent};
use async_trait::async_trait;
use eyre::{Result, WrapErr};

use super::contracts::{ArbRetryableTx, ARB_RETRYABLE_TX};
use super::{http_provider, parse_rpc_url, HttpProvider};
use crate::chain::{CreationReceipt, TicketSource};

pub struct AlloyTicketSource {
    provider: HttpProvider,
}

impl AlloyTicketSource {
    pub fn new(rpc_url: &str) -> Result<Self> {
        Ok(Self {
            provider: http_provider(&parse_rpc_url(rpc_url, "L2")?),
        })
    }
}

/// JSON-RPC error code nodes return for a reverted `eth_call`
const EXECUTION_REVERTED: i64 = 3;

/// Whether a `getTimeout` error response means the ticket no longer exists
///
/// Only a revert counts: either carrying the `NoTicketWithID` selector, or a
/// bare revert from a node that omits the data. Rate limits and other node
/// errors do not.
fn ticket_missing(code: i64, message: &str, data: Option<&str>) -> bool {
    let revert_data = data.and_then(|raw| serde_json::from_str::<Bytes>(raw).ok());

    match revert_data {
        Some(data) if !data.is_empty() => {
            data.starts_with(&ArbRetryableTx::NoTicketWithID::SELECTOR)
        }
        _ => code == EXECUTION_REVERTED || message.contains("execution reverted"),
    }
}

/// Retry transaction of the `RedeemScheduled` event in a creation receipt
fn scheduled_redeem(receipt: &TransactionReceipt) -> Option<B256> {
    receipt
        .inner
        .logs()
        .iter()
        .filter(|log| log.inner.address == ARB_RETRYABLE_TX)
        .find_map(|log| {
            ArbRetryableTx::RedeemScheduled::decode_log_data(&log.inner.data, true).ok()
        })
        .map(|event| event.retryTxHash)
}

#[async_trait]
impl TicketSource for AlloyTicketSource {
    async fn chain_id(&self) -> Result<u64> {
        self.provider
            .get_chain_id()
            .await
            .wrap_err("Failed to get L2 chain id")
    }

    async fn creation_receipt(&self, ticket_id: B256) -> Result<Option<CreationReceipt>> {
        let receipt = self
            .provider
            .get_transaction_receipt(ticket_id)
            .await
            .wrap_err("Failed to get ticket creation receipt")?;

        Ok(receipt.map(|receipt| CreationReceipt {
            success: receipt.status(),
            auto_redeem: scheduled_redeem(&receipt),
        }))
    }

    async fn transaction_succeeded(&self, tx_hash: B256) -> Result<Option<bool>> {
        let receipt = self
            .provider
            .get_transaction_receipt(tx_hash)
            .await
            .wrap_err("Failed to get transaction receipt")?;

        Ok(receipt.map(|receipt| receipt.status()))
    }

    /// `getTimeout` reverts once the ticket is redeemed or expired
    async fn ticket_alive(&self, ticket_id: B256) -> Result<bool> {
        let precompile = ArbRetryableTx::new(ARB_RETRYABLE_TX, &self.provider);

        let err = match precompile.getTimeout(ticket_id).call().await {
            Ok(_) => return Ok(true),
            Err(err) => err,
        };

        if let ContractError::TransportError(e) = &err {
            if let Some(payload) = e.as_error_resp() {
                let data = payload.data.as_deref().map(|raw| raw.get());
                if ticket_missing(payload.code, &payload.message, data) {
                    return Ok(false);
                }
            }
        }

        Err(err).wrap_err("Failed to read ticket timeout")
    }
}
