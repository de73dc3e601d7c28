//! Retryable pricing from the L1 inbox and the L2 node

use alloy::primitives::{Address, U256};
use alloy::providers::Provider;
use async_trait::async_trait;
use eyre::{eyre, Result, WrapErr};

use super::contracts::{IInbox, NodeInterface, NODE_INTERFACE};
use super::{http_provider, parse_rpc_url, HttpProvider};
use crate::chain::FeeOracle;
use crate::types::L2CallRequest;

pub struct ArbFeeOracle {
    l1: HttpProvider,
    l2: HttpProvider,
    inbox: Address,
}

impl ArbFeeOracle {
    pub fn new(l1_rpc_url: &str, l2_rpc_url: &str, inbox: Address) -> Result<Self> {
        Ok(Self {
            l1: http_provider(&parse_rpc_url(l1_rpc_url, "L1")?),
            l2: http_provider(&parse_rpc_url(l2_rpc_url, "L2")?),
            inbox,
        })
    }
}

#[async_trait]
impl FeeOracle for ArbFeeOracle {
    async fn submission_fee(&self, data_length: usize, base_fee: U256) -> Result<U256> {
        let inbox = IInbox::new(self.inbox, &self.l1);
        let result = inbox
            .calculateRetryableSubmissionFee(U256::from(data_length), base_fee)
            .call()
            .await
            .map_err(|e| eyre!("Failed to calculate retryable submission fee: {}", e))?;

        Ok(result._0)
    }

    async fn l2_gas_price(&self) -> Result<U256> {
        let price = self
            .l2
            .get_gas_price()
            .await
            .wrap_err("Failed to get L2 gas price")?;
        Ok(U256::from(price))
    }

    /// `eth_estimateGas` of `NodeInterface.estimateRetryableTicket`
    async fn retryable_gas_limit(
        &self,
        request: &L2CallRequest,
        sender_deposit: U256,
    ) -> Result<U256> {
        let node = NodeInterface::new(NODE_INTERFACE, &self.l2);
        let gas = node
            .estimateRetryableTicket(
                request.from,
                sender_deposit,
                request.to,
                request.l2_call_value,
                request.excess_fee_refund_address,
                request.call_value_refund_address,
                request.data.clone(),
            )
            .estimate_gas()
            .await
            .map_err(|e| eyre!("Failed to estimate retryable gas: {}", e))?;

        Ok(U256::from(gas))
    }
}
