//! Retryable ticket gas/fee estimation
//!
//! Prices an [`L2CallRequest`] so that the value attached to the L1
//! transaction covers submission plus L2 execution at the margins in
//! [`EstimatorConfig`]. The L1 base fee is taken as given by the caller; if
//! it rises before submission the ticket may still be underfunded.

use alloy::primitives::U256;
use tracing::debug;

use crate::chain::{FeeOracle, OriginChain};
use crate::error::BridgeError;
use crate::types::{GasEstimate, L2CallRequest};

/// 1 ether, the sender balance assumed while estimating L2 gas
const DEFAULT_SENDER_DEPOSIT_BUFFER: u128 = 1_000_000_000_000_000_000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EstimatorConfig {
    pub submission_fee_percent_increase: u64,
    pub gas_limit_percent_increase: u64,
    pub min_gas_limit: U256,
    pub max_fee_per_gas_percent_increase: u64,
    pub sender_deposit_buffer: U256,
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            submission_fee_percent_increase: 300,
            gas_limit_percent_increase: 0,
            min_gas_limit: U256::ZERO,
            max_fee_per_gas_percent_increase: 200,
            sender_deposit_buffer: U256::from(DEFAULT_SENDER_DEPOSIT_BUFFER),
        }
    }
}

/// Add `percent`% on top of `value`
pub fn with_margin(value: U256, percent: u64) -> U256 {
    value.saturating_add(value.saturating_mul(U256::from(percent)) / U256::from(100u64))
}

pub struct GasEstimator<F> {
    oracle: F,
    config: EstimatorConfig,
}

impl<F: FeeOracle> GasEstimator<F> {
    pub fn new(oracle: F, config: EstimatorConfig) -> Self {
        Self { oracle, config }
    }

    pub fn config(&self) -> &EstimatorConfig {
        &self.config
    }

    /// Compute the funding parameters for `request` at `l1_base_fee`
    ///
    /// Any oracle failure is reported as [`BridgeError::Estimation`]; no retries.
    pub async fn estimate(
        &self,
        request: &L2CallRequest,
        l1_base_fee: U256,
    ) -> Result<GasEstimate, BridgeError> {
        let submission_fee = self
            .oracle
            .submission_fee(request.data.len(), l1_base_fee)
            .await
            .map_err(|e| BridgeError::estimation("submission fee", e))?;
        let max_submission_cost =
            with_margin(submission_fee, self.config.submission_fee_percent_increase);

        let gas_price = self
            .oracle
            .l2_gas_price()
            .await
            .map_err(|e| BridgeError::estimation("max fee per gas", e))?;
        let max_fee_per_gas =
            with_margin(gas_price, self.config.max_fee_per_gas_percent_increase);

        let sender_deposit = self
            .config
            .sender_deposit_buffer
            .saturating_add(request.l2_call_value);
        let raw_gas_limit = self
            .oracle
            .retryable_gas_limit(request, sender_deposit)
            .await
            .map_err(|e| BridgeError::estimation("gas limit", e))?;
        let gas_limit = with_margin(raw_gas_limit, self.config.gas_limit_percent_increase)
            .max(self.config.min_gas_limit);

        let deposit = gas_limit
            .saturating_mul(max_fee_per_gas)
            .saturating_add(max_submission_cost)
            .saturating_add(request.l2_call_value);

        debug!(
            data_length = request.data.len(),
            l1_base_fee = %l1_base_fee,
            submission_fee = %submission_fee,
            gas_price = %gas_price,
            raw_gas_limit = %raw_gas_limit,
            "Retryable estimate inputs"
        );

        Ok(GasEstimate {
            max_submission_cost,
            gas_limit,
            max_fee_per_gas,
            deposit,
        })
    }

    /// Read the current L1 base fee from `origin`, then [`estimate`](Self::estimate)
    pub async fn estimate_now<O: OriginChain + ?Sized>(
        &self,
        origin: &O,
        request: &L2CallRequest,
    ) -> Result<GasEstimate, BridgeError> {
        let l1_base_fee = origin
            .base_fee()
            .await
            .map_err(|e| BridgeError::connectivity("L1", "reading base fee", e))?;

        self.estimate(request, l1_base_fee).await
    }
}
