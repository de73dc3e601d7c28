//! Chain access seams
//!
//! The workflows talk to both chains only through these traits. The alloy
//! implementations live in [`crate::evm`].

use alloy::primitives::{Address, Bytes, B256, U256};
use async_trait::async_trait;
use eyre::Result;

use crate::types::{GasEstimate, L2CallRequest, OriginReceipt};

/// L1 operations against the gateway and token contracts, signed by one account
///
/// Every transaction method waits for the receipt before returning.
#[async_trait]
pub trait OriginChain: Send + Sync {
    fn signer_address(&self) -> Address;

    /// Current L1 gas price, used as the base fee for submission pricing
    async fn base_fee(&self) -> Result<U256>;

    async fn l1_to_l2_token(&self, gateway: Address, l1_token: Address) -> Result<Address>;

    async fn register_l2_message_call_data(
        &self,
        gateway: Address,
        l1_token: Address,
        l2_token: Address,
    ) -> Result<Bytes>;

    async fn deposit_l2_message_call_data(
        &self,
        gateway: Address,
        l1_token: Address,
        l2_token: Address,
        token_id: U256,
        recipient: Address,
    ) -> Result<Bytes>;

    async fn register_token_to_l2(
        &self,
        gateway: Address,
        l2_token: Address,
        estimate: &GasEstimate,
        refund: Address,
    ) -> Result<OriginReceipt>;

    async fn deposit(
        &self,
        gateway: Address,
        l1_token: Address,
        token_id: U256,
        recipient: Address,
        estimate: &GasEstimate,
        refund: Address,
    ) -> Result<OriginReceipt>;

    async fn mint(&self, token: Address, recipient: Address) -> Result<OriginReceipt>;

    /// Running token id counter (the id the next mint will receive)
    async fn token_id_counter(&self, token: Address) -> Result<U256>;
}

/// Price inputs for retryable tickets
#[async_trait]
pub trait FeeOracle: Send + Sync {
    /// Unmargined submission fee charged by the L1 inbox
    async fn submission_fee(&self, data_length: usize, base_fee: U256) -> Result<U256>;

    /// Current L2 gas price
    async fn l2_gas_price(&self) -> Result<U256>;

    /// Gas needed to create and execute the retryable on L2
    async fn retryable_gas_limit(
        &self,
        request: &L2CallRequest,
        sender_deposit: U256,
    ) -> Result<U256>;
}

/// L2 receipt of a retryable ticket's creation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CreationReceipt {
    pub success: bool,
    /// Retry transaction scheduled by the auto-redeem, if any
    pub auto_redeem: Option<B256>,
}

/// L2 view of retryable tickets
#[async_trait]
pub trait TicketSource: Send + Sync {
    async fn chain_id(&self) -> Result<u64>;

    async fn creation_receipt(&self, ticket_id: B256) -> Result<Option<CreationReceipt>>;

    /// `None` while the transaction has no receipt
    async fn transaction_succeeded(&self, tx_hash: B256) -> Result<Option<bool>>;

    /// Whether the ticket still exists and can be redeemed
    async fn ticket_alive(&self, ticket_id: B256) -> Result<bool>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainSide {
    L1,
    L2,
}

impl ChainSide {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChainSide::L1 => "L1",
            ChainSide::L2 => "L2",
        }
    }
}

/// Contract deployment on either chain
#[async_trait]
pub trait ContractDeployer: Send + Sync {
    /// Deploy `contract` with ABI-encoded constructor arguments, returning its address
    async fn deploy(
        &self,
        side: ChainSide,
        contract: &str,
        constructor_args: Bytes,
    ) -> Result<Address>;

    async fn initialize_l1_gateway(
        &self,
        gateway: Address,
        l2_gateway: Address,
        inbox: Address,
    ) -> Result<()>;

    async fn initialize_l2_gateway(&self, gateway: Address, l1_gateway: Address) -> Result<()>;
}
