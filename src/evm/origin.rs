//! L1 client: gateway and token calls signed by the bootstrap account

use alloy::primitives::{Address, Bytes, U256};
use alloy::providers::Provider;
use alloy::signers::local::PrivateKeySigner;
use alloy::transports::http::reqwest::Url;
use async_trait::async_trait;
use eyre::{eyre, Result, WrapErr};
use tracing::{debug, info};

use super::contracts::{L1ArbERC721, L1NftGateway, L2GasParams};
use super::{http_provider, parse_rpc_url, parse_signer, signing_provider, HttpProvider};
use crate::chain::OriginChain;
use crate::types::{GasEstimate, OriginReceipt};

pub struct AlloyOrigin {
    rpc_url: Url,
    signer: PrivateKeySigner,
    provider: HttpProvider,
}

impl AlloyOrigin {
    pub fn new(rpc_url: &str, private_key: &str) -> Result<Self> {
        let rpc_url = parse_rpc_url(rpc_url, "L1")?;
        let signer = parse_signer(private_key)?;

        info!(signer = %signer.address(), "L1 client initialized");

        Ok(Self {
            provider: http_provider(&rpc_url),
            rpc_url,
            signer,
        })
    }
}

#[async_trait]
impl OriginChain for AlloyOrigin {
    fn signer_address(&self) -> Address {
        self.signer.address()
    }

    async fn base_fee(&self) -> Result<U256> {
        let price = self
            .provider
            .get_gas_price()
            .await
            .wrap_err("Failed to get L1 gas price")?;
        Ok(U256::from(price))
    }

    async fn l1_to_l2_token(&self, gateway: Address, l1_token: Address) -> Result<Address> {
        let gateway = L1NftGateway::new(gateway, &self.provider);
        let result = gateway
            .l1ToL2Token(l1_token)
            .call()
            .await
            .map_err(|e| eyre!("Failed to read l1ToL2Token: {}", e))?;

        Ok(result._0)
    }

    async fn register_l2_message_call_data(
        &self,
        gateway: Address,
        l1_token: Address,
        l2_token: Address,
    ) -> Result<Bytes> {
        let gateway = L1NftGateway::new(gateway, &self.provider);
        let result = gateway
            .getRegisterL2MessageCallData(l1_token, l2_token)
            .call()
            .await
            .map_err(|e| eyre!("Failed to get register L2 call data: {}", e))?;

        Ok(result._0)
    }

    async fn deposit_l2_message_call_data(
        &self,
        gateway: Address,
        l1_token: Address,
        l2_token: Address,
        token_id: U256,
        recipient: Address,
    ) -> Result<Bytes> {
        let gateway = L1NftGateway::new(gateway, &self.provider);
        let result = gateway
            .getDepositL2MessageCallData(l1_token, l2_token, token_id, recipient)
            .call()
            .await
            .map_err(|e| eyre!("Failed to get deposit L2 call data: {}", e))?;

        Ok(result._0)
    }

    async fn register_token_to_l2(
        &self,
        gateway: Address,
        l2_token: Address,
        estimate: &GasEstimate,
        refund: Address,
    ) -> Result<OriginReceipt> {
        let provider = signing_provider(&self.rpc_url, &self.signer);
        let gateway = L1NftGateway::new(gateway, &provider);

        debug!(l2_token = %l2_token, value = %estimate.deposit, "Submitting registerTokenToL2");

        let pending = gateway
            .registerTokenToL2(l2_token, L2GasParams::from(estimate), refund)
            .value(estimate.deposit)
            .send()
            .await
            .map_err(|e| eyre!("Failed to send registerTokenToL2: {}", e))?;

        info!(tx_hash = %pending.tx_hash(), "registerTokenToL2 sent");

        let receipt = pending
            .get_receipt()
            .await
            .map_err(|e| eyre!("Failed to get registerTokenToL2 receipt: {}", e))?;

        Ok(OriginReceipt::from(&receipt))
    }

    async fn deposit(
        &self,
        gateway: Address,
        l1_token: Address,
        token_id: U256,
        recipient: Address,
        estimate: &GasEstimate,
        refund: Address,
    ) -> Result<OriginReceipt> {
        let provider = signing_provider(&self.rpc_url, &self.signer);
        let gateway = L1NftGateway::new(gateway, &provider);

        debug!(
            token_id = %token_id,
            recipient = %recipient,
            value = %estimate.deposit,
            "Submitting deposit"
        );

        let pending = gateway
            .deposit(
                l1_token,
                token_id,
                recipient,
                L2GasParams::from(estimate),
                refund,
            )
            .value(estimate.deposit)
            .send()
            .await
            .map_err(|e| eyre!("Failed to send deposit: {}", e))?;

        info!(tx_hash = %pending.tx_hash(), "Deposit sent");

        let receipt = pending
            .get_receipt()
            .await
            .map_err(|e| eyre!("Failed to get deposit receipt: {}", e))?;

        Ok(OriginReceipt::from(&receipt))
    }

    async fn mint(&self, token: Address, recipient: Address) -> Result<OriginReceipt> {
        let provider = signing_provider(&self.rpc_url, &self.signer);
        let token = L1ArbERC721::new(token, &provider);

        let receipt = token
            .mint(recipient)
            .send()
            .await
            .map_err(|e| eyre!("Failed to send mint: {}", e))?
            .get_receipt()
            .await
            .map_err(|e| eyre!("Failed to get mint receipt: {}", e))?;

        Ok(OriginReceipt::from(&receipt))
    }

    async fn token_id_counter(&self, token: Address) -> Result<U256> {
        let token = L1ArbERC721::new(token, &self.provider);
        let result = token
            .tokenId()
            .call()
            .await
            .map_err(|e| eyre!("Failed to read tokenId counter: {}", e))?;

        Ok(result._0)
    }
}
