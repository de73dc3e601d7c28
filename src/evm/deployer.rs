//! Contract deployment from compiled artifacts

use alloy::network::TransactionBuilder;
use alloy::primitives::{Address, Bytes};
use alloy::providers::Provider;
use alloy::rpc::types::TransactionRequest;
use alloy::signers::local::PrivateKeySigner;
use alloy::transports::http::reqwest::Url;
use async_trait::async_trait;
use eyre::{eyre, Result, WrapErr};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::contracts::{L1NftGateway, L2NftGateway};
use super::{parse_rpc_url, parse_signer, signing_provider};
use crate::chain::{ChainSide, ContractDeployer};
use crate::types::OriginReceipt;

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ArtifactBytecode {
    /// Hardhat: `"bytecode": "0x…"`
    Hex(Bytes),
    /// Foundry: `"bytecode": { "object": "0x…" }`
    Object { object: Bytes },
}

#[derive(Debug, Deserialize)]
struct Artifact {
    bytecode: ArtifactBytecode,
}

/// Read the creation bytecode of `contract` from `<dir>/<contract>.json`
pub fn load_artifact(dir: &Path, contract: &str) -> Result<Bytes> {
    let path = dir.join(format!("{}.json", contract));
    let content = std::fs::read_to_string(&path)
        .wrap_err_with(|| format!("Failed to read artifact {}", path.display()))?;
    let artifact: Artifact = serde_json::from_str(&content)
        .wrap_err_with(|| format!("Failed to parse artifact {}", path.display()))?;

    let bytecode = match artifact.bytecode {
        ArtifactBytecode::Hex(code) | ArtifactBytecode::Object { object: code } => code,
    };
    if bytecode.is_empty() {
        return Err(eyre!("Artifact {} has no bytecode", path.display()));
    }

    Ok(bytecode)
}

pub struct AlloyDeployer {
    l1_rpc_url: Url,
    l2_rpc_url: Url,
    signer: PrivateKeySigner,
    artifacts_dir: PathBuf,
}

impl AlloyDeployer {
    pub fn new(
        l1_rpc_url: &str,
        l2_rpc_url: &str,
        private_key: &str,
        artifacts_dir: impl Into<PathBuf>,
    ) -> Result<Self> {
        Ok(Self {
            l1_rpc_url: parse_rpc_url(l1_rpc_url, "L1")?,
            l2_rpc_url: parse_rpc_url(l2_rpc_url, "L2")?,
            signer: parse_signer(private_key)?,
            artifacts_dir: artifacts_dir.into(),
        })
    }

    fn rpc_url(&self, side: ChainSide) -> &Url {
        match side {
            ChainSide::L1 => &self.l1_rpc_url,
            ChainSide::L2 => &self.l2_rpc_url,
        }
    }
}

#[async_trait]
impl ContractDeployer for AlloyDeployer {
    async fn deploy(
        &self,
        side: ChainSide,
        contract: &str,
        constructor_args: Bytes,
    ) -> Result<Address> {
        let mut code = load_artifact(&self.artifacts_dir, contract)?.to_vec();
        code.extend_from_slice(&constructor_args);

        debug!(
            chain = side.as_str(),
            contract,
            code_len = code.len(),
            "Deploying contract"
        );

        let provider = signing_provider(self.rpc_url(side), &self.signer);
        let tx = TransactionRequest::default().with_deploy_code(code);
        let receipt = provider
            .send_transaction(tx)
            .await
            .wrap_err_with(|| format!("Failed to send {} deployment", contract))?
            .get_receipt()
            .await
            .wrap_err_with(|| format!("Failed to get {} deployment receipt", contract))?;

        OriginReceipt::from(&receipt).ensure_success("deploy")?;
        let address = receipt
            .contract_address
            .ok_or_else(|| eyre!("{} deployment receipt has no contract address", contract))?;

        info!(chain = side.as_str(), contract, address = %address, "Contract deployed");
        Ok(address)
    }

    async fn initialize_l1_gateway(
        &self,
        gateway: Address,
        l2_gateway: Address,
        inbox: Address,
    ) -> Result<()> {
        let provider = signing_provider(&self.l1_rpc_url, &self.signer);
        let receipt = L1NftGateway::new(gateway, &provider)
            .initialize(l2_gateway, inbox)
            .send()
            .await
            .map_err(|e| eyre!("Failed to send L1 gateway initialize: {}", e))?
            .get_receipt()
            .await
            .map_err(|e| eyre!("Failed to get L1 gateway initialize receipt: {}", e))?;

        OriginReceipt::from(&receipt).ensure_success("initialize")?;
        info!(gateway = %gateway, counterpart = %l2_gateway, "L1 gateway initialized");
        Ok(())
    }

    async fn initialize_l2_gateway(&self, gateway: Address, l1_gateway: Address) -> Result<()> {
        let provider = signing_provider(&self.l2_rpc_url, &self.signer);
        let receipt = L2NftGateway::new(gateway, &provider)
            .initialize(l1_gateway)
            .send()
            .await
            .map_err(|e| eyre!("Failed to send L2 gateway initialize: {}", e))?
            .get_receipt()
            .await
            .map_err(|e| eyre!("Failed to get L2 gateway initialize receipt: {}", e))?;

        OriginReceipt::from(&receipt).ensure_success("initialize")?;
        info!(gateway = %gateway, counterpart = %l1_gateway, "L2 gateway initialized");
        Ok(())
    }
}
