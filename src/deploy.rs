//! `deploy-all`: deploy and wire the gateway pair and the mirrored tokens

use alloy::primitives::{Address, Bytes};
use alloy::sol_types::SolValue;
use eyre::{Result, WrapErr};
use tracing::info;

use crate::chain::{ChainSide, ContractDeployer};
use crate::registry::DeploymentLedger;
use crate::types::DeploymentRecord;

pub const L1_GATEWAY_CONTRACT: &str = "L1NftGateway";
pub const L2_GATEWAY_CONTRACT: &str = "L2NftGateway";
pub const L1_TOKEN_CONTRACT: &str = "L1ArbERC721";
pub const L2_TOKEN_CONTRACT: &str = "L2ArbERC721";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployPlan {
    /// Arbitrum delayed inbox on L1
    pub inbox: Address,
    pub token_name: String,
    pub token_symbol: String,
}

/// Deploy both gateways, link them, deploy both tokens and record the addresses
///
/// Nothing is written to `ledger` unless every step succeeded.
pub async fn deploy_all(
    deployer: &dyn ContractDeployer,
    plan: &DeployPlan,
    ledger: &dyn DeploymentLedger,
) -> Result<DeploymentRecord> {
    let l1_gateway = deployer
        .deploy(ChainSide::L1, L1_GATEWAY_CONTRACT, Bytes::new())
        .await
        .wrap_err("Failed to deploy L1 gateway")?;
    let l2_gateway = deployer
        .deploy(ChainSide::L2, L2_GATEWAY_CONTRACT, Bytes::new())
        .await
        .wrap_err("Failed to deploy L2 gateway")?;

    deployer
        .initialize_l1_gateway(l1_gateway, l2_gateway, plan.inbox)
        .await
        .wrap_err("Failed to initialize L1 gateway")?;
    deployer
        .initialize_l2_gateway(l2_gateway, l1_gateway)
        .await
        .wrap_err("Failed to initialize L2 gateway")?;

    let l1_token_args = (plan.token_name.clone(), plan.token_symbol.clone()).abi_encode_params();
    let l1_token = deployer
        .deploy(ChainSide::L1, L1_TOKEN_CONTRACT, l1_token_args.into())
        .await
        .wrap_err("Failed to deploy L1 token")?;

    let l2_token_args = (
        plan.token_name.clone(),
        plan.token_symbol.clone(),
        l1_token,
        l2_gateway,
    )
        .abi_encode_params();
    let l2_token = deployer
        .deploy(ChainSide::L2, L2_TOKEN_CONTRACT, l2_token_args.into())
        .await
        .wrap_err("Failed to deploy L2 token")?;

    let record = DeploymentRecord {
        l1_token_address: l1_token,
        l2_token_address: l2_token,
        l1_gateway_address: l1_gateway,
        l2_gateway_address: l2_gateway,
    };
    ledger.save(&record)?;

    info!(
        l1_gateway = %l1_gateway,
        l2_gateway = %l2_gateway,
        l1_token = %l1_token,
        l2_token = %l2_token,
        "Deployment complete"
    );

    Ok(record)
}
