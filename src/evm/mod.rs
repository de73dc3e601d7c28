//! Alloy implementations of the chain seams
//!
//! Read-only calls go through a plain HTTP provider held by each client.
//! Transactions build a signing provider per call with the recommended
//! fillers, so nonce, gas and fees are populated by the node.

pub mod contracts;
mod deployer;
mod fees;
mod origin;
mod tickets;

pub use deployer::{load_artifact, AlloyDeployer};
pub use fees::ArbFeeOracle;
pub use origin::AlloyOrigin;
pub use tickets::AlloyTicketSource;

use alloy::network::EthereumWallet;
use alloy::providers::{Provider, ProviderBuilder, RootProvider};
use alloy::signers::local::PrivateKeySigner;
use alloy::transports::http::reqwest::Url;
use alloy::transports::http::{Client, Http};
use eyre::{Result, WrapErr};

pub type HttpProvider = RootProvider<Http<Client>>;

pub(crate) fn parse_rpc_url(rpc_url: &str, chain: &str) -> Result<Url> {
    rpc_url
        .parse()
        .wrap_err_with(|| format!("Invalid {} RPC URL: {}", chain, rpc_url))
}

pub(crate) fn http_provider(rpc_url: &Url) -> HttpProvider {
    ProviderBuilder::new().on_http(rpc_url.clone())
}

pub(crate) fn signing_provider(
    rpc_url: &Url,
    signer: &PrivateKeySigner,
) -> impl Provider<Http<Client>> {
    ProviderBuilder::new()
        .with_recommended_fillers()
        .wallet(EthereumWallet::from(signer.clone()))
        .on_http(rpc_url.clone())
}

pub(crate) fn parse_signer(private_key: &str) -> Result<PrivateKeySigner> {
    private_key.parse().wrap_err("Invalid private key")
}
