use alloy::primitives::{address, Address};
use eyre::{eyre, Result, WrapErr};
use std::env;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use crate::deploy::DeployPlan;
use crate::estimator::EstimatorConfig;
use crate::tracker::TrackerConfig;

pub const DEFAULT_L2_RPC_URL: &str = "https://goerli-rollup.arbitrum.io/rpc";

/// Arbitrum Goerli delayed inbox
pub const DEFAULT_INBOX_ADDRESS: Address = address!("6BEbC4925716945D46F0Ec336D5C2564F419682C");

/// Configuration shared by both commands
#[derive(Clone)]
pub struct Config {
    pub l1_rpc_url: String,
    pub l2_rpc_url: String,
    pub private_key: String,
    pub inbox_address: Address,
    pub deployments_path: PathBuf,
    pub artifacts_dir: PathBuf,
    pub token_name: String,
    pub token_symbol: String,
    pub estimator: EstimatorConfig,
    pub tracker: TrackerConfig,
}

/// Custom Debug that redacts private_key to prevent accidental log leakage.
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("l1_rpc_url", &self.l1_rpc_url)
            .field("l2_rpc_url", &self.l2_rpc_url)
            .field("private_key", &"<redacted>")
            .field("inbox_address", &self.inbox_address)
            .field("deployments_path", &self.deployments_path)
            .field("artifacts_dir", &self.artifacts_dir)
            .field("token_name", &self.token_name)
            .field("token_symbol", &self.token_symbol)
            .field("estimator", &self.estimator)
            .field("tracker", &self.tracker)
            .finish()
    }
}

impl Config {
    /// Load configuration from environment variables
    /// Loads .env file if present, then reads from environment
    pub fn load() -> Result<Self> {
        Self::load_from_file(".env")
    }

    /// Load from a specific .env file path
    pub fn load_from_file(path: &str) -> Result<Self> {
        if Path::new(path).exists() {
            dotenvy::from_filename(path)
                .wrap_err_with(|| format!("Failed to load .env file from {}", path))?;
        }
        Self::from_env()
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Result<Self> {
        let l1_rpc_url = first_var(&["L1_RPC_URL", "GOERLI_RPC"])
            .ok_or_else(|| eyre!("L1_RPC_URL (or GOERLI_RPC) environment variable is required"))?;
        let private_key = first_var(&["PRIVATE_KEY", "TESTNET_PRIVKEY"]).ok_or_else(|| {
            eyre!("PRIVATE_KEY (or TESTNET_PRIVKEY) environment variable is required")
        })?;

        let defaults = EstimatorConfig::default();
        let estimator = EstimatorConfig {
            submission_fee_percent_increase: parse_var(
                "SUBMISSION_FEE_PERCENT_INCREASE",
                defaults.submission_fee_percent_increase,
            )?,
            gas_limit_percent_increase: parse_var(
                "GAS_LIMIT_PERCENT_INCREASE",
                defaults.gas_limit_percent_increase,
            )?,
            max_fee_per_gas_percent_increase: parse_var(
                "MAX_FEE_PER_GAS_PERCENT_INCREASE",
                defaults.max_fee_per_gas_percent_increase,
            )?,
            ..defaults
        };

        let inbox_address = parse_var("INBOX_ADDRESS", DEFAULT_INBOX_ADDRESS)?;
        let tracker_defaults = TrackerConfig::default();
        let tracker = TrackerConfig {
            poll_interval: Duration::from_millis(parse_var(
                "TICKET_POLL_INTERVAL_MS",
                tracker_defaults.poll_interval.as_millis() as u64,
            )?),
            timeout: Duration::from_secs(parse_var(
                "TICKET_TIMEOUT_SECS",
                tracker_defaults.timeout.as_secs(),
            )?),
            inbox: Some(inbox_address),
        };
        if tracker.poll_interval.is_zero() {
            return Err(eyre!("TICKET_POLL_INTERVAL_MS must be greater than 0"));
        }

        Ok(Self {
            l1_rpc_url,
            l2_rpc_url: env::var("L2_RPC_URL").unwrap_or_else(|_| DEFAULT_L2_RPC_URL.to_string()),
            private_key,
            inbox_address,
            deployments_path: env::var("DEPLOYMENTS_PATH")
                .unwrap_or_else(|_| "./deployments.json".to_string())
                .into(),
            artifacts_dir: env::var("ARTIFACTS_DIR")
                .unwrap_or_else(|_| "./artifacts".to_string())
                .into(),
            token_name: env::var("TOKEN_NAME").unwrap_or_else(|_| "GoldmanCoins".to_string()),
            token_symbol: env::var("TOKEN_SYMBOL").unwrap_or_else(|_| "GMC".to_string()),
            estimator,
            tracker,
        })
    }

    pub fn deploy_plan(&self) -> DeployPlan {
        DeployPlan {
            inbox: self.inbox_address,
            token_name: self.token_name.clone(),
            token_symbol: self.token_symbol.clone(),
        }
    }
}

/// First non-empty variable among `names`
fn first_var(names: &[&str]) -> Option<String> {
    names
        .iter()
        .filter_map(|name| env::var(name).ok())
        .find(|value| !value.trim().is_empty())
}

fn parse_var<T>(name: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .wrap_err_with(|| format!("{} has an invalid value: {}", name, raw)),
        Err(_) => Ok(default),
    }
}
