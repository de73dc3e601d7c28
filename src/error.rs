//! Error taxonomy for the bridge workflows
//!
//! Application code passes errors around as `eyre::Report`; the variants here
//! are the cases a caller may want to tell apart with `Report::downcast_ref`.

use alloy::primitives::B256;
use std::path::PathBuf;
use thiserror::Error;

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Error, Debug)]
pub enum BridgeError {
    /// An RPC endpoint could not be reached or answered with a transport error
    #[error("{chain} RPC unreachable while {action}")]
    Connectivity {
        chain: &'static str,
        action: &'static str,
        #[source]
        source: BoxError,
    },

    /// A cross-chain call could not be priced; nothing was submitted
    #[error("unable to estimate {step} for cross-chain call")]
    Estimation {
        step: &'static str,
        #[source]
        source: BoxError,
    },

    #[error("{call} transaction {tx_hash} reverted")]
    TransactionReverted { call: &'static str, tx_hash: B256 },

    #[error("no retryable ticket message found in transaction {tx_hash}")]
    NoMessageFound { tx_hash: B256 },

    #[error("retryable ticket {ticket_id} did not reach a terminal status within {waited_secs}s")]
    TicketTimedOut { ticket_id: B256, waited_secs: u64 },

    #[error("deployment registry not found at {path}")]
    RegistryMissing { path: PathBuf },

    #[error("deployment registry at {path} is malformed")]
    RegistryMalformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("token id counter is zero after mint; cannot derive minted token id")]
    InvalidTokenCounter,
}

impl BridgeError {
    pub fn connectivity(
        chain: &'static str,
        action: &'static str,
        source: impl Into<BoxError>,
    ) -> Self {
        BridgeError::Connectivity {
            chain,
            action,
            source: source.into(),
        }
    }

    pub fn estimation(step: &'static str, source: impl Into<BoxError>) -> Self {
        BridgeError::Estimation {
            step,
            source: source.into(),
        }
    }
}
