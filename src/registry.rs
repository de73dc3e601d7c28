//! Deployment registry
//!
//! The deploy phase saves the four contract addresses once; the
//! registration/deposit phase loads them. Neither workflow depends on where
//! the record is stored.

use eyre::{Result, WrapErr};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::info;

use crate::error::BridgeError;
use crate::types::DeploymentRecord;

pub trait DeploymentLedger: Send + Sync {
    fn load(&self) -> Result<DeploymentRecord>;

    /// Replace the stored record wholesale
    fn save(&self, record: &DeploymentRecord) -> Result<()>;
}

/// The `deployments.json` file: one JSON object with the four address keys
#[derive(Debug, Clone)]
pub struct JsonFileLedger {
    path: PathBuf,
}

impl JsonFileLedger {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl DeploymentLedger for JsonFileLedger {
    fn load(&self) -> Result<DeploymentRecord> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(BridgeError::RegistryMissing {
                    path: self.path.clone(),
                }
                .into());
            }
            Err(e) => {
                return Err(e).wrap_err_with(|| {
                    format!("Failed to read deployment registry {}", self.path.display())
                });
            }
        };

        let record: DeploymentRecord =
            serde_json::from_str(&content).map_err(|source| BridgeError::RegistryMalformed {
                path: self.path.clone(),
                source,
            })?;

        Ok(record)
    }

    fn save(&self, record: &DeploymentRecord) -> Result<()> {
        let json = serde_json::to_string_pretty(record)?;
        std::fs::write(&self.path, json).wrap_err_with(|| {
            format!("Failed to write deployment registry {}", self.path.display())
        })?;

        info!(path = %self.path.display(), "Deployment registry written");
        Ok(())
    }
}

/// In-process ledger
#[derive(Debug, Default)]
pub struct MemoryLedger {
    record: Mutex<Option<DeploymentRecord>>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_record(record: DeploymentRecord) -> Self {
        Self {
            record: Mutex::new(Some(record)),
        }
    }
}

impl DeploymentLedger for MemoryLedger {
    fn load(&self) -> Result<DeploymentRecord> {
        let guard = self
            .record
            .lock()
            .map_err(|_| eyre::eyre!("Deployment ledger lock poisoned"))?;

        (*guard).ok_or_else(|| {
            BridgeError::RegistryMissing {
                path: PathBuf::from("<memory>"),
            }
            .into()
        })
    }

    fn save(&self, record: &DeploymentRecord) -> Result<()> {
        let mut guard = self
            .record
            .lock()
            .map_err(|_| eyre::eyre!("Deployment ledger lock poisoned"))?;
        *guard = Some(*record);
        Ok(())
    }
}
