//! JSON snapshot of the registry state.
//!
//! Snapshots are how state survives a restart: the binary loads one at
//! startup (treating it as an upgrade) and rewrites it after each update
//! call.

use std::io::ErrorKind;
use std::path::Path;

use dip721_interface::{TokenMetadata, TxEvent};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::Configuration;
use crate::error::RegistryError;
use crate::metrics;

/// Current snapshot format.
pub const SNAPSHOT_VERSION: u32 = 1;

/// Serialized registry state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Format version
    pub version: u32,
    /// Registry settings
    pub configuration: Configuration,
    /// Every minted token, burned ones included
    pub tokens: Vec<TokenMetadata>,
    /// Transaction log in id order
    pub transactions: Vec<TxEvent>,
}

impl Snapshot {
    /// Create a snapshot in the current format.
    #[must_use]
    pub fn new(
        configuration: Configuration,
        tokens: Vec<TokenMetadata>,
        transactions: Vec<TxEvent>,
    ) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            configuration,
            tokens,
            transactions,
        }
    }

    /// Write the snapshot to `path`.
    ///
    /// The file is written next to `path` first and renamed into place.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding or any filesystem step fails.
    pub async fn save(&self, path: &Path) -> Result<(), RegistryError> {
        let result = self.write(path).await;
        metrics::record_snapshot_operation("save", status(&result));
        result
    }

    async fn write(&self, path: &Path) -> Result<(), RegistryError> {
        let data = serde_json::to_vec_pretty(self)?;
        let tmp = path.with_extension("tmp");

        tokio::fs::write(&tmp, &data)
            .await
            .map_err(|e| io_failure("Write", &tmp, e))?;
        tokio::fs::rename(&tmp, path)
            .await
            .map_err(|e| io_failure("Rename to", path, e))?;

        debug!(
            path = %path.display(),
            tokens = self.tokens.len(),
            transactions = self.transactions.len(),
            "Snapshot saved"
        );
        Ok(())
    }

    /// Read the snapshot at `path`, or `None` if there is no file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, does not decode, or has
    /// an unsupported version.
    pub async fn load(path: &Path) -> Result<Option<Self>, RegistryError> {
        let result = Self::read(path).await;
        metrics::record_snapshot_operation("load", status(&result));
        result
    }

    async fn read(path: &Path) -> Result<Option<Self>, RegistryError> {
        let data = match tokio::fs::read(path).await {
            Ok(data) => data,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(io_failure("Read", path, e)),
        };

        let snapshot: Self = serde_json::from_slice(&data)?;
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(RegistryError::storage(format!(
                "Unsupported snapshot version {} in {}",
                snapshot.version,
                path.display()
            )));
        }

        info!(
            path = %path.display(),
            tokens = snapshot.tokens.len(),
            transactions = snapshot.transactions.len(),
            "Snapshot loaded"
        );
        Ok(Some(snapshot))
    }
}

fn status<T>(result: &Result<T, RegistryError>) -> &'static str {
    if result.is_ok() {
        "ok"
    } else {
        "error"
    }
}

fn io_failure(action: &str, path: &Path, e: std::io::Error) -> RegistryError {
    RegistryError::storage(format!("{} {} failed: {}", action, path.display(), e))
}
