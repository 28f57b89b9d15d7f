//! State persistence
//!
//! The whole DAO state is written as a single checksummed JSON document
//! when the server stops and read back when it starts.

use crate::dao::DaoState;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::Path;
use thiserror::Error;
use tracing::{info, warn};

/// Bumped whenever the layout of [`DaoState`] changes incompatibly
pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Error, Debug)]
pub enum PersistenceError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("Unsupported snapshot version {0}")]
    UnsupportedVersion(u32),

    #[error("Snapshot checksum mismatch (expected {expected}, found {found})")]
    ChecksumMismatch { expected: String, found: String },
}

#[derive(Debug, Serialize, Deserialize)]
struct StateSnapshot {
    version: u32,
    checksum: String,
    state: serde_json::Value,
}

/// Compute checksum of the serialized state
pub fn compute_checksum(state: &serde_json::Value) -> Result<String, PersistenceError> {
    let bytes = serde_json::to_vec(state)?;
    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    Ok(format!("{:x}", hasher.finalize()))
}

/// Write the state atomically: a temporary file is renamed over the target
pub async fn save_state(path: &Path, state: &DaoState) -> Result<(), PersistenceError> {
    let value = serde_json::to_value(state)?;
    let snapshot = StateSnapshot {
        version: SNAPSHOT_VERSION,
        checksum: compute_checksum(&value)?,
        state: value,
    };
    let bytes = serde_json::to_vec_pretty(&snapshot)?;

    let tmp = path.with_extension("tmp");
    tokio::fs::write(&tmp, bytes).await?;
    tokio::fs::rename(&tmp, path).await?;

    info!(
        "Saved state to {} ({} proposals, {} donors, {} audit entries)",
        path.display(),
        state.proposals.len(),
        state.donors.len(),
        state.audit.len()
    );
    Ok(())
}

/// Read a saved state; `Ok(None)` when no file exists yet
pub async fn load_state(path: &Path) -> Result<Option<DaoState>, PersistenceError> {
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            warn!("No state file at {}, starting fresh", path.display());
            return Ok(None);
        }
        Err(e) => return Err(e.into()),
    };

    let snapshot: StateSnapshot = serde_json::from_slice(&bytes)?;
    if snapshot.version != SNAPSHOT_VERSION {
        return Err(PersistenceError::UnsupportedVersion(snapshot.version));
    }

    let found = compute_checksum(&snapshot.state)?;
    if found != snapshot.checksum {
        return Err(PersistenceError::ChecksumMismatch {
            expected: snapshot.checksum,
            found,
        });
    }

    let state: DaoState = serde_json::from_value(snapshot.state)?;
    if state.audit.is_empty() {
        warn!("State file {} carries no audit history", path.display());
    }
    info!(
        "Restored state from {} ({} proposals, {} donors, {} audit entries)",
        path.display(),
        state.proposals.len(),
        state.donors.len(),
        state.audit.len()
    );
    Ok(Some(state))
}
