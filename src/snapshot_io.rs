//! Reading snapshots and the healing history from disk

use std::path::Path;

use dom_snapshot::Snapshot;
use locator_heal::{HistoryRecord, InMemoryHealingHistory};
use tokio::fs;
use tracing::debug;

use crate::errors::AppError;

pub async fn load_snapshot(path: &Path) -> Result<Snapshot, AppError> {
    let raw = fs::read_to_string(path)
        .await
        .map_err(|source| AppError::Read {
            path: path.to_path_buf(),
            source,
        })?;
    let snapshot = Snapshot::from_json(&raw).map_err(|source| AppError::Snapshot {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(path = %path.display(), url = %snapshot.url, "loaded snapshot");
    Ok(snapshot)
}

/// A missing file is an empty history.
pub async fn load_history(path: &Path) -> Result<InMemoryHealingHistory, AppError> {
    if !fs::try_exists(path).await.unwrap_or(false) {
        return Ok(InMemoryHealingHistory::new());
    }
    let raw = fs::read_to_string(path)
        .await
        .map_err(|source| AppError::Read {
            path: path.to_path_buf(),
            source,
        })?;
    if raw.trim().is_empty() {
        return Ok(InMemoryHealingHistory::new());
    }
    let records: Vec<HistoryRecord> = serde_json::from_str(&raw)?;
    debug!(path = %path.display(), entries = records.len(), "loaded healing history");
    Ok(InMemoryHealingHistory::from_records(records))
}

pub async fn save_history(path: &Path, history: &InMemoryHealingHistory) -> Result<(), AppError> {
    let write_err = |source| AppError::Write {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).await.map_err(write_err)?;
    }
    let serialized = serde_json::to_string_pretty(&history.records())?;
    fs::write(path, serialized).await.map_err(write_err)?;
    Ok(())
}
