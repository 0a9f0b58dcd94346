//! Persistence of the acceleration record.
//!
//! One pretty-printed JSON file in the working directory, written only
//! on non-dry-run apply/restore and read back verbatim to drive a later
//! restore or status query. Single-writer, last-write-wins; concurrent
//! invocations on the same directory are unsupported.

use std::path::Path;

use chrono::Utc;
use tracing::debug;

use crate::error::AccelError;
use crate::model::AccelerationRecord;

pub const STATE_FILE_NAME: &str = ".accelctl_state.json";

/// RFC 3339 UTC timestamp for payloads.
pub fn utc_now() -> String {
    Utc::now().to_rfc3339()
}

/// Load the persisted record, or None when no pass has been saved yet.
/// A present-but-corrupt file is an error: the record drives mutating
/// restores and must not be silently defaulted.
pub fn load(dir: &Path) -> Result<Option<AccelerationRecord>, AccelError> {
    let path = dir.join(STATE_FILE_NAME);
    if !path.exists() {
        return Ok(None);
    }
    let text = std::fs::read_to_string(&path).map_err(|source| AccelError::StateRead {
        path: path.clone(),
        source,
    })?;
    let record = serde_json::from_str(&text)
        .map_err(|source| AccelError::StateParse { path, source })?;
    Ok(Some(record))
}

pub fn save(record: &AccelerationRecord, dir: &Path) -> Result<(), AccelError> {
    let path = dir.join(STATE_FILE_NAME);
    let json = serde_json::to_string_pretty(record).map_err(|source| AccelError::StateParse {
        path: path.clone(),
        source,
    })?;
    std::fs::write(&path, json).map_err(|source| AccelError::StateWrite {
        path: path.clone(),
        source,
    })?;
    debug!(path = %path.display(), "saved acceleration record");
    Ok(())
}
