//! JSON snapshot documents on disk.
//!
//! Local document: `{"records": [...]}`.
//! Remote document: `{"stores": {"<store name>": [...]}}`.
//! Records are tagged by `"type"`: `field`, `model` or `xmlid`.

use std::collections::BTreeMap;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::memory::{MemoryConnection, MemorySnapshot};
use super::{SnapshotResult, StoredRecord};
use crate::domain::error::SnapshotError;

/// Records of a single store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotDocument {
    #[serde(default)]
    pub records: Vec<StoredRecord>,
}

/// Records of a remote system, keyed by store name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteDocument {
    #[serde(default)]
    pub stores: BTreeMap<String, Vec<StoredRecord>>,
}

fn read_json<T: DeserializeOwned>(path: &Path) -> SnapshotResult<T> {
    let raw = std::fs::read_to_string(path).map_err(|source| SnapshotError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| SnapshotError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Load a local snapshot document.
pub fn load_local(path: &Path) -> SnapshotResult<MemorySnapshot> {
    let doc: SnapshotDocument = read_json(path)?;
    tracing::debug!(path = %path.display(), records = doc.records.len(), "local snapshot loaded");
    Ok(MemorySnapshot::from_records(doc.records))
}

/// Load a remote snapshot document as a connection over its stores.
pub fn load_remote(path: &Path) -> SnapshotResult<MemoryConnection> {
    let doc: RemoteDocument = read_json(path)?;
    tracing::debug!(path = %path.display(), stores = doc.stores.len(), "remote snapshot loaded");
    Ok(doc
        .stores
        .into_iter()
        .fold(MemoryConnection::new(), |conn, (name, records)| {
            conn.with_store(name, MemorySnapshot::from_records(records))
        }))
}
