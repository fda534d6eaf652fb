//! Snapshot collaborator abstractions.
//!
//! These traits describe where the two snapshots come from:
//! - `SnapshotSource`: one record store (`field_dump`, `search`, `read`)
//! - `RemoteConnection`: the pre-upgrade system, exposing stores by name
//!
//! In-memory implementations live in `memory`, JSON file loaders in `file`,
//! and the version-dependent choice of remote store in `shim`.

pub mod file;
pub mod memory;
pub mod shim;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::error::SnapshotError;
use crate::domain::{Family, FieldRecord, ModelRecord, XmlIdRecord};

/// Result type for snapshot operations.
pub type SnapshotResult<T> = std::result::Result<T, SnapshotError>;

/// Opaque handle of one stored record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RecordId(pub u64);

/// A record as persisted by a store, tagged with its family.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StoredRecord {
    Field(FieldRecord),
    Model(ModelRecord),
    #[serde(rename = "xmlid")]
    XmlId(XmlIdRecord),
}

impl StoredRecord {
    pub fn family(&self) -> Family {
        match self {
            StoredRecord::Field(_) => Family::Field,
            StoredRecord::Model(_) => Family::Model,
            StoredRecord::XmlId(_) => Family::XmlId,
        }
    }
}

/// A store of snapshot records.
#[async_trait]
pub trait SnapshotSource: Send + Sync {
    /// Every field record of the store.
    async fn field_dump(&self) -> SnapshotResult<Vec<FieldRecord>>;

    /// Handles of all records of `family`.
    async fn search(&self, family: Family) -> SnapshotResult<Vec<RecordId>>;

    /// Records behind `ids`, in the order given.
    async fn read(&self, ids: &[RecordId]) -> SnapshotResult<Vec<StoredRecord>>;
}

/// The pre-upgrade system, which may expose several record stores.
pub trait RemoteConnection: Send + Sync {
    fn store(&self, name: &str) -> SnapshotResult<&dyn SnapshotSource>;
}

/// All three families captured from one source.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    pub fields: Vec<FieldRecord>,
    pub models: Vec<ModelRecord>,
    pub xmlids: Vec<XmlIdRecord>,
}

impl Snapshot {
    /// Fetch fields via `field_dump`, models and xml ids via `search` + `read`.
    pub async fn capture(source: &dyn SnapshotSource) -> SnapshotResult<Self> {
        let fields = source.field_dump().await?;
        let models = read_family(source, Family::Model, |record| match record {
            StoredRecord::Model(model) => Ok(model),
            other => Err(other.family()),
        })
        .await?;
        let xmlids = read_family(source, Family::XmlId, |record| match record {
            StoredRecord::XmlId(xmlid) => Ok(xmlid),
            other => Err(other.family()),
        })
        .await?;
        Ok(Self {
            fields,
            models,
            xmlids,
        })
    }

    /// Raw owning modules of every record.
    pub fn modules(&self) -> impl Iterator<Item = &str> {
        self.fields
            .iter()
            .map(|r| r.module.as_str())
            .chain(self.models.iter().map(|r| r.module.as_str()))
            .chain(self.xmlids.iter().map(|r| r.module.as_str()))
    }
}

async fn read_family<T>(
    source: &dyn SnapshotSource,
    family: Family,
    extract: impl Fn(StoredRecord) -> Result<T, Family>,
) -> SnapshotResult<Vec<T>> {
    let ids = source.search(family).await?;
    source
        .read(&ids)
        .await?
        .into_iter()
        .map(|record| {
            extract(record).map_err(|found| SnapshotError::FamilyMismatch {
                expected: family,
                found,
            })
        })
        .collect()
}
