//! In-memory snapshot stores.
//!
//! `MemorySnapshot` backs the JSON file loaders and the test suites.
//! `MemoryConnection` maps store names to `MemorySnapshot`s.

use std::collections::BTreeMap;

use async_trait::async_trait;

use super::{RecordId, RemoteConnection, SnapshotResult, SnapshotSource, StoredRecord};
use crate::domain::error::SnapshotError;
use crate::domain::{Family, FieldRecord, ModelRecord, XmlIdRecord};

/// Record store backed by a `Vec`; a record's id is its position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemorySnapshot {
    records: Vec<StoredRecord>,
}

impl MemorySnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records(records: Vec<StoredRecord>) -> Self {
        Self { records }
    }

    pub fn with_field(mut self, record: FieldRecord) -> Self {
        self.records.push(StoredRecord::Field(record));
        self
    }

    pub fn with_model(mut self, record: ModelRecord) -> Self {
        self.records.push(StoredRecord::Model(record));
        self
    }

    pub fn with_xmlid(mut self, record: XmlIdRecord) -> Self {
        self.records.push(StoredRecord::XmlId(record));
        self
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[async_trait]
impl SnapshotSource for MemorySnapshot {
    async fn field_dump(&self) -> SnapshotResult<Vec<FieldRecord>> {
        Ok(self
            .records
            .iter()
            .filter_map(|record| match record {
                StoredRecord::Field(field) => Some(field.clone()),
                _ => None,
            })
            .collect())
    }

    async fn search(&self, family: Family) -> SnapshotResult<Vec<RecordId>> {
        Ok(self
            .records
            .iter()
            .enumerate()
            .filter(|(_, record)| record.family() == family)
            .map(|(idx, _)| RecordId(idx as u64))
            .collect())
    }

    async fn read(&self, ids: &[RecordId]) -> SnapshotResult<Vec<StoredRecord>> {
        ids.iter()
            .map(|id| {
                usize::try_from(id.0)
                    .ok()
                    .and_then(|idx| self.records.get(idx))
                    .cloned()
                    .ok_or_else(|| SnapshotError::Backend(format!("no record with id {}", id.0)))
            })
            .collect()
    }
}

/// Remote connection serving named in-memory stores.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryConnection {
    stores: BTreeMap<String, MemorySnapshot>,
}

impl MemoryConnection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_store(mut self, name: impl Into<String>, store: MemorySnapshot) -> Self {
        self.stores.insert(name.into(), store);
        self
    }

    pub fn store_names(&self) -> impl Iterator<Item = &str> {
        self.stores.keys().map(String::as_str)
    }
}

impl RemoteConnection for MemoryConnection {
    fn store(&self, name: &str) -> SnapshotResult<&dyn SnapshotSource> {
        self.stores
            .get(name)
            .map(|store| store as &dyn SnapshotSource)
            .ok_or_else(|| SnapshotError::UnknownStore {
                name: name.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::Snapshot;

    fn sample() -> MemorySnapshot {
        MemorySnapshot::new()
            .with_field(FieldRecord::new("sale", "sale.order", "name", "char"))
            .with_model(ModelRecord::new("sale", "sale.order"))
            .with_xmlid(XmlIdRecord::new("sale", "ir.ui.view", "sale.view_order_form"))
    }

    #[tokio::test]
    async fn search_filters_by_family() {
        let store = sample();
        assert_eq!(store.search(Family::Model).await.unwrap(), vec![RecordId(1)]);
        assert_eq!(store.search(Family::XmlId).await.unwrap(), vec![RecordId(2)]);
    }

    #[tokio::test]
    async fn read_unknown_id_fails() {
        let err = sample().read(&[RecordId(9)]).await.unwrap_err();
        assert!(matches!(err, SnapshotError::Backend(_)));
    }

    #[tokio::test]
    async fn capture_splits_families() {
        let snapshot = Snapshot::capture(&sample()).await.unwrap();
        assert_eq!(snapshot.fields.len(), 1);
        assert_eq!(snapshot.models.len(), 1);
        assert_eq!(snapshot.xmlids.len(), 1);
        assert_eq!(snapshot.modules().collect::<Vec<_>>(), vec!["sale"; 3]);
    }

    #[test]
    fn unknown_store_is_an_error() {
        let connection = MemoryConnection::new().with_store("upgrade.record", sample());
        assert!(connection.store("upgrade.record").is_ok());
        assert!(matches!(
            connection.store("openupgrade.record"),
            Err(SnapshotError::UnknownStore { .. })
        ));
    }
}
