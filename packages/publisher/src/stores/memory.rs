//! In-memory record store for tests, demos and the snapshot report.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::common::{RecordId, UserId};
use crate::error::{StoreError, StoreResult};
use crate::traits::{RecordFilter, RecordStore};
use crate::types::record::newest_first;
use crate::types::ContentRecord;

#[derive(Default)]
pub struct MemoryRecordStore {
    records: RwLock<HashMap<RecordId, ContentRecord>>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: impl IntoIterator<Item = ContentRecord>) -> Self {
        let store = Self::new();
        store.insert_many(records);
        store
    }

    /// Insert or replace a record.
    pub fn insert(&self, record: ContentRecord) {
        self.write().insert(record.id, record);
    }

    pub fn insert_many(&self, records: impl IntoIterator<Item = ContentRecord>) {
        let mut map = self.write();
        for record in records {
            map.insert(record.id, record);
        }
    }

    /// Mutate a stored record in place. Stands in for the collaborators that
    /// write publish results back (automation, webhooks).
    pub fn update<F>(&self, id: RecordId, f: F) -> StoreResult<()>
    where
        F: FnOnce(&mut ContentRecord),
    {
        let mut map = self.write();
        let record = map.get_mut(&id).ok_or(StoreError::NotFound { id })?;
        f(record);
        Ok(())
    }

    pub fn get(&self, id: RecordId) -> Option<ContentRecord> {
        self.read().get(&id).cloned()
    }

    /// Every stored record including discarded ones, newest first.
    pub fn snapshot(&self) -> Vec<ContentRecord> {
        let mut records: Vec<ContentRecord> = self.read().values().cloned().collect();
        records.sort_by(newest_first);
        records
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    // A panic while holding the lock leaves the map itself intact.
    fn read(&self) -> RwLockReadGuard<'_, HashMap<RecordId, ContentRecord>> {
        self.records.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<RecordId, ContentRecord>> {
        self.records.write().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn fetch_records(
        &self,
        user_id: UserId,
        filter: &RecordFilter,
    ) -> StoreResult<Vec<ContentRecord>> {
        let mut records: Vec<ContentRecord> = self
            .read()
            .values()
            .filter(|r| r.user_id == user_id && !r.discard && filter.matches(r))
            .cloned()
            .collect();
        records.sort_by(newest_first);
        Ok(records)
    }

    async fn discard(&self, user_id: UserId, record_id: RecordId) -> StoreResult<()> {
        let mut map = self.write();
        match map.get_mut(&record_id) {
            Some(record) if record.user_id == user_id => {
                record.discard = true;
                Ok(())
            }
            _ => Err(StoreError::NotFound { id: record_id }),
        }
    }
}
