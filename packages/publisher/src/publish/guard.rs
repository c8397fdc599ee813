//! Per-group "publish in flight" tracking.
//!
//! Two publishes of the same group must never overlap: both would see the same
//! missing platforms and each would ask for new rows. The registry hands out at
//! most one permit per `GroupKey`; the permit releases the key on drop, so a
//! cancelled or panicking publish cannot leave a group locked.

use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::Arc;

use super::target::GroupKey;

#[derive(Clone, Default)]
pub struct InFlightRegistry {
    entries: Arc<DashMap<GroupKey, DateTime<Utc>>>,
}

impl InFlightRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim `key`. Returns `None` while another permit for it is alive.
    pub fn try_acquire(&self, key: GroupKey) -> Option<PublishPermit> {
        match self.entries.entry(key) {
            Entry::Occupied(_) => None,
            Entry::Vacant(slot) => {
                slot.insert(Utc::now());
                Some(PublishPermit {
                    registry: self.clone(),
                    key,
                })
            }
        }
    }

    pub fn is_in_flight(&self, key: &GroupKey) -> bool {
        self.entries.contains_key(key)
    }

    /// When the current publish for `key` started.
    pub fn started_at(&self, key: &GroupKey) -> Option<DateTime<Utc>> {
        self.entries.get(key).map(|entry| *entry.value())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// RAII claim on one group. Dropping it frees the group for the next publish.
pub struct PublishPermit {
    registry: InFlightRegistry,
    key: GroupKey,
}

impl PublishPermit {
    pub fn key(&self) -> GroupKey {
        self.key
    }
}

impl Drop for PublishPermit {
    fn drop(&mut self) {
        self.registry.entries.remove(&self.key);
    }
}

impl std::fmt::Debug for PublishPermit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PublishPermit").field("key", &self.key).finish()
    }
}
