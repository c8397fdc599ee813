use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::common::{RecordId, UserId};
use crate::error::StoreResult;
use crate::types::{ContentRecord, Platform, RecordStatus};

/// Read side of the record store plus the one mutation the dashboard models.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Non-discarded records of a user matching `filter`, newest first.
    async fn fetch_records(
        &self,
        user_id: UserId,
        filter: &RecordFilter,
    ) -> StoreResult<Vec<ContentRecord>>;

    /// Soft-delete a record. Discarding twice is a no-op.
    async fn discard(&self, user_id: UserId, record_id: RecordId) -> StoreResult<()>;
}

/// Narrows a record query. The default matches everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordFilter {
    /// Created at or after
    pub from: Option<DateTime<Utc>>,
    /// Created strictly before
    pub to: Option<DateTime<Utc>>,
    /// Empty = all platforms
    #[serde(default)]
    pub platforms: Vec<Platform>,
    /// Empty = all statuses
    #[serde(default)]
    pub statuses: Vec<RecordStatus>,
}

impl RecordFilter {
    /// Filter that matches every record (the all-time query).
    pub fn all() -> Self {
        Self::default()
    }

    pub fn between(from: DateTime<Utc>, to: DateTime<Utc>) -> Self {
        Self {
            from: Some(from),
            to: Some(to),
            ..Self::default()
        }
    }

    pub fn with_platforms(mut self, platforms: impl IntoIterator<Item = Platform>) -> Self {
        self.platforms = platforms.into_iter().collect();
        self
    }

    pub fn with_statuses(mut self, statuses: impl IntoIterator<Item = RecordStatus>) -> Self {
        self.statuses = statuses.into_iter().collect();
        self
    }

    pub fn is_unfiltered(&self) -> bool {
        *self == Self::default()
    }

    /// Whether a record passes this filter. Discard is not considered here.
    pub fn matches(&self, record: &ContentRecord) -> bool {
        if self.from.is_some_and(|from| record.created_at < from) {
            return false;
        }
        if self.to.is_some_and(|to| record.created_at >= to) {
            return false;
        }
        if !self.platforms.is_empty() && !self.platforms.contains(&record.platform) {
            return false;
        }
        if !self.statuses.is_empty() && !self.statuses.contains(&record.status) {
            return false;
        }
        true
    }
}
