use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use typed_builder::TypedBuilder;

use super::platform::{Platform, RecordStatus, SourceType};
use crate::common::{ContentGroupId, RecordId, UserId};

/// One generated post, image or video, targeting a single platform.
///
/// Records are owned by the record store. The publish fields (`published_at`,
/// `platform_post_id`, `platform_post_url`) are only ever set by the external
/// process that confirms a post went live.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TypedBuilder)]
#[builder(field_defaults(setter(into)))]
pub struct ContentRecord {
    #[builder(default)]
    pub id: RecordId,
    pub user_id: UserId,

    // Grouping
    #[builder(default, setter(strip_option))]
    pub content_group_id: Option<ContentGroupId>,
    #[builder(default = SourceType::SocialPost)]
    pub source_type: SourceType,
    #[builder(default = Platform::None)]
    pub platform: Platform,

    // Publish state
    #[builder(default)]
    pub status: RecordStatus,
    #[builder(default)]
    pub published: bool,
    #[builder(default, setter(strip_option))]
    pub published_at: Option<DateTime<Utc>>,
    #[builder(default, setter(strip_option))]
    pub platform_post_id: Option<String>,
    #[builder(default, setter(strip_option))]
    pub platform_post_url: Option<String>,

    // Soft delete
    #[serde(default)]
    #[builder(default)]
    pub discard: bool,

    /// Source image of a derived record (e.g. an animated video)
    #[builder(default, setter(strip_option))]
    pub parent_post_id: Option<RecordId>,

    #[builder(default = Utc::now())]
    pub created_at: DateTime<Utc>,
}

impl ContentRecord {
    /// Whether this record takes part in a content group.
    ///
    /// Only social posts with a group id are grouped; images and videos are
    /// always standalone whatever their `content_group_id` says.
    pub fn is_groupable(&self) -> bool {
        !self.discard && self.source_type == SourceType::SocialPost && self.content_group_id.is_some()
    }

    /// Group this record belongs to, if it is groupable.
    pub fn group_id(&self) -> Option<ContentGroupId> {
        if self.is_groupable() {
            self.content_group_id
        } else {
            None
        }
    }
}

/// Newest first; equal timestamps fall back to the greater id.
pub(crate) fn newest_first(a: &ContentRecord, b: &ContentRecord) -> Ordering {
    b.created_at
        .cmp(&a.created_at)
        .then_with(|| b.id.cmp(&a.id))
}
