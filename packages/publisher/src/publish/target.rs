use std::fmt;

use crate::common::{ContentGroupId, RecordId};
use crate::types::{ContentGroup, ContentRecord, GroupedContent, Platform, SourceType};

/// Identity used to serialize publish attempts: one outstanding publish per key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum GroupKey {
    Group(ContentGroupId),
    /// Standalone content has no group yet, so the record stands in for it
    Record(RecordId),
}

impl GroupKey {
    pub fn for_record(record: &ContentRecord) -> Self {
        match record.group_id() {
            Some(id) => GroupKey::Group(id),
            None => GroupKey::Record(record.id),
        }
    }
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupKey::Group(id) => write!(f, "group:{}", id),
            GroupKey::Record(id) => write!(f, "record:{}", id),
        }
    }
}

/// What is being published: a whole group or one standalone record.
///
/// `Single` is only valid for records outside any group; planning rejects a
/// grouped record. Use `GroupedContent::publish_target` to resolve a record id.
#[derive(Debug, Clone, Copy)]
pub enum PublishTarget<'a> {
    Group(&'a ContentGroup),
    Single(&'a ContentRecord),
}

impl<'a> PublishTarget<'a> {
    pub fn key(&self) -> GroupKey {
        match *self {
            PublishTarget::Group(group) => GroupKey::Group(group.content_group_id()),
            PublishTarget::Single(record) => GroupKey::for_record(record),
        }
    }

    /// Record new platform rows are created from: the group's primary record,
    /// or the standalone record itself.
    pub fn source_record(&self) -> &'a ContentRecord {
        match *self {
            PublishTarget::Group(group) => group.primary(),
            PublishTarget::Single(record) => record,
        }
    }

    pub fn source_type(&self) -> SourceType {
        match *self {
            PublishTarget::Group(_) => SourceType::SocialPost,
            PublishTarget::Single(record) => record.source_type,
        }
    }

    pub fn content_group_id(&self) -> Option<ContentGroupId> {
        match *self {
            PublishTarget::Group(group) => Some(group.content_group_id()),
            PublishTarget::Single(record) => record.group_id(),
        }
    }

    pub fn members(&self) -> &'a [ContentRecord] {
        match *self {
            PublishTarget::Group(group) => group.members(),
            PublishTarget::Single(record) => std::slice::from_ref(record),
        }
    }

    /// Newest record on a platform.
    pub fn member_for(&self, platform: Platform) -> Option<&'a ContentRecord> {
        match *self {
            PublishTarget::Group(group) => group.member_for(platform),
            PublishTarget::Single(record) => (record.platform == platform).then_some(record),
        }
    }

    pub fn is_published_on(&self, platform: Platform) -> bool {
        self.members()
            .iter()
            .any(|m| m.platform == platform && m.published)
    }
}

impl<'a> From<&'a ContentGroup> for PublishTarget<'a> {
    fn from(group: &'a ContentGroup) -> Self {
        PublishTarget::Group(group)
    }
}

impl<'a> From<&'a ContentRecord> for PublishTarget<'a> {
    fn from(record: &'a ContentRecord) -> Self {
        PublishTarget::Single(record)
    }
}

impl GroupedContent {
    /// Publish target for a record: its group if it has one, else the record.
    pub fn publish_target(&self, record_id: RecordId) -> Option<PublishTarget<'_>> {
        if let Some(group) = self.group_of(record_id) {
            return Some(PublishTarget::Group(group));
        }
        self.find_standalone(record_id).map(PublishTarget::Single)
    }
}
