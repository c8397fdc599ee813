use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::platform::{Platform, PlatformRules, RecordStatus, SourceType};
use super::record::{newest_first, ContentRecord};
use crate::common::{ContentGroupId, RecordId};

/// Publish state of one platform inside a group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum PublishState {
    /// Confirmed live by the platform
    Published {
        record_id: RecordId,
        url: Option<String>,
    },
    /// The platform reported a failure for the last attempt
    Failed { record_id: RecordId },
    /// A record exists but has not been published yet
    Pending { record_id: RecordId },
}

impl PublishState {
    fn of(record: &ContentRecord) -> Self {
        if record.published {
            PublishState::Published {
                record_id: record.id,
                url: record.platform_post_url.clone(),
            }
        } else if record.status == RecordStatus::Failed {
            PublishState::Failed {
                record_id: record.id,
            }
        } else {
            PublishState::Pending {
                record_id: record.id,
            }
        }
    }

    pub fn record_id(&self) -> RecordId {
        match self {
            PublishState::Published { record_id, .. }
            | PublishState::Failed { record_id }
            | PublishState::Pending { record_id } => *record_id,
        }
    }

    pub fn is_published(&self) -> bool {
        matches!(self, PublishState::Published { .. })
    }
}

/// One logical piece of content spread over several platform records.
///
/// Members are held in platform order (newest first within a platform). The
/// primary record is the most recently created member.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContentGroup {
    content_group_id: ContentGroupId,
    members: Vec<ContentRecord>,
    primary_record_id: RecordId,
    #[serde(skip)]
    primary: usize,
    all_published: bool,
    any_published: bool,
}

impl ContentGroup {
    /// Build a group from its members. Returns `None` when `members` is empty.
    pub fn from_members(
        content_group_id: ContentGroupId,
        mut members: Vec<ContentRecord>,
    ) -> Option<Self> {
        members.sort_by(|a, b| a.platform.cmp(&b.platform).then_with(|| newest_first(a, b)));

        let primary = members
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| newest_first(a, b))
            .map(|(index, _)| index)?;

        let primary_record_id = members[primary].id;
        let all_published = members.iter().all(|m| m.published);
        let any_published = members.iter().any(|m| m.published);

        Some(Self {
            content_group_id,
            members,
            primary_record_id,
            primary,
            all_published,
            any_published,
        })
    }

    pub fn content_group_id(&self) -> ContentGroupId {
        self.content_group_id
    }

    pub fn members(&self) -> &[ContentRecord] {
        &self.members
    }

    pub fn primary(&self) -> &ContentRecord {
        &self.members[self.primary]
    }

    pub fn primary_record_id(&self) -> RecordId {
        self.primary_record_id
    }

    pub fn all_published(&self) -> bool {
        self.all_published
    }

    pub fn any_published(&self) -> bool {
        self.any_published
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Newest member on a platform.
    pub fn member_for(&self, platform: Platform) -> Option<&ContentRecord> {
        self.members.iter().find(|m| m.platform == platform)
    }

    /// True if any member on this platform is published.
    pub fn is_published_on(&self, platform: Platform) -> bool {
        self.members
            .iter()
            .any(|m| m.platform == platform && m.published)
    }

    /// Distinct platforms present, in display order.
    pub fn platforms(&self) -> Vec<Platform> {
        let mut platforms: Vec<Platform> = self.members.iter().map(|m| m.platform).collect();
        platforms.dedup();
        platforms
    }

    /// Per-platform publish state. A published member always wins over a newer
    /// unpublished one on the same platform.
    pub fn publish_states(&self) -> BTreeMap<Platform, PublishState> {
        let mut states = BTreeMap::new();
        for platform in self.platforms() {
            let state = self
                .members
                .iter()
                .find(|m| m.platform == platform && m.published)
                .or_else(|| self.member_for(platform))
                .map(PublishState::of);
            if let Some(state) = state {
                states.insert(platform, state);
            }
        }
        states
    }

    /// Platforms a user can still pick for this group.
    pub fn selectable_platforms(&self, rules: &PlatformRules) -> Vec<Platform> {
        rules
            .allowed(SourceType::SocialPost)
            .into_iter()
            .filter(|p| !self.is_published_on(*p))
            .collect()
    }

    pub(crate) fn has_duplicate_platforms(&self) -> bool {
        self.platforms().len() != self.members.len()
    }
}

/// Output of grouping a record snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GroupedContent {
    /// Newest primary record first
    pub groups: Vec<ContentGroup>,
    /// Newest first
    pub standalone: Vec<ContentRecord>,
}

impl GroupedContent {
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty() && self.standalone.is_empty()
    }

    /// Every record, grouped ones first.
    pub fn records(&self) -> impl Iterator<Item = &ContentRecord> {
        self.groups
            .iter()
            .flat_map(|g| g.members().iter())
            .chain(self.standalone.iter())
    }

    pub fn find_group(&self, id: ContentGroupId) -> Option<&ContentGroup> {
        self.groups.iter().find(|g| g.content_group_id() == id)
    }

    /// Group containing a record, if the record is grouped.
    pub fn group_of(&self, record_id: RecordId) -> Option<&ContentGroup> {
        self.groups
            .iter()
            .find(|g| g.members().iter().any(|m| m.id == record_id))
    }

    pub fn find_standalone(&self, record_id: RecordId) -> Option<&ContentRecord> {
        self.standalone.iter().find(|r| r.id == record_id)
    }

    /// Records derived from another record (e.g. the video made from an image).
    pub fn derivatives_of(&self, record_id: RecordId) -> Vec<&ContentRecord> {
        self.records()
            .filter(|r| r.parent_post_id == Some(record_id))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::UserId;
    use chrono::{Duration, Utc};

    fn member(group: ContentGroupId, platform: Platform, minutes_ago: i64) -> ContentRecord {
        ContentRecord::builder()
            .user_id(UserId::nil())
            .content_group_id(group)
            .platform(platform)
            .created_at(Utc::now() - Duration::minutes(minutes_ago))
            .build()
    }

    #[test]
    fn empty_members_yield_no_group() {
        assert!(ContentGroup::from_members(ContentGroupId::new(), vec![]).is_none());
    }

    #[test]
    fn members_sorted_by_platform_and_primary_is_newest() {
        let id = ContentGroupId::new();
        let tiktok = member(id, Platform::TikTok, 1);
        let facebook = member(id, Platform::Facebook, 10);
        let linkedin = member(id, Platform::LinkedIn, 5);

        let group =
            ContentGroup::from_members(id, vec![tiktok.clone(), facebook, linkedin]).unwrap();

        assert_eq!(
            group.platforms(),
            vec![Platform::Facebook, Platform::LinkedIn, Platform::TikTok]
        );
        assert_eq!(group.primary().id, tiktok.id);
    }

    #[test]
    fn published_flags() {
        let id = ContentGroupId::new();
        let mut fb = member(id, Platform::Facebook, 2);
        fb.published = true;
        let ig = member(id, Platform::Instagram, 1);

        let group = ContentGroup::from_members(id, vec![fb.clone(), ig.clone()]).unwrap();
        assert!(group.any_published());
        assert!(!group.all_published());

        let mut ig_done = ig;
        ig_done.published = true;
        let group = ContentGroup::from_members(id, vec![fb, ig_done]).unwrap();
        assert!(group.all_published());
    }

    #[test]
    fn publish_states_prefer_published_duplicate() {
        let id = ContentGroupId::new();
        let mut old_fb = member(id, Platform::Facebook, 30);
        old_fb.published = true;
        old_fb.platform_post_url = Some("https://facebook.com/p/1".to_string());
        let new_fb = member(id, Platform::Facebook, 1);
        let mut ig = member(id, Platform::Instagram, 5);
        ig.status = RecordStatus::Failed;

        let group =
            ContentGroup::from_members(id, vec![new_fb.clone(), old_fb.clone(), ig.clone()])
                .unwrap();
        assert!(group.has_duplicate_platforms());
        assert_eq!(group.member_for(Platform::Facebook).unwrap().id, new_fb.id);

        let states = group.publish_states();
        assert_eq!(
            states[&Platform::Facebook],
            PublishState::Published {
                record_id: old_fb.id,
                url: Some("https://facebook.com/p/1".to_string()),
            }
        );
        assert_eq!(
            states[&Platform::Instagram],
            PublishState::Failed { record_id: ig.id }
        );
    }

    #[test]
    fn selectable_platforms_skip_published() {
        let id = ContentGroupId::new();
        let mut fb = member(id, Platform::Facebook, 2);
        fb.published = true;
        let group = ContentGroup::from_members(id, vec![fb]).unwrap();

        assert_eq!(
            group.selectable_platforms(&PlatformRules::default()),
            vec![Platform::Instagram, Platform::LinkedIn, Platform::TikTok]
        );
    }
}
