//! Partition a record snapshot into content groups and standalone items.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use tracing::warn;

use crate::common::ContentGroupId;
use crate::types::record::newest_first;
use crate::types::{ContentGroup, ContentRecord, GroupedContent};

/// Group a snapshot.
///
/// Discarded records are dropped. A record is standalone when it has no
/// `content_group_id` or is not a social post; every other record joins the
/// group for its id. Groups come back newest primary first, standalone items
/// newest first. The result depends only on the input contents, not its order.
pub fn group(records: &[ContentRecord]) -> GroupedContent {
    let mut buckets: BTreeMap<ContentGroupId, Vec<ContentRecord>> = BTreeMap::new();
    let mut standalone = Vec::new();

    for record in records.iter().filter(|r| !r.discard) {
        match record.group_id() {
            Some(id) => buckets.entry(id).or_default().push(record.clone()),
            None => standalone.push(record.clone()),
        }
    }

    let mut groups: Vec<ContentGroup> = buckets
        .into_iter()
        .filter_map(|(id, members)| ContentGroup::from_members(id, members))
        .collect();

    for group in groups.iter().filter(|g| g.has_duplicate_platforms()) {
        warn!(
            content_group_id = %group.content_group_id(),
            platforms = ?group.platforms(),
            members = group.len(),
            "Content group has more than one record for a platform"
        );
    }

    groups.sort_by(newest_group_first);
    standalone.sort_by(newest_first);

    GroupedContent { groups, standalone }
}

fn newest_group_first(a: &ContentGroup, b: &ContentGroup) -> Ordering {
    newest_first(a.primary(), b.primary())
        .then_with(|| b.content_group_id().cmp(&a.content_group_id()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::UserId;
    use crate::types::{Platform, SourceType};
    use chrono::{Duration, Utc};

    fn post(group: Option<ContentGroupId>, platform: Platform, minutes_ago: i64) -> ContentRecord {
        let record = ContentRecord::builder()
            .user_id(UserId::nil())
            .platform(platform)
            .created_at(Utc::now() - Duration::minutes(minutes_ago))
            .build();
        ContentRecord {
            content_group_id: group,
            ..record
        }
    }

    #[test]
    fn empty_input_groups_to_nothing() {
        let grouped = group(&[]);
        assert!(grouped.is_empty());
    }

    #[test]
    fn splits_groups_from_standalone() {
        let g1 = ContentGroupId::new();
        let g2 = ContentGroupId::new();
        let records = vec![
            post(Some(g1), Platform::Facebook, 10),
            post(Some(g1), Platform::Instagram, 9),
            post(Some(g2), Platform::LinkedIn, 1),
            post(None, Platform::Facebook, 3),
        ];

        let grouped = group(&records);

        assert_eq!(grouped.groups.len(), 2);
        assert_eq!(grouped.standalone.len(), 1);
        // g2's primary is newer, so it comes first
        assert_eq!(grouped.groups[0].content_group_id(), g2);
        assert_eq!(grouped.groups[1].len(), 2);
    }

    #[test]
    fn images_with_group_id_stay_standalone() {
        let g = ContentGroupId::new();
        let mut image = post(Some(g), Platform::None, 1);
        image.source_type = SourceType::StandaloneImage;
        let mut video = post(Some(g), Platform::TikTok, 2);
        video.source_type = SourceType::Video;

        let grouped = group(&[image, video]);
        assert!(grouped.groups.is_empty());
        assert_eq!(grouped.standalone.len(), 2);
    }

    #[test]
    fn discarded_records_vanish() {
        let g = ContentGroupId::new();
        let mut gone = post(Some(g), Platform::Facebook, 1);
        gone.discard = true;
        let mut gone_standalone = post(None, Platform::Facebook, 1);
        gone_standalone.discard = true;
        let kept = post(Some(g), Platform::Instagram, 5);

        let grouped = group(&[gone, gone_standalone, kept.clone()]);
        assert_eq!(grouped.groups.len(), 1);
        assert_eq!(grouped.groups[0].members(), &[kept]);
        assert!(grouped.standalone.is_empty());
    }

    #[test]
    fn single_member_group_keeps_its_id() {
        let g = ContentGroupId::new();
        let grouped = group(&[post(Some(g), Platform::Facebook, 1)]);
        assert_eq!(grouped.groups.len(), 1);
        assert_eq!(grouped.groups[0].content_group_id(), g);
        assert!(grouped.standalone.is_empty());
    }

    #[test]
    fn standalone_sorted_newest_first() {
        let old = post(None, Platform::Facebook, 30);
        let new = post(None, Platform::Instagram, 1);
        let mid = post(None, Platform::LinkedIn, 10);

        let grouped = group(&[old.clone(), new.clone(), mid.clone()]);
        let ids: Vec<_> = grouped.standalone.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![new.id, mid.id, old.id]);
    }

    #[test]
    fn input_order_does_not_matter() {
        let g = ContentGroupId::new();
        let records = vec![
            post(Some(g), Platform::TikTok, 4),
            post(Some(g), Platform::Facebook, 2),
            post(None, Platform::Instagram, 3),
        ];
        let mut reversed = records.clone();
        reversed.reverse();

        assert_eq!(group(&records), group(&reversed));
    }

    #[test]
    fn derivatives_follow_parent_links() {
        let image = post(None, Platform::None, 10);
        let mut video = post(None, Platform::TikTok, 1);
        video.source_type = SourceType::Video;
        video.parent_post_id = Some(image.id);

        let grouped = group(&[image.clone(), video.clone()]);
        let derived = grouped.derivatives_of(image.id);
        assert_eq!(derived.len(), 1);
        assert_eq!(derived[0].id, video.id);
    }
}
