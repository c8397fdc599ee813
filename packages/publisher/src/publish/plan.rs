use std::collections::{BTreeMap, BTreeSet};

use super::target::{GroupKey, PublishTarget};
use crate::common::{ContentGroupId, RecordId};
use crate::error::ValidationError;
use crate::types::{Platform, PlatformRules};

/// What a publish would do, computed without touching any service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishPlan {
    pub key: GroupKey,
    /// Record missing platform rows are created from
    pub source_record_id: RecordId,
    pub content_group_id: Option<ContentGroupId>,
    /// Requested but already live; never sent again
    pub already_published: Vec<Platform>,
    /// Platforms with an unpublished record ready to go
    pub existing: BTreeMap<Platform, RecordId>,
    /// Platforms that need a new row first
    pub missing: Vec<Platform>,
}

impl PublishPlan {
    /// Platforms the command will carry, in display order.
    pub fn platforms_to_publish(&self) -> Vec<Platform> {
        let mut platforms: Vec<Platform> = self
            .existing
            .keys()
            .copied()
            .chain(self.missing.iter().copied())
            .collect();
        platforms.sort();
        platforms
    }
}

/// Validate a request and split it into already-published, existing and
/// missing platforms.
///
/// An empty request, or one where every platform is already published, is
/// `NoPlatformsSelected`. A single target must not belong to a group: only
/// the group sees every sibling's publish state.
pub fn plan(
    target: PublishTarget<'_>,
    requested: &BTreeSet<Platform>,
    rules: &PlatformRules,
) -> Result<PublishPlan, ValidationError> {
    if let PublishTarget::Single(record) = target {
        if let Some(content_group_id) = record.group_id() {
            return Err(ValidationError::GroupedRecord {
                record_id: record.id,
                content_group_id,
            });
        }
    }

    if requested.is_empty() {
        return Err(ValidationError::NoPlatformsSelected);
    }

    let source_type = target.source_type();
    for platform in requested {
        if !platform.is_publishable() {
            return Err(ValidationError::UnpublishablePlatform(*platform));
        }
        if !rules.allows(source_type, *platform) {
            return Err(ValidationError::PlatformNotAllowed {
                platform: *platform,
                source_type,
            });
        }
    }

    let mut already_published = Vec::new();
    let mut existing = BTreeMap::new();
    let mut missing = Vec::new();

    for platform in requested.iter().copied() {
        if target.is_published_on(platform) {
            already_published.push(platform);
        } else if let Some(record) = target.member_for(platform) {
            existing.insert(platform, record.id);
        } else {
            missing.push(platform);
        }
    }

    if existing.is_empty() && missing.is_empty() {
        return Err(ValidationError::NoPlatformsSelected);
    }

    Ok(PublishPlan {
        key: target.key(),
        source_record_id: target.source_record().id,
        content_group_id: target.content_group_id(),
        already_published,
        existing,
        missing,
    })
}
