//! Record and orchestrator fixtures shared by the integration tests.

use chrono::{Duration, Utc};
use std::collections::BTreeSet;
use std::sync::Arc;

use publisher_core::testing::{MockAutomationEndpoint, MockRowCreationService};
use publisher_core::{
    ContentGroupId, ContentRecord, Platform, PublishOrchestrator, SourceType, UserId,
};

/// A social post belonging to `group`, created `minutes_ago` minutes ago.
pub fn group_member(
    user: UserId,
    group: ContentGroupId,
    platform: Platform,
    published: bool,
    minutes_ago: i64,
) -> ContentRecord {
    ContentRecord::builder()
        .user_id(user)
        .content_group_id(group)
        .platform(platform)
        .published(published)
        .created_at(Utc::now() - Duration::minutes(minutes_ago))
        .build()
}

/// A plain generated image, not part of any group.
pub fn standalone_image(user: UserId) -> ContentRecord {
    ContentRecord::builder()
        .user_id(user)
        .source_type(SourceType::StandaloneImage)
        .build()
}

pub fn platforms(list: &[Platform]) -> BTreeSet<Platform> {
    list.iter().copied().collect()
}

/// Orchestrator wired to shared mocks so tests can inspect calls afterwards.
pub fn orchestrator(
    rows: &Arc<MockRowCreationService>,
    automation: &Arc<MockAutomationEndpoint>,
) -> PublishOrchestrator {
    PublishOrchestrator::new(rows.clone(), automation.clone())
}
