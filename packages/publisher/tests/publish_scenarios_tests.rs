//! End-to-end publish behaviour against mocked services.

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::*;
use publisher_core::testing::{MockAutomationEndpoint, MockRowCreationService};
use publisher_core::{
    group, ContentGroupId, ContentRecord, GroupKey, OrchestratorConfig, Platform, PublishResult,
    PublishTarget, UserId, ValidationError,
};

#[tokio::test]
async fn mixed_group_publishes_existing_and_creates_missing() {
    let user = UserId::new();
    let g = ContentGroupId::new();
    let fb = group_member(user, g, Platform::Facebook, true, 10);
    let ig = group_member(user, g, Platform::Instagram, false, 5);
    let view = group(&[fb.clone(), ig.clone()]);
    let target = PublishTarget::Group(&view.groups[0]);

    let rows = Arc::new(MockRowCreationService::new().reporting_group(g));
    let automation = Arc::new(MockAutomationEndpoint::new());
    let orchestrator = orchestrator(&rows, &automation);

    let result = orchestrator
        .publish(
            target,
            &platforms(&[Platform::Facebook, Platform::Instagram, Platform::TikTok]),
            user,
        )
        .await;

    let receipt = result.receipt().expect("publish should be accepted");

    // One row creation call, for TikTok only, sourced from the primary record
    let calls = rows.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].platforms, vec![Platform::TikTok]);
    assert_eq!(calls[0].source_record_id, ig.id);

    // Exactly one command referencing Instagram's record and the new TikTok row
    assert_eq!(automation.call_count(), 1);
    let command = automation.last_command().unwrap();
    let tiktok_id = rows.created_ids()[0];
    assert_eq!(command.len(), 2);
    assert_eq!(command.record_for(Platform::Instagram), Some(ig.id));
    assert_eq!(command.record_for(Platform::TikTok), Some(tiktok_id));
    assert_eq!(command.record_for(Platform::Facebook), None);
    assert_eq!(command.user_id, user);

    assert_eq!(receipt.skipped_published, vec![Platform::Facebook]);
    assert_eq!(receipt.content_group_id, Some(g));
    assert_eq!(receipt.created_rows.len(), 1);
    assert!(orchestrator.in_flight().is_empty());
}

#[tokio::test]
async fn standalone_image_is_converted_into_a_new_group() {
    let user = UserId::new();
    let image = standalone_image(user);
    let view = group(&[image.clone()]);
    let target = view.publish_target(image.id).unwrap();
    assert_eq!(target.key(), GroupKey::Record(image.id));

    let new_group = ContentGroupId::new();
    let rows = Arc::new(MockRowCreationService::new().reporting_group(new_group));
    let automation = Arc::new(MockAutomationEndpoint::new());

    let result = orchestrator(&rows, &automation)
        .publish(
            target,
            &platforms(&[Platform::Facebook, Platform::Instagram]),
            user,
        )
        .await;

    assert!(result.is_accepted());

    let calls = rows.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].source_record_id, image.id);
    assert_eq!(calls[0].platforms, vec![Platform::Facebook, Platform::Instagram]);

    let created = rows.created();
    assert_eq!(created.len(), 2);
    assert!(created.iter().all(|r| r.content_group_id == Some(new_group)));

    let command = automation.last_command().unwrap();
    let mut sent = command.record_ids();
    let mut expected = rows.created_ids();
    sent.sort();
    expected.sort();
    assert_eq!(sent, expected);

    assert_eq!(result.receipt().unwrap().content_group_id, Some(new_group));
}

#[tokio::test]
async fn standalone_conversion_without_reported_group_is_accepted() {
    let user = UserId::new();
    let image = standalone_image(user);
    let rows = Arc::new(MockRowCreationService::new());
    let automation = Arc::new(MockAutomationEndpoint::new());

    // Every row is reported without a group: accepted, group unknown
    let result = orchestrator(&rows, &automation)
        .publish(
            PublishTarget::Single(&image),
            &platforms(&[Platform::Facebook]),
            user,
        )
        .await;
    assert!(result.is_accepted());
    assert_eq!(result.receipt().unwrap().content_group_id, None);
}

#[tokio::test]
async fn row_creation_failure_never_reaches_automation() {
    let user = UserId::new();
    let g = ContentGroupId::new();
    let fb = group_member(user, g, Platform::Facebook, true, 10);
    let ig = group_member(user, g, Platform::Instagram, false, 5);
    let view = group(&[fb, ig]);

    let rows = Arc::new(MockRowCreationService::new().failing(500));
    let automation = Arc::new(MockAutomationEndpoint::new());
    let orchestrator = orchestrator(&rows, &automation);

    let result = orchestrator
        .publish(
            PublishTarget::Group(&view.groups[0]),
            &platforms(&[Platform::Facebook, Platform::Instagram, Platform::TikTok]),
            user,
        )
        .await;

    match result {
        PublishResult::RowCreationFailed(reason) => assert!(reason.contains("500")),
        other => panic!("expected RowCreationFailed, got {:?}", other),
    }
    assert_eq!(rows.call_count(), 1);
    assert_eq!(automation.call_count(), 0);
    assert!(orchestrator.in_flight().is_empty());
}

#[tokio::test]
async fn short_row_creation_response_is_a_failure() {
    let user = UserId::new();
    let image = standalone_image(user);
    let rows = Arc::new(MockRowCreationService::new().omitting(Platform::Instagram));
    let automation = Arc::new(MockAutomationEndpoint::new());

    let result = orchestrator(&rows, &automation)
        .publish(
            PublishTarget::Single(&image),
            &platforms(&[Platform::Facebook, Platform::Instagram]),
            user,
        )
        .await;

    assert!(matches!(result, PublishResult::RowCreationFailed(_)));
    assert_eq!(automation.call_count(), 0);
}

#[tokio::test]
async fn row_creation_timeout_is_a_failure() {
    let user = UserId::new();
    let image = standalone_image(user);
    let rows = Arc::new(MockRowCreationService::new().with_delay(Duration::from_millis(500)));
    let automation = Arc::new(MockAutomationEndpoint::new());

    let result = orchestrator(&rows, &automation)
        .with_config(OrchestratorConfig::default().with_timeout(Duration::from_millis(20)))
        .publish(
            PublishTarget::Single(&image),
            &platforms(&[Platform::Facebook]),
            user,
        )
        .await;

    match result {
        PublishResult::RowCreationFailed(reason) => assert!(reason.contains("timed out")),
        other => panic!("expected RowCreationFailed, got {:?}", other),
    }
    assert_eq!(automation.call_count(), 0);
}

#[tokio::test]
async fn automation_failure_keeps_created_rows() {
    let user = UserId::new();
    let g = ContentGroupId::new();
    let ig = group_member(user, g, Platform::Instagram, false, 5);
    let view = group(&[ig]);

    let rows = Arc::new(MockRowCreationService::new());
    let automation = Arc::new(MockAutomationEndpoint::new().failing(502));
    let orchestrator = orchestrator(&rows, &automation);

    let result = orchestrator
        .publish(
            PublishTarget::Group(&view.groups[0]),
            &platforms(&[Platform::Instagram, Platform::LinkedIn]),
            user,
        )
        .await;

    match result {
        PublishResult::PublishCommandFailed(reason) => assert!(reason.contains("502")),
        other => panic!("expected PublishCommandFailed, got {:?}", other),
    }
    // The LinkedIn row was created and is not rolled back
    assert_eq!(rows.created().len(), 1);
    assert_eq!(automation.call_count(), 1);
    assert!(orchestrator.in_flight().is_empty());
}

#[tokio::test]
async fn concurrent_publish_of_one_group_creates_rows_once() {
    let user = UserId::new();
    let g = ContentGroupId::new();
    let fb = group_member(user, g, Platform::Facebook, false, 5);
    let view = group(&[fb]);
    let target = PublishTarget::Group(&view.groups[0]);
    let requested = platforms(&[Platform::Facebook, Platform::TikTok]);

    let (rows, gate) = MockRowCreationService::new().gated();
    let rows = Arc::new(rows);
    let automation = Arc::new(MockAutomationEndpoint::new());
    let orchestrator = orchestrator(&rows, &automation);

    let first = orchestrator.publish(target, &requested, user);
    let second = async {
        gate.entered().await;
        let result = orchestrator.publish(target, &requested, user).await;
        gate.release();
        result
    };

    let (first, second) = tokio::join!(first, second);

    assert!(first.is_accepted());
    assert_eq!(second, PublishResult::AlreadyInFlight);
    assert_eq!(rows.call_count(), 1);
    assert_eq!(automation.call_count(), 1);
    assert!(orchestrator.in_flight().is_empty());
}

#[tokio::test]
async fn different_groups_publish_concurrently() {
    let user = UserId::new();
    let a = group_member(user, ContentGroupId::new(), Platform::Facebook, false, 5);
    let b = group_member(user, ContentGroupId::new(), Platform::Facebook, false, 6);
    let view = group(&[a, b]);
    let requested = platforms(&[Platform::Facebook]);

    let rows = Arc::new(MockRowCreationService::new());
    let automation = Arc::new(MockAutomationEndpoint::new());
    let orchestrator = orchestrator(&rows, &automation);

    let (first, second) = tokio::join!(
        orchestrator.publish(PublishTarget::Group(&view.groups[0]), &requested, user),
        orchestrator.publish(PublishTarget::Group(&view.groups[1]), &requested, user),
    );

    assert!(first.is_accepted());
    assert!(second.is_accepted());
    assert_eq!(rows.call_count(), 0);
    assert_eq!(automation.call_count(), 2);
}

#[tokio::test]
async fn fully_published_request_makes_no_calls() {
    let user = UserId::new();
    let g = ContentGroupId::new();
    let fb = group_member(user, g, Platform::Facebook, true, 5);
    let ig = group_member(user, g, Platform::Instagram, true, 6);
    let view = group(&[fb, ig]);

    let rows = Arc::new(MockRowCreationService::new());
    let automation = Arc::new(MockAutomationEndpoint::new());

    let result = orchestrator(&rows, &automation)
        .publish(
            PublishTarget::Group(&view.groups[0]),
            &platforms(&[Platform::Facebook, Platform::Instagram]),
            user,
        )
        .await;

    assert_eq!(result, PublishResult::NoPlatformsSelected);
    assert_eq!(rows.call_count(), 0);
    assert_eq!(automation.call_count(), 0);
}

#[tokio::test]
async fn validation_failures_make_no_calls() {
    let user = UserId::new();
    let image = standalone_image(user);
    let rows = Arc::new(MockRowCreationService::new());
    let automation = Arc::new(MockAutomationEndpoint::new());
    let orchestrator = orchestrator(&rows, &automation);

    let empty = orchestrator
        .publish(PublishTarget::Single(&image), &platforms(&[]), user)
        .await;
    assert_eq!(empty, PublishResult::NoPlatformsSelected);

    let tiktok = orchestrator
        .publish(
            PublishTarget::Single(&image),
            &platforms(&[Platform::TikTok]),
            user,
        )
        .await;
    assert!(matches!(
        tiktok,
        PublishResult::Invalid(ValidationError::PlatformNotAllowed {
            platform: Platform::TikTok,
            ..
        })
    ));

    let none = orchestrator
        .publish(
            PublishTarget::Single(&image),
            &platforms(&[Platform::None]),
            user,
        )
        .await;
    assert_eq!(
        none,
        PublishResult::Invalid(ValidationError::UnpublishablePlatform(Platform::None))
    );

    assert_eq!(rows.call_count(), 0);
    assert_eq!(automation.call_count(), 0);
}

#[tokio::test]
async fn published_platforms_never_reach_either_service() {
    let user = UserId::new();
    let g = ContentGroupId::new();
    let records: Vec<ContentRecord> = vec![
        group_member(user, g, Platform::Facebook, true, 1),
        group_member(user, g, Platform::LinkedIn, true, 2),
        group_member(user, g, Platform::Instagram, false, 3),
    ];
    let view = group(&records);

    let rows = Arc::new(MockRowCreationService::new());
    let automation = Arc::new(MockAutomationEndpoint::new());

    let result = orchestrator(&rows, &automation)
        .publish(
            PublishTarget::Group(&view.groups[0]),
            &platforms(&Platform::PUBLISHABLE),
            user,
        )
        .await;
    assert!(result.is_accepted());

    for call in rows.calls() {
        assert!(!call.platforms.contains(&Platform::Facebook));
        assert!(!call.platforms.contains(&Platform::LinkedIn));
    }
    let command = automation.last_command().unwrap();
    assert_eq!(command.record_for(Platform::Facebook), None);
    assert_eq!(command.record_for(Platform::LinkedIn), None);
    assert_eq!(
        command.platforms(),
        vec![Platform::Instagram, Platform::TikTok]
    );
}

#[tokio::test]
async fn grouped_record_published_alone_is_rejected() {
    let user = UserId::new();
    let g = ContentGroupId::new();
    let fb = group_member(user, g, Platform::Facebook, false, 2);
    let ig = group_member(user, g, Platform::Instagram, true, 1);

    let rows = Arc::new(MockRowCreationService::new());
    let automation = Arc::new(MockAutomationEndpoint::new());
    let orchestrator = orchestrator(&rows, &automation);

    let result = orchestrator
        .publish(
            PublishTarget::from(&fb),
            &platforms(&[Platform::Instagram]),
            user,
        )
        .await;

    assert_eq!(
        result,
        PublishResult::Invalid(ValidationError::GroupedRecord {
            record_id: fb.id,
            content_group_id: g,
        })
    );
    assert_eq!(rows.call_count(), 0);
    assert_eq!(automation.call_count(), 0);

    // Through the group, Instagram is seen as already published
    let view = group(&[fb.clone(), ig]);
    let target = view.publish_target(fb.id).unwrap();
    let result = orchestrator
        .publish(target, &platforms(&[Platform::Instagram]), user)
        .await;
    assert_eq!(result, PublishResult::NoPlatformsSelected);
    assert_eq!(rows.call_count(), 0);
    assert_eq!(automation.call_count(), 0);
}
