//! HTTP implementations of the external service seams.

use async_trait::async_trait;
use automation_client::{
    AutomationClient, AutomationClientError, CreateRowsRequest, NewRecord, PublishCommandBody,
};
use std::sync::Arc;

use crate::error::{ServiceError, ServiceResult};
use crate::publish::PublishCommand;
use crate::traits::{BaseAutomationEndpoint, BaseRowCreationService, CreatedRow, RowCreationRequest};
use crate::types::Platform;

impl From<AutomationClientError> for ServiceError {
    fn from(err: AutomationClientError) -> Self {
        match err {
            AutomationClientError::Timeout => ServiceError::Timeout,
            AutomationClientError::Api { status, message } => ServiceError::Status { status, message },
            AutomationClientError::Http(e) => ServiceError::Transport(e.to_string()),
        }
    }
}

// =============================================================================
// Row creation
// =============================================================================

pub struct HttpRowCreationService(pub Arc<AutomationClient>);

impl HttpRowCreationService {
    pub fn new(client: Arc<AutomationClient>) -> Self {
        Self(client)
    }
}

#[async_trait]
impl BaseRowCreationService for HttpRowCreationService {
    async fn create_rows(&self, request: &RowCreationRequest) -> ServiceResult<Vec<CreatedRow>> {
        let body = CreateRowsRequest {
            source_record_id: request.source_record_id.into_uuid(),
            platforms: request.platforms.iter().map(|p| p.to_string()).collect(),
        };

        let response = self.0.create_rows(&body).await?;

        response.new_records.into_iter().map(created_row).collect()
    }
}

fn created_row(record: NewRecord) -> ServiceResult<CreatedRow> {
    let platform: Platform = record
        .platform
        .parse()
        .map_err(|e| ServiceError::Transport(format!("unexpected row in response: {}", e)))?;

    Ok(CreatedRow {
        id: record.id.into(),
        platform,
        content_group_id: record.content_group_id.map(Into::into),
    })
}

// =============================================================================
// Automation endpoint
// =============================================================================

pub struct HttpAutomationEndpoint(pub Arc<AutomationClient>);

impl HttpAutomationEndpoint {
    pub fn new(client: Arc<AutomationClient>) -> Self {
        Self(client)
    }
}

#[async_trait]
impl BaseAutomationEndpoint for HttpAutomationEndpoint {
    async fn submit(&self, command: &PublishCommand) -> ServiceResult<()> {
        self.0.trigger_publish(&command_body(command)).await?;
        Ok(())
    }
}

/// Flatten a command into the fixed per-platform fields the endpoint expects.
fn command_body(command: &PublishCommand) -> PublishCommandBody {
    let record = |platform| command.record_for(platform).map(|id| id.into_uuid());

    PublishCommandBody {
        facebook_post_id: record(Platform::Facebook),
        instagram_post_id: record(Platform::Instagram),
        linkedin_post_id: record(Platform::LinkedIn),
        tiktok_post_id: record(Platform::TikTok),
        user_id: command.user_id.into_uuid(),
    }
}
