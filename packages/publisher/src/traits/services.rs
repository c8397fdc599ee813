use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::common::{ContentGroupId, RecordId};
use crate::error::ServiceResult;
use crate::publish::PublishCommand;
use crate::types::Platform;

/// Ask for new records on `platforms`, sharing the group of `source_record_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowCreationRequest {
    pub source_record_id: RecordId,
    pub platforms: Vec<Platform>,
}

/// A record created by the row-creation service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedRow {
    pub id: RecordId,
    pub platform: Platform,
    /// Group the new row was placed in, when the service reports it
    pub content_group_id: Option<ContentGroupId>,
}

#[async_trait]
pub trait BaseRowCreationService: Send + Sync {
    /// Create one Draft record per requested platform.
    async fn create_rows(&self, request: &RowCreationRequest) -> ServiceResult<Vec<CreatedRow>>;
}

#[async_trait]
pub trait BaseAutomationEndpoint: Send + Sync {
    /// Submit one publish command. `Ok` means the command was accepted, not
    /// that anything is live yet.
    async fn submit(&self, command: &PublishCommand) -> ServiceResult<()>;
}
