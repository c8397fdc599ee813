use chrono::{DateTime, Utc};
use serde::Serialize;

use super::command::PublishCommand;
use super::target::GroupKey;
use crate::common::ContentGroupId;
use crate::error::ValidationError;
use crate::traits::CreatedRow;
use crate::types::Platform;

/// Outcome of one `publish` call. Every failure is a value, never a panic or
/// an `Err` crossing the boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublishResult {
    /// The automation endpoint accepted the command. The posts are not live
    /// until the record store says so.
    Accepted(PublishReceipt),
    /// Nothing requested, or everything requested is already published
    NoPlatformsSelected,
    Invalid(ValidationError),
    /// Another publish for the same group has not finished yet
    AlreadyInFlight,
    /// No command was sent
    RowCreationFailed(String),
    /// Rows created during this attempt (if any) remain as drafts
    PublishCommandFailed(String),
}

impl PublishResult {
    pub fn is_accepted(&self) -> bool {
        matches!(self, PublishResult::Accepted(_))
    }

    pub fn receipt(&self) -> Option<&PublishReceipt> {
        match self {
            PublishResult::Accepted(receipt) => Some(receipt),
            _ => None,
        }
    }
}

impl From<ValidationError> for PublishResult {
    fn from(err: ValidationError) -> Self {
        match err {
            ValidationError::NoPlatformsSelected => PublishResult::NoPlatformsSelected,
            other => PublishResult::Invalid(other),
        }
    }
}

/// What an accepted publish sent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PublishReceipt {
    #[serde(skip)]
    pub key: GroupKey,
    pub command: PublishCommand,
    /// Rows created for platforms that had no record
    pub created_rows: Vec<CreatedRow>,
    /// Requested platforms left out because they were already published
    pub skipped_published: Vec<Platform>,
    /// Group the published records belong to, if known
    pub content_group_id: Option<ContentGroupId>,
    pub accepted_at: DateTime<Utc>,
}
