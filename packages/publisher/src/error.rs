//! Typed errors for the publisher core.
//!
//! None of these cross the `publish` boundary as errors: the orchestrator folds
//! them into a `PublishResult`. They do cross the trait seams (stores, external
//! services) and the parsing helpers.

use thiserror::Error;

use crate::common::{ContentGroupId, RecordId};
use crate::types::{Platform, SourceType};

/// Failure reported by an external service (row creation, automation endpoint).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ServiceError {
    /// Non-2xx response
    #[error("service returned {status}: {message}")]
    Status { status: u16, message: String },

    /// Connection or decoding failure
    #[error("transport error: {0}")]
    Transport(String),

    #[error("request timed out")]
    Timeout,
}

/// Record store failures.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("record not found: {id}")]
    NotFound { id: RecordId },

    /// A stored row could not be mapped onto a `ContentRecord`
    #[error("invalid stored record: {0}")]
    InvalidRecord(String),

    #[error("storage error: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// A publish request that can never succeed as asked.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("no platform selected")]
    NoPlatformsSelected,

    /// A grouped record has to be published through its group
    #[error("record {record_id} belongs to group {content_group_id}")]
    GroupedRecord {
        record_id: RecordId,
        content_group_id: ContentGroupId,
    },

    #[error("{0} is not a publishable platform")]
    UnpublishablePlatform(Platform),

    #[error("{platform} is not available for {source_type} content")]
    PlatformNotAllowed {
        platform: Platform,
        source_type: SourceType,
    },
}

/// Unknown enum value when parsing from text.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("invalid {kind}: {value}")]
pub struct ParseError {
    pub kind: &'static str,
    pub value: String,
}

impl ParseError {
    pub(crate) fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

pub type ServiceResult<T> = std::result::Result<T, ServiceError>;
