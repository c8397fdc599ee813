//! Content grouping and publish orchestration.
//!
//! Generated content lives in a record store as one record per platform. This
//! crate turns a snapshot of those records into logical content groups, counts
//! what was generated and published, and publishes a group to a chosen set of
//! platforms through two external services: a row-creation service for
//! platforms that have no record yet, and an automation endpoint that does the
//! actual posting.
//!
//! # Usage
//!
//! ```rust,ignore
//! use publisher_core::{group, PublishOrchestrator, Platform};
//!
//! let view = group(&records);
//! let target = view.publish_target(record_id).unwrap();
//! let result = orchestrator
//!     .publish(target, &[Platform::Facebook, Platform::TikTok].into(), user_id)
//!     .await;
//! ```
//!
//! # Modules
//!
//! - [`grouping`] - Partition a snapshot into groups and standalone records
//! - [`stats`] - Generated / published counts
//! - [`publish`] - Validation, in-flight guard and the two-step publish
//! - [`reconcile`] - Snapshot diffs and publish attempt states
//! - [`stores`] - Record store backends
//! - [`adapters`] - HTTP implementations of the service traits
//! - [`testing`] - Mock services

pub mod adapters;
pub mod common;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod grouping;
pub mod publish;
pub mod reconcile;
pub mod stats;
pub mod stores;
pub mod testing;
pub mod traits;
pub mod types;

pub use common::{ContentGroupId, RecordId, UserId};
pub use config::Config;
pub use dashboard::{load_dashboard, Dashboard};
pub use error::{ParseError, ServiceError, StoreError, ValidationError};
pub use grouping::group;
pub use publish::{
    GroupKey, InFlightRegistry, OrchestratorConfig, PublishCommand, PublishOrchestrator,
    PublishPlan, PublishReceipt, PublishResult, PublishTarget,
};
pub use reconcile::{diff, reconcile_attempt, AttemptState, PublishTracking, RecordChange};
pub use stats::{aggregate, ContentStats};
pub use stores::MemoryRecordStore;
pub use traits::{
    BaseAutomationEndpoint, BaseRowCreationService, CreatedRow, RecordFilter, RecordStore,
    RowCreationRequest,
};
pub use types::{
    ContentGroup, ContentRecord, GroupedContent, Platform, PlatformRules, PublishState,
    RecordStatus, SourceType,
};

#[cfg(feature = "postgres")]
pub use stores::PostgresRecordStore;
