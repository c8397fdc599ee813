//! Domain types: records, derived groups, platforms.

pub mod group;
pub mod platform;
pub mod record;

pub use group::{ContentGroup, GroupedContent, PublishState};
pub use platform::{Platform, PlatformRules, RecordStatus, SourceType};
pub use record::ContentRecord;
