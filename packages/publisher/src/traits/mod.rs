//! Seams to the collaborators this crate does not implement.
//!
//! - `RecordStore`: where records live
//! - `BaseRowCreationService`: creates missing per-platform records
//! - `BaseAutomationEndpoint`: performs the actual publishing

pub mod services;
pub mod store;

pub use services::{BaseAutomationEndpoint, BaseRowCreationService, CreatedRow, RowCreationRequest};
pub use store::{RecordFilter, RecordStore};
