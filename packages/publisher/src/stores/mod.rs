//! Record store backends.
//!
//! - `MemoryRecordStore`: in-process, always available
//! - `PostgresRecordStore`: requires the `postgres` feature

pub mod memory;

#[cfg(feature = "postgres")]
pub mod postgres;

pub use memory::MemoryRecordStore;

#[cfg(feature = "postgres")]
pub use postgres::PostgresRecordStore;
