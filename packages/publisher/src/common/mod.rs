pub mod id;

pub use id::{ContentGroupId, RecordId, UserId};
