//! Generation and publish counts over a record snapshot.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::types::ContentRecord;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentStats {
    pub total_generated: usize,
    pub total_published: usize,
}

/// Count generated and published records, ignoring discarded ones.
///
/// Must be fed the all-time snapshot, not a date-filtered view. Both counts
/// are over distinct ids, so a snapshot that repeats a row never inflates them.
pub fn aggregate(records: &[ContentRecord]) -> ContentStats {
    let mut generated = HashSet::new();
    let mut published = HashSet::new();

    for record in records.iter().filter(|r| !r.discard) {
        generated.insert(record.id);
        if record.published {
            published.insert(record.id);
        }
    }

    ContentStats {
        total_generated: generated.len(),
        total_published: published.len(),
    }
}
