use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::common::{RecordId, UserId};
use crate::types::Platform;

/// The single command sent to the automation endpoint.
///
/// Keyed by platform, so a platform can appear at most once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishCommand {
    pub user_id: UserId,
    targets: BTreeMap<Platform, RecordId>,
}

impl PublishCommand {
    pub fn new(user_id: UserId) -> Self {
        Self {
            user_id,
            targets: BTreeMap::new(),
        }
    }

    /// Returns false (and leaves the command unchanged) for `Platform::None`.
    pub(crate) fn insert(&mut self, platform: Platform, record_id: RecordId) -> bool {
        if !platform.is_publishable() {
            return false;
        }
        self.targets.insert(platform, record_id);
        true
    }

    pub fn record_for(&self, platform: Platform) -> Option<RecordId> {
        self.targets.get(&platform).copied()
    }

    pub fn platforms(&self) -> Vec<Platform> {
        self.targets.keys().copied().collect()
    }

    pub fn record_ids(&self) -> Vec<RecordId> {
        self.targets.values().copied().collect()
    }

    pub fn targets(&self) -> impl Iterator<Item = (Platform, RecordId)> + '_ {
        self.targets.iter().map(|(p, id)| (*p, *id))
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// The flat wire shape: one field per publishable platform in display
    /// order, `None` where the platform is not part of this command.
    pub fn fields(&self) -> Vec<(&'static str, Option<RecordId>)> {
        Platform::PUBLISHABLE
            .iter()
            .filter_map(|p| p.command_field().map(|field| (field, self.record_for(*p))))
            .collect()
    }
}
