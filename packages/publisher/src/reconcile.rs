//! Interpreting a fresh snapshot after a publish.
//!
//! The core never writes publish results itself; it only compares what the
//! record store reports now with what it reported before.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

use crate::common::RecordId;
use crate::publish::PublishReceipt;
use crate::types::{ContentRecord, Platform, RecordStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangedField {
    Published,
    Status,
    PlatformPostUrl,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChangeKind {
    Added,
    /// Gone from the snapshot or discarded since
    Removed,
    Updated { fields: Vec<ChangedField> },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordChange {
    pub id: RecordId,
    #[serde(flatten)]
    pub kind: ChangeKind,
}

/// Records that differ between two snapshots, ordered by id.
///
/// Only `published`, `status` and `platform_post_url` count as updates.
/// Discarded records are treated as absent.
pub fn diff(previous: &[ContentRecord], next: &[ContentRecord]) -> Vec<RecordChange> {
    let before = live_by_id(previous);
    let after = live_by_id(next);

    let mut changes = Vec::new();

    for (id, old) in &before {
        match after.get(id) {
            None => changes.push(RecordChange {
                id: *id,
                kind: ChangeKind::Removed,
            }),
            Some(new) => {
                let fields = changed_fields(old, new);
                if !fields.is_empty() {
                    changes.push(RecordChange {
                        id: *id,
                        kind: ChangeKind::Updated { fields },
                    });
                }
            }
        }
    }

    for id in after.keys() {
        if !before.contains_key(id) {
            changes.push(RecordChange {
                id: *id,
                kind: ChangeKind::Added,
            });
        }
    }

    changes.sort_by_key(|change| change.id);
    changes
}

fn live_by_id(records: &[ContentRecord]) -> HashMap<RecordId, &ContentRecord> {
    records
        .iter()
        .filter(|r| !r.discard)
        .map(|r| (r.id, r))
        .collect()
}

fn changed_fields(old: &ContentRecord, new: &ContentRecord) -> Vec<ChangedField> {
    let mut fields = Vec::new();
    if old.published != new.published {
        fields.push(ChangedField::Published);
    }
    if old.status != new.status {
        fields.push(ChangedField::Status);
    }
    if old.platform_post_url != new.platform_post_url {
        fields.push(ChangedField::PlatformPostUrl);
    }
    fields
}

/// Where one platform of a publish attempt stands.
///
/// `Unpublished -> Publishing -> {Published | Failed | Unpublished}`.
/// `Published` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AttemptState {
    Unpublished,
    Publishing,
    Published,
    Failed,
}

impl AttemptState {
    pub fn is_terminal(self) -> bool {
        matches!(self, AttemptState::Published)
    }

    /// Move to `observed` unless already terminal.
    pub fn advance(self, observed: AttemptState) -> AttemptState {
        if self.is_terminal() {
            self
        } else {
            observed
        }
    }
}

/// State of every platform in an accepted command, as seen in `snapshot`.
///
/// A record that is neither published nor failed stays `Publishing` until
/// `confirmation_window` has passed since the command was accepted; after that
/// the attempt is considered to have gone nowhere.
pub fn reconcile_attempt(
    receipt: &PublishReceipt,
    snapshot: &[ContentRecord],
    now: DateTime<Utc>,
    confirmation_window: Duration,
) -> BTreeMap<Platform, AttemptState> {
    let by_id = live_by_id(snapshot);
    let expired = now - receipt.accepted_at > confirmation_window;

    receipt
        .command
        .targets()
        .map(|(platform, record_id)| {
            let state = match by_id.get(&record_id) {
                None => AttemptState::Unpublished,
                Some(record) if record.published => AttemptState::Published,
                Some(record) if record.status == RecordStatus::Failed => AttemptState::Failed,
                Some(_) if expired => AttemptState::Unpublished,
                Some(_) => AttemptState::Publishing,
            };
            (platform, state)
        })
        .collect()
}

/// A state change reported by `PublishTracking::refresh`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub platform: Platform,
    pub from: AttemptState,
    pub to: AttemptState,
}

/// Follows one accepted publish across successive snapshots.
#[derive(Debug, Clone)]
pub struct PublishTracking {
    receipt: PublishReceipt,
    states: BTreeMap<Platform, AttemptState>,
    confirmation_window: Duration,
}

impl PublishTracking {
    pub fn new(receipt: PublishReceipt, confirmation_window: Duration) -> Self {
        let states = receipt
            .command
            .platforms()
            .into_iter()
            .map(|platform| (platform, AttemptState::Publishing))
            .collect();
        Self {
            receipt,
            states,
            confirmation_window,
        }
    }

    pub fn receipt(&self) -> &PublishReceipt {
        &self.receipt
    }

    pub fn states(&self) -> &BTreeMap<Platform, AttemptState> {
        &self.states
    }

    pub fn state(&self, platform: Platform) -> Option<AttemptState> {
        self.states.get(&platform).copied()
    }

    /// Nothing left in `Publishing`.
    pub fn is_settled(&self) -> bool {
        !self.states.values().any(|s| *s == AttemptState::Publishing)
    }

    /// Apply a new snapshot and return what changed.
    pub fn refresh(&mut self, snapshot: &[ContentRecord], now: DateTime<Utc>) -> Vec<Transition> {
        let observed = reconcile_attempt(&self.receipt, snapshot, now, self.confirmation_window);
        let mut transitions = Vec::new();

        for (platform, seen) in observed {
            let Some(current) = self.states.get_mut(&platform) else {
                continue;
            };
            let next = current.advance(seen);
            if next != *current {
                debug!(%platform, from = ?*current, to = ?next, "Publish state changed");
                transitions.push(Transition {
                    platform,
                    from: *current,
                    to: next,
                });
                *current = next;
            }
        }

        transitions
    }
}
