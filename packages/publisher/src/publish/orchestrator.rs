use chrono::Utc;
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{info, instrument, warn};

use super::command::PublishCommand;
use super::guard::InFlightRegistry;
use super::outcome::{PublishReceipt, PublishResult};
use super::plan::{plan, PublishPlan};
use super::target::PublishTarget;
use crate::common::{ContentGroupId, RecordId, UserId};
use crate::error::ValidationError;
use crate::traits::{BaseAutomationEndpoint, BaseRowCreationService, CreatedRow, RowCreationRequest};
use crate::types::{Platform, PlatformRules};

const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Upper bound for each external call
    pub timeout: Duration,
    pub rules: PlatformRules,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            rules: PlatformRules::default(),
        }
    }
}

impl OrchestratorConfig {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_rules(mut self, rules: PlatformRules) -> Self {
        self.rules = rules;
        self
    }
}

/// Turns "publish this content on these platforms" into at most one
/// row-creation call followed by exactly one automation command.
///
/// Attempt-once: no retries, no rollback. Cheap to clone; clones share the
/// in-flight registry.
#[derive(Clone)]
pub struct PublishOrchestrator {
    row_creation: Arc<dyn BaseRowCreationService>,
    automation: Arc<dyn BaseAutomationEndpoint>,
    in_flight: InFlightRegistry,
    config: OrchestratorConfig,
}

impl PublishOrchestrator {
    pub fn new(
        row_creation: Arc<dyn BaseRowCreationService>,
        automation: Arc<dyn BaseAutomationEndpoint>,
    ) -> Self {
        Self {
            row_creation,
            automation,
            in_flight: InFlightRegistry::new(),
            config: OrchestratorConfig::default(),
        }
    }

    pub fn with_config(mut self, config: OrchestratorConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    /// Registry of groups with a publish outstanding. Callers use it to
    /// disable the publish action while one is running.
    pub fn in_flight(&self) -> &InFlightRegistry {
        &self.in_flight
    }

    /// Dry run: what `publish` would do for this request.
    pub fn plan(
        &self,
        target: PublishTarget<'_>,
        requested: &BTreeSet<Platform>,
    ) -> Result<PublishPlan, ValidationError> {
        plan(target, requested, &self.config.rules)
    }

    /// Publish `target` on `requested` platforms on behalf of `user_id`.
    ///
    /// Already-published platforms are dropped silently. Missing platforms get
    /// new rows first; if that fails nothing is sent. Success means the
    /// automation endpoint accepted the command.
    #[instrument(skip_all, fields(group_key = %target.key(), user_id = %user_id))]
    pub async fn publish(
        &self,
        target: PublishTarget<'_>,
        requested: &BTreeSet<Platform>,
        user_id: UserId,
    ) -> PublishResult {
        let plan = match self.plan(target, requested) {
            Ok(plan) => plan,
            Err(err) => {
                info!(error = %err, "Publish request rejected");
                return err.into();
            }
        };

        if !plan.already_published.is_empty() {
            info!(platforms = ?plan.already_published, "Skipping already published platforms");
        }

        let Some(_permit) = self.in_flight.try_acquire(plan.key) else {
            warn!("Publish already in flight for this content");
            return PublishResult::AlreadyInFlight;
        };

        let mut command = PublishCommand::new(user_id);
        for (platform, record_id) in &plan.existing {
            command.insert(*platform, *record_id);
        }

        let mut created_rows = Vec::new();
        let mut content_group_id = plan.content_group_id;

        if !plan.missing.is_empty() {
            match self.create_missing_rows(&plan).await {
                Ok((rows, group_id)) => {
                    for row in &rows {
                        command.insert(row.platform, row.id);
                    }
                    content_group_id = group_id;
                    created_rows = rows;
                }
                Err(reason) => {
                    warn!(%reason, platforms = ?plan.missing, "Row creation failed; no publish command sent");
                    return PublishResult::RowCreationFailed(reason);
                }
            }
        }

        info!(platforms = ?command.platforms(), "Sending publish command");

        let failure = match timeout(self.config.timeout, self.automation.submit(&command)).await {
            Ok(Ok(())) => None,
            Ok(Err(err)) => Some(err.to_string()),
            Err(_) => Some(format!(
                "automation endpoint timed out after {}s",
                self.config.timeout.as_secs()
            )),
        };

        if let Some(reason) = failure {
            if !created_rows.is_empty() {
                let orphaned: Vec<RecordId> = created_rows.iter().map(|r| r.id).collect();
                warn!(?orphaned, "Publish command failed; rows created for this attempt remain as drafts");
            }
            warn!(%reason, "Publish command failed");
            return PublishResult::PublishCommandFailed(reason);
        }

        info!(records = command.len(), "Publish command accepted");

        PublishResult::Accepted(PublishReceipt {
            key: plan.key,
            command,
            created_rows,
            skipped_published: plan.already_published,
            content_group_id,
            accepted_at: Utc::now(),
        })
    }

    async fn create_missing_rows(
        &self,
        plan: &PublishPlan,
    ) -> Result<(Vec<CreatedRow>, Option<ContentGroupId>), String> {
        let request = RowCreationRequest {
            source_record_id: plan.source_record_id,
            platforms: plan.missing.clone(),
        };

        info!(source_record_id = %request.source_record_id, platforms = ?request.platforms, "Creating missing platform rows");

        let rows = match timeout(self.config.timeout, self.row_creation.create_rows(&request)).await {
            Ok(Ok(rows)) => rows,
            Ok(Err(err)) => return Err(err.to_string()),
            Err(_) => {
                return Err(format!(
                    "row creation timed out after {}s",
                    self.config.timeout.as_secs()
                ))
            }
        };

        let group_id = check_created_rows(plan, &rows)?;
        Ok((rows, group_id))
    }
}

/// The service must return exactly one row per requested platform, each with
/// a fresh id, all in the same group. Returns the group the rows landed in.
fn check_created_rows(
    plan: &PublishPlan,
    rows: &[CreatedRow],
) -> Result<Option<ContentGroupId>, String> {
    let mut returned: Vec<Platform> = rows.iter().map(|r| r.platform).collect();
    returned.sort();
    if returned != plan.missing {
        return Err(format!(
            "requested rows for {:?} but service returned {:?}",
            plan.missing, returned
        ));
    }

    let mut seen: BTreeSet<RecordId> = plan.existing.values().copied().collect();
    seen.insert(plan.source_record_id);
    for row in rows {
        if !seen.insert(row.id) {
            return Err(format!(
                "service returned record id {} more than once",
                row.id
            ));
        }
    }

    let reported: BTreeSet<ContentGroupId> =
        rows.iter().filter_map(|r| r.content_group_id).collect();

    match plan.content_group_id {
        Some(expected) => match reported.iter().find(|id| **id != expected) {
            Some(other) => Err(format!(
                "rows were created in group {} instead of {}",
                other, expected
            )),
            None => Ok(Some(expected)),
        },
        None if reported.len() > 1 => Err(format!(
            "new rows do not share one content group: {:?}",
            reported
        )),
        None => Ok(reported.into_iter().next()),
    }
}
