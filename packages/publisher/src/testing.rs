//! Mock collaborators for exercising the orchestrator without a network.

use async_trait::async_trait;
use std::collections::BTreeSet;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;
use tokio::sync::{Notify, Semaphore};

use crate::common::{ContentGroupId, RecordId};
use crate::error::{ServiceError, ServiceResult};
use crate::publish::PublishCommand;
use crate::traits::{BaseAutomationEndpoint, BaseRowCreationService, CreatedRow, RowCreationRequest};
use crate::types::Platform;

fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(|e| e.into_inner())
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(|e| e.into_inner())
}

/// Holds a mocked call open until the test releases it.
#[derive(Clone)]
pub struct CallGate {
    permits: Arc<Semaphore>,
    entered: Arc<Notify>,
}

impl CallGate {
    fn new() -> Self {
        Self {
            permits: Arc::new(Semaphore::new(0)),
            entered: Arc::new(Notify::new()),
        }
    }

    /// Resolves once a call has reached the gate.
    pub async fn entered(&self) {
        self.entered.notified().await;
    }

    /// Let one held call continue.
    pub fn release(&self) {
        self.permits.add_permits(1);
    }

    async fn pass(&self) {
        self.entered.notify_one();
        if let Ok(permit) = self.permits.acquire().await {
            permit.forget();
        }
    }
}

/// Row-creation service that mints one Draft row per requested platform.
///
/// Calls are recorded; failures, short responses, a reported group id, a
/// delay and a gate can be configured builder-style.
#[derive(Clone, Default)]
pub struct MockRowCreationService {
    calls: Arc<RwLock<Vec<RowCreationRequest>>>,
    created: Arc<RwLock<Vec<CreatedRow>>>,
    failure: Option<ServiceError>,
    reported_group: Option<ContentGroupId>,
    omitted: BTreeSet<Platform>,
    delay: Option<Duration>,
    gate: Option<CallGate>,
}

impl MockRowCreationService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer every call with this HTTP status.
    pub fn failing(mut self, status: u16) -> Self {
        self.failure = Some(ServiceError::Status {
            status,
            message: "mock row creation failure".to_string(),
        });
        self
    }

    /// Report `group_id` on every created row.
    pub fn reporting_group(mut self, group_id: ContentGroupId) -> Self {
        self.reported_group = Some(group_id);
        self
    }

    /// Leave `platform` out of responses even when requested.
    pub fn omitting(mut self, platform: Platform) -> Self {
        self.omitted.insert(platform);
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Hold every call until released through the returned gate.
    pub fn gated(mut self) -> (Self, CallGate) {
        let gate = CallGate::new();
        self.gate = Some(gate.clone());
        (self, gate)
    }

    pub fn call_count(&self) -> usize {
        read(&self.calls).len()
    }

    pub fn calls(&self) -> Vec<RowCreationRequest> {
        read(&self.calls).clone()
    }

    /// Every row handed out so far.
    pub fn created(&self) -> Vec<CreatedRow> {
        read(&self.created).clone()
    }

    pub fn created_ids(&self) -> Vec<RecordId> {
        read(&self.created).iter().map(|r| r.id).collect()
    }
}

#[async_trait]
impl BaseRowCreationService for MockRowCreationService {
    async fn create_rows(&self, request: &RowCreationRequest) -> ServiceResult<Vec<CreatedRow>> {
        write(&self.calls).push(request.clone());

        if let Some(gate) = &self.gate {
            gate.pass().await;
        }
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(err) = &self.failure {
            return Err(err.clone());
        }

        let rows: Vec<CreatedRow> = request
            .platforms
            .iter()
            .filter(|p| !self.omitted.contains(*p))
            .map(|platform| CreatedRow {
                id: RecordId::new(),
                platform: *platform,
                content_group_id: self.reported_group,
            })
            .collect();

        write(&self.created).extend(rows.iter().cloned());
        Ok(rows)
    }
}

/// Automation endpoint that records every submitted command.
#[derive(Clone, Default)]
pub struct MockAutomationEndpoint {
    commands: Arc<RwLock<Vec<PublishCommand>>>,
    failure: Option<ServiceError>,
    delay: Option<Duration>,
}

impl MockAutomationEndpoint {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(mut self, status: u16) -> Self {
        self.failure = Some(ServiceError::Status {
            status,
            message: "mock automation failure".to_string(),
        });
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn call_count(&self) -> usize {
        read(&self.commands).len()
    }

    pub fn commands(&self) -> Vec<PublishCommand> {
        read(&self.commands).clone()
    }

    pub fn last_command(&self) -> Option<PublishCommand> {
        read(&self.commands).last().cloned()
    }
}

#[async_trait]
impl BaseAutomationEndpoint for MockAutomationEndpoint {
    async fn submit(&self, command: &PublishCommand) -> ServiceResult<()> {
        write(&self.commands).push(command.clone());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        match &self.failure {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}
