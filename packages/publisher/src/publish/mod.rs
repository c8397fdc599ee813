//! Publish orchestration: plan, guard, create missing rows, send one command.

pub mod command;
pub mod guard;
pub mod orchestrator;
pub mod outcome;
pub mod plan;
pub mod target;

pub use command::PublishCommand;
pub use guard::{InFlightRegistry, PublishPermit};
pub use orchestrator::{OrchestratorConfig, PublishOrchestrator};
pub use outcome::{PublishReceipt, PublishResult};
pub use plan::{plan, PublishPlan};
pub use target::{GroupKey, PublishTarget};
