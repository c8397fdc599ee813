use anyhow::{Context, Result};
use automation_client::AutomationClientOptions;
use dotenvy::dotenv;
use std::env;
use std::time::Duration;

use crate::publish::OrchestratorConfig;

/// Publisher configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub row_creation_url: String,
    pub automation_url: String,
    pub automation_api_token: Option<String>,
    pub publish_timeout: Duration,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        let timeout_secs: u64 = env::var("PUBLISH_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".to_string())
            .parse()
            .context("PUBLISH_TIMEOUT_SECS must be a whole number of seconds")?;

        Ok(Self {
            row_creation_url: env::var("ROW_CREATION_URL")
                .context("ROW_CREATION_URL must be set")?,
            automation_url: env::var("AUTOMATION_URL").context("AUTOMATION_URL must be set")?,
            automation_api_token: env::var("AUTOMATION_API_TOKEN").ok(),
            publish_timeout: Duration::from_secs(timeout_secs),
        })
    }

    /// Record database location. Only read when records come from Postgres,
    /// so the publish settings are not required for it.
    pub fn database_url_from_env() -> Result<String> {
        let _ = dotenv();
        env::var("DATABASE_URL").context("DATABASE_URL must be set")
    }

    pub fn client_options(&self) -> AutomationClientOptions {
        let options =
            AutomationClientOptions::new(self.row_creation_url.clone(), self.automation_url.clone())
                .with_timeout(self.publish_timeout);

        match &self.automation_api_token {
            Some(token) => options.with_api_token(token.clone()),
            None => options,
        }
    }

    pub fn orchestrator_config(&self) -> OrchestratorConfig {
        OrchestratorConfig::default().with_timeout(self.publish_timeout)
    }
}
