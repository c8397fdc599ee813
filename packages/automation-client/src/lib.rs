//! REST client for the publish automation boundary.
//!
//! Two external services sit behind this client:
//!
//! - the row-creation service, which creates per-platform records that share a
//!   content group with a source record
//! - the automation endpoint, which accepts one flat publish command and performs
//!   the actual social-platform publishing out of band
//!
//! Both calls are attempt-once. There is no retry here; callers decide.
//!
//! # Example
//!
//! ```rust,ignore
//! use automation_client::{AutomationClient, AutomationClientOptions, CreateRowsRequest};
//!
//! let client = AutomationClient::new(AutomationClientOptions::new(
//!     "https://rows.example.com/create",
//!     "https://automation.example.com/publish",
//! ))?;
//!
//! let created = client
//!     .create_rows(&CreateRowsRequest {
//!         source_record_id,
//!         platforms: vec!["tiktok".into()],
//!     })
//!     .await?;
//! ```

pub mod error;
pub mod types;

pub use error::{AutomationClientError, Result};
pub use types::{CreateRowsRequest, CreateRowsResponse, NewRecord, PublishCommandBody};

use std::time::Duration;

const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone)]
pub struct AutomationClientOptions {
    pub row_creation_url: String,
    pub automation_url: String,
    pub api_token: Option<String>,
    pub timeout: Duration,
}

impl AutomationClientOptions {
    pub fn new(row_creation_url: impl Into<String>, automation_url: impl Into<String>) -> Self {
        Self {
            row_creation_url: row_creation_url.into(),
            automation_url: automation_url.into(),
            api_token: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    pub fn with_api_token(mut self, token: impl Into<String>) -> Self {
        self.api_token = Some(token.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

pub struct AutomationClient {
    client: reqwest::Client,
    options: AutomationClientOptions,
}

impl AutomationClient {
    pub fn new(options: AutomationClientOptions) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(options.timeout).build()?;
        Ok(Self { client, options })
    }

    /// Ask the row-creation service for new records on the given platforms.
    pub async fn create_rows(&self, request: &CreateRowsRequest) -> Result<CreateRowsResponse> {
        tracing::debug!(
            source_record_id = %request.source_record_id,
            platforms = ?request.platforms,
            "Requesting platform rows"
        );

        let resp = self
            .authorize(self.client.post(&self.options.row_creation_url))
            .json(request)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(AutomationClientError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let created: CreateRowsResponse = resp.json().await?;
        tracing::debug!(count = created.new_records.len(), "Platform rows created");
        Ok(created)
    }

    /// Send one publish command. Only the status code is inspected.
    pub async fn trigger_publish(&self, body: &PublishCommandBody) -> Result<()> {
        tracing::debug!(user_id = %body.user_id, "Sending publish command");

        let resp = self
            .authorize(self.client.post(&self.options.automation_url))
            .json(body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(AutomationClientError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        Ok(())
    }

    fn authorize(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.options.api_token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }
}
