use thiserror::Error;

pub type Result<T> = std::result::Result<T, AutomationClientError>;

#[derive(Debug, Error)]
pub enum AutomationClientError {
    /// The request did not complete within the configured timeout
    #[error("request timed out")]
    Timeout,

    /// Connection, TLS or body decoding failure
    #[error("HTTP error: {0}")]
    Http(#[source] reqwest::Error),

    /// Non-2xx response
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },
}

impl From<reqwest::Error> for AutomationClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            AutomationClientError::Timeout
        } else {
            AutomationClientError::Http(err)
        }
    }
}

impl AutomationClientError {
    /// HTTP status code, if the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            AutomationClientError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}
