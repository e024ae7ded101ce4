//! Shared failure type for calls that leave the process.

use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BoundaryError {
    #[error("{service} is not configured: {detail}")]
    MissingConfig {
        service: &'static str,
        detail: String,
    },
    #[error("{0} cannot be empty")]
    EmptyInput(&'static str),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("{service} request failed: {source}")]
    Http {
        service: &'static str,
        source: reqwest::Error,
    },
    #[error("{service} timed out")]
    Timeout { service: &'static str },
    #[error("{service} returned HTTP {status}: {message}")]
    Status {
        service: &'static str,
        status: u16,
        message: String,
    },
    #[error("{service} returned a malformed response: {detail}")]
    MalformedResponse {
        service: &'static str,
        detail: String,
    },
}

impl BoundaryError {
    pub(crate) fn from_reqwest(service: &'static str, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout { service }
        } else {
            Self::Http {
                service,
                source: err,
            }
        }
    }

    pub(crate) fn malformed(service: &'static str, detail: impl Into<String>) -> Self {
        Self::MalformedResponse {
            service,
            detail: detail.into(),
        }
    }
}

/// Client with the per-call timeout every boundary adapter applies.
pub(crate) fn http_client(
    service: &'static str,
    timeout: Duration,
) -> Result<reqwest::Client, BoundaryError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|err| BoundaryError::from_reqwest(service, err))
}
