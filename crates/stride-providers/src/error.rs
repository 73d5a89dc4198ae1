//! Shared error type for collaborator calls.
//!
//! A timeout is just a failed request; callers treat every variant the same
//! way: log it, record a warning, and degrade to an empty result.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("upstream returned status {0}")]
    UpstreamStatus(u16),

    #[error("malformed upstream payload: {0}")]
    Decode(String),

    #[error("upstream response missing {0}")]
    MissingData(&'static str),

    /// Failure inside a local data source (e.g. the incident store).
    #[error("data source error: {0}")]
    Source(String),
}
