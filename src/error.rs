use thiserror::Error;

/// Recoverable failures of one portal interaction. The search loop treats these
/// as "no results for this candidate".
#[derive(Debug, Error)]
pub enum PortalError {
    #[error("failed to build portal client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("portal returned HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("timed out after {secs}s waiting for {stage}")]
    Timeout { stage: &'static str, secs: u64 },

    #[error("form field not found: {0}")]
    MissingFormField(&'static str),

    #[error("invalid form action {0:?}")]
    InvalidAction(String),

    #[error("portal session already closed")]
    Closed,
}

/// Failures that end a job with `status: failed`.
#[derive(Debug, Error)]
pub enum JobError {
    #[error("invalid target date {0:?}, expected YYYY-MM-DD")]
    InvalidTargetDate(String),

    #[error("job has no registration number")]
    MissingRegistration,

    #[error("could not open portal session: {0}")]
    Session(#[from] PortalError),
}

#[derive(Debug, Error)]
pub enum QueueError {
    #[error("queue request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("queue returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("unexpected queue response: {0}")]
    Decode(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(transparent)]
    Load(#[from] config::ConfigError),

    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{0} must be greater than zero")]
    Zero(&'static str),

    #[error("{key} is not a valid URL: {value:?}")]
    InvalidUrl { key: &'static str, value: String },
}
