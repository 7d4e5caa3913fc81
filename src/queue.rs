use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Url};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::{info, warn};

use crate::error::QueueError;
use crate::models::{Job, ResultPayload};

pub const SECRET_HEADER: &str = "x-webhook-secret";
pub const PENDING_JOBS_PATH: &str = "dje-get-pending-jobs";
pub const RESULTS_PATH: &str = "dje-webhook-receiver";

/// Where jobs come from and where their results go.
#[async_trait]
pub trait JobQueue: Send + Sync {
    async fn pending_jobs(&self) -> Result<Vec<Job>, QueueError>;

    /// Deliver one payload; returns the receiver's response body.
    async fn report(&self, payload: &ResultPayload) -> Result<String, QueueError>;
}

/// The webhook pair exposed by the job producer.
pub struct WebhookQueue {
    client: Client,
    base_url: Url,
    secret: SecretString,
}

impl WebhookQueue {
    pub fn new(base_url: Url, secret: SecretString, timeout: Duration) -> Result<Self, QueueError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(WebhookQueue {
            client,
            base_url,
            secret,
        })
    }

    pub fn endpoint(&self, path: &str) -> String {
        endpoint(&self.base_url, path)
    }
}

#[async_trait]
impl JobQueue for WebhookQueue {
    async fn pending_jobs(&self) -> Result<Vec<Job>, QueueError> {
        let response = self
            .client
            .get(self.endpoint(PENDING_JOBS_PATH))
            .header(CONTENT_TYPE, "application/json")
            .header(SECRET_HEADER, self.secret.expose_secret())
            .send()
            .await?;

        let body = read_body(response).await?;
        decode_pending(&body)
    }

    async fn report(&self, payload: &ResultPayload) -> Result<String, QueueError> {
        let response = self
            .client
            .post(self.endpoint(RESULTS_PATH))
            .header(SECRET_HEADER, self.secret.expose_secret())
            .json(payload)
            .send()
            .await?;

        read_body(response).await
    }
}

fn endpoint(base: &Url, path: &str) -> String {
    format!("{}/{}", base.as_str().trim_end_matches('/'), path)
}

async fn read_body(response: reqwest::Response) -> Result<String, QueueError> {
    let status = response.status();
    let body = response.text().await?;
    if !status.is_success() {
        return Err(QueueError::Status {
            status: status.as_u16(),
            body,
        });
    }
    Ok(body)
}

/// Body of `GET dje-get-pending-jobs`.
#[derive(Deserialize)]
struct PendingJobs {
    #[serde(default)]
    count: Option<usize>,
    #[serde(default)]
    jobs: Vec<serde_json::Value>,
}

/// Malformed entries are skipped so one bad job cannot block the batch.
fn decode_pending(body: &str) -> Result<Vec<Job>, QueueError> {
    let raw: PendingJobs = serde_json::from_str(body)?;
    let listed = raw.jobs.len();

    let jobs: Vec<Job> = raw
        .jobs
        .into_iter()
        .filter_map(|value| match serde_json::from_value::<Job>(value) {
            Ok(job) => Some(job),
            Err(e) => {
                warn!("Skipping malformed job: {}", e);
                None
            }
        })
        .collect();

    info!(
        "Found {} pending job(s) ({} listed, {} reported)",
        jobs.len(),
        listed,
        raw.count.unwrap_or(listed)
    );
    Ok(jobs)
}

// ── Tests ──

#[cfg(test)]
pub mod mock {
    use std::collections::VecDeque;
    use std::sync::{Arc, RwLock};

    use super::*;

    /// Serves queued batches in order, then empty ones; records every report.
    #[derive(Default, Clone)]
    pub struct MockQueue {
        batches: Arc<RwLock<VecDeque<Result<Vec<Job>, u16>>>>,
        reports: Arc<RwLock<Vec<ResultPayload>>>,
        fail_reports: bool,
    }

    impl MockQueue {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_batch(self, jobs: Vec<Job>) -> Self {
            self.batches.write().unwrap().push_back(Ok(jobs));
            self
        }

        /// Next fetch fails with this HTTP status.
        pub fn with_fetch_error(self, status: u16) -> Self {
            self.batches.write().unwrap().push_back(Err(status));
            self
        }

        pub fn rejecting_reports(self) -> Self {
            MockQueue {
                fail_reports: true,
                ..self
            }
        }

        pub fn reports(&self) -> Vec<ResultPayload> {
            self.reports.read().unwrap().clone()
        }
    }

    #[async_trait]
    impl JobQueue for MockQueue {
        async fn pending_jobs(&self) -> Result<Vec<Job>, QueueError> {
            match self.batches.write().unwrap().pop_front() {
                Some(Ok(jobs)) => Ok(jobs),
                Some(Err(status)) => Err(QueueError::Status {
                    status,
                    body: "unavailable".into(),
                }),
                None => Ok(Vec::new()),
            }
        }

        async fn report(&self, payload: &ResultPayload) -> Result<String, QueueError> {
            self.reports.write().unwrap().push(payload.clone());
            if self.fail_reports {
                return Err(QueueError::Status {
                    status: 500,
                    body: "receiver down".into(),
                });
            }
            Ok("{\"ok\":true}".into())
        }
    }
}
