use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

pub const DEFAULT_STATE: &str = "SP";

/// Queue identifiers come back as UUID strings or integer keys depending on the producer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum JobId {
    Number(i64),
    Text(String),
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobId::Number(n) => write!(f, "{}", n),
            JobId::Text(s) => f.write_str(s),
        }
    }
}

/// One scraping request pulled from the pending-jobs endpoint.
///
/// The producer historically used snake_case `oab_*` keys; both spellings are accepted.
#[derive(Debug, Clone, Deserialize)]
pub struct Job {
    pub id: JobId,
    #[serde(
        rename = "registrationNumber",
        alias = "oab_number",
        deserialize_with = "string_or_number"
    )]
    pub registration_number: String,
    #[serde(
        rename = "registrationState",
        alias = "oab_state",
        default = "default_state"
    )]
    pub registration_state: String,
    #[serde(rename = "attorneyName", alias = "lawyer_name", default)]
    pub attorney_name: Option<String>,
    #[serde(rename = "targetDate", alias = "target_date")]
    pub target_date: String,
}

impl Job {
    /// Attorney name with surrounding whitespace removed, if one was given.
    pub fn attorney_name(&self) -> Option<&str> {
        self.attorney_name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
    }

    pub fn state_code(&self) -> String {
        let state = self.registration_state.trim().to_uppercase();
        if state.is_empty() {
            DEFAULT_STATE.to_string()
        } else {
            state
        }
    }

    /// Parses `targetDate` as an ISO calendar date (`YYYY-MM-DD`).
    pub fn parsed_target_date(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(self.target_date.trim(), "%Y-%m-%d").ok()
    }
}

fn default_state() -> String {
    DEFAULT_STATE.to_string()
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(u64),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(s) => s,
        Raw::Number(n) => n.to_string(),
    })
}

/// Which name rule the relevance gate may use for a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameMatch {
    /// Full normalized name must appear contiguously.
    Exact,
    /// Full name, or first and last name tokens appearing independently.
    Tokens,
}

/// A candidate query submitted to the portal, tried in ascending `priority`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchStrategy {
    pub search_term: String,
    pub description: &'static str,
    pub priority: u8,
    pub name_match: NameMatch,
}

/// Text scraped from one result element, before any filtering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResultBlock {
    pub text: String,
    pub raw_date: Option<String>,
}

/// What one portal search produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    /// The portal rendered its explicit "no results" marker.
    NoResults,
    /// Neither a marker nor any result block was recognised on the page.
    Unrecognized,
    Blocks(Vec<RawResultBlock>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PublicationType {
    Citacao,
    Intimacao,
    Sentenca,
    Decisao,
    Despacho,
    Acordao,
    Edital,
    Outros,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    Normal,
    High,
    Critical,
}

/// Final record reported to the webhook for one unique publication.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicationRecord {
    pub date: String,
    #[serde(rename = "type")]
    pub kind: PublicationType,
    pub text: String,
    pub process_number: Option<String>,
    pub parties: Vec<String>,
    pub lawyers: Vec<String>,
    pub urgency: Urgency,
    pub source_tag: String,
    pub search_strategy_used: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub available_on: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Completed,
    Failed,
}

/// Body of `POST dje-webhook-receiver`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultPayload {
    pub job_id: JobId,
    pub status: JobStatus,
    pub publications: Vec<PublicationRecord>,
    pub results_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub registration_number: String,
    pub target_date: String,
}

impl ResultPayload {
    pub fn completed(job: &Job, publications: Vec<PublicationRecord>) -> Self {
        ResultPayload {
            job_id: job.id.clone(),
            status: JobStatus::Completed,
            results_count: publications.len(),
            publications,
            error: None,
            registration_number: job.registration_number.clone(),
            target_date: job.target_date.clone(),
        }
    }

    pub fn failed(job: &Job, error: impl Into<String>) -> Self {
        ResultPayload {
            job_id: job.id.clone(),
            status: JobStatus::Failed,
            publications: Vec::new(),
            results_count: 0,
            error: Some(error.into()),
            registration_number: job.registration_number.clone(),
            target_date: job.target_date.clone(),
        }
    }
}

// ── Tests ──
