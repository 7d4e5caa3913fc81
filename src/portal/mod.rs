pub mod dje;
#[cfg(test)]
pub mod mock;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::error::PortalError;
use crate::models::SearchOutcome;

pub use dje::DjePortal;

/// One query against the gazette: free text plus an inclusive date range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub term: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl SearchQuery {
    /// Portal date format, `dd/mm/yyyy`.
    pub fn start_br(&self) -> String {
        self.start.format("%d/%m/%Y").to_string()
    }

    pub fn end_br(&self) -> String {
        self.end.format("%d/%m/%Y").to_string()
    }
}

/// Opens per-job sessions. A session is never shared between jobs.
#[async_trait]
pub trait Portal: Send + Sync {
    async fn open_session(&self) -> Result<Box<dyn PortalSession>, PortalError>;
}

#[async_trait]
pub trait PortalSession: Send {
    async fn search(&mut self, query: &SearchQuery) -> Result<SearchOutcome, PortalError>;

    /// Release the session. Called exactly once, on every exit path.
    async fn close(&mut self);
}
