use tracing::{error, info};

use crate::error::JobError;
use crate::models::{Job, PublicationRecord, ResultPayload};
use crate::portal::Portal;
use crate::search::{build_strategies, run_strategies, DateWindow};

/// Runs one job end to end against a portal: validate, search, report shape.
pub struct Pipeline {
    portal: Box<dyn Portal>,
    date_window_days: u32,
}

impl Pipeline {
    pub fn new(portal: Box<dyn Portal>, date_window_days: u32) -> Self {
        Pipeline {
            portal,
            date_window_days,
        }
    }

    /// Never fails; job-fatal errors become a `failed` payload.
    pub async fn process_job(&self, job: &Job) -> ResultPayload {
        match self.search_job(job).await {
            Ok(records) => {
                info!("[{}] Completed with {} publication(s)", job.id, records.len());
                ResultPayload::completed(job, records)
            }
            Err(e) => {
                error!("[{}] Failed: {}", job.id, e);
                ResultPayload::failed(job, e.to_string())
            }
        }
    }

    pub async fn search_job(&self, job: &Job) -> Result<Vec<PublicationRecord>, JobError> {
        let target = job
            .parsed_target_date()
            .ok_or_else(|| JobError::InvalidTargetDate(job.target_date.clone()))?;
        if job.registration_number.trim().is_empty() {
            return Err(JobError::MissingRegistration);
        }

        let window = DateWindow::ending_on(target, self.date_window_days);
        let strategies = build_strategies(job);
        info!(
            "[{}] OAB {}/{} on {} ({} candidate(s))",
            job.id,
            job.registration_number,
            job.state_code(),
            job.target_date,
            strategies.len()
        );

        let mut session = self.portal.open_session().await?;
        let records = run_strategies(session.as_mut(), job, window, &strategies).await;
        session.close().await;

        Ok(records)
    }
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{JobStatus, PublicationType, Urgency};
    use crate::portal::mock::MockPortal;

    fn job(target_date: &str) -> Job {
        serde_json::from_value(serde_json::json!({
            "id": "job-1",
            "oab_number": "123456",
            "oab_state": "SP",
            "lawyer_name": "Maria Souza",
            "target_date": target_date,
        }))
        .unwrap()
    }

    fn results_page() -> String {
        std::fs::read_to_string("tests/fixtures/results_two_blocks.html").unwrap()
    }

    #[tokio::test]
    async fn two_block_page_yields_the_attorneys_publication() {
        let portal = MockPortal::new().with_page("123456", results_page());
        let pipeline = Pipeline::new(Box::new(portal.clone()), 0);

        let payload = pipeline.process_job(&job("2024-03-10")).await;

        assert_eq!(payload.status, JobStatus::Completed);
        assert_eq!(payload.results_count, 1);
        let record = &payload.publications[0];
        assert_eq!(record.kind, PublicationType::Sentenca);
        assert_eq!(record.urgency, Urgency::Critical);
        assert_eq!(record.process_number.as_deref(), Some("1234567-89.2024.8.26.0001"));
        assert_eq!(record.date, "2024-03-10");
        assert_eq!(portal.opened_sessions(), 1);
        assert_eq!(portal.closed_sessions(), 1);
    }

    #[tokio::test]
    async fn no_results_anywhere_completes_empty() {
        let portal = MockPortal::new();
        let pipeline = Pipeline::new(Box::new(portal.clone()), 0);

        let payload = pipeline.process_job(&job("2024-03-10")).await;

        assert_eq!(payload.status, JobStatus::Completed);
        assert!(payload.publications.is_empty());
        assert_eq!(payload.results_count, 0);
        assert_eq!(portal.search_terms().len(), 5);
        assert_eq!(portal.closed_sessions(), 1);
    }

    #[tokio::test]
    async fn no_results_page_echoing_the_query_yields_nothing() {
        let page = "<html><body><div id=\"divConteudo\">Resultado da pesquisa livre por \
OAB 123456/SP no período de 10/03/2024 a 10/03/2024 em todos os cadernos do diário. \
Não foram encontrados registros para os critérios informados.</div></body></html>";
        let portal = MockPortal::new().with_page("OAB 123456/SP", page);
        let pipeline = Pipeline::new(Box::new(portal.clone()), 0);

        let payload = pipeline.process_job(&job("2024-03-10")).await;

        assert_eq!(payload.status, JobStatus::Completed);
        assert_eq!(payload.results_count, 0);
        assert_eq!(portal.search_terms().len(), 5);
    }

    #[tokio::test]
    async fn invalid_date_fails_without_opening_a_session() {
        let portal = MockPortal::new();
        let pipeline = Pipeline::new(Box::new(portal.clone()), 0);

        let payload = pipeline.process_job(&job("10/03/2024")).await;

        assert_eq!(payload.status, JobStatus::Failed);
        assert!(payload.error.unwrap().contains("10/03/2024"));
        assert_eq!(portal.opened_sessions(), 0);
    }

    #[tokio::test]
    async fn unreachable_portal_fails_the_job() {
        let pipeline = Pipeline::new(Box::new(MockPortal::unreachable()), 0);

        let payload = pipeline.process_job(&job("2024-03-10")).await;

        assert_eq!(payload.status, JobStatus::Failed);
        assert!(payload.publications.is_empty());
        assert!(payload.error.unwrap().contains("could not open portal session"));
    }

    #[tokio::test]
    async fn missing_registration_is_rejected() {
        let mut j = job("2024-03-10");
        j.registration_number = "  ".into();
        let pipeline = Pipeline::new(Box::new(MockPortal::new()), 0);

        let err = pipeline.search_job(&j).await.unwrap_err();
        assert!(matches!(err, JobError::MissingRegistration));
    }
}
