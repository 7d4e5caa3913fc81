//! Candidate queries for one job and the loop that tries them in order.

use chrono::{Days, NaiveDate};
use tracing::{info, warn};

use crate::aggregate::Aggregator;
use crate::models::{Job, NameMatch, PublicationRecord, SearchOutcome, SearchStrategy};
use crate::parser;
use crate::parser::normalize::digits_only;
use crate::portal::{PortalSession, SearchQuery};

/// Inclusive range of publication days searched for a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateWindow {
    /// `extra_days` before the target, through the target itself.
    pub fn ending_on(target: NaiveDate, extra_days: u32) -> Self {
        let start = target
            .checked_sub_days(Days::new(u64::from(extra_days)))
            .unwrap_or(target);
        DateWindow { start, end: target }
    }

    fn query(&self, term: &str) -> SearchQuery {
        SearchQuery {
            term: term.to_string(),
            start: self.start,
            end: self.end,
        }
    }
}

/// Ordered candidates: registration variants first, then the attorney's name.
pub fn build_strategies(job: &Job) -> Vec<SearchStrategy> {
    let number = registration_digits(&job.registration_number);
    let state = job.state_code();

    let mut strategies = vec![
        strategy(number.clone(), "registration number", 1, NameMatch::Exact),
        strategy(format!("\"{}\"", number), "quoted registration number", 2, NameMatch::Exact),
        strategy(format!("{}/{}", number, state), "number/state", 3, NameMatch::Exact),
        strategy(format!("OAB {}/{}", number, state), "OAB number/state", 4, NameMatch::Exact),
    ];
    if let Some(name) = job.attorney_name() {
        strategies.push(strategy(format!("\"{}\"", name), "attorney name", 5, NameMatch::Tokens));
    }

    strategies.sort_by_key(|s| s.priority);
    strategies
}

fn strategy(term: String, description: &'static str, priority: u8, name_match: NameMatch) -> SearchStrategy {
    SearchStrategy {
        search_term: term,
        description,
        priority,
        name_match,
    }
}

/// Digits without leading zeros; the raw value when that leaves nothing.
fn registration_digits(raw: &str) -> String {
    let digits = digits_only(raw);
    let trimmed = digits.trim_start_matches('0');
    if trimmed.is_empty() {
        raw.trim().to_string()
    } else {
        trimmed.to_string()
    }
}

/// Try candidates in order and stop at the first one that yields relevant records.
///
/// Portal failures on a candidate are logged and treated as "no results".
pub async fn run_strategies(
    session: &mut dyn PortalSession,
    job: &Job,
    window: DateWindow,
    strategies: &[SearchStrategy],
) -> Vec<PublicationRecord> {
    let mut aggregator = Aggregator::new(job);

    for strategy in strategies {
        let query = window.query(&strategy.search_term);
        let blocks = match session.search(&query).await {
            Ok(SearchOutcome::Blocks(blocks)) => blocks,
            Ok(SearchOutcome::NoResults) => {
                info!("[{}] No results for {}", job.id, strategy.description);
                continue;
            }
            Ok(SearchOutcome::Unrecognized) => {
                warn!(
                    "[{}] Unrecognized result page for {}, treating as empty",
                    job.id, strategy.description
                );
                continue;
            }
            Err(e) => {
                warn!("[{}] {} failed: {}", job.id, strategy.description, e);
                continue;
            }
        };

        let total = blocks.len();
        let relevant = parser::process_blocks(&blocks, job, strategy.name_match);
        let added = aggregator.add(strategy, relevant);
        info!(
            "[{}] {}: {} block(s), {} relevant",
            job.id, strategy.description, total, added
        );

        if !aggregator.is_empty() {
            info!(
                "[{}] Stopping after {} with {} record(s)",
                job.id,
                strategy.description,
                aggregator.len()
            );
            break;
        }
    }

    aggregator.finish()
}

// ── Tests ──
