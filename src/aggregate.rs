use std::collections::HashSet;

use crate::models::{Job, PublicationRecord, SearchStrategy};
use crate::parser::dedupe::{dedupe, fingerprint};
use crate::parser::extract::parties::MAX_NAMES;
use crate::parser::extract::ExtractedPublication;
use crate::parser::normalize::{normalize, truncate_chars};

pub const SOURCE_TAG: &str = "TJSP_DJE";
pub const MAX_TEXT_CHARS: usize = 10_000;

/// Collects records for one job across strategies, one per fingerprint.
pub struct Aggregator<'a> {
    job: &'a Job,
    seen: HashSet<String>,
    records: Vec<PublicationRecord>,
}

impl<'a> Aggregator<'a> {
    pub fn new(job: &'a Job) -> Self {
        Aggregator {
            job,
            seen: HashSet::new(),
            records: Vec::new(),
        }
    }

    /// Shape and keep new publications; returns how many were not seen before.
    pub fn add(&mut self, strategy: &SearchStrategy, found: Vec<ExtractedPublication>) -> usize {
        let before = self.records.len();
        for publication in found {
            let record = self.shape(publication, &strategy.search_term);
            if self.seen.insert(fingerprint(&record)) {
                self.records.push(record);
            }
        }
        self.records.len() - before
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn finish(self) -> Vec<PublicationRecord> {
        dedupe(self.records)
    }

    fn shape(&self, publication: ExtractedPublication, term: &str) -> PublicationRecord {
        PublicationRecord {
            date: self.job.target_date.trim().to_string(),
            kind: publication.kind,
            text: truncate_chars(&publication.text, MAX_TEXT_CHARS),
            process_number: publication.process_number,
            parties: publication.parties,
            lawyers: self.lawyers(publication.lawyers),
            urgency: publication.urgency,
            source_tag: SOURCE_TAG.to_string(),
            search_strategy_used: Some(term.to_string()),
            available_on: publication.raw_date,
        }
    }

    /// Requested attorney first, then names found in the text.
    fn lawyers(&self, extracted: Vec<String>) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut names: Vec<String> = self
            .job
            .attorney_name()
            .map(str::to_string)
            .into_iter()
            .chain(extracted)
            .filter(|n| seen.insert(normalize(n)))
            .take(MAX_NAMES)
            .collect();

        if names.is_empty() {
            names.push(format!(
                "OAB {}/{}",
                self.job.registration_number.trim(),
                self.job.state_code()
            ));
        }
        names
    }
}

// ── Tests ──
