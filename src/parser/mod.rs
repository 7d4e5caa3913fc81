pub mod blocks;
pub mod dedupe;
pub mod extract;
pub mod normalize;
pub mod relevance;

use tracing::debug;

use crate::models::{Job, NameMatch, RawResultBlock};
use extract::ExtractedPublication;

/// Per-block pipeline: clean → relevance gate → entity extraction.
pub fn process_blocks(
    blocks: &[RawResultBlock],
    job: &Job,
    name_match: NameMatch,
) -> Vec<ExtractedPublication> {
    blocks
        .iter()
        .filter_map(|block| {
            let cleaned = RawResultBlock {
                text: normalize::clean_text(&block.text),
                raw_date: block.raw_date.clone(),
            };
            if !relevance::is_relevant(
                &cleaned.text,
                &job.registration_number,
                job.attorney_name(),
                name_match,
            ) {
                debug!("Dropped block ({} chars): attorney not mentioned", cleaned.text.len());
                return None;
            }
            Some(extract::extract_all(&cleaned))
        })
        .collect()
}

// ── Tests ──
