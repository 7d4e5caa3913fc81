use std::collections::HashSet;

use sha2::{Digest, Sha256};

use crate::models::PublicationRecord;
use crate::parser::normalize::normalize;

/// Leading characters of the normalized text that feed the content hash.
pub const FINGERPRINT_CHARS: usize = 500;

/// Process number when one was extracted, else a hash of the text head.
pub fn fingerprint(record: &PublicationRecord) -> String {
    match &record.process_number {
        Some(number) => format!("cnj:{}", number),
        None => {
            let head: String = normalize(&record.text)
                .chars()
                .take(FINGERPRINT_CHARS)
                .collect();
            let mut hasher = Sha256::new();
            hasher.update(head.as_bytes());
            format!("txt:{:x}", hasher.finalize())
        }
    }
}

/// Keep the first record per fingerprint, in discovery order.
pub fn dedupe(records: Vec<PublicationRecord>) -> Vec<PublicationRecord> {
    let mut seen = HashSet::new();
    records
        .into_iter()
        .filter(|r| seen.insert(fingerprint(r)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PublicationType, Urgency};

    fn record(text: &str, process: Option<&str>) -> PublicationRecord {
        PublicationRecord {
            date: "2024-03-10".into(),
            kind: PublicationType::Outros,
            text: text.into(),
            process_number: process.map(String::from),
            parties: Vec::new(),
            lawyers: Vec::new(),
            urgency: Urgency::Normal,
            source_tag: "TEST".into(),
            search_strategy_used: None,
            available_on: None,
        }
    }

    #[test]
    fn same_process_number_is_one_publication() {
        let out = dedupe(vec![
            record("first text", Some("1234567-89.2024.8.26.0001")),
            record("other text", Some("1234567-89.2024.8.26.0001")),
            record("third text", Some("7654321-00.2024.8.26.0002")),
        ]);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].text, "first text");
        assert_eq!(out[1].text, "third text");
    }

    #[test]
    fn text_fingerprint_ignores_case_spacing_and_tail() {
        let head = "a".repeat(FINGERPRINT_CHARS);
        let out = dedupe(vec![
            record(&format!("{} tail one", head), None),
            record(&format!("{}  TAIL two", head.to_uppercase()), None),
            record("Intimação  das partes", None),
            record("INTIMACAO DAS PARTES", None),
        ]);
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn idempotent() {
        let input = vec![
            record("alpha", None),
            record("beta", Some("1234567-89.2024.8.26.0001")),
            record("ALPHA", None),
            record("gamma", Some("1234567-89.2024.8.26.0001")),
            record("delta", None),
        ];
        let once = dedupe(input);
        let twice = dedupe(once.clone());
        assert_eq!(once, twice);
        assert_eq!(once.len(), 3);
    }

    #[test]
    fn empty_input() {
        assert!(dedupe(Vec::new()).is_empty());
    }
}
