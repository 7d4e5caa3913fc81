pub mod classify;
pub mod oab;
pub mod parties;
pub mod process;

use crate::models::{PublicationType, RawResultBlock, Urgency};
use crate::parser::normalize::normalize;

/// Entities pulled out of one relevant block, before shaping into a record.
#[derive(Debug, Clone)]
pub struct ExtractedPublication {
    pub text: String,
    pub raw_date: Option<String>,
    pub process_number: Option<String>,
    pub parties: Vec<String>,
    pub lawyers: Vec<String>,
    pub kind: PublicationType,
    pub urgency: Urgency,
}

/// `block.text` is expected to be whitespace-cleaned already.
pub fn extract_all(block: &RawResultBlock) -> ExtractedPublication {
    let normalized = normalize(&block.text);

    ExtractedPublication {
        text: block.text.clone(),
        raw_date: block.raw_date.clone(),
        process_number: process::extract(&block.text),
        parties: parties::extract_parties(&block.text),
        lawyers: parties::extract_lawyers(&block.text),
        kind: classify::classify_type(&normalized),
        urgency: classify::classify_urgency(&normalized),
    }
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tjsp_sentence_block() {
        let block = RawResultBlock {
            text: "Processo 1234567-89.2024.8.26.0001 - Procedimento Comum Cível - \
                   Reqte: JOÃO DA SILVA - Reqdo: BANCO EXEMPLO S/A - Vistos. SENTENÇA. \
                   Julgo procedente o pedido. Cumprimento urgente. \
                   ADV: MARIA SOUZA (OAB/SP 123456)"
                .to_string(),
            raw_date: None,
        };
        let e = extract_all(&block);
        assert_eq!(e.process_number.as_deref(), Some("1234567-89.2024.8.26.0001"));
        assert_eq!(e.kind, PublicationType::Sentenca);
        assert_eq!(e.urgency, Urgency::Critical);
        assert_eq!(e.parties, vec!["JOÃO DA SILVA", "BANCO EXEMPLO S/A"]);
        assert_eq!(e.lawyers, vec!["MARIA SOUZA"]);
    }

    #[test]
    fn empty_block_is_total() {
        let e = extract_all(&RawResultBlock {
            text: String::new(),
            raw_date: None,
        });
        assert_eq!(e.process_number, None);
        assert_eq!(e.kind, PublicationType::Outros);
        assert_eq!(e.urgency, Urgency::Normal);
        assert!(e.parties.is_empty() && e.lawyers.is_empty());
    }
}
