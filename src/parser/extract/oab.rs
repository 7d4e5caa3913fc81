//! Attorney registration (OAB) references.
//!
//! Runs on normalized text. Rules are tried in order and merged by `state+number`:
//!   1. `OAB/SP 123456`, `OAB SP Nº 123.456`   (prefix, state, number)
//!   2. `OAB 123456/SP`, `OAB: 123456-SP`     (prefix, number, state)
//!   3. `OAB 123456`, `OAB Nº 123.456`        (prefix, number, no state)
//!   4. `123456/SP`                            (bare number/state pair)
//! Rules 1 to 3 mark a reference as sitting next to an OAB marker. A rule 3
//! number that another rule already found with a state is not repeated.

use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

use regex::Regex;

use crate::parser::normalize::digits_only;

pub const STATE_CODES: &[&str] = &[
    "AC", "AL", "AP", "AM", "BA", "CE", "DF", "ES", "GO", "MA", "MT", "MS", "MG", "PA", "PB",
    "PR", "PE", "PI", "RJ", "RN", "RS", "RO", "RR", "SC", "SP", "SE", "TO",
];

const MIN_DIGITS: usize = 4;

const STATE: &str = r"(AC|AL|AP|AM|BA|CE|DF|ES|GO|MA|MT|MS|MG|PA|PB|PR|PE|PI|RJ|RN|RS|RO|RR|SC|SP|SE|TO)";
const NUMBER: &str = r"(\d{1,3}(?:\.\d{3})+|\d+)";
const ORDINAL: &str = r"(?:N[º°O]?\.?\s*)?";

static PREFIX_STATE_NUMBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"\bOAB\s*[/:\-]?\s*{STATE}\b\s*{ORDINAL}[:\-]?\s*{NUMBER}\b"
    ))
    .unwrap()
});

static PREFIX_NUMBER_STATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"\bOAB\s*[:\-]?\s*{ORDINAL}[:\-]?\s*{NUMBER}\s*[/\-]\s*{STATE}\b"
    ))
    .unwrap()
});

static PREFIX_NUMBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"\bOAB\s*[:/\-]?\s*{ORDINAL}[:\-]?\s*{NUMBER}\b")).unwrap()
});

static BARE_NUMBER_STATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!(r"\b{NUMBER}\s*/\s*{STATE}\b")).unwrap());

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationRef {
    pub number: String,
    /// `None` when the marker carried no state.
    pub state_code: Option<String>,
    /// Found next to an `OAB` marker rather than as a bare `number/UF` pair.
    pub marked: bool,
}

/// Canonical form of a registration number: digits only, leading zeros dropped.
pub fn canonical_number(raw: &str) -> String {
    let digits = digits_only(raw);
    let trimmed = digits.trim_start_matches('0');
    trimmed.to_string()
}

/// All registration references in `normalized`, deduplicated, in discovery order.
pub fn extract(normalized: &str) -> Vec<RegistrationRef> {
    let mut refs: Vec<RegistrationRef> = Vec::new();
    let mut index: HashMap<(Option<String>, String), usize> = HashMap::new();

    let mut push = |number: &str, state: Option<&str>, marked: bool| {
        let number = canonical_number(number);
        if number.len() < MIN_DIGITS {
            return;
        }
        let key = (state.map(str::to_string), number.clone());
        match index.get(&key).copied() {
            Some(i) => refs[i].marked |= marked,
            None => {
                index.insert(key, refs.len());
                refs.push(RegistrationRef {
                    number,
                    state_code: state.map(str::to_string),
                    marked,
                });
            }
        }
    };

    for caps in PREFIX_STATE_NUMBER.captures_iter(normalized) {
        push(&caps[2], Some(&caps[1]), true);
    }
    for caps in PREFIX_NUMBER_STATE.captures_iter(normalized) {
        push(&caps[1], Some(&caps[2]), true);
    }
    for caps in BARE_NUMBER_STATE.captures_iter(normalized) {
        push(&caps[1], Some(&caps[2]), false);
    }
    for caps in PREFIX_NUMBER.captures_iter(normalized) {
        push(&caps[1], None, true);
    }

    let stated: HashSet<String> = refs
        .iter()
        .filter(|r| r.state_code.is_some())
        .map(|r| r.number.clone())
        .collect();
    refs.retain(|r| r.state_code.is_some() || !stated.contains(&r.number));
    refs
}
