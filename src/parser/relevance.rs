//! Second, independent gate on every scraped block: the portal's free-text
//! search is loose, so a block is only reported when it names the attorney.

use std::collections::HashSet;

use crate::models::NameMatch;
use crate::parser::extract::oab;
use crate::parser::normalize::normalize;

/// Blocks shorter than this (in characters) are never relevant.
pub const MIN_TEXT_CHARS: usize = 50;
const MIN_NAME_TOKEN_CHARS: usize = 3;

pub fn is_relevant(
    text: &str,
    registration_number: &str,
    attorney_name: Option<&str>,
    name_match: NameMatch,
) -> bool {
    if text.chars().count() < MIN_TEXT_CHARS {
        return false;
    }

    let normalized = normalize(text);
    matches_registration(&normalized, registration_number)
        || attorney_name.is_some_and(|name| matches_name(&normalized, name, name_match))
}

/// The number must sit next to an OAB marker, with or without a state;
/// bare `number/UF` pairs do not count.
fn matches_registration(normalized: &str, registration_number: &str) -> bool {
    let wanted = oab::canonical_number(registration_number);
    if wanted.is_empty() {
        return false;
    }
    oab::extract(normalized)
        .iter()
        .any(|r| r.marked && r.number == wanted)
}

fn matches_name(normalized: &str, name: &str, mode: NameMatch) -> bool {
    let name = normalize(name);
    if name.is_empty() {
        return false;
    }
    if normalized.contains(&name) {
        return true;
    }
    match mode {
        NameMatch::Exact => false,
        NameMatch::Tokens => matches_first_and_last(normalized, &name),
    }
}

fn matches_first_and_last(normalized: &str, name: &str) -> bool {
    let tokens: Vec<&str> = name.split(' ').collect();
    let (Some(first), Some(last)) = (tokens.first(), tokens.last()) else {
        return false;
    };
    if tokens.len() < 2
        || first.chars().count() < MIN_NAME_TOKEN_CHARS
        || last.chars().count() < MIN_NAME_TOKEN_CHARS
    {
        return false;
    }

    let words: HashSet<&str> = normalized
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect();
    words.contains(first) && words.contains(last)
}
