use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

use crate::parser::normalize::normalize;

pub const MAX_NAMES: usize = 10;

static ROLE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"(?i)\b(?:",
        // claimant side
        r"autora?|autores|requerentes?|reqtes?|exequentes?|apelantes?|agravantes?|embargantes?|impetrantes?",
        // defendant side
        r"|r[ée]us?|r[ée]|requerid[oa]s?|reqd[oa]s?|executad[oa]s?|apelad[oa]s?|agravad[oa]s?|embargad[oa]s?|impetrad[oa]s?",
        r")\s*:\s*"
    ))
    .unwrap()
});

static LAWYER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\badv(?:s|ogad[oa]s?|ogado\(a\))?\.?\s*:\s*").unwrap());

/// Where a name span ends: a dashed separator, a lawyer marker or the next `Label:`.
static SPAN_END_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\s+[-–]\s|\bADVS?\b|\bADVOGAD|\s[\p{L}.]+\s*:|[;\n]").unwrap()
});

static PAREN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\([^)]*\)").unwrap());

/// Names that follow a claimant/defendant role label, capped at [`MAX_NAMES`].
pub fn extract_parties(text: &str) -> Vec<String> {
    let mut names = NameSet::default();

    for m in ROLE_RE.find_iter(text) {
        let rest = &text[m.end()..];
        let span = cut_span(rest);
        let span = match span.find('(') {
            Some(i) => &span[..i],
            None => span,
        };
        names.push(span);
        if names.is_full() {
            break;
        }
    }

    names.into_vec()
}

/// Names listed after `ADV:` markers, with their OAB parentheticals removed.
pub fn extract_lawyers(text: &str) -> Vec<String> {
    let mut names = NameSet::default();

    for m in LAWYER_RE.find_iter(text) {
        let span = cut_span(&text[m.end()..]);
        let span = PAREN_RE.replace_all(span, "");
        for name in span.split(',') {
            names.push(name);
            if names.is_full() {
                return names.into_vec();
            }
        }
    }

    names.into_vec()
}

fn cut_span(rest: &str) -> &str {
    match SPAN_END_RE.find(rest) {
        Some(end) => &rest[..end.start()],
        None => rest,
    }
}

#[derive(Default)]
struct NameSet {
    seen: HashSet<String>,
    names: Vec<String>,
}

impl NameSet {
    fn push(&mut self, raw: &str) {
        if self.is_full() {
            return;
        }
        let name = raw
            .trim_matches(|c: char| c.is_whitespace() || matches!(c, '.' | ',' | ':' | '-' | '–'))
            .to_string();
        let letters = name.chars().filter(|c| c.is_alphabetic()).count();
        if letters < 3 || name.chars().any(|c| c.is_ascii_digit()) {
            return;
        }
        if self.seen.insert(normalize(&name)) {
            self.names.push(name);
        }
    }

    fn is_full(&self) -> bool {
        self.names.len() >= MAX_NAMES
    }

    fn into_vec(self) -> Vec<String> {
        self.names
    }
}
