//! Result-page HTML → raw publication blocks.
//!
//! The DJe markup changes often, so selectors are an ordered list tried one by
//! one; each attempt reports found/not-found instead of failing.

use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use crate::models::{RawResultBlock, SearchOutcome};
use crate::parser::normalize::{clean_text, normalize};

/// Repeated result rows, most specific first.
pub const RESULT_SELECTORS: &[&str] = &[
    ".fundocinza1",
    ".fundocinza2",
    ".itemPublicacao",
    "div[class*=\"resultado\"]",
    "tr.fundocinza1",
    "tr.fundocinza2",
];

/// Whole content region, used only when no row selector matched.
pub const FALLBACK_SELECTORS: &[&str] = &["#divConteudo", ".conteudo", "main"];

/// Compared against normalized page text.
const NO_RESULTS_MARKERS: &[&str] = &[
    "NENHUM RESULTADO ENCONTRADO",
    "NAO FORAM ENCONTRADOS",
    "SEM RESULTADO",
];

const MIN_BLOCK_CHARS: usize = 50;
const MIN_FALLBACK_CHARS: usize = 100;

static AVAILABLE_ON_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)disponibiliza\w*\s*:?\s*(?:em\s*)?(\d{2}/\d{2}/\d{4})").unwrap()
});

/// Classify a result page: result rows, then the no-results marker, then the
/// content-region fallback. Rows win over a stray marker elsewhere on the page;
/// the marker wins over the fallback region that usually contains it.
pub fn read_result_page(html: &str) -> SearchOutcome {
    let document = Html::parse_document(html);

    let rows = extract_rows(&document);
    if !rows.is_empty() {
        return SearchOutcome::Blocks(rows);
    }

    if has_no_results_marker(&document) {
        return SearchOutcome::NoResults;
    }

    match fallback_block(&document) {
        Some(block) => SearchOutcome::Blocks(vec![block]),
        None => SearchOutcome::Unrecognized,
    }
}

pub fn has_no_results_marker(document: &Html) -> bool {
    let text = normalize(&document.root_element().text().collect::<Vec<_>>().join(" "));
    NO_RESULTS_MARKERS.iter().any(|m| text.contains(m))
}

/// Text of every result row, skipping elements nested in one already taken.
pub fn extract_rows(document: &Html) -> Vec<RawResultBlock> {
    let mut taken = Vec::new();
    let mut blocks = Vec::new();

    for selector in RESULT_SELECTORS {
        let Some(elements) = select_all(document, selector) else {
            continue;
        };
        for el in elements {
            if overlaps(&el, &taken) {
                continue;
            }
            let text = element_text(&el);
            if text.chars().count() > MIN_BLOCK_CHARS {
                taken.push(el);
                blocks.push(to_block(text));
            }
        }
    }

    blocks
}

fn fallback_block(document: &Html) -> Option<RawResultBlock> {
    FALLBACK_SELECTORS.iter().find_map(|selector| {
        let el = select_all(document, selector)?.into_iter().next()?;
        let text = element_text(&el);
        (text.chars().count() > MIN_FALLBACK_CHARS).then(|| to_block(text))
    })
}

/// `None` when the selector is invalid or matches nothing.
fn select_all<'a>(document: &'a Html, selector: &str) -> Option<Vec<ElementRef<'a>>> {
    let selector = Selector::parse(selector).ok()?;
    let found: Vec<_> = document.select(&selector).collect();
    (!found.is_empty()).then_some(found)
}

/// Same element, or nested inside/around one already taken.
fn overlaps(el: &ElementRef<'_>, taken: &[ElementRef<'_>]) -> bool {
    taken.iter().any(|t| {
        t.id() == el.id()
            || el.ancestors().any(|a| a.id() == t.id())
            || t.ancestors().any(|a| a.id() == el.id())
    })
}

fn element_text(el: &ElementRef<'_>) -> String {
    clean_text(&el.text().collect::<Vec<_>>().join(" "))
}

fn to_block(text: String) -> RawResultBlock {
    let raw_date = AVAILABLE_ON_RE
        .captures(&text)
        .map(|caps| caps[1].to_string());
    RawResultBlock { text, raw_date }
}

// ── Tests ──
