//! In-memory portal for tests.
//!
//! Pages are canned per search term; any term without a page gets the
//! portal's "no results" screen. Clones share pages and call logs, so a
//! test can hand one clone to the pipeline and inspect the other.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;

use super::{Portal, PortalSession, SearchQuery};
use crate::error::PortalError;
use crate::models::SearchOutcome;
use crate::parser::blocks;

pub const NO_RESULTS_PAGE: &str =
    "<html><body><div id=\"divConteudo\"><p>Não foram encontrados registros.</p></div></body></html>";

#[derive(Debug, Clone)]
enum Canned {
    Page(String),
    Timeout,
}

#[derive(Default, Clone)]
pub struct MockPortal {
    pages: Arc<RwLock<HashMap<String, Canned>>>,
    fail_open: bool,
    searches: Arc<RwLock<Vec<SearchQuery>>>,
    opened: Arc<RwLock<usize>>,
    closed: Arc<RwLock<usize>>,
}

impl MockPortal {
    pub fn new() -> Self {
        Self::default()
    }

    /// A portal whose sessions can never be opened.
    pub fn unreachable() -> Self {
        MockPortal {
            fail_open: true,
            ..Self::default()
        }
    }

    /// Serve `html` for searches on `term`.
    pub fn with_page(self, term: &str, html: impl Into<String>) -> Self {
        self.pages
            .write()
            .unwrap()
            .insert(term.to_string(), Canned::Page(html.into()));
        self
    }

    /// Searches on `term` time out.
    pub fn with_timeout(self, term: &str) -> Self {
        self.pages
            .write()
            .unwrap()
            .insert(term.to_string(), Canned::Timeout);
        self
    }

    pub fn searches(&self) -> Vec<SearchQuery> {
        self.searches.read().unwrap().clone()
    }

    pub fn search_terms(&self) -> Vec<String> {
        self.searches().into_iter().map(|q| q.term).collect()
    }

    pub fn opened_sessions(&self) -> usize {
        *self.opened.read().unwrap()
    }

    pub fn closed_sessions(&self) -> usize {
        *self.closed.read().unwrap()
    }
}

#[async_trait]
impl Portal for MockPortal {
    async fn open_session(&self) -> Result<Box<dyn PortalSession>, PortalError> {
        if self.fail_open {
            return Err(PortalError::Timeout {
                stage: "search form",
                secs: 60,
            });
        }
        *self.opened.write().unwrap() += 1;
        Ok(Box::new(MockSession {
            portal: self.clone(),
            open: true,
        }))
    }
}

struct MockSession {
    portal: MockPortal,
    open: bool,
}

#[async_trait]
impl PortalSession for MockSession {
    async fn search(&mut self, query: &SearchQuery) -> Result<SearchOutcome, PortalError> {
        if !self.open {
            return Err(PortalError::Closed);
        }
        self.portal.searches.write().unwrap().push(query.clone());

        let canned = self.portal.pages.read().unwrap().get(&query.term).cloned();
        match canned {
            Some(Canned::Page(html)) => Ok(blocks::read_result_page(&html)),
            Some(Canned::Timeout) => Err(PortalError::Timeout {
                stage: "search results",
                secs: 30,
            }),
            None => Ok(blocks::read_result_page(NO_RESULTS_PAGE)),
        }
    }

    async fn close(&mut self) {
        if self.open {
            self.open = false;
            *self.portal.closed.write().unwrap() += 1;
        }
    }
}
