//! DJe TJSP advanced search ("consulta avançada") over a plain HTTP session.
//!
//! A session keeps the portal's cookies for the lifetime of one job. Every
//! search reloads the form, so hidden inputs and the form action track
//! whatever the portal currently serves.

use std::sync::LazyLock;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, REFERER};
use reqwest::{Client, RequestBuilder, Url};
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, info};

use super::{Portal, PortalSession, SearchQuery};
use crate::config::PortalSettings;
use crate::error::PortalError;
use crate::models::SearchOutcome;
use crate::parser::blocks;

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

pub const QUERY_FIELD: &str = "dadosConsulta.pesquisaLivre";
pub const START_FIELD: &str = "dadosConsulta.dtInicio";
pub const END_FIELD: &str = "dadosConsulta.dtFim";
pub const CATEGORY_FIELD: &str = "dadosConsulta.cdCaderno";
/// "Todos os cadernos".
pub const ALL_CATEGORIES: &str = "-11";

static FORM_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("form").unwrap());
static QUERY_INPUT_SEL: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(&format!("input[name=\"{}\"]", QUERY_FIELD)).unwrap()
});
static HIDDEN_INPUT_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("input[type=\"hidden\"][name]").unwrap());
static CATEGORY_SEL: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(&format!("select[name=\"{}\"]", CATEGORY_FIELD)).unwrap()
});

pub struct DjePortal {
    settings: PortalSettings,
}

impl DjePortal {
    pub fn new(settings: PortalSettings) -> Self {
        DjePortal { settings }
    }
}

#[async_trait]
impl Portal for DjePortal {
    async fn open_session(&self) -> Result<Box<dyn PortalSession>, PortalError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8"),
        );
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("pt-BR,pt;q=0.9"));

        let client = Client::builder()
            .cookie_store(true)
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .connect_timeout(self.settings.navigation_timeout)
            .timeout(self.settings.navigation_timeout)
            .build()
            .map_err(PortalError::Client)?;

        info!("Opened portal session for {}", self.settings.search_url);
        Ok(Box::new(DjeSession {
            client: Some(client),
            settings: self.settings.clone(),
            searches: 0,
        }))
    }
}

struct DjeSession {
    client: Option<Client>,
    settings: PortalSettings,
    searches: usize,
}

#[async_trait]
impl PortalSession for DjeSession {
    async fn search(&mut self, query: &SearchQuery) -> Result<SearchOutcome, PortalError> {
        let client = self.client.as_ref().ok_or(PortalError::Closed)?;
        self.searches += 1;
        let search_url = &self.settings.search_url;

        let form_html = fetch_text(
            client.get(search_url.clone()),
            search_url,
            self.settings.navigation_timeout,
            "search form",
        )
        .await?;
        let form = parse_search_form(&form_html, search_url)?;

        debug!(
            "Submitting \"{}\" for {} to {}",
            query.term,
            query.end_br(),
            form.action
        );
        let request = client
            .post(form.action.clone())
            .header(REFERER, search_url.as_str())
            .form(&form.fields(query));
        let page = fetch_text(
            request,
            &form.action,
            self.settings.result_timeout,
            "search results",
        )
        .await?;

        Ok(blocks::read_result_page(&page))
    }

    async fn close(&mut self) {
        if self.client.take().is_some() {
            info!("Closed portal session after {} search(es)", self.searches);
        }
    }
}

/// The advanced-search form as currently served by the portal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchForm {
    pub action: Url,
    pub hidden: Vec<(String, String)>,
    pub has_category_select: bool,
}

impl SearchForm {
    /// Hidden inputs first, then the query, date range and category.
    pub fn fields(&self, query: &SearchQuery) -> Vec<(String, String)> {
        let mut fields = self.hidden.clone();
        fields.push((QUERY_FIELD.to_string(), query.term.clone()));
        fields.push((START_FIELD.to_string(), query.start_br()));
        fields.push((END_FIELD.to_string(), query.end_br()));
        if self.has_category_select {
            fields.push((CATEGORY_FIELD.to_string(), ALL_CATEGORIES.to_string()));
        }
        fields
    }
}

/// Locate the form that owns the free-text input.
pub fn parse_search_form(html: &str, page_url: &Url) -> Result<SearchForm, PortalError> {
    let document = Html::parse_document(html);
    let form = document
        .select(&FORM_SEL)
        .find(|f| f.select(&QUERY_INPUT_SEL).next().is_some())
        .ok_or(PortalError::MissingFormField(QUERY_FIELD))?;

    let action = match form.value().attr("action").map(str::trim) {
        Some(a) if !a.is_empty() => page_url
            .join(a)
            .map_err(|_| PortalError::InvalidAction(a.to_string()))?,
        _ => page_url.clone(),
    };

    Ok(SearchForm {
        action,
        hidden: hidden_inputs(&form),
        has_category_select: form.select(&CATEGORY_SEL).next().is_some(),
    })
}

fn hidden_inputs(form: &ElementRef<'_>) -> Vec<(String, String)> {
    form.select(&HIDDEN_INPUT_SEL)
        .filter_map(|input| {
            let name = input.value().attr("name")?;
            if matches!(name, QUERY_FIELD | START_FIELD | END_FIELD | CATEGORY_FIELD) {
                return None;
            }
            let value = input.value().attr("value").unwrap_or_default();
            Some((name.to_string(), value.to_string()))
        })
        .collect()
}

/// Send and read the body under one deadline; non-2xx is an error.
async fn fetch_text(
    request: RequestBuilder,
    url: &Url,
    limit: Duration,
    stage: &'static str,
) -> Result<String, PortalError> {
    let start = Instant::now();
    let result = tokio::time::timeout(limit, async {
        let response = request.send().await?.error_for_status()?;
        response.text().await
    })
    .await;

    match result {
        Err(_) => Err(PortalError::Timeout {
            stage,
            secs: limit.as_secs(),
        }),
        Ok(Err(e)) => Err(match e.status() {
            Some(status) => PortalError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            },
            None => PortalError::Request {
                url: url.to_string(),
                source: e,
            },
        }),
        Ok(Ok(body)) => {
            debug!(
                "Loaded {} in {}ms ({} chars)",
                stage,
                start.elapsed().as_millis(),
                body.len()
            );
            Ok(body)
        }
    }
}

// ── Tests ──
