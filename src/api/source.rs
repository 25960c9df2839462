//! Summary source: fetch, normalize, cache, coalesce
//!
//! One [`SummarySource`] per named source configuration. Each instance owns
//! its cache and in-flight table; nothing else mutates them. The cache is
//! append-only for the life of the source — entries are terminal once set,
//! and failures are never cached, so an errored key is retried on the next
//! call.

use std::collections::HashMap;
use std::sync::Arc;

use once_cell::sync::Lazy;
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use regex::Regex;
use serde_json::Value;
use tokio::sync::{watch, Mutex};

use crate::api::schema::{ActionApiPage, ActionApiResponse, RestSummary, REST_NOT_FOUND_TYPE};
use crate::api::transport::Transport;
use crate::config::SourceConfig;
use crate::error::{Error, Result};
use crate::key::cache_key;
use crate::summary::{Branding, PageSummary};

/// Default action-API endpoint template
const ACTION_API_DEFAULT: &str = "https://{{lang}}.wikipedia.org/w/api.php";
/// Default REST summary endpoint template
const RESTBASE_DEFAULT: &str = "https://{{lang}}.wikipedia.org/api/rest_v1/page/summary/{{pageName}}";

const LANG_TOKEN: &str = "{{lang}}";
const PAGE_TOKEN: &str = "{{pageName}}";

/// Matches the encyclopedia's own domain: `https://<anything>.wikipedia.org`.
/// Template tokens count as `<anything>`, so the default base URLs match.
static WIKIPEDIA_DOMAIN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^https://[^/]+\.wikipedia\.org(/|$)").unwrap());

/// Outcome shared with every caller coalesced onto one in-flight request
type FetchOutcome = std::result::Result<PageSummary, Error>;

/// Per-key shared state: the cache and the in-flight table.
///
/// An in-flight entry exists exactly while a network call for that key is
/// outstanding; it is removed unconditionally before any waiter observes
/// the outcome.
#[derive(Default)]
struct SourceState {
    cache: HashMap<String, PageSummary>,
    in_flight: HashMap<String, watch::Receiver<Option<FetchOutcome>>>,
}

/// A configured summary source: owns its cache, coalesces concurrent
/// fetches per cache key, and normalizes both upstream response shapes
/// into [`PageSummary`].
pub struct SummarySource {
    base_url: String,
    lang: String,
    use_restbase: bool,
    branding: Branding,
    wikipedia: bool,
    transport: Arc<dyn Transport>,
    state: Mutex<SourceState>,
}

impl SummarySource {
    pub fn new(config: SourceConfig, transport: Arc<dyn Transport>) -> Self {
        let base_url = config.base_url.unwrap_or_else(|| {
            if config.use_restbase {
                RESTBASE_DEFAULT.to_string()
            } else {
                ACTION_API_DEFAULT.to_string()
            }
        });
        // Computed once here, not re-evaluated per request.
        let wikipedia = WIKIPEDIA_DOMAIN.is_match(&base_url);

        Self {
            base_url,
            lang: config.lang,
            use_restbase: config.use_restbase,
            branding: Branding {
                logo: config.logo,
                title: config.name,
            },
            wikipedia,
            transport,
            state: Mutex::new(SourceState::default()),
        }
    }

    /// Default language used when a caller supplies none.
    pub fn default_lang(&self) -> &str {
        &self.lang
    }

    /// Whether this source's base URL is a *.wikipedia.org domain.
    pub fn is_wikipedia(&self) -> bool {
        self.wikipedia
    }

    /// Fetch the canonical summary for a page.
    ///
    /// Resolves from the cache when possible (no network call), joins an
    /// outstanding request for the same key when one exists, and otherwise
    /// dispatches exactly one network call whose outcome every concurrent
    /// caller for that key observes. Fails with [`Error::MissingPage`] when
    /// the page does not exist upstream and [`Error::Fetch`] on any
    /// transport or parse failure.
    pub async fn get_page_info(&self, page_name: &str, lang: Option<&str>) -> Result<PageSummary> {
        let lang = match lang {
            Some(l) if !l.trim().is_empty() => l.trim().to_string(),
            _ => self.lang.clone(),
        };
        let key = cache_key(page_name, &lang);

        let tx = {
            let mut state = self.state.lock().await;

            if let Some(hit) = state.cache.get(&key) {
                tracing::debug!(key = %key, "cache hit");
                return Ok(hit.clone());
            }

            if let Some(rx) = state.in_flight.get(&key) {
                let mut rx = rx.clone();
                drop(state);
                tracing::debug!(key = %key, "joining in-flight request");
                loop {
                    let published: Option<FetchOutcome> = (*rx.borrow_and_update()).clone();
                    if let Some(outcome) = published {
                        return outcome;
                    }
                    if rx.changed().await.is_err() {
                        // The leading task was dropped before publishing.
                        // Clear the stale entry so the next caller can
                        // start a fresh request.
                        let mut state = self.state.lock().await;
                        if let Some(existing) = state.in_flight.get(&key) {
                            if existing.has_changed().is_err() {
                                state.in_flight.remove(&key);
                            }
                        }
                        return Err(Error::Fetch(format!("request for {key} was abandoned")));
                    }
                }
            }

            let (tx, rx) = watch::channel(None);
            state.in_flight.insert(key.clone(), rx);
            tx
        };

        tracing::debug!(key = %key, page = %page_name, lang = %lang, "dispatching fetch");
        let outcome = self.fetch(page_name, &lang).await;

        {
            let mut state = self.state.lock().await;
            // The in-flight entry must be gone before any waiter observes
            // the outcome: a caller arriving after this lock drops either
            // hits the cache (success) or leads a fresh request (failure).
            state.in_flight.remove(&key);
            if let Ok(summary) = &outcome {
                state.cache.insert(key.clone(), summary.clone());
            }
        }
        let _ = tx.send(Some(outcome.clone()));

        match &outcome {
            Ok(summary) => {
                tracing::info!(key = %key, title = %summary.title, "retrieved page summary")
            }
            Err(Error::MissingPage(title)) => {
                tracing::warn!(key = %key, title = %title, "page missing upstream")
            }
            Err(e) => tracing::warn!(key = %key, error = %e, "fetch failed"),
        }

        outcome
    }

    async fn fetch(&self, page_name: &str, lang: &str) -> FetchOutcome {
        let raw = if self.use_restbase {
            let (url, _) = self.resolve_url(page_name, lang);
            self.transport.get_json(&url, &[]).await?
        } else {
            let (url, page_in_path) = self.resolve_url(page_name, lang);
            let params =
                self.action_api_params(if page_in_path { None } else { Some(page_name) });
            self.transport.get_json(&url, &params).await?
        };
        self.process_api_result(&raw)
    }

    /// Substitute `{{lang}}` and `{{pageName}}` into the base URL template.
    /// Returns the resolved URL and whether the page name was embedded.
    fn resolve_url(&self, page_name: &str, lang: &str) -> (String, bool) {
        let url = self.base_url.replace(LANG_TOKEN, &escape(lang));
        let page_in_path = url.contains(PAGE_TOKEN);
        let url = if page_in_path {
            url.replace(PAGE_TOKEN, &escape(page_name))
        } else {
            url
        };
        (url, page_in_path)
    }

    /// Action-API query requesting page info, thumbnail, and intro extract.
    /// `titles` is only passed when the base URL carried no page-name token.
    fn action_api_params(&self, page_name: Option<&str>) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("action", "query".to_string()),
            ("format", "json".to_string()),
            ("prop", "info|pageimages|extracts".to_string()),
            ("inprop", "url".to_string()),
            ("piprop", "thumbnail".to_string()),
            ("pithumbsize", "300".to_string()),
            ("redirects", "1".to_string()),
            ("exsentences", "5".to_string()),
            ("exintro", "1".to_string()),
            ("explaintext", "1".to_string()),
            ("origin", "*".to_string()),
        ];
        if let Some(title) = page_name {
            params.push(("titles", title.to_string()));
        }
        params
    }

    /// Normalize a raw upstream response into the canonical summary,
    /// dispatching on this source's mode.
    pub fn process_api_result(&self, raw: &Value) -> Result<PageSummary> {
        if raw.is_null() {
            return Err(Error::Fetch("empty response".to_string()));
        }
        if self.use_restbase {
            self.normalize_rest(raw)
        } else {
            self.normalize_action_api(raw)
        }
    }

    fn normalize_action_api(&self, raw: &Value) -> Result<PageSummary> {
        let response: ActionApiResponse = serde_json::from_value(raw.clone())
            .map_err(|e| Error::Fetch(format!("malformed action API response: {e}")))?;
        let pages = response
            .query
            .and_then(|q| q.pages)
            .ok_or_else(|| Error::Fetch("response has no query.pages".to_string()))?;

        // A well-formed response for one title carries exactly one entry;
        // if the upstream ever returns more, any single entry is taken.
        let (_, page): (String, ActionApiPage) = pages
            .into_iter()
            .next()
            .ok_or_else(|| Error::Fetch("query.pages is empty".to_string()))?;

        if page.missing.is_some() {
            return Err(Error::MissingPage(page.title));
        }

        Ok(PageSummary {
            history: format!("{}?action=history", page.full_url),
            title: page.title,
            content: page.extract,
            thumbnail: page.thumbnail.unwrap_or_default(),
            url: page.canonical_url,
            dir: page.page_language_dir.unwrap_or_default(),
            wikipedia: self.wikipedia,
            source: self.branding.clone(),
        })
    }

    fn normalize_rest(&self, raw: &Value) -> Result<PageSummary> {
        let summary: RestSummary = serde_json::from_value(raw.clone())
            .map_err(|e| Error::Fetch(format!("malformed REST summary: {e}")))?;

        if summary.kind.as_deref() == Some(REST_NOT_FOUND_TYPE) {
            return Err(Error::MissingPage(summary.display_title));
        }

        let urls = summary
            .content_urls
            .and_then(|c| c.desktop)
            .unwrap_or_default();

        Ok(PageSummary {
            title: summary.display_title,
            content: summary.extract,
            thumbnail: summary.thumbnail.unwrap_or_default(),
            url: urls.page,
            history: urls.revisions,
            dir: summary.dir.unwrap_or_default(),
            wikipedia: self.wikipedia,
            source: self.branding.clone(),
        })
    }
}

fn escape(value: &str) -> String {
    utf8_percent_encode(value, NON_ALPHANUMERIC).to_string()
}
