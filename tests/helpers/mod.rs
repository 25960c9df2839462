//! Shared test helpers: a scriptable in-memory transport and canned
//! upstream response bodies.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};
use wikilookup::{Transport, TransportError};

/// One recorded request: resolved URL plus query pairs.
pub type RecordedRequest = (String, Vec<(String, String)>);

/// Initialize test logging.
///
/// Safe to call from every test; initialization may fail if another test
/// already installed the subscriber, which is fine.
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "wikilookup=debug".into()),
        )
        .with_test_writer()
        .try_init();
}

/// In-memory transport. Responses are served from a queue first, then from
/// the fallback value; every call is counted and recorded.
pub struct MockTransport {
    calls: AtomicUsize,
    queue: Mutex<VecDeque<Result<Value, TransportError>>>,
    fallback: Option<Value>,
    delay_ms: u64,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl MockTransport {
    /// Serve `value` for every request.
    pub fn returning(value: Value) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            queue: Mutex::new(VecDeque::new()),
            fallback: Some(value),
            delay_ms: 0,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Serve scripted responses in order; error once exhausted.
    pub fn scripted(responses: Vec<Result<Value, TransportError>>) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            queue: Mutex::new(responses.into()),
            fallback: None,
            delay_ms: 0,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Delay each response, so concurrent callers overlap deterministically.
    pub fn with_delay_ms(mut self, delay_ms: u64) -> Self {
        self.delay_ms = delay_ms;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn get_json(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<Value, TransportError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push((
            url.to_string(),
            query.iter().map(|(k, v)| (k.to_string(), v.clone())).collect(),
        ));

        if self.delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(self.delay_ms)).await;
        }

        let queued = self.queue.lock().unwrap().pop_front();
        match queued {
            Some(response) => response,
            None => self
                .fallback
                .clone()
                .ok_or_else(|| TransportError::Network("mock transport exhausted".into())),
        }
    }
}

/// Well-formed action-API response for one page.
pub fn action_page(title: &str) -> Value {
    json!({
        "query": {
            "pages": {
                "42": {
                    "title": title,
                    "extract": format!("{title} is a page."),
                    "canonicalurl": format!("https://en.wikipedia.org/wiki/{title}"),
                    "fullurl": format!("https://en.wikipedia.org/wiki/{title}")
                }
            }
        }
    })
}

/// Action-API response carrying the missing-page marker.
pub fn action_missing(title: &str) -> Value {
    json!({
        "query": {
            "pages": {
                "-1": { "title": title, "missing": "" }
            }
        }
    })
}

/// Well-formed REST summary response.
pub fn rest_summary(title: &str) -> Value {
    json!({
        "type": "standard",
        "displaytitle": title,
        "extract": format!("{title} is a page."),
        "content_urls": {
            "desktop": {
                "page": format!("https://en.wikipedia.org/wiki/{title}"),
                "revisions": format!("https://en.wikipedia.org/wiki/{title}?action=history")
            }
        }
    })
}
