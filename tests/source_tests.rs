//! Fetch/cache/coalescing behavior of `SummarySource`.

mod helpers;

use std::sync::Arc;

use helpers::{action_missing, action_page, rest_summary, MockTransport};
use wikilookup::{Error, SourceConfig, SummarySource, TransportError};

fn source_with(transport: Arc<MockTransport>, config: SourceConfig) -> SummarySource {
    helpers::init_test_logging();
    SummarySource::new(config, transport)
}

fn default_source(transport: Arc<MockTransport>) -> SummarySource {
    source_with(transport, SourceConfig::default())
}

#[tokio::test]
async fn concurrent_callers_share_one_network_call() {
    let transport = Arc::new(MockTransport::returning(action_page("Rust")).with_delay_ms(50));
    let source = default_source(Arc::clone(&transport));

    let (a, b) = tokio::join!(
        source.get_page_info("Rust", None),
        source.get_page_info("Rust", None),
    );

    assert_eq!(transport.calls(), 1);
    let a = a.unwrap();
    let b = b.unwrap();
    assert_eq!(a, b);
    assert_eq!(a.title, "Rust");
}

#[tokio::test]
async fn cache_fast_path_skips_the_network() {
    let transport = Arc::new(MockTransport::returning(action_page("Rust")));
    let source = default_source(Arc::clone(&transport));

    source.get_page_info("Rust", None).await.unwrap();
    let cached = source.get_page_info("Rust", None).await.unwrap();

    assert_eq!(transport.calls(), 1);
    assert_eq!(cached.title, "Rust");
}

#[tokio::test]
async fn key_normalization_collapses_spelling_variants() {
    let transport = Arc::new(MockTransport::returning(action_page("Page Name")));
    let source = default_source(Arc::clone(&transport));

    source.get_page_info(" Page Name ", None).await.unwrap();
    source.get_page_info("page name", None).await.unwrap();
    source.get_page_info("PAGE NAME", None).await.unwrap();

    assert_eq!(transport.calls(), 1);
}

#[tokio::test]
async fn languages_are_cached_separately() {
    let transport = Arc::new(MockTransport::returning(action_page("Rust")));
    let source = default_source(Arc::clone(&transport));

    source.get_page_info("Rust", None).await.unwrap();
    source.get_page_info("Rust", Some("he")).await.unwrap();

    assert_eq!(transport.calls(), 2);
}

#[tokio::test]
async fn failures_are_never_cached() {
    let transport = Arc::new(MockTransport::scripted(vec![
        Err(TransportError::Status(500)),
        Ok(action_page("Rust")),
    ]));
    let source = default_source(Arc::clone(&transport));

    let first = source.get_page_info("Rust", None).await;
    assert!(matches!(first, Err(Error::Fetch(_))));

    // the errored key is retried, not served from the cache
    let second = source.get_page_info("Rust", None).await.unwrap();
    assert_eq!(second.title, "Rust");
    assert_eq!(transport.calls(), 2);
}

#[tokio::test]
async fn missing_page_is_distinguishable_from_fetch_failure() {
    let transport = Arc::new(MockTransport::scripted(vec![
        Ok(action_missing("Ghost")),
        Err(TransportError::Network("unreachable".into())),
    ]));
    let source = default_source(Arc::clone(&transport));

    let missing = source.get_page_info("Ghost", None).await;
    assert_eq!(missing, Err(Error::MissingPage("Ghost".to_string())));

    let failed = source.get_page_info("Other", None).await;
    assert!(matches!(failed, Err(Error::Fetch(_))));
}

#[tokio::test]
async fn action_api_request_targets_the_language_endpoint() {
    let transport = Arc::new(MockTransport::returning(action_page("Rust")));
    let source = default_source(Arc::clone(&transport));

    source.get_page_info("Rust lang", Some("he")).await.unwrap();

    let requests = transport.requests();
    assert_eq!(requests.len(), 1);
    let (url, query) = &requests[0];
    assert_eq!(url, "https://he.wikipedia.org/w/api.php");
    // page name passed as a query field when the base URL has no token
    assert!(query.contains(&("titles".to_string(), "Rust lang".to_string())));
    assert!(query.contains(&("action".to_string(), "query".to_string())));
}

#[tokio::test]
async fn custom_base_url_embeds_the_page_name() {
    let transport = Arc::new(MockTransport::returning(action_page("Rust")));
    let source = source_with(
        Arc::clone(&transport),
        SourceConfig {
            base_url: Some("https://{{lang}}.wikipedia.org/w/api.php?title={{pageName}}".into()),
            ..Default::default()
        },
    );

    source.get_page_info("Foo bar", Some("he")).await.unwrap();

    let requests = transport.requests();
    let (url, query) = &requests[0];
    assert_eq!(url, "https://he.wikipedia.org/w/api.php?title=Foo%20bar");
    // no titles field when the page name is embedded in the URL
    assert!(!query.iter().any(|(k, _)| k == "titles"));
}

#[tokio::test]
async fn restbase_mode_uses_the_summary_path() {
    let transport = Arc::new(MockTransport::returning(rest_summary("Foo bar")));
    let source = source_with(
        Arc::clone(&transport),
        SourceConfig {
            use_restbase: true,
            ..Default::default()
        },
    );

    let summary = source.get_page_info("Foo bar", None).await.unwrap();
    assert_eq!(summary.title, "Foo bar");
    assert_eq!(summary.url, "https://en.wikipedia.org/wiki/Foo bar");

    let requests = transport.requests();
    let (url, query) = &requests[0];
    assert_eq!(
        url,
        "https://en.wikipedia.org/api/rest_v1/page/summary/Foo%20bar"
    );
    assert!(query.is_empty());
}

#[tokio::test]
async fn coalesced_callers_all_observe_the_failure() {
    let transport = Arc::new(
        MockTransport::scripted(vec![Err(TransportError::Status(503))]).with_delay_ms(50),
    );
    let source = default_source(Arc::clone(&transport));

    let (a, b) = tokio::join!(
        source.get_page_info("Rust", None),
        source.get_page_info("Rust", None),
    );

    assert_eq!(transport.calls(), 1);
    assert!(matches!(a, Err(Error::Fetch(_))));
    assert!(matches!(b, Err(Error::Fetch(_))));
}
