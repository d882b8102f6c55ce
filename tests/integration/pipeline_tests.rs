//! Integration tests for the fetch pipeline
//!
//! These tests use wiremock to create mock HTTP servers and drive the real
//! HTTP processor through the job queue end-to-end.

use bracket_fetch::config::{HttpConfig, Secret};
use bracket_fetch::processor::{hash_email, HttpUrlProcessor};
use bracket_fetch::queue::{CollectingSink, FetchJobQueue, QueueOptions, RetryPolicy};
use bracket_fetch::runner::Runner;
use bracket_fetch::Lifecycle;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SECRET: &str = "secret";

/// Builds a queue around the real HTTP processor with short test timings
fn create_test_queue() -> (FetchJobQueue, Arc<CollectingSink>) {
    let http = HttpConfig {
        timeout_secs: 5,
        connect_timeout_secs: 2,
        ..HttpConfig::default()
    };
    let processor = HttpUrlProcessor::new(&http, Secret::new(SECRET).unwrap()).unwrap();
    let sink = Arc::new(CollectingSink::new());

    let options = QueueOptions {
        rate_limit: Duration::from_millis(10),
        retry_policy: RetryPolicy::fixed(1, Duration::from_millis(50)),
    };
    let queue = FetchJobQueue::with_options(Arc::new(processor), sink.clone(), options);
    (queue, sink)
}

async fn drain(queue: &FetchJobQueue) {
    tokio::time::timeout(Duration::from_secs(10), queue.wait_until_drained())
        .await
        .expect("queue did not drain in time");
}

fn html_page(title: &str, body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_string(format!(
            "<html><head><title>{}</title></head><body>{}</body></html>",
            title, body
        ))
        .insert_header("content-type", "text/html")
}

#[tokio::test]
async fn test_title_and_email_hash() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/about"))
        .respond_with(html_page(
            "About Us",
            "<p>Write to example@example.com for details.</p>",
        ))
        .expect(1)
        .mount(&mock_server)
        .await;

    let (queue, sink) = create_test_queue();
    let url = format!("{}/about", mock_server.uri());
    queue.handle_chunk(&format!("see [ our page {} ] today", url));
    drain(&queue).await;

    let results = sink.successes();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].url, url);
    assert_eq!(results[0].title.as_deref(), Some("About Us"));
    assert_eq!(
        results[0].email_hash.as_deref(),
        Some(hash_email("example@example.com", SECRET).as_str())
    );
    assert!(sink.failures().is_empty());
}

#[tokio::test]
async fn test_page_without_title_or_email() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/plain"))
        .respond_with(ResponseTemplate::new(200).set_body_string("just some text"))
        .mount(&mock_server)
        .await;

    let (queue, sink) = create_test_queue();
    queue.handle_chunk(&format!("[ {}/plain ]", mock_server.uri()));
    drain(&queue).await;

    let results = sink.successes();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].title, None);
    assert_eq!(results[0].email_hash, None);

    let line = serde_json::to_string(&results[0]).unwrap();
    assert_eq!(line, format!(r#"{{"url":"{}/plain"}}"#, mock_server.uri()));
}

#[tokio::test]
async fn test_http_error_retried_once() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/broken"))
        .respond_with(ResponseTemplate::new(500))
        .expect(2)
        .mount(&mock_server)
        .await;

    let (queue, sink) = create_test_queue();
    let url = format!("{}/broken", mock_server.uri());
    queue.handle_chunk(&format!("[ {} ]", url));
    drain(&queue).await;

    let expected = format!("[ERROR] {} -> HTTP 500", url);
    assert_eq!(sink.failures(), vec![expected.clone(), expected]);
    assert!(sink.successes().is_empty());

    let stats = queue.stats();
    assert_eq!(stats.dispatched, 2);
    assert_eq!(stats.retries_scheduled, 1);
    assert_eq!(stats.dropped, 1);
}

#[tokio::test]
async fn test_retry_recovers_after_transient_error() {
    let mock_server = MockServer::start().await;

    // Mounted first so it answers the first request only
    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(html_page("Back Again", ""))
        .mount(&mock_server)
        .await;

    let (queue, sink) = create_test_queue();
    let url = format!("{}/flaky", mock_server.uri());
    queue.handle_chunk(&format!("[ {} ]", url));
    drain(&queue).await;

    assert_eq!(sink.failures(), vec![format!("[ERROR] {} -> HTTP 503", url)]);

    let results = sink.successes();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].title.as_deref(), Some("Back Again"));
}

#[tokio::test]
async fn test_network_error() {
    let (queue, sink) = create_test_queue();
    queue.handle_chunk("[ http://127.0.0.1:1/unreachable ]");
    drain(&queue).await;

    let failures = sink.failures();
    assert_eq!(failures.len(), 2);
    for line in &failures {
        assert!(
            line.starts_with("[ERROR] http://127.0.0.1:1/unreachable -> Network error"),
            "unexpected error line: {}",
            line
        );
    }
    assert!(sink.successes().is_empty());
}

#[tokio::test]
async fn test_duplicate_urls_fetched_once() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/once"))
        .respond_with(html_page("Once", ""))
        .expect(1)
        .mount(&mock_server)
        .await;

    let (queue, sink) = create_test_queue();
    let url = format!("{}/once", mock_server.uri());
    queue.handle_chunk(&format!("[ {} ] and again [ {} ]", url, url));
    drain(&queue).await;
    queue.handle_chunk(&format!("later [ {} ]", url));
    drain(&queue).await;

    assert_eq!(sink.successes().len(), 1);
    assert_eq!(queue.stats().duplicates, 2);
}

#[tokio::test]
async fn test_failure_does_not_affect_other_urls() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/bad"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/good"))
        .respond_with(html_page("Good", "contact: team@example.org"))
        .mount(&mock_server)
        .await;

    let (queue, sink) = create_test_queue();
    let base = mock_server.uri();
    queue.handle_chunk(&format!("[ {}/bad ] [ {}/good ]", base, base));
    drain(&queue).await;

    let results = sink.successes();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].url, format!("{}/good", base));
    assert_eq!(
        results[0].email_hash.as_deref(),
        Some(hash_email("team@example.org", SECRET).as_str())
    );
    assert_eq!(sink.failures().len(), 2);
}

#[tokio::test]
async fn test_runner_streams_text() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/one"))
        .respond_with(html_page("One", ""))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/two"))
        .respond_with(html_page("Two", ""))
        .mount(&mock_server)
        .await;

    let (queue, sink) = create_test_queue();
    let runner = Runner::new(queue.clone());
    let base = mock_server.uri();
    let text = format!(
        "First link [ {}/one ]\nsecond one spans [ lines,\nsee {}/two ]\n",
        base, base
    );

    let lines = runner.pump(text.as_bytes(), false).await.unwrap();
    assert_eq!(lines, 3);

    let mut titles: Vec<String> = sink
        .successes()
        .into_iter()
        .filter_map(|info| info.title)
        .collect();
    titles.sort();
    assert_eq!(titles, vec!["One", "Two"]);
    assert_eq!(queue.lifecycle(), Lifecycle::Idle);
}

#[tokio::test]
async fn test_shutdown_rejects_new_urls() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(html_page("Any", ""))
        .expect(0)
        .mount(&mock_server)
        .await;

    let (queue, sink) = create_test_queue();
    queue.shutdown();
    queue.handle_chunk(&format!("[ {}/late ]", mock_server.uri()));
    drain(&queue).await;

    assert!(sink.successes().is_empty());
    assert_eq!(queue.lifecycle(), Lifecycle::Stopped);
    assert_eq!(queue.stats().rejected, 1);
}
