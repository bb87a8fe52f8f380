//! Fetcher tests: chunked batch retrieval through the default trait method.

mod common;

use std::time::{Duration, Instant};

use common::MockFetcher;
use lexiload::fetch::{FetchRequest, ResourceFetcher};

fn requests(namespaces: &[&str]) -> Vec<FetchRequest> {
    namespaces
        .iter()
        .map(|ns| FetchRequest::new("en", ns))
        .collect()
}

fn namespaces(loaded: &[(FetchRequest, lexiload::cache::ResourceBundle)]) -> Vec<String> {
    loaded.iter().map(|(req, _)| req.namespace.clone()).collect()
}

// =============================================================================
// Batch Tests
// =============================================================================

#[tokio::test]
async fn failed_request_is_omitted_without_cancelling_others() {
    let fetcher = MockFetcher::new();
    fetcher.fail("b");

    let loaded = fetcher
        .fetch_batch(&requests(&["a", "b", "c", "d", "e"]), 2)
        .await;

    assert_eq!(namespaces(&loaded), vec!["a", "c", "d", "e"]);
    assert_eq!(fetcher.fetch_order(), vec!["a", "b", "c", "d", "e"]);
    assert_eq!(fetcher.total_calls(), 5);

    let (req, bundle) = &loaded[1];
    assert_eq!(req, &FetchRequest::new("en", "c"));
    assert_eq!(bundle.version_tag, "v-c");
}

#[tokio::test]
async fn chunks_run_one_after_another() {
    let delay = Duration::from_millis(20);
    let fetcher = MockFetcher::with_delay(delay);

    let started = Instant::now();
    let loaded = fetcher
        .fetch_batch(&requests(&["a", "b", "c", "d", "e"]), 2)
        .await;

    assert_eq!(loaded.len(), 5);
    // Three chunks, each bounded below by one fetch delay.
    assert!(started.elapsed() >= delay * 3);
    assert_eq!(fetcher.fetch_order(), vec!["a", "b", "c", "d", "e"]);
}

#[tokio::test]
async fn zero_limit_fetches_one_at_a_time() {
    let fetcher = MockFetcher::new();

    let loaded = fetcher.fetch_batch(&requests(&["x", "y"]), 0).await;
    assert_eq!(namespaces(&loaded), vec!["x", "y"]);
}

#[tokio::test]
async fn empty_batch_makes_no_requests() {
    let fetcher = MockFetcher::new();

    assert!(fetcher.fetch_batch(&[], 4).await.is_empty());
    assert_eq!(fetcher.total_calls(), 0);
}
