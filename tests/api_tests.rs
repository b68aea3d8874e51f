//! Integration tests for the HTTP service
//!
//! These tests serve the real router on an ephemeral port, with wiremock
//! standing in for the remote product pages, and exercise the full cycle
//! end-to-end.

use shelf_scout::config::FetcherConfig;
use shelf_scout::scrape::{build_http_client, ItemResult};
use shelf_scout::server::{router, AppState};
use std::time::{Duration, Instant};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const PRODUCT_PAGE: &str = r#"<html><body>
    <span id="productTitle"> My Product </span>
    <div id="buyNewSection"><span class="offer-price">£8.49</span></div>
    <div id="leftCol">
        <img data-a-dynamic-image='{"https://a/x.jpg":[100,100],"https://a/y.jpg":[300,200]}' />
    </div>
    <div id="availability"> In stock. </div>
</body></html>"#;

/// Serves the app on an ephemeral port and returns its base URL
async fn spawn_app() -> String {
    let client = build_http_client(&FetcherConfig::default()).expect("build client");
    let state = AppState::new(client);
    let app = router(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind listener");
    let addr = listener.local_addr().expect("local addr");

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve");
    });

    format!("http://{}", addr)
}

/// Mounts the reference product page at /product
async fn mount_product_page(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/product"))
        .respond_with(ResponseTemplate::new(200).set_body_string(PRODUCT_PAGE))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_sync_batch_end_to_end() {
    let upstream = MockServer::start().await;
    mount_product_page(&upstream).await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&upstream)
        .await;

    let base = spawn_app().await;
    let client = reqwest::Client::new();

    let urls = vec![
        format!("{}/product", upstream.uri()),
        "not-a-url".to_string(),
        format!("{}/missing", upstream.uri()),
    ];

    let response = client.post(&base).json(&urls).send().await.expect("request");
    assert_eq!(response.status(), 200);

    let results: Vec<ItemResult> = response.json().await.expect("parse body");
    assert_eq!(results.len(), 3);

    // Item 0: fully extracted product record.
    assert_eq!(results[0].url, urls[0]);
    let meta = results[0].meta.as_ref().expect("meta on success");
    assert_eq!(meta.title, "My Product");
    assert_eq!(meta.price, "£8.49");
    assert_eq!(meta.image, "https://a/y.jpg");
    assert!(meta.in_stock);
    assert!(results[0].error.is_none());

    // Item 1: invalid URL, failure localized to this item.
    assert_eq!(results[1].url, urls[1]);
    assert!(results[1].meta.is_none());
    assert!(results[1].error.is_some());

    // Item 2: non-200 status surfaces as the reason phrase.
    assert_eq!(results[2].url, urls[2]);
    assert!(results[2].meta.is_none());
    assert_eq!(results[2].error.as_deref(), Some("Not Found"));
}

#[tokio::test]
async fn test_async_job_matches_sync_path() {
    let upstream = MockServer::start().await;
    mount_product_page(&upstream).await;

    let base = spawn_app().await;
    let client = reqwest::Client::new();
    let urls = vec![format!("{}/product", upstream.uri()), "bad url".to_string()];

    let submit = client
        .post(format!("{}/order-42", base))
        .json(&urls)
        .send()
        .await
        .expect("submit");
    assert_eq!(submit.status(), 201);

    let collect = client
        .get(format!("{}/order-42", base))
        .send()
        .await
        .expect("collect");
    assert_eq!(collect.status(), 200);
    let async_results: Vec<ItemResult> = collect.json().await.expect("parse body");

    let sync_results: Vec<ItemResult> = client
        .post(&base)
        .json(&urls)
        .send()
        .await
        .expect("sync request")
        .json()
        .await
        .expect("parse sync body");

    assert_eq!(async_results, sync_results);

    // Consume-once: the id is gone now.
    let again = client
        .get(format!("{}/order-42", base))
        .send()
        .await
        .expect("second collect");
    assert_eq!(again.status(), 404);
}

#[tokio::test]
async fn test_duplicate_submit_conflicts() {
    let base = spawn_app().await;
    let client = reqwest::Client::new();
    let urls: Vec<String> = vec![];

    let first = client
        .post(format!("{}/dup", base))
        .json(&urls)
        .send()
        .await
        .expect("first submit");
    assert_eq!(first.status(), 201);

    let second = client
        .post(format!("{}/dup", base))
        .json(&urls)
        .send()
        .await
        .expect("second submit");
    assert_eq!(second.status(), 409);

    // The original job survived the collision and is collectable once.
    let collect = client
        .get(format!("{}/dup", base))
        .send()
        .await
        .expect("collect");
    assert_eq!(collect.status(), 200);
    let results: Vec<ItemResult> = collect.json().await.expect("parse body");
    assert!(results.is_empty());
}

#[tokio::test]
async fn test_collect_unknown_id_is_immediate_404() {
    let base = spawn_app().await;
    let client = reqwest::Client::new();

    let response = client
        .get(format!("{}/never-submitted", base))
        .send()
        .await
        .expect("collect");
    assert_eq!(response.status(), 404);
}

#[tokio::test]
async fn test_collect_blocks_until_job_completes() {
    let upstream = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(PRODUCT_PAGE)
                .set_delay(Duration::from_millis(300)),
        )
        .mount(&upstream)
        .await;

    let base = spawn_app().await;
    let client = reqwest::Client::new();
    let urls = vec![format!("{}/slow", upstream.uri())];

    let submit = client
        .post(format!("{}/slow-job", base))
        .json(&urls)
        .send()
        .await
        .expect("submit");
    assert_eq!(submit.status(), 201);

    // The collect must suspend until the slow upstream has answered.
    let started = Instant::now();
    let collect = client
        .get(format!("{}/slow-job", base))
        .send()
        .await
        .expect("collect");
    assert_eq!(collect.status(), 200);
    assert!(
        started.elapsed() >= Duration::from_millis(250),
        "collect returned before the job could have completed"
    );

    let results: Vec<ItemResult> = collect.json().await.expect("parse body");
    assert_eq!(results.len(), 1);
    assert!(results[0].meta.is_some());
}

#[tokio::test]
async fn test_malformed_body_rejected() {
    let base = spawn_app().await;
    let client = reqwest::Client::new();

    // Sync path: a JSON object is not a list of URLs.
    let sync = client
        .post(&base)
        .header("content-type", "application/json")
        .body(r#"{"not": "a list"}"#)
        .send()
        .await
        .expect("sync request");
    assert_eq!(sync.status(), 400);

    // Submit path: a bare number is not a list of URLs.
    let submit = client
        .post(format!("{}/bad-body", base))
        .header("content-type", "application/json")
        .body("42")
        .send()
        .await
        .expect("submit request");
    assert_eq!(submit.status(), 400);

    // The malformed submit must not have registered a job.
    let collect = client
        .get(format!("{}/bad-body", base))
        .send()
        .await
        .expect("collect");
    assert_eq!(collect.status(), 404);
}
