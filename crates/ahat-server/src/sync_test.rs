use std::sync::Arc;

use ahat_deals::DealsClient;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::*;
use crate::test_support::FakeStore;

fn deal(id: i64, current: f64, original: f64) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "title": format!("Deal {id}"),
        "category": "Audio",
        "current_price": current,
        "original_price": original,
    })
}

async fn mount_page(server: &MockServer, page: u32, deals: Vec<serde_json::Value>, has_more: bool) {
    Mock::given(method("GET"))
        .and(path("/deals"))
        .and(header("X-API-Key", "live-key"))
        .and(query_param("page", page.to_string()))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "success": true,
            "data": deals,
            "pagination": {"has_more": has_more}
        })))
        .mount(server)
        .await;
}

fn live(server: &MockServer, store: Arc<FakeStore>, max_pages: u32) -> LiveDealProvider {
    let client = DealsClient::with_base_url(5, &server.uri()).expect("client");
    LiveDealProvider::new(client, store, max_pages)
}

#[tokio::test]
async fn mock_sync_generates_requested_count() {
    let outcome = MockDealProvider
        .sync(None, &SyncParams {
            count: Some(3),
            ..SyncParams::default()
        })
        .await
        .unwrap();

    assert_eq!(outcome.synced, 3);
    assert_eq!(outcome.message, Some("Development mode: Mock sync completed"));
    assert!(matches!(outcome.new_products, NewProducts::Generated(ref p) if p.len() == 3));
}

#[tokio::test]
async fn mock_sync_defaults_and_clamps_count() {
    let outcome = MockDealProvider
        .sync(None, &SyncParams::default())
        .await
        .unwrap();
    assert_eq!(outcome.synced, 10);

    let outcome = MockDealProvider
        .sync(None, &SyncParams {
            count: Some(1_000),
            ..SyncParams::default()
        })
        .await
        .unwrap();
    assert_eq!(outcome.synced, 100);
}

#[test]
fn outcome_serializes_new_products_by_variant() {
    let outcome = SyncOutcome {
        synced: 2,
        new_products: NewProducts::Inserted(2),
        updated: 0,
        skipped: 0,
        failed: 0,
        message: None,
    };
    let json = serde_json::to_value(&outcome).unwrap();
    assert_eq!(json["new_products"], 2);
    assert!(json.get("message").is_none());
}

#[tokio::test]
async fn live_sync_tallies_pages_duplicates_and_failures() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        1,
        vec![deal(1, 79.0, 109.99), deal(2, 120.0, 100.0), deal(1, 79.0, 109.99)],
        true,
    )
    .await;
    mount_page(&server, 2, vec![deal(3, 10.0, 20.0)], false).await;

    let store = Arc::new(FakeStore {
        existing: ["SSD-3".to_string()].into_iter().collect(),
        ..FakeStore::default()
    });
    let provider = live(&server, Arc::clone(&store), 5);

    let outcome = provider
        .sync(Some("live-key"), &SyncParams::default())
        .await
        .expect("sync should succeed");

    assert_eq!(outcome.synced, 4);
    assert!(matches!(outcome.new_products, NewProducts::Inserted(1)));
    assert_eq!(outcome.updated, 1);
    assert_eq!(outcome.skipped, 1);
    assert_eq!(outcome.failed, 1);
    assert!(outcome.message.is_none());

    let imports = store.imports.lock().unwrap();
    let ids: Vec<&str> = imports.iter().map(|i| i.id.as_str()).collect();
    assert_eq!(ids, ["SSD-1", "SSD-3"]);

    let syncs = store.syncs.lock().unwrap();
    assert_eq!(syncs.len(), 1);
    assert_eq!(syncs[0].synced, 4);
    assert_eq!(syncs[0].inserted, 1);
}

#[tokio::test]
async fn live_sync_counts_unparseable_deals_as_failed() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        1,
        vec![
            deal(1, 5.0, 10.0),
            serde_json::json!({
                "id": 99,
                "title": "Broken",
                "current_price": null,
                "original_price": 10.0,
            }),
        ],
        false,
    )
    .await;

    let store = Arc::new(FakeStore::default());
    let provider = live(&server, Arc::clone(&store), 5);
    let outcome = provider
        .sync(Some("live-key"), &SyncParams::default())
        .await
        .expect("a bad entry must not fail the run");

    assert_eq!(outcome.synced, 2);
    assert_eq!(outcome.failed, 1);
    assert!(matches!(outcome.new_products, NewProducts::Inserted(1)));
    assert_eq!(store.imports.lock().unwrap().len(), 1);
    assert_eq!(store.syncs.lock().unwrap()[0].failed, 1);
}

#[tokio::test]
async fn live_sync_respects_page_cap() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "success": true,
            "data": [deal(1, 5.0, 10.0)],
            "pagination": {"has_more": true}
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let provider = live(&server, Arc::new(FakeStore::default()), 5);
    let outcome = provider
        .sync(Some("live-key"), &SyncParams {
            max_pages: Some(1),
            ..SyncParams::default()
        })
        .await
        .unwrap();
    assert_eq!(outcome.synced, 1);
}

#[tokio::test]
async fn live_sync_without_key_is_rejected() {
    let server = MockServer::start().await;
    let provider = live(&server, Arc::new(FakeStore::default()), 5);
    let err = provider
        .sync(None, &SyncParams::default())
        .await
        .unwrap_err();
    assert!(matches!(err, SyncError::MissingApiKey));
}

#[tokio::test]
async fn live_sync_surfaces_provider_errors() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
            "success": false,
            "error": "Invalid API key"
        })))
        .mount(&server)
        .await;

    let store = Arc::new(FakeStore::default());
    let provider = live(&server, Arc::clone(&store), 5);
    let err = provider
        .sync(Some("live-key"), &SyncParams::default())
        .await
        .unwrap_err();

    assert!(matches!(err, SyncError::Deals(DealsError::ApiError(_))));
    assert!(store.syncs.lock().unwrap().is_empty(), "failed syncs are not recorded");
}
