// Integration tests for `CatalogClient` using wiremock.
#![allow(clippy::unwrap_used)]

use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use shelf_api::{CatalogClient, Error, ItemId};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, CatalogClient) {
    let server = MockServer::start().await;
    let endpoint = format!("{}/api/products", server.uri());
    let client = CatalogClient::from_reqwest(&endpoint, reqwest::Client::new()).unwrap();
    (server, client)
}

// ── Happy path ──────────────────────────────────────────────────────

#[tokio::test]
async fn test_list_items_preserves_order_and_fields() {
    let (server, client) = setup().await;

    let body = json!([
        { "id": 1, "name": "Earthen Bottle", "price": "48R", "imageAlt": "Porcelain bottle" },
        { "id": 2, "name": "Nomad Tumbler", "price": "35R", "rating": 4.5 },
        { "id": 3, "name": "Focus Paper Refill", "price": "89R" },
    ]);

    Mock::given(method("GET"))
        .and(path("/api/products"))
        .and(header("accept", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(&server)
        .await;

    let items = client.list_items().await.unwrap();

    let ids: Vec<ItemId> = items.iter().map(|i| i.id.clone()).collect();
    assert_eq!(ids, vec![ItemId::Number(1), ItemId::Number(2), ItemId::Number(3)]);
    assert_eq!(items[0].image_alt(), Some("Porcelain bottle"));
    assert_eq!(items[1].fields["rating"], json!(4.5));
}

#[tokio::test]
async fn test_empty_list_is_success() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/products"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    assert!(client.list_items().await.unwrap().is_empty());
}

// ── Error paths ─────────────────────────────────────────────────────

#[tokio::test]
async fn test_server_error_keeps_status_and_body() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/products"))
        .respond_with(
            ResponseTemplate::new(500).set_body_json(json!({ "message": "database offline" })),
        )
        .mount(&server)
        .await;

    let err = client.list_items().await.unwrap_err();
    match err {
        Error::Status {
            status,
            reason,
            body,
        } => {
            assert_eq!(status, 500);
            assert_eq!(reason, "Internal Server Error");
            assert!(body.unwrap().contains("database offline"));
        }
        other => panic!("expected Status error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_error_status_with_empty_body() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/products"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let err = client.list_items().await.unwrap_err();
    assert_eq!(err.status(), Some(404));
    assert!(matches!(err, Error::Status { body: None, .. }));
}

#[tokio::test]
async fn test_non_list_body_is_deserialization_error() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/products"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "products": [] })))
        .mount(&server)
        .await;

    let err = client.list_items().await.unwrap_err();
    match err {
        Error::Deserialization { body, .. } => assert!(body.contains("products")),
        other => panic!("expected Deserialization error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_connection_refused_is_connect_error() {
    // Bind then drop a server so the port is known to be closed.
    let server = MockServer::start().await;
    let endpoint = format!("{}/api/products", server.uri());
    drop(server);

    let client = CatalogClient::from_reqwest(&endpoint, reqwest::Client::new()).unwrap();
    let err = client.list_items().await.unwrap_err();

    assert!(err.is_connect(), "expected connect error, got {err:?}");
    assert_eq!(err.status(), None);
}

#[test]
fn test_invalid_endpoint_is_rejected() {
    let err = CatalogClient::from_reqwest("not a url", reqwest::Client::new()).unwrap_err();
    assert!(matches!(err, Error::InvalidUrl(_)));
}
