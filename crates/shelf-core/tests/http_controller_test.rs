// Integration tests driving FetchController through HttpSource against a
// wiremock server.
#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::time::Duration;

use pretty_assertions::assert_eq;
use serde_json::json;
use shelf_core::{
    CatalogItem, ErrorKind, FetchConfig, FetchController, FetchState, HttpSource, ItemId,
    TransportConfig,
};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Helpers ─────────────────────────────────────────────────────────

async fn controller_for(server: &MockServer, timeout_ms: u64) -> FetchController<CatalogItem> {
    let endpoint = format!("{}/api/products", server.uri());
    let source = HttpSource::new(&endpoint, &TransportConfig::default()).unwrap();
    FetchController::new(source, FetchConfig::new(timeout_ms, true).unwrap())
}

async fn mount(server: &MockServer, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path("/api/products"))
        .respond_with(response)
        .mount(server)
        .await;
}

fn failure_kind(state: &FetchState<CatalogItem>) -> ErrorKind {
    state.error().expect("expected Failed state").kind()
}

// ── Success ─────────────────────────────────────────────────────────

#[tokio::test]
async fn success_keeps_server_order() {
    let server = MockServer::start().await;
    mount(
        &server,
        ResponseTemplate::new(200).set_body_json(json!([
            { "id": 3, "name": "Brass Scissors", "price": "50R" },
            { "id": 1, "name": "Earthen Bottle", "price": "48R" },
            { "id": 3, "name": "Brass Scissors", "price": "50R" }
        ])),
    )
    .await;

    let controller = controller_for(&server, 5000).await;
    let state = controller.settled().await;

    let data = state.data().expect("expected Success state");
    let ids: Vec<_> = data.iter().map(|item| item.id.clone()).collect();
    assert_eq!(ids, vec![ItemId::Number(3), ItemId::Number(1), ItemId::Number(3)]);
    assert_eq!(data[1].name(), Some("Earthen Bottle"));
}

// ── Failures ────────────────────────────────────────────────────────

#[tokio::test]
async fn server_error_carries_status_and_detail() {
    let server = MockServer::start().await;
    mount(
        &server,
        ResponseTemplate::new(500).set_body_json(json!({ "message": "database offline" })),
    )
    .await;

    let controller = controller_for(&server, 5000).await;
    let state = controller.settled().await;

    assert_eq!(failure_kind(&state), ErrorKind::ServerError(500));
    let message = state.error().unwrap().message();
    assert!(message.starts_with("Server error: 500"), "{message}");
    assert!(message.contains("database offline"), "{message}");
    assert_eq!(state.attempt(), Some(1));
}

#[tokio::test]
async fn slow_server_times_out() {
    let server = MockServer::start().await;
    mount(
        &server,
        ResponseTemplate::new(200)
            .set_body_json(json!([]))
            .set_delay(Duration::from_secs(5)),
    )
    .await;

    let controller = controller_for(&server, 200).await;
    let state = controller.settled().await;

    assert_eq!(failure_kind(&state), ErrorKind::Timeout);
}

#[tokio::test]
async fn refused_connection_is_network_unreachable() {
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let source = HttpSource::new(
        &format!("http://127.0.0.1:{port}/api/products"),
        &TransportConfig::default(),
    )
    .unwrap();
    let controller = FetchController::new(source, FetchConfig::default());

    let state = controller.settled().await;

    assert_eq!(failure_kind(&state), ErrorKind::NetworkUnreachable);
    assert_eq!(
        state.error().unwrap().message(),
        "No internet connection or server is not reachable."
    );
}

#[tokio::test]
async fn object_body_is_malformed() {
    let server = MockServer::start().await;
    mount(
        &server,
        ResponseTemplate::new(200).set_body_json(json!({ "products": [] })),
    )
    .await;

    let controller = controller_for(&server, 5000).await;
    let state = controller.settled().await;

    assert_eq!(failure_kind(&state), ErrorKind::MalformedResponse);
    assert!(state.error().unwrap().cause().is_some());
}

// ── Retry ───────────────────────────────────────────────────────────

#[tokio::test]
async fn retry_after_failure_reaches_success() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/products"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    mount(
        &server,
        ResponseTemplate::new(200).set_body_json(json!([{ "id": "a", "name": "Nomad Tumbler" }])),
    )
    .await;

    let controller = controller_for(&server, 5000).await;
    let first = controller.settled().await;
    assert_eq!(failure_kind(&first), ErrorKind::ServerError(503));

    assert!(controller.retry());
    assert_eq!(controller.snapshot(), FetchState::Loading { attempt: 2 });

    let second = controller.settled().await;
    let data = second.data().expect("expected Success after retry");
    assert_eq!(data[0].id, ItemId::Text("a".into()));
}
