//! Integration tests for the JSON-RPC client using wiremock.
//!
//! The mock server stands in for the `/jsonrpc` endpoint; requests are
//! discriminated by partial body match on the service/method pair.

use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use odoo_bridge_rpc::{Domain, HostGuard, OdooClient, OdooCredentials, RecordStore, RpcError};

fn credentials(url: &str) -> OdooCredentials {
    OdooCredentials {
        url: url.to_string(),
        db: "prod".to_string(),
        username: "admin".to_string(),
        password: "secret".to_string(),
    }
}

fn client(url: &str) -> OdooClient {
    OdooClient::new(credentials(url), &HostGuard::allow_any()).unwrap()
}

async fn mount_authenticate(server: &MockServer, uid: i64) {
    Mock::given(method("POST"))
        .and(path("/jsonrpc"))
        .and(body_partial_json(
            json!({"params": {"service": "common", "method": "authenticate"}}),
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "jsonrpc": "2.0",
            "id": 1,
            "result": uid,
        })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_authenticate_caches_uid() {
    let server = MockServer::start().await;
    mount_authenticate(&server, 7).await;

    let client = client(&server.uri());
    assert_eq!(client.authenticate().await.unwrap(), 7);
    assert_eq!(client.authenticate().await.unwrap(), 7);

    // Second call must come from the cache.
    assert_eq!(server.received_requests().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_authenticate_false_is_auth_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/jsonrpc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "jsonrpc": "2.0",
            "id": 1,
            "result": false,
        })))
        .mount(&server)
        .await;

    let client = client(&server.uri());
    assert!(matches!(
        client.authenticate().await,
        Err(RpcError::AuthenticationFailed { .. })
    ));
}

#[tokio::test]
async fn test_find_authenticates_lazily() {
    let server = MockServer::start().await;
    mount_authenticate(&server, 2).await;

    Mock::given(method("POST"))
        .and(path("/jsonrpc"))
        .and(body_partial_json(
            json!({"params": {"service": "object", "method": "execute_kw"}}),
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "jsonrpc": "2.0",
            "id": 2,
            "result": [{"id": 11, "key": "app.enabled", "value": "1"}],
        })))
        .mount(&server)
        .await;

    let client = client(&server.uri());
    let rows = client
        .find(
            "ir.config_parameter",
            &Domain::eq("key", "app.enabled"),
            &["id", "value"],
            Some(1),
            None,
        )
        .await
        .unwrap();

    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].get("value"), Some(&json!("1")));

    // One authenticate call plus one search_read.
    assert_eq!(server.received_requests().await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_fault_carries_server_message() {
    let server = MockServer::start().await;
    mount_authenticate(&server, 2).await;

    Mock::given(method("POST"))
        .and(path("/jsonrpc"))
        .and(body_partial_json(
            json!({"params": {"service": "object"}}),
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "jsonrpc": "2.0",
            "id": 3,
            "error": {
                "code": 200,
                "message": "Odoo Server Error",
                "data": {"message": "Access Denied on ir.ui.view"},
            },
        })))
        .mount(&server)
        .await;

    let client = client(&server.uri());
    let err = client
        .search("ir.ui.view", &Domain::eq("key", "x"), None)
        .await
        .unwrap_err();
    match err {
        RpcError::Fault { message } => assert_eq!(message, "Access Denied on ir.ui.view"),
        other => panic!("expected Fault, got {other:?}"),
    }
}

#[tokio::test]
async fn test_host_guard_blocks_before_any_request() {
    let server = MockServer::start().await;

    let guard = HostGuard::new("acme.odoo.com", false);
    let result = OdooClient::new(credentials(&server.uri()), &guard);
    assert!(matches!(result, Err(RpcError::HostBlocked { .. })));

    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_transport_error_is_not_a_fault() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/jsonrpc"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let client = client(&server.uri());
    assert!(matches!(
        client.authenticate().await,
        Err(RpcError::Transport(_))
    ));
}
