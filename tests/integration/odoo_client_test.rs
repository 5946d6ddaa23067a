//! Integration tests for the Odoo JSON-RPC client against the fake server.

mod helpers;

use std::sync::atomic::Ordering;
use std::time::Duration;

use serde_json::json;

use erpgate_odoo::{ErpConnector, ErpError, OdooClient};
use helpers::{ALICE, DATABASE, FakeOdoo, PASSWORD};

fn client() -> OdooClient {
    OdooClient::new(Duration::from_secs(2)).unwrap()
}

#[tokio::test]
async fn test_authenticate_takes_token_from_cookie() {
    let odoo = FakeOdoo::start().await;

    let session = client()
        .authenticate(&odoo.url(), DATABASE, ALICE, PASSWORD)
        .await
        .unwrap();

    assert_eq!(session.token, "tok-0");
    assert_eq!(session.uid, 2);
    assert_eq!(session.username, ALICE);
    assert_eq!(session.database, DATABASE);
    assert_eq!(session.endpoint, odoo.url());
}

#[tokio::test]
async fn test_authenticate_takes_token_from_body_on_old_servers() {
    let odoo = FakeOdoo::start_legacy().await;

    let session = client()
        .authenticate(&odoo.url(), DATABASE, ALICE, PASSWORD)
        .await
        .unwrap();

    assert_eq!(session.token, "tok-0");
}

#[tokio::test]
async fn test_rejected_credentials() {
    let odoo = FakeOdoo::start().await;

    let err = client()
        .authenticate(&odoo.url(), DATABASE, ALICE, "nope")
        .await
        .unwrap_err();
    assert!(matches!(err, ErpError::InvalidCredentials));

    let err = client()
        .authenticate(&odoo.url(), "other_db", ALICE, PASSWORD)
        .await
        .unwrap_err();
    assert!(matches!(err, ErpError::InvalidCredentials));
}

#[tokio::test]
async fn test_unreachable_endpoint_is_transport() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let closed = listener.local_addr().unwrap();
    drop(listener);

    let err = client()
        .authenticate(&format!("http://{closed}"), DATABASE, ALICE, PASSWORD)
        .await
        .unwrap_err();

    assert!(matches!(err, ErpError::Transport(_)));
}

#[tokio::test]
async fn test_non_rpc_response_is_protocol() {
    let odoo = FakeOdoo::start().await;

    // Unknown path on the fake answers 404 with an empty body.
    let err = client()
        .authenticate(&format!("{}/not-odoo", odoo.url()), DATABASE, ALICE, PASSWORD)
        .await
        .unwrap_err();

    assert!(matches!(err, ErpError::Protocol(_)));
}

#[tokio::test]
async fn test_call_with_live_session() {
    let odoo = FakeOdoo::start().await;
    let client = client();
    let session = client
        .authenticate(&odoo.url(), DATABASE, ALICE, PASSWORD)
        .await
        .unwrap();

    let result = client
        .call(&session, "res.partner", "search_count", json!([[]]), json!({}))
        .await
        .unwrap();

    assert_eq!(result, json!(42));
}

#[tokio::test]
async fn test_call_classifies_remote_errors() {
    let odoo = FakeOdoo::start().await;
    let client = client();
    let session = client
        .authenticate(&odoo.url(), DATABASE, ALICE, PASSWORD)
        .await
        .unwrap();

    let err = client
        .call(&session, "res.partner", "archive_all", json!([]), json!({}))
        .await
        .unwrap_err();
    match err {
        ErpError::Remote { name, message } => {
            assert_eq!(name, "odoo.exceptions.UserError");
            assert_eq!(message, "You cannot archive every partner");
        }
        other => panic!("unexpected {other:?}"),
    }

    odoo.state.expire_all_sessions();
    let err = client
        .call(&session, "res.partner", "search_count", json!([]), json!({}))
        .await
        .unwrap_err();
    assert!(matches!(err, ErpError::SessionExpired));
}

#[tokio::test]
async fn test_call_rejects_bad_input_locally() {
    let odoo = FakeOdoo::start().await;
    let client = client();
    let session = client
        .authenticate(&odoo.url(), DATABASE, ALICE, PASSWORD)
        .await
        .unwrap();

    let err = client
        .call(&session, "res/partner", "read", json!([]), json!({}))
        .await
        .unwrap_err();
    assert!(matches!(err, ErpError::InvalidRequest(_)));

    let err = client
        .call(&session, "res.partner", "read", json!({}), json!({}))
        .await
        .unwrap_err();
    assert!(matches!(err, ErpError::InvalidRequest(_)));

    assert_eq!(odoo.state.call_kw_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_slow_call_times_out_as_transport() {
    let odoo = FakeOdoo::start().await;
    let client = OdooClient::new(Duration::from_millis(300)).unwrap();
    let session = client
        .authenticate(&odoo.url(), DATABASE, ALICE, PASSWORD)
        .await
        .unwrap();

    let err = client
        .call(&session, "slow.model", "read", json!([]), json!({}))
        .await
        .unwrap_err();

    assert!(matches!(err, ErpError::Transport(_)));
}

#[tokio::test]
async fn test_logout_destroys_remote_session() {
    let odoo = FakeOdoo::start().await;
    let client = client();
    let session = client
        .authenticate(&odoo.url(), DATABASE, ALICE, PASSWORD)
        .await
        .unwrap();
    assert_eq!(odoo.state.live_sessions(), 1);

    client.logout(&session).await.unwrap();

    assert_eq!(odoo.state.destroy_calls.load(Ordering::SeqCst), 1);
    assert_eq!(odoo.state.live_sessions(), 0);
}
