//! Integration tests for session lifetime and call forwarding.

mod helpers;

use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::time::Duration;

use http::StatusCode;
use serde_json::json;

use erpgate_auth::SessionId;
use helpers::{ALICE, BOB};

#[tokio::test]
async fn test_call_is_forwarded_with_session() {
    let app = helpers::TestApp::new().await;
    let session_id = app.login_ok(ALICE).await;

    let response = app
        .request(
            "POST",
            "/api/call",
            Some(json!({"model": "res.partner", "method": "search_count", "args": [[]]})),
            Some(&session_id),
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["result"], 42);
}

#[tokio::test]
async fn test_call_passes_arguments_through() {
    let app = helpers::TestApp::new().await;
    let session_id = app.login_ok(ALICE).await;

    let response = app
        .request(
            "POST",
            "/api/call",
            Some(json!({
                "model": "res.partner",
                "method": "read",
                "args": [[7], ["name"]],
                "kwargs": {"context": {"lang": "en_US"}}
            })),
            Some(&session_id),
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["result"]["args"], json!([[7], ["name"]]));
}

#[tokio::test]
async fn test_remote_business_error_is_unprocessable() {
    let app = helpers::TestApp::new().await;
    let session_id = app.login_ok(ALICE).await;

    let response = app
        .request(
            "POST",
            "/api/call",
            Some(json!({"model": "res.partner", "method": "archive_all"})),
            Some(&session_id),
        )
        .await;

    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(response.body["error"], "REMOTE_ERROR");
    assert_eq!(response.body["message"], "You cannot archive every partner");

    // A business error does not end the session.
    let response = app
        .request("GET", "/api/whoami", None, Some(&session_id))
        .await;
    assert_eq!(response.status, StatusCode::OK);
}

#[tokio::test]
async fn test_invalid_call_never_reaches_erp() {
    let app = helpers::TestApp::new().await;
    let session_id = app.login_ok(ALICE).await;

    let response = app
        .request(
            "POST",
            "/api/call",
            Some(json!({"model": "../web", "method": "read"})),
            Some(&session_id),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let response = app
        .request(
            "POST",
            "/api/call",
            Some(json!({"model": "res.partner", "method": "read", "kwargs": []})),
            Some(&session_id),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    assert_eq!(app.odoo.state.call_kw_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_call_without_session_is_unauthorized() {
    let app = helpers::TestApp::new().await;

    let response = app
        .request(
            "POST",
            "/api/call",
            Some(json!({"model": "res.partner", "method": "search_count"})),
            Some(SessionId::generate().as_str()),
        )
        .await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(app.odoo.state.call_kw_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_remote_session_expiry_ends_local_session() {
    let app = helpers::TestApp::new().await;
    let session_id = app.login_ok(ALICE).await;

    app.odoo.state.expire_all_sessions();

    let response = app
        .request(
            "POST",
            "/api/call",
            Some(json!({"model": "res.partner", "method": "search_count"})),
            Some(&session_id),
        )
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);

    let response = app
        .request("GET", "/api/whoami", None, Some(&session_id))
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert!(app.state.gateway.store().is_empty());
}

#[tokio::test]
async fn test_idle_session_expires() {
    let odoo = helpers::FakeOdoo::start().await;
    let mut config = helpers::test_config(&odoo);
    config.session.idle_timeout_seconds = 1;
    let app = helpers::TestApp::with_config(config, odoo);

    let session_id = app.login_ok(ALICE).await;
    tokio::time::sleep(Duration::from_millis(1200)).await;

    let response = app
        .request("GET", "/api/whoami", None, Some(&session_id))
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_each_login_creates_exactly_one_session() {
    let app = helpers::TestApp::new().await;

    let first = app.login_ok(ALICE).await;
    let second = app.login_ok(ALICE).await;
    let third = app.login_ok(BOB).await;

    assert_ne!(first, second);
    assert_ne!(second, third);
    assert_eq!(app.state.gateway.store().len(), 3);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_logins_get_distinct_sessions() {
    let app = Arc::new(helpers::TestApp::new().await);

    let logins = (0..20).map(|i| {
        let app = Arc::clone(&app);
        let user = if i % 2 == 0 { ALICE } else { BOB };
        tokio::spawn(async move { app.login_ok(user).await })
    });

    let ids: Vec<String> = futures::future::join_all(logins)
        .await
        .into_iter()
        .map(|r| r.unwrap())
        .collect();

    let unique: std::collections::HashSet<&String> = ids.iter().collect();
    assert_eq!(unique.len(), 20);
    assert_eq!(app.state.gateway.store().len(), 20);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_logout_racing_calls_never_resurrects_session() {
    let app = Arc::new(helpers::TestApp::new().await);
    let session_id = app.login_ok(ALICE).await;

    let calls = (0..10).map(|_| {
        let app = Arc::clone(&app);
        let session_id = session_id.clone();
        tokio::spawn(async move {
            app.request(
                "POST",
                "/api/call",
                Some(json!({"model": "res.partner", "method": "search_count"})),
                Some(&session_id),
            )
            .await
            .status
        })
    });
    let logout = {
        let app = Arc::clone(&app);
        let session_id = session_id.clone();
        tokio::spawn(async move {
            app.request("POST", "/api/logout", None, Some(&session_id))
                .await
                .status
        })
    };

    for status in futures::future::join_all(calls).await {
        let status = status.unwrap();
        assert!(status == StatusCode::OK || status == StatusCode::UNAUTHORIZED);
    }
    assert_eq!(logout.await.unwrap(), StatusCode::NO_CONTENT);

    let response = app
        .request("GET", "/api/whoami", None, Some(&session_id))
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert!(app.state.gateway.store().is_empty());
}
