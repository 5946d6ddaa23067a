//! Shared test helpers for integration tests.
//!
//! [`FakeOdoo`] is a tiny in-process server speaking the subset of Odoo's
//! JSON-RPC used by erpgate. [`TestApp`] wires the real router to it.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::header::{COOKIE, SET_COOKIE};
use axum::http::{HeaderMap, HeaderValue};
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};
use http::{Request, StatusCode};
use serde_json::{Value, json};
use tower::ServiceExt;

use erpgate_core::config::AppConfig;
use erpgate_odoo::OdooClient;

pub const DATABASE: &str = "demo";
/// Database the fake answers with a server-side failure instead of a login.
pub const MISSING_DATABASE: &str = "gone";
pub const ALICE: &str = "alice@example.com";
pub const BOB: &str = "bob@example.com";
pub const MALLORY: &str = "mallory@example.com";
pub const PASSWORD: &str = "s3cret-pass";

/// Remote state of the fake server.
#[derive(Debug, Default)]
pub struct FakeOdooState {
    /// login -> (password, uid)
    users: HashMap<String, (String, i64)>,
    /// Session tokens the fake currently recognizes.
    sessions: Mutex<HashSet<String>>,
    next_token: AtomicUsize,
    pub authenticate_calls: AtomicUsize,
    pub call_kw_calls: AtomicUsize,
    pub destroy_calls: AtomicUsize,
    /// Put the session token in the body instead of a cookie, as old
    /// servers do.
    legacy_token_in_body: bool,
}

impl FakeOdooState {
    /// Forget every remote session, as a server restart would.
    pub fn expire_all_sessions(&self) {
        self.sessions.lock().unwrap().clear();
    }

    pub fn live_sessions(&self) -> usize {
        self.sessions.lock().unwrap().len()
    }
}

/// A running fake Odoo server.
pub struct FakeOdoo {
    pub addr: SocketAddr,
    pub state: Arc<FakeOdooState>,
}

impl FakeOdoo {
    /// Starts a server knowing alice, bob and mallory, all with [`PASSWORD`].
    pub async fn start() -> Self {
        Self::start_with(false).await
    }

    /// Starts a server that returns the session token in the body.
    pub async fn start_legacy() -> Self {
        Self::start_with(true).await
    }

    async fn start_with(legacy_token_in_body: bool) -> Self {
        let users = [(ALICE, 2), (BOB, 3), (MALLORY, 4)]
            .into_iter()
            .map(|(login, uid)| (login.to_string(), (PASSWORD.to_string(), uid)))
            .collect();

        let state = Arc::new(FakeOdooState {
            users,
            legacy_token_in_body,
            ..FakeOdooState::default()
        });

        let router = Router::new()
            .route("/web/session/authenticate", post(authenticate))
            .route("/web/session/destroy", post(destroy))
            .route("/web/dataset/call_kw/{model}/{method}", post(call_kw))
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        Self { addr, state }
    }

    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }
}

fn rpc_result(id: &Value, result: Value) -> Json<Value> {
    Json(json!({"jsonrpc": "2.0", "id": id, "result": result}))
}

fn rpc_error(id: &Value, code: i64, name: &str, message: &str) -> Json<Value> {
    Json(json!({
        "jsonrpc": "2.0",
        "id": id,
        "error": {
            "code": code,
            "message": "Odoo Server Error",
            "data": {"name": name, "message": message}
        }
    }))
}

fn session_token(headers: &HeaderMap) -> Option<String> {
    let cookies = headers.get(COOKIE)?.to_str().ok()?;
    cookies
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == "session_id")
        .map(|(_, value)| value.to_string())
}

async fn authenticate(
    State(state): State<Arc<FakeOdooState>>,
    Json(body): Json<Value>,
) -> impl IntoResponse {
    state.authenticate_calls.fetch_add(1, Ordering::SeqCst);
    let id = body["id"].clone();
    let params = &body["params"];

    if params["db"] == MISSING_DATABASE {
        return rpc_error(
            &id,
            200,
            "psycopg2.OperationalError",
            "connection to server at \"10.0.0.5\", port 5432 failed: FATAL:  database \"gone\" does not exist",
        )
        .into_response();
    }

    if params["db"] != DATABASE {
        return rpc_error(&id, 200, "odoo.exceptions.AccessDenied", "Access Denied").into_response();
    }

    let login = params["login"].as_str().unwrap_or_default();
    let password = params["password"].as_str().unwrap_or_default();
    let uid = match state.users.get(login) {
        Some((expected, uid)) if expected == password => *uid,
        _ => {
            return rpc_error(&id, 200, "odoo.exceptions.AccessDenied", "Access Denied")
                .into_response();
        }
    };

    let token = format!(
        "tok-{}",
        state.next_token.fetch_add(1, Ordering::SeqCst)
    );
    state.sessions.lock().unwrap().insert(token.clone());

    if state.legacy_token_in_body {
        return rpc_result(&id, json!({"uid": uid, "session_id": token, "db": DATABASE}))
            .into_response();
    }

    let cookie = format!("session_id={token}; Expires=Sat, 01 Jan 2000 00:00:00 GMT; HttpOnly; Path=/");
    let mut response = rpc_result(&id, json!({"uid": uid, "db": DATABASE})).into_response();
    response
        .headers_mut()
        .insert(SET_COOKIE, HeaderValue::from_str(&cookie).unwrap());
    response
}

async fn destroy(
    State(state): State<Arc<FakeOdooState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Json<Value> {
    state.destroy_calls.fetch_add(1, Ordering::SeqCst);
    if let Some(token) = session_token(&headers) {
        state.sessions.lock().unwrap().remove(&token);
    }
    rpc_result(&body["id"], Value::Null)
}

async fn call_kw(
    State(state): State<Arc<FakeOdooState>>,
    Path((model, method)): Path<(String, String)>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Json<Value> {
    state.call_kw_calls.fetch_add(1, Ordering::SeqCst);
    let id = body["id"].clone();

    let known = session_token(&headers)
        .is_some_and(|token| state.sessions.lock().unwrap().contains(&token));
    if !known {
        return rpc_error(
            &id,
            100,
            "odoo.http.SessionExpiredException",
            "Session expired",
        );
    }

    match (model.as_str(), method.as_str()) {
        ("res.partner", "search_count") => rpc_result(&id, json!(42)),
        ("res.partner", "archive_all") => rpc_error(
            &id,
            200,
            "odoo.exceptions.UserError",
            "You cannot archive every partner",
        ),
        ("slow.model", _) => {
            tokio::time::sleep(Duration::from_secs(5)).await;
            rpc_result(&id, Value::Null)
        }
        _ => rpc_result(
            &id,
            json!({"model": model, "method": method, "args": body["params"]["args"]}),
        ),
    }
}

/// Configuration pointing at `odoo`, with alice and bob allow-listed.
pub fn test_config(odoo: &FakeOdoo) -> AppConfig {
    let mut config = AppConfig::default();
    config.erp.default_endpoint = odoo.url();
    config.erp.default_database = DATABASE.to_string();
    config.erp.call_timeout_seconds = 2;
    config.access.allowed_users = vec![ALICE.to_string(), BOB.to_string()];
    config
}

/// Test application context
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    /// The fake ERP behind the router
    pub odoo: FakeOdoo,
    /// Application config
    pub config: AppConfig,
    /// Shared state, for direct inspection of the session store
    pub state: erpgate_api::AppState,
}

impl TestApp {
    /// Create a new test application
    pub async fn new() -> Self {
        let odoo = FakeOdoo::start().await;
        Self::with_config(test_config(&odoo), odoo)
    }

    pub fn with_config(config: AppConfig, odoo: FakeOdoo) -> Self {
        let client = OdooClient::new(config.erp.call_timeout()).unwrap();
        let state = erpgate_api::app::build_state(Arc::new(config.clone()), Arc::new(client));
        let router = erpgate_api::build_app(state.clone());

        Self {
            router,
            odoo,
            config,
            state,
        }
    }

    /// Log in and return the response.
    pub async fn login(&self, username: &str, password: &str) -> TestResponse {
        self.request(
            "POST",
            "/api/login",
            Some(json!({"username": username, "password": password})),
            None,
        )
        .await
    }

    /// Log in and return the issued session identifier.
    pub async fn login_ok(&self, username: &str) -> String {
        let response = self.login(username, PASSWORD).await;
        assert_eq!(response.status, StatusCode::OK, "login failed: {:?}", response.body);
        response.body["sessionId"].as_str().unwrap().to_string()
    }

    /// Make a request, presenting `token` as a bearer session identifier.
    pub async fn request(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> TestResponse {
        let auth = token.map(|t| ("Authorization", format!("Bearer {}", t)));
        self.send(method, path, body, auth.into_iter().collect()).await
    }

    /// Make a request, presenting `token` in the session cookie.
    pub async fn request_with_cookie(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
        token: &str,
    ) -> TestResponse {
        let cookie = format!("{}={}", self.config.session.cookie.name, token);
        self.send(method, path, body, vec![("Cookie", cookie)]).await
    }

    /// Make a request presenting both a session cookie and a bearer token.
    pub async fn request_with_cookie_and_bearer(
        &self,
        method: &str,
        path: &str,
        cookie_token: &str,
        bearer_token: &str,
    ) -> TestResponse {
        let headers = vec![
            (
                "Cookie",
                format!("{}={}", self.config.session.cookie.name, cookie_token),
            ),
            ("Authorization", format!("Bearer {}", bearer_token)),
        ];
        self.send(method, path, None, headers).await
    }

    async fn send(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
        headers: Vec<(&str, String)>,
    ) -> TestResponse {
        let body_str = body
            .map(|b| serde_json::to_string(&b).expect("Failed to serialize body"))
            .unwrap_or_default();

        let mut req = Request::builder()
            .method(method)
            .uri(path)
            .header("Content-Type", "application/json");

        for (name, value) in headers {
            req = req.header(name, value);
        }

        let req = req
            .body(Body::from(body_str))
            .expect("Failed to build request");

        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let set_cookie = response
            .headers()
            .get_all(SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .map(String::from)
            .collect();
        let body_bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("Failed to read body");

        let body: Value = serde_json::from_slice(&body_bytes).unwrap_or(Value::Null);

        TestResponse {
            status,
            body,
            set_cookie,
        }
    }
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Parsed JSON body
    pub body: Value,
    /// `Set-Cookie` header values
    pub set_cookie: Vec<String>,
}
