//! In-process stand-in for the forecasting backend.
//!
//! Serves the auth and scenario routes the client uses, counts calls, and
//! records every Authorization header it receives on protected routes.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Form, Json, Router};
use parking_lot::Mutex;
use serde::Deserialize;
use serde_json::{json, Value};

use growthcanvas_core::auth::{MemorySessionStore, Session};
use growthcanvas_core::ApiClient;

pub const USERNAME: &str = "alice";
pub const PASSWORD: &str = "secret";
pub const INITIAL_ACCESS: &str = "access-1";
pub const INITIAL_REFRESH: &str = "refresh-1";

/// How the refresh endpoint answers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshMode {
    /// New access token and a rotated refresh token
    Rotate,
    /// New access token only
    AccessOnly,
    /// 401, as for an expired refresh token
    Fail,
    /// Issues an access token that protected routes still reject
    IssueRejected,
}

pub struct Backend {
    pub valid_access: Mutex<String>,
    pub valid_refresh: Mutex<String>,
    pub refresh_mode: Mutex<RefreshMode>,
    pub login_calls: AtomicUsize,
    pub refresh_calls: AtomicUsize,
    pub protected_calls: AtomicUsize,
    /// Authorization header values seen per protected request
    pub auth_headers: Mutex<Vec<Vec<String>>>,
}

impl Backend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            valid_access: Mutex::new(INITIAL_ACCESS.to_string()),
            valid_refresh: Mutex::new(INITIAL_REFRESH.to_string()),
            refresh_mode: Mutex::new(RefreshMode::Rotate),
            login_calls: AtomicUsize::new(0),
            refresh_calls: AtomicUsize::new(0),
            protected_calls: AtomicUsize::new(0),
            auth_headers: Mutex::new(Vec::new()),
        })
    }

    pub fn set_refresh_mode(&self, mode: RefreshMode) {
        *self.refresh_mode.lock() = mode;
    }

    pub fn refresh_calls(&self) -> usize {
        self.refresh_calls.load(Ordering::SeqCst)
    }

    pub fn protected_calls(&self) -> usize {
        self.protected_calls.load(Ordering::SeqCst)
    }

    pub fn login_calls(&self) -> usize {
        self.login_calls.load(Ordering::SeqCst)
    }

    pub fn last_auth_headers(&self) -> Vec<String> {
        self.auth_headers.lock().last().cloned().unwrap_or_default()
    }

    fn authorize(&self, headers: &HeaderMap) -> Result<(), Response> {
        self.protected_calls.fetch_add(1, Ordering::SeqCst);
        let values: Vec<String> = headers
            .get_all(header::AUTHORIZATION)
            .iter()
            .filter_map(|v| v.to_str().ok().map(str::to_string))
            .collect();
        self.auth_headers.lock().push(values.clone());

        let expected = format!("Bearer {}", self.valid_access.lock());
        if values.len() == 1 && values[0] == expected {
            Ok(())
        } else {
            Err(error(StatusCode::UNAUTHORIZED, "Could not validate credentials"))
        }
    }
}

fn error(status: StatusCode, detail: &str) -> Response {
    (status, Json(json!({ "detail": detail }))).into_response()
}

#[derive(Deserialize)]
struct LoginForm {
    username: String,
    password: String,
}

async fn login(State(backend): State<Arc<Backend>>, Form(form): Form<LoginForm>) -> Response {
    backend.login_calls.fetch_add(1, Ordering::SeqCst);
    if form.username != USERNAME || form.password != PASSWORD {
        return error(StatusCode::UNAUTHORIZED, "Incorrect username or password");
    }
    // token_type deliberately omitted
    Json(json!({
        "access_token": *backend.valid_access.lock(),
        "refresh_token": *backend.valid_refresh.lock(),
    }))
    .into_response()
}

async fn refresh(State(backend): State<Arc<Backend>>, headers: HeaderMap) -> Response {
    let call = backend.refresh_calls.fetch_add(1, Ordering::SeqCst) + 1;

    let presented = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    if presented != format!("Bearer {}", backend.valid_refresh.lock()) {
        return error(StatusCode::UNAUTHORIZED, "Invalid refresh token");
    }

    let mode = *backend.refresh_mode.lock();
    let new_access = format!("access-{}", call + 1);
    match mode {
        RefreshMode::Fail => error(StatusCode::UNAUTHORIZED, "Refresh token expired"),
        RefreshMode::IssueRejected => Json(json!({ "access_token": "still-rejected" })).into_response(),
        RefreshMode::AccessOnly => {
            *backend.valid_access.lock() = new_access.clone();
            Json(json!({ "access_token": new_access, "token_type": "Bearer" })).into_response()
        }
        RefreshMode::Rotate => {
            let new_refresh = format!("refresh-{}", call + 1);
            *backend.valid_access.lock() = new_access.clone();
            *backend.valid_refresh.lock() = new_refresh.clone();
            Json(json!({
                "access_token": new_access,
                "refresh_token": new_refresh,
                "token_type": "Bearer",
            }))
            .into_response()
        }
    }
}

async fn me(State(backend): State<Arc<Backend>>, headers: HeaderMap) -> Response {
    if let Err(response) = backend.authorize(&headers) {
        return response;
    }
    Json(json!({ "id": 1, "username": USERNAME, "email": "alice@example.com" })).into_response()
}

async fn list_scenarios(State(backend): State<Arc<Backend>>, headers: HeaderMap) -> Response {
    if let Err(response) = backend.authorize(&headers) {
        return response;
    }
    Json(json!([
        { "id": 1, "name": "Base", "is_default": true },
        { "id": 2, "name": "Aggressive", "description": "Faster hiring" }
    ]))
    .into_response()
}

async fn create_scenario(
    State(backend): State<Arc<Backend>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if let Err(response) = backend.authorize(&headers) {
        return response;
    }
    let name = body.get("name").cloned().unwrap_or(Value::Null);
    if name.as_str().map_or(true, str::is_empty) {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({ "detail": [{ "loc": ["body", "name"], "msg": "field required" }] })),
        )
            .into_response();
    }
    (
        StatusCode::CREATED,
        Json(json!({ "id": 10, "name": name, "description": body.get("description") })),
    )
        .into_response()
}

async fn delete_scenario(
    State(backend): State<Arc<Backend>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Response {
    if let Err(response) = backend.authorize(&headers) {
        return response;
    }
    if id == 1 || id == 2 {
        StatusCode::NO_CONTENT.into_response()
    } else {
        error(StatusCode::NOT_FOUND, "Scenario not found")
    }
}

fn yearly_financials_body() -> Value {
    json!([
        { "year": 2026, "income": 500000, "expenses": 700000, "ebitda": -200000, "client_count": 120, "total_staff": 6 },
        { "year": 2027, "income": 1500000, "expenses": 1100000, "ebitda": 400000, "client_count": 380, "total_staff": 11 }
    ])
}

async fn scenario_financials(
    State(backend): State<Arc<Backend>>,
    headers: HeaderMap,
    Path(_id): Path<i64>,
) -> Response {
    if let Err(response) = backend.authorize(&headers) {
        return response;
    }
    Json(yearly_financials_body()).into_response()
}

async fn scenario_staff(
    State(backend): State<Arc<Backend>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Response {
    if let Err(response) = backend.authorize(&headers) {
        return response;
    }
    if id == 2 {
        return error(StatusCode::INTERNAL_SERVER_ERROR, "Staffing model failed");
    }
    Json(json!([
        { "year": 2026, "sales_staff": 2, "jr_devs": 2, "cto_count": 1, "ceo_count": 1, "total_staff": 6 },
        { "year": 2027, "sales_staff": 5, "jr_devs": 4, "cto_count": 1, "ceo_count": 1, "total_staff": 11 }
    ]))
    .into_response()
}

async fn default_financials(State(backend): State<Arc<Backend>>, headers: HeaderMap) -> Response {
    if let Err(response) = backend.authorize(&headers) {
        return response;
    }
    Json(yearly_financials_body()).into_response()
}

async fn default_staff(State(backend): State<Arc<Backend>>, headers: HeaderMap) -> Response {
    if let Err(response) = backend.authorize(&headers) {
        return response;
    }
    Json(json!([{ "year": 2026, "total_staff": 6 }])).into_response()
}

async fn update_parameters(
    State(backend): State<Arc<Backend>>,
    headers: HeaderMap,
    Path(_id): Path<i64>,
    Json(body): Json<Value>,
) -> Response {
    if let Err(response) = backend.authorize(&headers) {
        return response;
    }
    let price = body.get("subscription_price").and_then(Value::as_f64).unwrap_or_default();
    if price < 0.0 {
        return error(StatusCode::BAD_REQUEST, "subscription_price must be non-negative");
    }
    Json(json!({ "status": "success", "yearly_summary": yearly_financials_body() })).into_response()
}

pub fn router(backend: Arc<Backend>) -> Router {
    Router::new()
        .route("/api/auth/login", post(login))
        .route("/api/auth/refresh-token", post(refresh))
        .route("/api/auth/me", get(me))
        .route("/api/scenarios", get(list_scenarios).post(create_scenario))
        .route("/api/scenarios/{id}", axum::routing::delete(delete_scenario))
        .route("/api/scenarios/{id}/financials/yearly", get(scenario_financials))
        .route("/api/scenarios/{id}/staff/yearly", get(scenario_staff))
        .route("/api/scenarios/{id}/parameters/update", post(update_parameters))
        .route("/api/financials/yearly", get(default_financials))
        .route("/api/staff/yearly", get(default_staff))
        .with_state(backend)
}

/// Serve the fake backend on an ephemeral port and return its base URL
pub async fn spawn(backend: Arc<Backend>) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let addr = listener.local_addr().expect("Failed to read listener address");
    let app = router(backend);
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Test server failed");
    });
    format!("http://{}", addr)
}

/// Backend, a client pointed at it, and the client's session store
pub async fn setup() -> (Arc<Backend>, ApiClient, Arc<MemorySessionStore>) {
    let backend = Backend::new();
    let base_url = spawn(backend.clone()).await;
    let store = Arc::new(MemorySessionStore::new());
    let api = ApiClient::new(&base_url, Session::new(store.clone())).expect("Failed to create client");
    (backend, api, store)
}
