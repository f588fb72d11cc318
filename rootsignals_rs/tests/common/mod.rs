#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use rootsignals_rs::RootSignalsClient;
use serde_json::{Value, json};

pub const API_KEY: &str = "test-key";
pub const PROMPT: &str = "What is the weather today?";
/// The listing never returns more than this many items per page.
pub const MAX_PAGE_SIZE: usize = 2;

#[derive(Debug, Clone)]
pub struct Recorded {
    pub path: String,
    pub query: HashMap<String, String>,
    pub authorization: Option<String>,
    pub user_agent: Option<String>,
    pub body: Value,
}

/// In-process stand-in for the Root Signals API.
#[derive(Default)]
pub struct MockApi {
    pub requests: Mutex<Vec<Recorded>>,
    pub evaluators: Vec<Value>,
    /// Calibration requests for this model answer 500.
    pub failing_model: Option<String>,
}

impl MockApi {
    pub fn with_evaluators(mut self, evaluators: Vec<Value>) -> Self {
        self.evaluators = evaluators;
        self
    }

    pub fn failing_model(mut self, model: &str) -> Self {
        self.failing_model = Some(model.to_string());
        self
    }

    pub fn recorded(&self, path_prefix: &str) -> Vec<Recorded> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.path.starts_with(path_prefix))
            .cloned()
            .collect()
    }

    fn record(
        &self,
        path: String,
        query: HashMap<String, String>,
        headers: &HeaderMap,
        body: &Bytes,
    ) -> bool {
        let header = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };
        let authorization = header("authorization");
        let authorized = authorization.as_deref() == Some(format!("Api-Key {API_KEY}").as_str());
        self.requests.lock().unwrap().push(Recorded {
            path,
            query,
            authorization,
            user_agent: header("user-agent"),
            body: serde_json::from_slice(body).unwrap_or(Value::Null),
        });
        authorized
    }
}

pub fn weather_outcomes(model: &str) -> Value {
    json!([
        {
            "result": {
                "score": 0.8,
                "expected_score": 0.75,
                "llm_output": "output",
                "model": model,
                "rendered_prompt": PROMPT,
                "cost": 0.1,
                "execution_log_id": "1"
            },
            "row_number": 1,
            "variables": {}
        },
        {
            "result": {
                "score": 0.9,
                "expected_score": 0.55,
                "llm_output": "output",
                "model": model,
                "rendered_prompt": PROMPT,
                "cost": 0.1,
                "execution_log_id": "2"
            },
            "row_number": 2,
            "variables": {}
        }
    ])
}

pub fn evaluator(id: &str, name: &str) -> Value {
    json!({
        "id": id,
        "name": name,
        "created_at": "2024-05-01T12:00:00Z",
        "intent": format!("Measure {name}"),
        "is_preset": false,
        "prompt": "Rate {{response}}",
        "models": ["gpt-4o"]
    })
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({"detail": "Invalid API key"})),
    )
        .into_response()
}

fn not_found(what: &str) -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({"detail": format!("{what} not found")})),
    )
        .into_response()
}

async fn calibrate(
    State(api): State<Arc<MockApi>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    if !api.record("/v1/evaluators/calibrate/".into(), HashMap::new(), &headers, &body) {
        return unauthorized();
    }
    let body: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
    let model = body["models"][0].as_str().unwrap_or_default().to_string();
    if api.failing_model.as_deref() == Some(model.as_str()) {
        return (StatusCode::INTERNAL_SERVER_ERROR, "upstream exploded").into_response();
    }
    Json(weather_outcomes(&model)).into_response()
}

async fn calibrate_existing(
    State(api): State<Arc<MockApi>>,
    Path(id): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let path = format!("/v1/evaluators/calibrate/{id}/");
    if !api.record(path, HashMap::new(), &headers, &body) {
        return unauthorized();
    }
    if !api.evaluators.iter().any(|e| e["id"] == id.as_str()) {
        return not_found("evaluator");
    }
    Json(weather_outcomes("gpt-4o")).into_response()
}

async fn execute(
    State(api): State<Arc<MockApi>>,
    Path(id): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let path = format!("/v1/evaluators/execute/{id}/");
    if !api.record(path, HashMap::new(), &headers, &body) {
        return unauthorized();
    }
    Json(json!({
        "score": 0.9,
        "justification": "The response answers the question.",
        "evaluator_name": id,
        "execution_log_id": "log-1",
        "cost": 0.002
    }))
    .into_response()
}

async fn execute_by_name(
    State(api): State<Arc<MockApi>>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let name = query.get("name").cloned().unwrap_or_default();
    if !api.record("/v1/evaluators/execute/by-name/".into(), query, &headers, &body) {
        return unauthorized();
    }
    Json(json!({"score": 0.5, "evaluator_name": name})).into_response()
}

async fn list(
    State(api): State<Arc<MockApi>>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Response {
    if !api.record("/v1/evaluators/".into(), query.clone(), &headers, &Bytes::new()) {
        return unauthorized();
    }
    let matching: Vec<&Value> = api
        .evaluators
        .iter()
        .filter(|e| query.get("name").is_none_or(|n| e["name"] == n.as_str()))
        .collect();
    let page_size: usize = query
        .get("page_size")
        .and_then(|v| v.parse().ok())
        .unwrap_or(MAX_PAGE_SIZE)
        .min(MAX_PAGE_SIZE);
    let offset: usize = query
        .get("cursor")
        .and_then(|v| v.parse().ok())
        .unwrap_or(0);
    let end = (offset + page_size).min(matching.len());
    let host = headers
        .get("host")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("localhost");
    let next = (end < matching.len())
        .then(|| format!("http://{host}/v1/evaluators/?cursor={end}&page_size={page_size}"));
    Json(json!({
        "results": matching.get(offset..end).unwrap_or_default(),
        "next": next,
        "previous": null
    }))
    .into_response()
}

async fn get_evaluator(
    State(api): State<Arc<MockApi>>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Response {
    let path = format!("/v1/evaluators/{id}/");
    if !api.record(path, HashMap::new(), &headers, &Bytes::new()) {
        return unauthorized();
    }
    match api.evaluators.iter().find(|e| e["id"] == id.as_str()) {
        Some(e) => Json(e.clone()).into_response(),
        None => not_found("evaluator"),
    }
}

pub fn router(api: Arc<MockApi>) -> Router {
    Router::new()
        .route("/v1/evaluators/", get(list))
        .route("/v1/evaluators/:id/", get(get_evaluator))
        .route("/v1/evaluators/calibrate/", post(calibrate))
        .route("/v1/evaluators/calibrate/:id/", post(calibrate_existing))
        .route("/v1/evaluators/execute/by-name/", post(execute_by_name))
        .route("/v1/evaluators/execute/:id/", post(execute))
        .with_state(api)
}

pub async fn start_server(api: Arc<MockApi>) -> SocketAddr {
    let app = router(api);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    tokio::time::sleep(Duration::from_millis(100)).await;
    addr
}

pub fn client(addr: SocketAddr) -> RootSignalsClient {
    RootSignalsClient::new(API_KEY, format!("http://{addr}/"))
}
