//! Shared helpers: a throwaway upstream that records what it receives, and a
//! gateway router wired from a fake environment.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::body::{Body, Bytes};
use axum::extract::{Query, State};
use axum::http::{HeaderMap, Request, StatusCode};
use axum::{routing, Json, Router};
use serde_json::Value;
use tower::ServiceExt;

use opsgate::config::GatewayConfig;
use opsgate::{api, upstream, Gateway};

pub const TRUSTED_ORIGIN: &str = "https://ops.example.com";
pub const API_KEY: &str = "k-123";

#[derive(Debug, Clone)]
pub struct Recorded {
    pub query: HashMap<String, String>,
    pub headers: HeaderMap,
    pub body: Option<Value>,
}

#[derive(Clone)]
struct Shared {
    status: StatusCode,
    reply: Value,
    calls: Arc<Mutex<Vec<Recorded>>>,
}

async fn record(
    State(shared): State<Shared>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
    body: Bytes,
) -> (StatusCode, Json<Value>) {
    shared.calls.lock().unwrap().push(Recorded {
        query,
        headers,
        body: serde_json::from_slice(&body).ok(),
    });
    (shared.status, Json(shared.reply.clone()))
}

pub struct FakeUpstream {
    pub base_url: String,
    calls: Arc<Mutex<Vec<Recorded>>>,
}

impl FakeUpstream {
    /// Serve `reply` with `status` on `path` from an ephemeral local port.
    pub async fn spawn(path: &str, status: StatusCode, reply: Value) -> Self {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let shared = Shared {
            status,
            reply,
            calls: calls.clone(),
        };
        let app = Router::new()
            .route(path, routing::any(record))
            .with_state(shared);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{addr}"),
            calls,
        }
    }

    pub fn calls(&self) -> Vec<Recorded> {
        self.calls.lock().unwrap().clone()
    }
}

/// Address nothing is listening on.
pub async fn dead_address() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}

pub fn gateway(vars: &[(&str, &str)]) -> Router {
    let mut env: HashMap<String, String> = HashMap::from([
        ("ALLOWED_DOMAINS".to_string(), "example.com".to_string()),
        ("API_KEYS".to_string(), API_KEY.to_string()),
    ]);
    for (k, v) in vars {
        env.insert(k.to_string(), v.to_string());
    }
    let config = GatewayConfig::from_lookup(|name| env.get(name).cloned()).unwrap();
    let http = upstream::http_client().unwrap();
    api::router(Arc::new(Gateway::new(config, http)))
}

/// GET from the trusted origin with the custom header set.
pub fn trusted_get(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header("origin", TRUSTED_ORIGIN)
        .header("x-rfp-customer", "acme")
        .body(Body::empty())
        .unwrap()
}

pub struct Reply {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

pub async fn send(app: Router, req: Request<Body>) -> Reply {
    let resp = app.oneshot(req).await.unwrap();
    let status = resp.status();
    let headers = resp.headers().clone();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    Reply {
        status,
        headers,
        body,
    }
}

pub fn allow_origin(reply: &Reply) -> &str {
    reply
        .headers
        .get("access-control-allow-origin")
        .unwrap()
        .to_str()
        .unwrap()
}
