use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderMap, HeaderName, Method, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::security::{apply_cors, authorize, RequestCredentials};
use crate::AppState;

/// Non-empty header value. Non-ASCII bytes are replaced rather than treated
/// as absence, so presence checks do not depend on the encoding.
fn header_value(headers: &HeaderMap, name: &HeaderName) -> Option<String> {
    headers
        .get(name)
        .filter(|v| !v.is_empty())
        .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned())
}

/// Denial body. Not an envelope: clients match on `{"error": "Unauthorized"}`.
fn unauthorized() -> Response {
    (
        StatusCode::FORBIDDEN,
        Json(json!({ "error": "Unauthorized" })),
    )
        .into_response()
}

/// Guards every `/api` route.
///
/// - `OPTIONS` is answered here with an empty 204 and never reaches the
///   authorization policy.
/// - Otherwise the policy runs; a denied request gets 403 and the handler is
///   not called.
/// - Whatever comes back (handler result, 403 or preflight) leaves with the
///   CORS headers applied.
///
/// The origin is taken from `Origin`, falling back to `Referer`.
pub async fn guard_middleware(
    State(state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let security = &state.config.security;
    let headers = req.headers();
    let origin = header_value(headers, &header::ORIGIN)
        .or_else(|| header_value(headers, &header::REFERER));
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    if method == Method::OPTIONS {
        log::info!(
            "CORS preflight for {} {} origin={}",
            method,
            path,
            origin.as_deref().unwrap_or("-")
        );
        let mut resp = StatusCode::NO_CONTENT.into_response();
        apply_cors(resp.headers_mut(), origin.as_deref(), security);
        return resp;
    }

    let decision = {
        let custom_header = header_value(headers, &security.custom_auth_header);
        let api_key = header_value(headers, &security.api_key_header);
        let creds = RequestCredentials {
            origin: origin.as_deref(),
            custom_header: custom_header.as_deref(),
            api_key: api_key.as_deref(),
        };
        authorize(method.as_str(), &path, &creds, security)
    };

    let mut resp = if decision.granted {
        next.run(req).await
    } else {
        unauthorized()
    };

    apply_cors(resp.headers_mut(), origin.as_deref(), security);
    resp
}
