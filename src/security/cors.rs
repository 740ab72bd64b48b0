use axum::http::header::{
    ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN,
    ACCESS_CONTROL_MAX_AGE, VARY,
};
use axum::http::{HeaderMap, HeaderValue};

use super::origin::is_allowed;
use crate::config::SecurityConfig;

const ALLOWED_METHODS: &str = "GET, POST, PUT, PATCH, DELETE, OPTIONS";
const MAX_AGE_SECS: &str = "3600";

/// Stamp the CORS headers onto a response.
///
/// Only an allow-listed origin is echoed back. Anything else gets the literal
/// `null`, so untrusted pages cannot read responses even when they carry
/// valid credentials. The body is never touched.
pub fn apply_cors(headers: &mut HeaderMap, origin: Option<&str>, config: &SecurityConfig) {
    let allow_origin = match origin {
        Some(o) if is_allowed(Some(o), &config.allowed) => {
            HeaderValue::from_str(o).unwrap_or_else(|_| HeaderValue::from_static("null"))
        }
        _ => HeaderValue::from_static("null"),
    };
    headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, allow_origin);
    headers.insert(VARY, HeaderValue::from_static("Origin"));

    let allow_headers = format!(
        "{}, {}, Content-Type",
        config.custom_auth_header, config.api_key_header
    );
    if let Ok(value) = HeaderValue::from_str(&allow_headers) {
        headers.insert(ACCESS_CONTROL_ALLOW_HEADERS, value);
    }
    headers.insert(
        ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static(ALLOWED_METHODS),
    );
    headers.insert(ACCESS_CONTROL_MAX_AGE, HeaderValue::from_static(MAX_AGE_SECS));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AllowList;
    use axum::http::HeaderName;

    fn config() -> SecurityConfig {
        SecurityConfig {
            allowed: AllowList::from_entries(["example.com"]),
            ..SecurityConfig::default()
        }
    }

    fn header<'a>(headers: &'a HeaderMap, name: HeaderName) -> &'a str {
        headers.get(name).unwrap().to_str().unwrap()
    }

    #[test]
    fn allowed_origin_is_echoed_verbatim() {
        let mut headers = HeaderMap::new();
        apply_cors(&mut headers, Some("https://Ops.Example.com"), &config());
        assert_eq!(
            header(&headers, ACCESS_CONTROL_ALLOW_ORIGIN),
            "https://Ops.Example.com"
        );
    }

    #[test]
    fn untrusted_origin_gets_literal_null() {
        let mut headers = HeaderMap::new();
        apply_cors(&mut headers, Some("https://evil.net"), &config());
        assert_eq!(header(&headers, ACCESS_CONTROL_ALLOW_ORIGIN), "null");
    }

    #[test]
    fn missing_origin_gets_literal_null() {
        let mut headers = HeaderMap::new();
        apply_cors(&mut headers, None, &config());
        assert_eq!(header(&headers, ACCESS_CONTROL_ALLOW_ORIGIN), "null");
    }

    #[test]
    fn fixed_headers_are_always_present() {
        let mut headers = HeaderMap::new();
        apply_cors(&mut headers, None, &config());
        assert_eq!(header(&headers, VARY), "Origin");
        assert_eq!(
            header(&headers, ACCESS_CONTROL_ALLOW_METHODS),
            "GET, POST, PUT, PATCH, DELETE, OPTIONS"
        );
        assert_eq!(header(&headers, ACCESS_CONTROL_MAX_AGE), "3600");
    }

    #[test]
    fn allow_headers_follow_configured_names() {
        let cfg = SecurityConfig {
            custom_auth_header: HeaderName::from_static("x-team"),
            api_key_header: HeaderName::from_static("x-secret"),
            ..config()
        };
        let mut headers = HeaderMap::new();
        apply_cors(&mut headers, None, &cfg);
        assert_eq!(
            header(&headers, ACCESS_CONTROL_ALLOW_HEADERS),
            "x-team, x-secret, Content-Type"
        );
    }

    #[test]
    fn existing_values_are_replaced() {
        let mut headers = HeaderMap::new();
        headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
        headers.insert(VARY, HeaderValue::from_static("Accept"));
        apply_cors(&mut headers, Some("https://evil.net"), &config());
        assert_eq!(header(&headers, ACCESS_CONTROL_ALLOW_ORIGIN), "null");
        assert_eq!(header(&headers, VARY), "Origin");
    }
}
