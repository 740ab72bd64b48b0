use std::fmt;

use super::origin::is_allowed;
use crate::config::SecurityConfig;

/// Why a request was let through, or that it was not.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthReason {
    OriginAndCustomHeader,
    ApiKeyAndCustomHeader,
    Denied,
}

impl AuthReason {
    pub fn as_str(self) -> &'static str {
        match self {
            AuthReason::OriginAndCustomHeader => "allowed-origin + custom-header",
            AuthReason::ApiKeyAndCustomHeader => "api-key + custom-header (origin not allowed)",
            AuthReason::Denied => "denied",
        }
    }
}

impl fmt::Display for AuthReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthDecision {
    pub granted: bool,
    pub reason: AuthReason,
}

/// Credentials pulled off an inbound request. Values are only inspected for
/// presence and key membership, never logged.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestCredentials<'a> {
    pub origin: Option<&'a str>,
    pub custom_header: Option<&'a str>,
    pub api_key: Option<&'a str>,
}

fn present(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

/// Decide whether a non-preflight request may proceed.
///
/// The custom header is required on both paths but its content is not
/// checked. It is paired either with an allow-listed origin or with an API
/// key from the configured set.
pub fn evaluate(creds: &RequestCredentials<'_>, config: &SecurityConfig) -> AuthDecision {
    let custom = present(creds.custom_header).is_some();

    let reason = if custom && is_allowed(creds.origin, &config.allowed) {
        AuthReason::OriginAndCustomHeader
    } else if custom
        && present(creds.api_key).is_some_and(|key| config.api_keys.contains(key))
    {
        AuthReason::ApiKeyAndCustomHeader
    } else {
        AuthReason::Denied
    };

    AuthDecision {
        granted: reason != AuthReason::Denied,
        reason,
    }
}

/// [`evaluate`], plus the audit log line for the decision.
pub fn authorize(
    method: &str,
    path: &str,
    creds: &RequestCredentials<'_>,
    config: &SecurityConfig,
) -> AuthDecision {
    let decision = evaluate(creds, config);

    log::info!(
        "Auth {} for {} {} | origin={} custom_header_present={} api_key_present={} reason={}",
        if decision.granted { "GRANTED" } else { "DENIED" },
        method,
        path,
        creds.origin.unwrap_or("-"),
        present(creds.custom_header).is_some(),
        present(creds.api_key).is_some(),
        decision.reason,
    );

    decision
}
