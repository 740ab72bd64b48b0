//! Gateway configuration, read once from the environment at startup.
//!
//! Nothing in the request path touches `std::env`; handlers receive the
//! immutable [`GatewayConfig`] through router state.

use std::collections::HashSet;
use std::net::SocketAddr;

use axum::http::HeaderName;
use subtle::ConstantTimeEq;

use crate::error::GatewayError;

pub const DEFAULT_CUSTOM_AUTH_HEADER: &str = "X-RFP-Customer";
pub const DEFAULT_API_KEY_HEADER: &str = "X-API-Key";
pub const DEFAULT_BIND: &str = "127.0.0.1:5000";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{var} is not a valid HTTP header name: {value:?}")]
    InvalidHeaderName { var: &'static str, value: String },

    #[error("GATEWAY_BIND is not a valid socket address: {0:?}")]
    InvalidBind(String),
}

/// Lowercased allow-list of bare domains (`example.com`) and full origins
/// (`https://example.com`).
#[derive(Debug, Clone, Default)]
pub struct AllowList(HashSet<String>);

impl AllowList {
    pub fn from_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self(
            entries
                .into_iter()
                .map(|e| e.as_ref().trim().to_lowercase())
                .filter(|e| !e.is_empty())
                .collect(),
        )
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn contains(&self, entry: &str) -> bool {
        self.0.contains(entry)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Flat set of shared-secret API keys.
#[derive(Clone, Default)]
pub struct ApiKeySet(Vec<String>);

impl ApiKeySet {
    pub fn from_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut keys: Vec<String> = entries
            .into_iter()
            .map(|e| e.as_ref().trim().to_string())
            .filter(|e| !e.is_empty())
            .collect();
        keys.sort();
        keys.dedup();
        Self(keys)
    }

    /// Membership check that compares against every key in constant time,
    /// so response timing does not reveal which prefix matched.
    pub fn contains(&self, candidate: &str) -> bool {
        let candidate = candidate.as_bytes();
        self.0
            .iter()
            .fold(0u8, |hit, key| hit | key.as_bytes().ct_eq(candidate).unwrap_u8())
            == 1
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

// Keys never appear in Debug output.
impl std::fmt::Debug for ApiKeySet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ApiKeySet({} keys)", self.0.len())
    }
}

/// Everything the request guard and the CORS responder consult.
#[derive(Debug, Clone)]
pub struct SecurityConfig {
    pub allowed: AllowList,
    pub api_keys: ApiKeySet,
    pub custom_auth_header: HeaderName,
    pub api_key_header: HeaderName,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            allowed: AllowList::default(),
            api_keys: ApiKeySet::default(),
            custom_auth_header: HeaderName::from_static("x-rfp-customer"),
            api_key_header: HeaderName::from_static("x-api-key"),
        }
    }
}

/// Which upstream a set of settings belongs to. Drives the environment
/// variable names in error messages and URL normalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpstreamKind {
    Netbox,
    Zabbix,
}

impl UpstreamKind {
    fn url_var(self) -> &'static str {
        match self {
            UpstreamKind::Netbox => "NETBOX_API_URL",
            UpstreamKind::Zabbix => "ZABBIX_API_URL",
        }
    }

    fn token_var(self) -> &'static str {
        match self {
            UpstreamKind::Netbox => "NETBOX_API_TOKEN",
            UpstreamKind::Zabbix => "ZABBIX_API_TOKEN",
        }
    }
}

/// Raw upstream settings as configured. Either value may be missing; that is
/// only an error once a request needs the upstream.
#[derive(Clone)]
pub struct UpstreamSettings {
    kind: UpstreamKind,
    url: Option<String>,
    token: Option<String>,
}

impl std::fmt::Debug for UpstreamSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpstreamSettings")
            .field("kind", &self.kind)
            .field("url", &self.url)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Resolved base URL (no trailing slash) and token for one upstream call.
#[derive(Clone)]
pub struct UpstreamCredentials {
    pub base_url: String,
    pub token: String,
}

impl UpstreamSettings {
    pub fn new(kind: UpstreamKind, url: Option<String>, token: Option<String>) -> Self {
        Self { kind, url, token }
    }

    pub fn kind(&self) -> UpstreamKind {
        self.kind
    }

    /// Resolve the settings into credentials, or a configuration error naming
    /// the missing variable.
    pub fn resolve(&self) -> Result<UpstreamCredentials, GatewayError> {
        let raw = self.url.as_deref().map(str::trim).unwrap_or_default();
        let base = raw.trim_end_matches('/');
        if base.is_empty() {
            return Err(GatewayError::Configuration(format!(
                "{} is not set",
                self.kind.url_var()
            )));
        }

        let token = self.token.as_deref().unwrap_or_default();
        if token.is_empty() {
            return Err(GatewayError::Configuration(format!(
                "{} is not set",
                self.kind.token_var()
            )));
        }

        let base_url = match self.kind {
            // Lab NetBox instances are often configured without a scheme.
            UpstreamKind::Netbox => {
                if base.starts_with("http://") || base.starts_with("https://") {
                    base.to_string()
                } else {
                    format!("http://{base}")
                }
            }
            UpstreamKind::Zabbix => {
                if base.ends_with("api_jsonrpc.php") {
                    base.to_string()
                } else {
                    format!("{base}/api_jsonrpc.php")
                }
            }
        };

        Ok(UpstreamCredentials {
            base_url,
            token: token.to_string(),
        })
    }
}

#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub bind: SocketAddr,
    pub security: SecurityConfig,
    pub netbox: UpstreamSettings,
    pub zabbix: UpstreamSettings,
}

impl GatewayConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build the configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let list = |name: &str| -> Vec<String> {
            lookup(name)
                .map(|raw| raw.split(',').map(str::to_string).collect())
                .unwrap_or_default()
        };

        let header = |var: &'static str, default: &str| -> Result<HeaderName, ConfigError> {
            let value = lookup(var)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| default.to_string());
            HeaderName::from_bytes(value.as_bytes())
                .map_err(|_| ConfigError::InvalidHeaderName { var, value })
        };

        let bind_raw = lookup("GATEWAY_BIND")
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_BIND.to_string());
        let bind = bind_raw
            .parse()
            .map_err(|_| ConfigError::InvalidBind(bind_raw.clone()))?;

        let security = SecurityConfig {
            allowed: AllowList::from_entries(list("ALLOWED_DOMAINS")),
            api_keys: ApiKeySet::from_entries(list("API_KEYS")),
            custom_auth_header: header("CUSTOM_AUTH_HEADER", DEFAULT_CUSTOM_AUTH_HEADER)?,
            api_key_header: header("API_KEY_HEADER", DEFAULT_API_KEY_HEADER)?,
        };

        Ok(Self {
            bind,
            security,
            netbox: UpstreamSettings::new(
                UpstreamKind::Netbox,
                lookup("NETBOX_API_URL"),
                lookup("NETBOX_API_TOKEN"),
            ),
            zabbix: UpstreamSettings::new(
                UpstreamKind::Zabbix,
                lookup("ZABBIX_API_URL"),
                lookup("ZABBIX_API_TOKEN"),
            ),
        })
    }
}
