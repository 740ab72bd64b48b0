use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use crate::config::UpstreamCredentials;
use crate::error::GatewayResult;

/// Validated site-listing filters, ready to go on the query string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SiteQuery {
    /// `0` means "no explicit limit" and is not sent.
    pub limit: u64,
    pub offset: Option<u64>,
    pub q: Option<String>,
    pub name: Option<String>,
    pub slug: Option<String>,
}

impl SiteQuery {
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if self.limit > 0 {
            pairs.push(("limit", self.limit.to_string()));
        }
        if let Some(offset) = self.offset {
            pairs.push(("offset", offset.to_string()));
        }
        let filters = [("q", &self.q), ("name", &self.name), ("slug", &self.slug)];
        for (key, value) in filters {
            if let Some(v) = value.as_deref().filter(|v| !v.is_empty()) {
                pairs.push((key, v.to_string()));
            }
        }
        pairs
    }
}

/// Page of `dcim.sites` as NetBox returns it. Only the fields we project are
/// modelled.
#[derive(Debug, Deserialize)]
struct SitePage {
    #[serde(default)]
    results: Option<Vec<RawSite>>,
}

#[derive(Debug, Deserialize)]
struct RawSite {
    #[serde(default)]
    id: Value,
    #[serde(default)]
    name: Value,
    #[serde(default)]
    status: Value,
    #[serde(default)]
    physical_address: Value,
    #[serde(default)]
    latitude: Value,
    #[serde(default)]
    longitude: Value,
}

/// Compact site record returned to gateway callers.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct Site {
    pub id: Value,
    pub name: Value,
    /// The status label when NetBox returns a `{value, label}` object.
    pub status: Value,
    pub location: Value,
    pub lat: Value,
    pub long: Value,
}

impl From<RawSite> for Site {
    fn from(raw: RawSite) -> Self {
        let status = match raw.status {
            Value::Object(mut map) => map.remove("label").unwrap_or(Value::Null),
            other => other,
        };
        Site {
            id: raw.id,
            name: raw.name,
            status,
            location: raw.physical_address,
            lat: raw.latitude,
            long: raw.longitude,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct SiteList {
    pub count: usize,
    pub results: Vec<Site>,
}

/// REST client for the NetBox site inventory.
pub struct NetboxClient {
    client: Client,
    base_url: String,
    token: String,
}

impl NetboxClient {
    pub fn new(client: Client, creds: UpstreamCredentials) -> Self {
        Self {
            client,
            base_url: creds.base_url,
            token: creds.token,
        }
    }

    pub fn sites_url(&self) -> String {
        format!("{}/api/dcim/sites/", self.base_url)
    }

    /// List sites with a single `GET /api/dcim/sites/`.
    pub async fn list_sites(&self, query: &SiteQuery) -> GatewayResult<SiteList> {
        let url = self.sites_url();
        let pairs = query.to_pairs();
        log::info!("NetBox request start: GET {} params={:?}", url, pairs);

        let page = self
            .client
            .get(&url)
            .header("Authorization", format!("Token {}", self.token))
            .header("Accept", "application/json")
            .query(&pairs)
            .send()
            .await?
            .error_for_status()?
            .json::<SitePage>()
            .await?;

        let results: Vec<Site> = page
            .results
            .unwrap_or_default()
            .into_iter()
            .map(Site::from)
            .collect();

        log::info!("NetBox request ok: {} sites returned", results.len());
        Ok(SiteList {
            count: results.len(),
            results,
        })
    }
}
