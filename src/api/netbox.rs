use axum::{
    extract::{rejection::QueryRejection, Query, State},
    Json,
};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::envelope::Envelope;
use crate::error::{GatewayError, GatewayResult};
use crate::upstream::{NetboxClient, SiteList, SiteQuery};
use crate::AppState;

/// Raw query string for `/api/sites`. Numbers arrive as text so that a bad
/// value can be reported by name.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SitesParams {
    /// Search term, passed to NetBox as `?q=`.
    pub q: Option<String>,
    /// Exact-name filter.
    pub name: Option<String>,
    /// Exact-slug filter.
    pub slug: Option<String>,
    /// Max records. `0` (default) sends no limit upstream.
    #[param(value_type = Option<u64>, minimum = 0, maximum = 10000)]
    pub limit: Option<String>,
    /// Pagination offset.
    #[param(value_type = Option<u64>, minimum = 0)]
    pub offset: Option<String>,
}

fn non_negative(name: &'static str, raw: &str) -> GatewayResult<u64> {
    raw.trim()
        .parse::<i64>()
        .ok()
        .and_then(|v| u64::try_from(v).ok())
        .ok_or(GatewayError::InvalidParam(name))
}

impl SitesParams {
    pub fn validate(self) -> GatewayResult<SiteQuery> {
        let limit = match self.limit.as_deref() {
            Some(raw) => non_negative("limit", raw)?,
            None => 0,
        };
        let offset = self
            .offset
            .as_deref()
            .map(|raw| non_negative("offset", raw))
            .transpose()?;

        Ok(SiteQuery {
            limit,
            offset,
            q: self.q,
            name: self.name,
            slug: self.slug,
        })
    }
}

/// List NetBox sites as a compact projection.
#[utoipa::path(
    get,
    path = "/api/sites",
    tag = "netbox",
    security(("custom_header" = []), ("api_key" = [])),
    params(SitesParams),
    responses(
        (status = 200, description = "Sites retrieved", body = Object, example = json!({
            "status": "ok",
            "result": {
                "count": 1,
                "results": [{
                    "id": 1,
                    "name": "Chicago-DC",
                    "status": "Active",
                    "location": "1 Main St, Chicago",
                    "lat": 41.88,
                    "long": -87.63
                }]
            }
        })),
        (status = 400, description = "Invalid parameter or missing NetBox configuration", body = Object, example = json!({
            "status": "error",
            "error": {"message": "Invalid query parameter: limit"}
        })),
        (status = 403, description = "Unauthorized"),
        (status = 502, description = "NetBox unreachable or returned an error status"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn list_sites(
    State(state): State<AppState>,
    params: Result<Query<SitesParams>, QueryRejection>,
) -> GatewayResult<Json<Envelope<SiteList>>> {
    log::info!("NetBox /sites endpoint hit");

    let creds = state.config.netbox.resolve()?;
    let Query(params) = params.map_err(|_| GatewayError::InvalidParam("query"))?;
    let query = params.validate()?;

    let client = NetboxClient::new(state.http.clone(), creds);
    let sites = client.list_sites(&query).await?;
    Ok(Json(Envelope::ok(sites)))
}
