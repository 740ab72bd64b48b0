use axum::{
    extract::{rejection::QueryRejection, Query, State},
    Json,
};
use serde::Deserialize;
use serde_json::Value;
use utoipa::IntoParams;

use crate::envelope::Envelope;
use crate::error::{GatewayError, GatewayResult};
use crate::upstream::{HostQuery, InventorySelection, ZabbixClient};
use crate::AppState;

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct HostsParams {
    /// Include host interfaces (`selectInterfaces`). Default true.
    #[param(value_type = Option<bool>)]
    pub with_interfaces: Option<String>,
    /// Include host inventory (`selectInventory`). Default true.
    #[param(value_type = Option<bool>)]
    pub with_inventory: Option<String>,
    /// Comma-separated host fields. Default `hostid,host,name`.
    pub fields: Option<String>,
    /// Comma-separated inventory fields. All fields when omitted or blank.
    pub inventory_fields: Option<String>,
    /// Maximum number of hosts.
    #[param(value_type = Option<u64>, minimum = 1, maximum = 10000)]
    pub limit: Option<String>,
}

/// Anything but a case-insensitive `false` counts as true.
fn flag(raw: Option<&str>) -> bool {
    raw.map_or(true, |v| !v.eq_ignore_ascii_case("false"))
}

fn field_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|f| !f.is_empty())
        .map(str::to_string)
        .collect()
}

impl HostsParams {
    pub fn validate(self) -> GatewayResult<HostQuery> {
        let defaults = HostQuery::default();

        let fields = self
            .fields
            .as_deref()
            .map(field_list)
            .filter(|f| !f.is_empty())
            .unwrap_or(defaults.fields);

        let inventory = if !flag(self.with_inventory.as_deref()) {
            InventorySelection::None
        } else {
            match self.inventory_fields.as_deref().map(str::trim) {
                Some(raw) if !raw.is_empty() => InventorySelection::Fields(field_list(raw)),
                _ => InventorySelection::All,
            }
        };

        let limit = match self.limit.as_deref().filter(|v| !v.is_empty()) {
            Some(raw) => match raw.trim().parse::<i64>() {
                Ok(v) if v > 0 => Some(v as u64),
                _ => return Err(GatewayError::InvalidParam("limit")),
            },
            None => None,
        };

        Ok(HostQuery {
            fields,
            with_interfaces: flag(self.with_interfaces.as_deref()),
            inventory,
            limit,
        })
    }
}

/// List Zabbix hosts via `host.get`; the result array is passed through.
#[utoipa::path(
    get,
    path = "/api/hosts",
    tag = "zabbix",
    security(("custom_header" = []), ("api_key" = [])),
    params(HostsParams),
    responses(
        (status = 200, description = "Hosts retrieved", body = Object, example = json!({
            "status": "ok",
            "result": [{
                "hostid": "10084",
                "host": "Zabbix server",
                "name": "Zabbix server",
                "interfaces": [{"interfaceid": "1", "ip": "127.0.0.1"}],
                "inventory": {"type": "Server", "os": "Ubuntu 22.04"}
            }]
        })),
        (status = 400, description = "Invalid parameter or missing Zabbix configuration", body = Object, example = json!({
            "status": "error",
            "error": {"message": "Invalid query parameter: limit"}
        })),
        (status = 403, description = "Unauthorized"),
        (status = 502, description = "Zabbix returned an RPC error or was unreachable", body = Object, example = json!({
            "status": "error",
            "error": {"code": -32602, "message": "Not authorized."}
        })),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn list_hosts(
    State(state): State<AppState>,
    params: Result<Query<HostsParams>, QueryRejection>,
) -> GatewayResult<Json<Envelope<Value>>> {
    log::info!("Zabbix /hosts endpoint hit");

    let creds = state.config.zabbix.resolve()?;
    let Query(params) = params.map_err(|_| GatewayError::InvalidParam("query"))?;
    let query = params.validate()?;

    let client = ZabbixClient::new(state.http.clone(), creds);
    let hosts = client.list_hosts(&query).await?;
    Ok(Json(Envelope::ok(hosts)))
}
