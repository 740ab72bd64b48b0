use reqwest::Client;
use serde::Serialize;
use serde_json::{json, Map, Value};

use crate::config::UpstreamCredentials;
use crate::error::{GatewayError, GatewayResult};

pub const DEFAULT_HOST_FIELDS: [&str; 3] = ["hostid", "host", "name"];
const INTERFACE_FIELDS: [&str; 2] = ["interfaceid", "ip"];

/// Which inventory fields to pull alongside each host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InventorySelection {
    None,
    /// Zabbix `"extend"`: every inventory field.
    All,
    Fields(Vec<String>),
}

/// Validated `host.get` options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostQuery {
    pub fields: Vec<String>,
    pub with_interfaces: bool,
    pub inventory: InventorySelection,
    pub limit: Option<u64>,
}

impl Default for HostQuery {
    fn default() -> Self {
        Self {
            fields: DEFAULT_HOST_FIELDS.iter().map(|f| f.to_string()).collect(),
            with_interfaces: true,
            inventory: InventorySelection::All,
            limit: None,
        }
    }
}

impl HostQuery {
    /// `params` object for `host.get`.
    pub fn to_params(&self) -> Value {
        let mut params = Map::new();
        params.insert("output".into(), json!(self.fields));
        if self.with_interfaces {
            params.insert("selectInterfaces".into(), json!(INTERFACE_FIELDS));
        }
        match &self.inventory {
            InventorySelection::None => {}
            InventorySelection::All => {
                params.insert("selectInventory".into(), json!("extend"));
            }
            // An explicit but blank list goes out as `[]`.
            InventorySelection::Fields(fields) => {
                params.insert("selectInventory".into(), json!(fields));
            }
        }
        if let Some(limit) = self.limit {
            params.insert("limit".into(), json!(limit));
        }
        Value::Object(params)
    }
}

#[derive(Debug, Serialize)]
struct RpcRequest<'a> {
    jsonrpc: &'static str,
    method: &'a str,
    params: Value,
    id: String,
}

/// Split a JSON-RPC reply into its result. The mere presence of an `error`
/// member marks a failure, whatever its value.
fn into_result(mut reply: Map<String, Value>) -> GatewayResult<Value> {
    if let Some(err) = reply.remove("error") {
        return Err(GatewayError::Rpc(err));
    }
    Ok(reply
        .remove("result")
        .unwrap_or_else(|| Value::Array(Vec::new())))
}

/// JSON-RPC client for the Zabbix API.
pub struct ZabbixClient {
    client: Client,
    url: String,
    token: String,
}

impl ZabbixClient {
    pub fn new(client: Client, creds: UpstreamCredentials) -> Self {
        Self {
            client,
            url: creds.base_url,
            token: creds.token,
        }
    }

    /// Issue one JSON-RPC call. An `error` member in the reply becomes
    /// [`GatewayError::Rpc`] carrying the upstream object unchanged.
    pub async fn call(&self, method: &str, params: Value) -> GatewayResult<Value> {
        let rpc_id = uuid::Uuid::new_v4().simple().to_string();
        log::info!("Zabbix request start: {} id={}", method, rpc_id);

        let reply = self
            .client
            .post(&self.url)
            .header("Authorization", format!("Bearer {}", self.token))
            .header("Content-Type", "application/json-rpc")
            .body(serde_json::to_vec(&RpcRequest {
                jsonrpc: "2.0",
                method,
                params,
                id: rpc_id.clone(),
            })
            .map_err(|e| GatewayError::Internal(format!("encoding {method} request: {e}")))?)
            .send()
            .await?
            .error_for_status()?
            .json::<Map<String, Value>>()
            .await?;

        let result = into_result(reply);
        match &result {
            Ok(_) => log::info!("Zabbix request ok: {} id={}", method, rpc_id),
            Err(e) => log::warn!("Zabbix API error: {} id={} {}", method, rpc_id, e),
        }
        result
    }

    /// `host.get`; the result array is returned as Zabbix sent it.
    pub async fn list_hosts(&self, query: &HostQuery) -> GatewayResult<Value> {
        self.call("host.get", query.to_params()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_query_requests_interfaces_and_full_inventory() {
        assert_eq!(
            HostQuery::default().to_params(),
            json!({
                "output": ["hostid", "host", "name"],
                "selectInterfaces": ["interfaceid", "ip"],
                "selectInventory": "extend"
            })
        );
    }

    #[test]
    fn inventory_subset_and_limit() {
        let query = HostQuery {
            fields: vec!["hostid".into()],
            with_interfaces: false,
            inventory: InventorySelection::Fields(vec!["os".into(), "serialno_a".into()]),
            limit: Some(5),
        };
        assert_eq!(
            query.to_params(),
            json!({
                "output": ["hostid"],
                "selectInventory": ["os", "serialno_a"],
                "limit": 5
            })
        );
    }

    #[test]
    fn inventory_can_be_left_out() {
        let query = HostQuery {
            inventory: InventorySelection::None,
            ..HostQuery::default()
        };
        assert!(query.to_params().get("selectInventory").is_none());
    }

    #[test]
    fn request_envelope_is_jsonrpc_2() {
        let body = serde_json::to_value(RpcRequest {
            jsonrpc: "2.0",
            method: "host.get",
            params: json!({}),
            id: "abc".into(),
        })
        .unwrap();
        assert_eq!(
            body,
            json!({"jsonrpc": "2.0", "method": "host.get", "params": {}, "id": "abc"})
        );
    }

    fn reply(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            other => panic!("not an object: {other}"),
        }
    }

    fn rpc_error(result: GatewayResult<Value>) -> Value {
        match result {
            Err(GatewayError::Rpc(raw)) => raw,
            other => panic!("expected Rpc error, got {other:?}"),
        }
    }

    #[test]
    fn error_member_is_kept_verbatim() {
        let error = json!({"code": -32602, "message": "Not authorized.", "data": "x", "extra": 7});
        let result = into_result(reply(json!({"jsonrpc": "2.0", "error": error.clone(), "id": "abc"})));
        assert_eq!(rpc_error(result), error);
    }

    #[test]
    fn error_without_message_still_counts() {
        let error = json!({"code": -32700, "data": "Parse error"});
        let result = into_result(reply(json!({"jsonrpc": "2.0", "error": error.clone(), "id": "abc"})));
        assert_eq!(rpc_error(result), error);
    }

    #[test]
    fn null_error_member_is_still_an_error() {
        let result = into_result(reply(json!({"jsonrpc": "2.0", "error": null, "result": []})));
        assert_eq!(rpc_error(result), Value::Null);
    }

    #[test]
    fn result_defaults_to_empty_list() {
        let result = into_result(reply(json!({"jsonrpc": "2.0", "id": "abc"}))).unwrap();
        assert_eq!(result, json!([]));

        let result = into_result(reply(json!({"jsonrpc": "2.0", "result": [{"hostid": "1"}]}))).unwrap();
        assert_eq!(result, json!([{"hostid": "1"}]));
    }

    #[test]
    fn blank_inventory_subset_is_an_empty_list() {
        let query = HostQuery {
            inventory: InventorySelection::Fields(Vec::new()),
            ..HostQuery::default()
        };
        assert_eq!(query.to_params()["selectInventory"], json!([]));
    }
}
