use serde::Serialize;
use serde_json::{json, Value};
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum EnvelopeStatus {
    Ok,
    Error,
}

/// Error object the gateway itself produces for a failed [`Envelope`].
///
/// Zabbix JSON-RPC errors usually look the same but are carried as raw JSON,
/// so members this type does not know about survive.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct ErrorDetail {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub code: Option<i64>,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub data: Option<serde_json::Value>,
}

impl ErrorDetail {
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            code: None,
            message: message.into(),
            data: None,
        }
    }
}

impl From<ErrorDetail> for Value {
    fn from(detail: ErrorDetail) -> Self {
        let mut obj = json!({ "message": detail.message });
        if let Some(code) = detail.code {
            obj["code"] = json!(code);
        }
        if let Some(data) = detail.data {
            obj["data"] = data;
        }
        obj
    }
}

/// Uniform `{status, result}` / `{status, error}` body returned by every
/// gateway endpoint.
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub status: EnvelopeStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<Value>,
}

impl<T> Envelope<T> {
    pub fn ok(result: T) -> Self {
        Self {
            status: EnvelopeStatus::Ok,
            result: Some(result),
            error: None,
        }
    }

    pub fn failure(error: impl Into<Value>) -> Self {
        Self {
            status: EnvelopeStatus::Error,
            result: None,
            error: Some(error.into()),
        }
    }
}
