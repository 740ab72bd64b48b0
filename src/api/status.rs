use axum::Json;
use serde::Serialize;
use utoipa::ToSchema;

use crate::envelope::EnvelopeStatus;

#[derive(Debug, Serialize, ToSchema)]
pub struct StatusMessage {
    pub status: EnvelopeStatus,
    pub message: String,
}

fn working() -> Json<StatusMessage> {
    Json(StatusMessage {
        status: EnvelopeStatus::Ok,
        message: "API is working".into(),
    })
}

/// Health echo for the Zabbix namespace.
#[utoipa::path(
    get,
    path = "/api/zabbix/status",
    tag = "status",
    security(("custom_header" = []), ("api_key" = [])),
    responses(
        (status = 200, description = "Gateway is up", body = StatusMessage),
        (status = 403, description = "Unauthorized")
    )
)]
pub async fn zabbix_status() -> Json<StatusMessage> {
    log::info!("Zabbix status endpoint hit");
    working()
}

/// Health echo for the NetBox namespace.
#[utoipa::path(
    get,
    path = "/api/netbox/status",
    tag = "status",
    security(("custom_header" = []), ("api_key" = [])),
    responses(
        (status = 200, description = "Gateway is up", body = StatusMessage),
        (status = 403, description = "Unauthorized")
    )
)]
pub async fn netbox_status() -> Json<StatusMessage> {
    log::info!("NetBox status endpoint hit");
    working()
}
