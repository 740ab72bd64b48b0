mod middleware;
pub mod netbox;
pub mod status;
pub mod zabbix;

use axum::{
    extract::{OriginalUri, State},
    middleware as axum_middleware, routing, Json, Router,
};
use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::openapi::Components;
use utoipa::OpenApi;

use crate::error::GatewayError;
use crate::AppState;

pub use middleware::guard_middleware;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Opsgate API",
        description = "Authenticated gateway to NetBox sites and Zabbix hosts. Callers send the custom auth header together with either an allow-listed Origin or a shared API key.",
        version = "0.1.0",
        license(name = "MIT")
    ),
    paths(
        status::zabbix_status,
        status::netbox_status,
        zabbix::list_hosts,
        netbox::list_sites,
    ),
    components(schemas(
        status::StatusMessage,
        crate::envelope::EnvelopeStatus,
        crate::envelope::ErrorDetail,
        crate::upstream::Site,
        crate::upstream::SiteList,
    )),
    tags(
        (name = "status", description = "Gateway health echo"),
        (name = "zabbix", description = "Zabbix host monitoring"),
        (name = "netbox", description = "NetBox site inventory")
    )
)]
pub struct ApiDoc;

/// Build the full router: every `/api` route sits behind the guard.
pub fn router(state: AppState) -> Router {
    let guarded = Router::new()
        .route("/zabbix/status", routing::get(status::zabbix_status))
        .route("/netbox/status", routing::get(status::netbox_status))
        .route("/hosts", routing::get(zabbix::list_hosts))
        .route("/sites", routing::get(netbox::list_sites))
        .fallback(unknown_route)
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::guard_middleware,
        ));

    Router::new()
        .route("/openapi.json", routing::get(openapi_spec))
        .nest("/api", guarded)
        .with_state(state)
}

/// Unknown `/api` paths still sit behind the guard, so they answer with CORS
/// headers and an envelope instead of a bare 404.
async fn unknown_route(OriginalUri(uri): OriginalUri) -> GatewayError {
    GatewayError::NotFound(uri.path().to_string())
}

pub async fn start_server(state: AppState) -> std::io::Result<()> {
    let bind = state.config.bind;
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(bind).await?;
    log::info!("Gateway listening on {}", bind);
    axum::serve(listener, app).await?;

    Ok(())
}

/// The credential header names are configurable, so the security schemes
/// are filled in per process rather than baked into the derive.
async fn openapi_spec(State(state): State<AppState>) -> Json<utoipa::openapi::OpenApi> {
    let security = &state.config.security;
    let mut doc = ApiDoc::openapi();
    let components = doc.components.get_or_insert_with(Components::default);
    components.add_security_scheme(
        "custom_header",
        SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new(
            security.custom_auth_header.as_str(),
        ))),
    );
    components.add_security_scheme(
        "api_key",
        SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new(
            security.api_key_header.as_str(),
        ))),
    );
    Json(doc)
}
