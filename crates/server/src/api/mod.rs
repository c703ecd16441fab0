//! API module providing the relay's HTTP endpoints.
//!
//! - `relay` - `/send` and `/history`
//! - `health` - Health check endpoint (`/healthz`)
//! - `openapi` - OpenAPI/Utoipa configuration, served as Redoc on `/api-docs`

pub mod health;
pub mod openapi;
pub mod relay;

pub use health::MISC_TAG;
pub use relay::RELAY_TAG;

use crate::AppResources;
use axum::{Extension, Router};
use std::net::SocketAddr;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_axum::{router::OpenApiRouter, routes};
use utoipa_redoc::{Redoc, Servable};

/// Build the full application router with middleware and API docs attached.
#[tracing::instrument(skip_all)]
pub fn router(app_resources: AppResources) -> Router {
    let (router, api) = OpenApiRouter::with_openapi(openapi::ApiDoc::openapi())
        .merge(relay::router())
        .routes(routes!(health::health))
        .layer(Extension(app_resources))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .split_for_parts();

    router.merge(Redoc::with_url("/api-docs", api))
}

/// Starts the web server on the configured bind address.
#[tracing::instrument(skip(app_resources))]
pub async fn start_webserver(app_resources: AppResources) -> color_eyre::Result<()> {
    let addr = app_resources.config.bind_address.clone();
    let router = router(app_resources);

    let listener = tokio::net::TcpListener::bind(addr.as_str()).await?;
    tracing::info!(addr = %addr, "Server running");
    axum::serve(
        listener,
        router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .map_err(|e| color_eyre::Report::msg(format!("Failed to start server: {e}")))?;

    Ok(())
}
