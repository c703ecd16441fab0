//! Relay API endpoints.
//!
//! - `/send` - Relay a message to Telegram and log the attempt
//! - `/history` - Most recent send attempts, newest first

use crate::{
    AppResources,
    relay::{self as workflow, FAILED_DELIVERY_STATUS, SendRequest},
    response::{ErrorResponse, HistoryEntry, SendResponse},
};
use axum::{
    Extension, Json,
    body::Bytes,
    extract::{ConnectInfo, FromRequestParts, Query, rejection::QueryRejection},
    http::request::Parts,
    response::{IntoResponse, Response},
};
use hyper::StatusCode;
use serde::Deserialize;
use serde_json::json;
use std::convert::Infallible;
use std::net::SocketAddr;
use utoipa::IntoParams;
use utoipa_axum::{router::OpenApiRouter, routes};

/// Tag for OpenAPI documentation.
pub const RELAY_TAG: &str = "Relay API";

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct HistoryParams {
    /// Number of records to return. Invalid values fall back to the configured default.
    pub limit: Option<String>,
}

/// Peer IP of the connection, or an empty string when the transport does not
/// expose it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CallerAddress(pub String);

impl<S> FromRequestParts<S> for CallerAddress
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let ip = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip().to_string())
            .unwrap_or_default();
        Ok(CallerAddress(ip))
    }
}

/// Creates the relay API router.
#[tracing::instrument(skip_all)]
pub fn router() -> OpenApiRouter {
    OpenApiRouter::new()
        .routes(routes!(send_message))
        .routes(routes!(history))
}

#[tracing::instrument(skip(resources, caller, body), fields(caller = %caller.0, body_len = body.len()))]
#[utoipa::path(
    post,
    path = "/send",
    tag = RELAY_TAG,
    operation_id = "Send Message",
    summary = "Relay a message to Telegram",
    description = "Forwards `text` to the Telegram Bot API `sendMessage` method using Markdown rendering.\n\n\
                   **Target:** `chat_id` from the body, or the deployment's default chat when omitted.\n\n\
                   **Logging:** every request that passes validation is recorded in the send history, \
                   whether or not Telegram accepted it. A failed log write does not change the response.\n\n\
                   **Timeout:** the Telegram call is bounded (10 seconds by default); a timeout is reported \
                   as a failed delivery.",
    request_body(
        content = SendRequest,
        description = "Message to relay"
    ),
    responses(
        (status = 200, description = "Telegram accepted the message", body = SendResponse),
        (status = 400, description = "Missing `text` or no resolvable target", body = ErrorResponse,
            example = json!({"error": "Content 'text' is required"})),
        (status = 502, description = "Telegram rejected the message or could not be reached", body = SendResponse)
    )
)]
pub async fn send_message(
    Extension(resources): Extension<AppResources>,
    caller: CallerAddress,
    body: Bytes,
) -> Response {
    let request = SendRequest::from_body(&body);
    match workflow::send(&resources, request, &caller.0).await {
        Ok(report) => {
            let status = if report.success {
                StatusCode::OK
            } else {
                FAILED_DELIVERY_STATUS
            };
            (status, Json(SendResponse::from(&report))).into_response()
        }
        Err(e) => {
            tracing::warn!(
                name = "api.send_message.validation_failed",
                target = concat!(env!("CARGO_PKG_NAME"), "::", module_path!()),
                error = %e,
                message = "Rejected send request"
            );
            (StatusCode::BAD_REQUEST, Json(ErrorResponse::new(e.to_string()))).into_response()
        }
    }
}

#[tracing::instrument(skip(resources, params))]
#[utoipa::path(
    get,
    path = "/history",
    tag = RELAY_TAG,
    operation_id = "Send History",
    summary = "List recent send attempts",
    description = "Returns the most recent send attempts ordered by id, newest first.\n\n\
                   `limit` defaults to 20 when absent or not a positive integer and is capped by the \
                   deployment's configured maximum. The raw Telegram response is only included when \
                   the deployment enables it.",
    params(HistoryParams),
    responses(
        (status = 200, description = "Send attempts, newest first", body = [HistoryEntry]),
        (status = 500, description = "The log could not be read", body = ErrorResponse)
    )
)]
pub async fn history(
    Extension(resources): Extension<AppResources>,
    params: Result<Query<HistoryParams>, QueryRejection>,
) -> Response {
    // A malformed query string is treated like an absent limit.
    let limit = params.ok().and_then(|Query(p)| p.limit);
    match workflow::history(&resources, limit.as_deref()).await {
        Ok(entries) => (StatusCode::OK, Json(entries)).into_response(),
        Err(e) => {
            tracing::error!(
                name = "api.history.db_query_failed",
                target = concat!(env!("CARGO_PKG_NAME"), "::", module_path!()),
                error = ?e,
                message = "Failed to read send history"
            );
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new(format!("DB error: {e}"))),
            )
                .into_response()
        }
    }
}
