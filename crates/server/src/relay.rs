//! Send-and-log and history workflows.
//!
//! A send is validated, relayed to the provider exactly once, and its outcome
//! appended to the log before the caller gets an answer. The delivery outcome
//! alone decides the reply; a failed log write is reported and otherwise ignored.

use crate::AppResources;
use crate::config::HistoryConfig;
use crate::error::{StoreError, TransportError, ValidationError};
use crate::response::HistoryEntry;
use crate::store::NewSendAttempt;
use crate::telegram::ProviderResponse;
use hyper::StatusCode;
use serde::Deserialize;
use utoipa::ToSchema;

/// HTTP status used for every attempt the provider did not accept.
pub const FAILED_DELIVERY_STATUS: StatusCode = StatusCode::BAD_GATEWAY;

/// Recipient as sent by the caller. Telegram chat ids are numeric, channel
/// usernames are strings; both are forwarded as text.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(untagged)]
pub enum ChatTarget {
    Id(i64),
    Name(String),
}

impl ChatTarget {
    fn into_string(self) -> String {
        match self {
            ChatTarget::Id(id) => id.to_string(),
            ChatTarget::Name(name) => name,
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq, ToSchema)]
pub struct SendRequest {
    /// Message text, forwarded untouched.
    #[serde(default)]
    pub text: Option<String>,
    /// Overrides the configured default target.
    #[serde(default)]
    pub chat_id: Option<ChatTarget>,
}

impl SendRequest {
    /// Parse a request body. Anything that is not a matching JSON object reads
    /// as an empty request and fails validation on `text`.
    pub fn from_body(body: &[u8]) -> Self {
        serde_json::from_slice(body).unwrap_or_default()
    }
}

/// How a single provider call ended.
#[derive(Debug)]
pub enum DeliveryOutcome {
    Delivered { body: String },
    Rejected { status: StatusCode, body: String },
    Unreachable(TransportError),
}

impl DeliveryOutcome {
    pub fn classify(result: Result<ProviderResponse, TransportError>) -> Self {
        match result {
            Ok(resp) if resp.is_delivered() => DeliveryOutcome::Delivered { body: resp.body },
            Ok(resp) => DeliveryOutcome::Rejected {
                status: resp.status,
                body: resp.body,
            },
            Err(e) => DeliveryOutcome::Unreachable(e),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, DeliveryOutcome::Delivered { .. })
    }

    /// Text recorded as `api_response`: the provider body when there is one.
    pub fn into_api_response(self) -> String {
        match self {
            DeliveryOutcome::Delivered { body } | DeliveryOutcome::Rejected { body, .. } => body,
            DeliveryOutcome::Unreachable(e) => format!("Internal Error: {e}"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SendReport {
    pub success: bool,
    pub api_response: String,
    pub timestamp: String,
    /// `None` when the log write failed.
    pub record_id: Option<i64>,
}

fn resolve_target(requested: Option<ChatTarget>, default_target: &str) -> Option<String> {
    requested
        .map(ChatTarget::into_string)
        .filter(|t| !t.is_empty())
        .or_else(|| Some(default_target.to_string()).filter(|t| !t.is_empty()))
}

#[tracing::instrument(skip(resources, request, caller), fields(caller = %caller))]
pub async fn send(
    resources: &AppResources,
    request: SendRequest,
    caller: &str,
) -> Result<SendReport, ValidationError> {
    let text = request.text.unwrap_or_default();
    if text.is_empty() {
        return Err(ValidationError::MissingText);
    }
    let target = resolve_target(request.chat_id, &resources.config.chat_id)
        .ok_or(ValidationError::MissingTarget)?;

    let timestamp = resources.clock.now();
    let outcome =
        DeliveryOutcome::classify(resources.telegram.send_message(&target, &text).await);

    match &outcome {
        DeliveryOutcome::Delivered { .. } => {
            tracing::info!(text_len = text.len(), "Message relayed");
        }
        DeliveryOutcome::Rejected { status, body } => {
            tracing::error!(
                name = "relay.send.provider_rejected",
                target = concat!(env!("CARGO_PKG_NAME"), "::", module_path!()),
                status = %status,
                body = %body,
                message = "Telegram API Error"
            );
        }
        DeliveryOutcome::Unreachable(e) => {
            tracing::error!(
                name = "relay.send.provider_unreachable",
                target = concat!(env!("CARGO_PKG_NAME"), "::", module_path!()),
                error = %e,
                message = "Request Exception"
            );
        }
    }

    let success = outcome.is_success();
    let api_response = outcome.into_api_response();

    let attempt = NewSendAttempt {
        sender_ip: caller.to_string(),
        send_time: timestamp.clone(),
        content: text,
        success,
        api_response: api_response.clone(),
    };
    let record_id = match resources.store.insert(attempt).await {
        Ok(id) => Some(id),
        Err(e) => {
            tracing::error!(
                name = "relay.send.db_insert_failed",
                target = concat!(env!("CARGO_PKG_NAME"), "::", module_path!()),
                error = ?e,
                message = "Database Write Error"
            );
            None
        }
    };

    Ok(SendReport {
        success,
        api_response,
        timestamp,
        record_id,
    })
}

/// Turn the caller's raw `limit` into the number of rows to read.
///
/// Missing, unparsable and non-positive values use the configured default;
/// anything above the configured ceiling is clamped to it.
pub fn resolve_limit(raw: Option<&str>, config: &HistoryConfig) -> i64 {
    let limit = raw
        .and_then(|s| s.trim().parse::<i64>().ok())
        .filter(|n| *n > 0)
        .map(|n| n as u64)
        .unwrap_or(config.default_limit)
        .min(config.max_limit);
    i64::try_from(limit).unwrap_or(i64::MAX)
}

#[tracing::instrument(skip(resources))]
pub async fn history(
    resources: &AppResources,
    limit: Option<&str>,
) -> Result<Vec<HistoryEntry>, StoreError> {
    let limit = resolve_limit(limit, &resources.config.history);
    let expose = resources.config.history.expose_api_response;
    let rows = resources.store.list_recent(limit).await?;
    Ok(rows
        .into_iter()
        .map(|row| HistoryEntry::from_model(row, expose))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn history_config() -> HistoryConfig {
        HistoryConfig {
            default_limit: 20,
            max_limit: 100,
            expose_api_response: false,
        }
    }

    #[test]
    fn limit_falls_back_to_default() {
        let cfg = history_config();
        assert_eq!(resolve_limit(None, &cfg), 20);
        assert_eq!(resolve_limit(Some("abc"), &cfg), 20);
        assert_eq!(resolve_limit(Some(""), &cfg), 20);
        assert_eq!(resolve_limit(Some("2.5"), &cfg), 20);
        assert_eq!(resolve_limit(Some("0"), &cfg), 20);
        assert_eq!(resolve_limit(Some("-3"), &cfg), 20);
    }

    #[test]
    fn limit_is_honoured_and_clamped() {
        let cfg = history_config();
        assert_eq!(resolve_limit(Some("5"), &cfg), 5);
        assert_eq!(resolve_limit(Some(" 7 "), &cfg), 7);
        assert_eq!(resolve_limit(Some("100000"), &cfg), 100);
    }

    #[test]
    fn request_body_parsing_is_lenient() {
        assert_eq!(SendRequest::from_body(b"not json"), SendRequest::default());
        assert_eq!(SendRequest::from_body(b""), SendRequest::default());
        assert_eq!(SendRequest::from_body(b"null"), SendRequest::default());
        assert_eq!(
            SendRequest::from_body(br#"{"text": 42}"#),
            SendRequest::default()
        );

        let parsed = SendRequest::from_body(br#"{"text":"*bold*","chat_id":-100123}"#);
        assert_eq!(parsed.text.as_deref(), Some("*bold*"));
        assert_eq!(parsed.chat_id, Some(ChatTarget::Id(-100123)));

        let parsed = SendRequest::from_body(br#"{"text":"x","chat_id":"@channel"}"#);
        assert_eq!(parsed.chat_id, Some(ChatTarget::Name("@channel".into())));
    }

    #[test]
    fn target_prefers_request_then_default() {
        assert_eq!(
            resolve_target(Some(ChatTarget::Name("42".into())), "7"),
            Some("42".into())
        );
        assert_eq!(resolve_target(Some(ChatTarget::Id(5)), ""), Some("5".into()));
        assert_eq!(
            resolve_target(Some(ChatTarget::Name(String::new())), "7"),
            Some("7".into())
        );
        assert_eq!(resolve_target(None, "7"), Some("7".into()));
        assert_eq!(resolve_target(None, ""), None);
    }

    #[test]
    fn outcome_classification() {
        let delivered = DeliveryOutcome::classify(Ok(ProviderResponse {
            status: StatusCode::OK,
            body: r#"{"ok":true}"#.into(),
        }));
        assert!(delivered.is_success());
        assert_eq!(delivered.into_api_response(), r#"{"ok":true}"#);

        let rejected = DeliveryOutcome::classify(Ok(ProviderResponse {
            status: StatusCode::FORBIDDEN,
            body: r#"{"ok":false}"#.into(),
        }));
        assert!(!rejected.is_success());
        assert_eq!(rejected.into_api_response(), r#"{"ok":false}"#);

        let unreachable = DeliveryOutcome::classify(Err(TransportError::Network(
            "connection refused".into(),
        )));
        assert!(!unreachable.is_success());
        assert_eq!(
            unreachable.into_api_response(),
            "Internal Error: network error: connection refused"
        );
    }
}
