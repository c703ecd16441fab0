//! JSON bodies returned by the HTTP surface.

use crate::entity::send_attempt;
use crate::relay::SendReport;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SendStatus {
    Success,
    Failed,
}

/// Result of a `/send` call that reached the provider stage.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
pub struct SendResponse {
    pub status: SendStatus,
    /// Raw provider body, or a local error description.
    pub telegram_response: String,
    /// Local time of the attempt, `YYYY-MM-DD HH:MM:SS`.
    pub timestamp: String,
}

impl From<&SendReport> for SendResponse {
    fn from(report: &SendReport) -> Self {
        Self {
            status: if report.success {
                SendStatus::Success
            } else {
                SendStatus::Failed
            },
            telegram_response: report.api_response.clone(),
            timestamp: report.timestamp.clone(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

/// Public view of a persisted send attempt.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
pub struct HistoryEntry {
    pub id: i64,
    pub ip: String,
    pub time: String,
    pub content: String,
    pub success: bool,
    /// Only present when the deployment opts into exposing provider bodies.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_response: Option<String>,
}

impl HistoryEntry {
    pub fn from_model(model: send_attempt::Model, expose_api_response: bool) -> Self {
        Self {
            id: model.id,
            ip: model.sender_ip,
            time: model.send_time,
            content: model.content,
            success: model.success,
            api_response: expose_api_response.then_some(model.api_response),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model() -> send_attempt::Model {
        send_attempt::Model {
            id: 7,
            sender_ip: "10.0.0.1".into(),
            send_time: "2025-01-01 00:00:00".into(),
            content: "*hi*".into(),
            success: false,
            api_response: r#"{"ok":false}"#.into(),
        }
    }

    #[test]
    fn history_entry_hides_api_response_by_default() {
        let entry = HistoryEntry::from_model(model(), false);
        let json = serde_json::to_value(&entry).unwrap();
        assert!(json.get("api_response").is_none());
        assert_eq!(json["ip"], "10.0.0.1");
        assert_eq!(json["time"], "2025-01-01 00:00:00");
        assert_eq!(json["success"], false);
    }

    #[test]
    fn history_entry_exposes_api_response_when_enabled() {
        let entry = HistoryEntry::from_model(model(), true);
        assert_eq!(entry.api_response.as_deref(), Some(r#"{"ok":false}"#));
    }

    #[test]
    fn send_response_status_strings() {
        let report = SendReport {
            success: true,
            api_response: "{}".into(),
            timestamp: "2025-01-01 00:00:00".into(),
            record_id: Some(1),
        };
        let json = serde_json::to_value(SendResponse::from(&report)).unwrap();
        assert_eq!(json["status"], "success");
        assert_eq!(json["telegram_response"], "{}");

        let failed = SendReport {
            success: false,
            ..report
        };
        let json = serde_json::to_value(SendResponse::from(&failed)).unwrap();
        assert_eq!(json["status"], "failed");
    }
}
