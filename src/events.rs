//! Notifications dispatched on the global event target.

use serde::{Deserialize, Serialize};

/// Event name emitted once the element wrapper is registered.
pub const READY_EVENT: &str = "grace-chat-sdk:ready";

/// Event name emitted when loading the element wrapper fails.
pub const ERROR_EVENT: &str = "grace-chat-sdk:error";

/// Detail payload of the ready event.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadyDetail {
    /// Recorded SDK version
    pub version: String,
    /// CDN base URL, when one is configured
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cdn_url: Option<String>,
}

/// Detail payload of the error event.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDetail {
    /// Human-readable failure message
    pub error: String,
}

/// SDK notification.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SdkEvent {
    /// The SDK finished loading.
    Ready(ReadyDetail),
    /// The SDK failed to load.
    Error(ErrorDetail),
}

impl SdkEvent {
    /// Create a ready event.
    pub fn ready<S: Into<String>>(version: S, cdn_url: Option<String>) -> Self {
        Self::Ready(ReadyDetail {
            version: version.into(),
            cdn_url,
        })
    }

    /// Create an error event.
    pub fn error<S: Into<String>>(error: S) -> Self {
        Self::Error(ErrorDetail {
            error: error.into(),
        })
    }

    /// Name the event is dispatched under.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Ready(_) => READY_EVENT,
            Self::Error(_) => ERROR_EVENT,
        }
    }

    /// Event detail as JSON.
    pub fn detail(&self) -> serde_json::Value {
        let detail = match self {
            Self::Ready(detail) => serde_json::to_value(detail),
            Self::Error(detail) => serde_json::to_value(detail),
        };
        // Both detail types are plain string structs.
        detail.unwrap_or(serde_json::Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_ready_event_shape() {
        let event = SdkEvent::ready("0.0.1", None);
        assert_eq!(event.name(), "grace-chat-sdk:ready");
        assert_eq!(event.detail(), json!({ "version": "0.0.1" }));
    }

    #[test]
    fn test_ready_event_with_cdn() {
        let event = SdkEvent::ready("0.0.1", Some("https://cdn.grace-sdk.com".to_string()));
        assert_eq!(
            event.detail(),
            json!({ "version": "0.0.1", "cdnUrl": "https://cdn.grace-sdk.com" })
        );
    }

    #[test]
    fn test_error_event_shape() {
        let event = SdkEvent::error("network down");
        assert_eq!(event.name(), "grace-chat-sdk:error");
        assert_eq!(event.detail(), json!({ "error": "network down" }));
    }
}
