//! I/O traits for message delivery
//!
//! The filter never talks to the network itself. Delivery goes through
//! `MessagePoster` so the whole pipeline can be tested with a mock.

use serde::Deserialize;
use thiserror::Error;

// =============================================================================
// DELIVERY TYPES
// =============================================================================

/// What the chat service said about a posted message
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct DeliveryResult {
    #[serde(default)]
    pub ok: bool,
    /// Service error code when `ok` is false (e.g. `channel_not_found`)
    #[serde(default)]
    pub error: Option<String>,
}

impl DeliveryResult {
    pub fn delivered() -> Self {
        Self {
            ok: true,
            error: None,
        }
    }
}

/// Delivery failed before the chat service could answer
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("missing webhook credentials: {0}")]
    MissingCredentials(&'static str),
    #[error("request failed: {0}")]
    Transport(String),
    #[error("unexpected response: {0}")]
    InvalidResponse(String),
}

// =============================================================================
// I/O TRAITS
// =============================================================================

/// Sends a formatted notification somewhere
pub trait MessagePoster {
    /// Post `text`. Blocking, no retry.
    fn post(&self, text: &str) -> Result<DeliveryResult, DispatchError>;
}

impl<P: MessagePoster + ?Sized> MessagePoster for &P {
    fn post(&self, text: &str) -> Result<DeliveryResult, DispatchError> {
        (**self).post(text)
    }
}

// =============================================================================
// MOCK IMPLEMENTATIONS FOR TESTING
// =============================================================================


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delivery_result_from_slack_json() {
        let ok: DeliveryResult =
            serde_json::from_str(r#"{"ok": true, "channel": "C123", "ts": "1.2"}"#).unwrap();
        assert_eq!(ok, DeliveryResult::delivered());

        let err: DeliveryResult =
            serde_json::from_str(r#"{"ok": false, "error": "invalid_auth"}"#).unwrap();
        assert!(!err.ok);
        assert_eq!(err.error.as_deref(), Some("invalid_auth"));
    }

    #[test]
    fn test_mock_records_messages() {
        let mock = mocks::MockPoster::new();
        mock.post("hello").unwrap();
        assert_eq!(mock.sent_count(), 1);
        assert_eq!(mock.last_sent().as_deref(), Some("hello"));

        let failing = mocks::MockPoster::failing("timeout");
        assert!(matches!(failing.post("x"), Err(DispatchError::Transport(_))));
    }
}
