//! Live Reload Message Protocol
//!
//! Defines the JSON message format for WebSocket communication between
//! the development server and browser clients.
//!
//! # Message Types
//!
//! - `reload`: Trigger full page reload (markup, scripts, fonts)
//! - `css`: Swap one stylesheet in place (styles stream)
//! - `assets`: Refresh images without reloading (images stream)
//! - `error` / `clear_error`: Show or hide the failed-build overlay
//! - `connected`: Sent once after the handshake

use serde::{Deserialize, Serialize};

/// Live reload message sent over WebSocket
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum HotReloadMessage {
    /// Full page reload
    Reload {
        /// Optional reason for reload
        #[serde(skip_serializing_if = "Option::is_none")]
        reason: Option<String>,
    },

    /// Stylesheet update, matched by the client against `<link href>`
    Css {
        /// Output path relative to the server root (e.g., "assets/css/main.min.css")
        path: String,
    },

    /// Image update: the client re-requests `<img>` and CSS backgrounds
    Assets,

    /// Connection established
    Connected {
        /// Server version for compatibility check
        version: String,
    },

    /// Build error (display overlay, no reload)
    Error {
        /// Failing transform, e.g. "Error in sass"
        title: String,
        /// Error message
        message: String,
    },

    /// Clear error overlay (rebuild succeeded after error)
    #[serde(rename = "clear_error")]
    ClearError,
}

impl HotReloadMessage {
    /// Create a reload message with reason
    pub fn reload_with_reason(reason: impl Into<String>) -> Self {
        Self::Reload {
            reason: Some(reason.into()),
        }
    }

    /// Create a stylesheet stream message
    pub fn css(path: impl Into<String>) -> Self {
        Self::Css { path: path.into() }
    }

    /// Create a connected message
    pub fn connected() -> Self {
        Self::Connected {
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    /// Create an error message
    pub fn error(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Error {
            title: title.into(),
            message: message.into(),
        }
    }

    /// Serialize to JSON string
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| r#"{"type":"reload"}"#.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reload_serialization() {
        let json = HotReloadMessage::reload_with_reason("scripts").to_json();
        assert_eq!(json, r#"{"type":"reload","reason":"scripts"}"#);
    }

    #[test]
    fn test_css_serialization() {
        let json = HotReloadMessage::css("assets/css/main.min.css").to_json();
        assert_eq!(json, r#"{"type":"css","path":"assets/css/main.min.css"}"#);
    }

    #[test]
    fn test_unit_variants() {
        assert_eq!(HotReloadMessage::Assets.to_json(), r#"{"type":"assets"}"#);
        assert_eq!(
            HotReloadMessage::ClearError.to_json(),
            r#"{"type":"clear_error"}"#
        );
    }

    #[test]
    fn test_error_message() {
        let msg = HotReloadMessage::error("Error in sass", "expected \"{\"");
        let parsed: HotReloadMessage = serde_json::from_str(&msg.to_json()).unwrap();
        assert_eq!(parsed, msg);
    }

    #[test]
    fn test_unknown_type_rejected() {
        assert!(serde_json::from_str::<HotReloadMessage>(r#"{"type":"unknown"}"#).is_err());
    }
}
