//! Hot Reload Message Protocol
//!
//! JSON messages sent from the dev server to browser clients.
//!
//! # Message Types
//!
//! - `reload`: full page reload
//! - `css`: swap one stylesheet in place
//! - `error` / `clear_error`: show or hide the error overlay
//! - `connected`: handshake greeting

use serde::{Deserialize, Serialize};

/// Hot reload message sent over WebSocket
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum HotReloadMessage {
    /// Full page reload
    Reload {
        /// Task that triggered the reload
        #[serde(skip_serializing_if = "Option::is_none")]
        reason: Option<String>,
    },

    /// Stylesheet update without reload
    Css {
        /// Served path of the stylesheet, e.g. `/css/main.min.css`
        href: String,
    },

    /// Connection established
    Connected {
        /// Server version for compatibility check
        version: String,
    },

    /// Build error (display overlay, no reload)
    Error {
        /// Source file path
        path: String,
        /// Error message
        error: String,
    },

    /// Clear error overlay (task succeeded after error)
    #[serde(rename = "clear_error")]
    ClearError,
}

impl HotReloadMessage {
    pub fn reload() -> Self {
        Self::Reload { reason: None }
    }

    pub fn reload_with_reason(reason: impl Into<String>) -> Self {
        Self::Reload {
            reason: Some(reason.into()),
        }
    }

    pub fn css(href: impl Into<String>) -> Self {
        Self::Css { href: href.into() }
    }

    pub fn connected() -> Self {
        Self::Connected {
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    pub fn error(path: impl Into<String>, error: impl Into<String>) -> Self {
        Self::Error {
            path: path.into(),
            error: error.into(),
        }
    }

    pub fn clear_error() -> Self {
        Self::ClearError
    }

    /// Serialize to JSON string
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| r#"{"type":"reload"}"#.to_string())
    }

    /// Parse from JSON string
    #[cfg(test)]
    pub fn from_json(s: &str) -> Option<Self> {
        serde_json::from_str(s).ok()
    }
}
