//! Session and connectivity types for the keep-alive loop.

use serde::{Deserialize, Serialize};

/// Whether the gateway currently lets us through.
///
/// This is not a real session object: it is recomputed from the last HTTP
/// response on every tick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "state")]
pub enum SessionState {
    /// The gateway accepted us (or traffic already reaches the internet).
    Authenticated {
        /// Keep-alive link handed out by the portal on login, if any.
        #[serde(default)]
        keepalive_url: Option<String>,
    },
    /// Login was rejected, or the gateway could not be reached.
    NotAuthenticated,
}

impl SessionState {
    /// Authenticated without a keep-alive link.
    pub fn online() -> Self {
        SessionState::Authenticated {
            keepalive_url: None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, SessionState::Authenticated { .. })
    }

    pub fn keepalive_url(&self) -> Option<&str> {
        match self {
            SessionState::Authenticated { keepalive_url } => keepalive_url.as_deref(),
            SessionState::NotAuthenticated => None,
        }
    }
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionState::Authenticated { .. } => write!(f, "authenticated"),
            SessionState::NotAuthenticated => write!(f, "not_authenticated"),
        }
    }
}

/// Outcome of the connectivity probe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "result")]
pub enum Probe {
    /// The probe reached the open internet untouched.
    Online,
    /// The probe was intercepted; the portal wants us at `login_page`.
    Captive { login_page: String },
}

/// Derive the logout link from a keep-alive link.
///
/// FortiGate-style portals serve both under the same token:
/// `https://gw:1003/keepalive?abc` → `https://gw:1003/logout?abc`.
pub fn logout_url(keepalive_url: &str) -> String {
    keepalive_url.replace("keepalive", "logout")
}
