//! Captive portal abstraction layer.
//!
//! This module defines the `CaptivePortal` trait the keep-alive loop drives,
//! so the loop can run against the real HTTP gateway or a scripted stand-in.

mod client;
mod parse;

pub use client::PortalClient;

use async_trait::async_trait;
use portal_common::{Probe, SessionState};

use crate::error::Result;

/// Operations the keep-alive loop needs from a gateway.
#[async_trait]
pub trait CaptivePortal: Send + Sync {
    /// Check whether traffic reaches the internet or is intercepted.
    async fn probe(&self) -> Result<Probe>;

    /// Submit the credentials through the portal's login page.
    ///
    /// A rejected login is `Ok(SessionState::NotAuthenticated)`; errors are
    /// reserved for transport failures and pages we cannot make sense of.
    async fn login(&self, login_page: &str) -> Result<SessionState>;

    /// Refresh the session. `Ok(false)` means the gateway no longer honours it.
    async fn keep_alive(&self, keepalive_url: &str) -> Result<bool>;

    /// End the session.
    async fn logout(&self, logout_url: &str) -> Result<()>;
}
