//! Portal Keep-Alive - logs into a captive portal gateway and keeps the session alive.

pub mod cli;
pub mod config;
pub mod error;
pub mod keepalive;
pub mod portal;
pub mod test_util;

pub use config::{Config, ConfigError};
pub use error::{Error, Result};
pub use keepalive::KeepAliveLoop;
pub use portal::{CaptivePortal, PortalClient};
