//! Portal Keep-Alive Common Types
//!
//! Shared types used by the keep-alive loop and its portal clients.

pub mod credentials;
pub mod session;
pub mod status;

pub use credentials::{Credentials, MissingCredential};
pub use session::{logout_url, Probe, SessionState};
pub use status::SessionStatus;
