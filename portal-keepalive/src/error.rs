//! Error types for the keep-alive loop.

/// Errors raised while talking to the gateway.
///
/// All of these are retriable: the loop logs them and tries again on the next
/// tick. Rejected credentials are not an error, see
/// [`SessionState::NotAuthenticated`](portal_common::SessionState).
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Gateway unreachable: {0}")]
    Communication(String),

    #[error("Gateway timed out: {0}")]
    Timeout(String),

    #[error("Unexpected portal response: {0}")]
    Portal(String),
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Error::Timeout(e.to_string())
        } else {
            Error::Communication(e.to_string())
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
