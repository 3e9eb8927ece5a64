//! Attempt bookkeeping reported by the keep-alive loop.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::SessionState;

/// Snapshot of the loop's view of the gateway session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionStatus {
    pub authenticated: bool,
    #[serde(default)]
    pub keepalive_url: Option<String>,
    /// Login or keep-alive attempts made so far.
    pub attempts: u64,
    /// Attempts since the last success.
    pub consecutive_failures: u32,
    #[serde(default)]
    pub last_attempt: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_success: Option<DateTime<Utc>>,
}

impl SessionStatus {
    /// Fold the outcome of one attempt into the snapshot.
    pub fn record(&mut self, state: &SessionState, at: DateTime<Utc>) {
        self.attempts += 1;
        self.last_attempt = Some(at);
        self.authenticated = state.is_authenticated();
        self.keepalive_url = state.keepalive_url().map(str::to_string);

        if self.authenticated {
            self.consecutive_failures = 0;
            self.last_success = Some(at);
        } else {
            self.consecutive_failures = self.consecutive_failures.saturating_add(1);
        }
    }
}
