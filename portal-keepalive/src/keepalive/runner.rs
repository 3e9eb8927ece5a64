//! The keep-alive loop.

use std::future::Future;
use std::time::Duration;

use chrono::Utc;
use portal_common::{logout_url, Probe, SessionState, SessionStatus};

use crate::config::TimingConfig;
use crate::error::Result;
use crate::portal::CaptivePortal;

/// Keeps a captive portal session alive.
///
/// Owns the portal client for its whole lifetime. The session state is
/// recomputed on every tick from the gateway's answers.
pub struct KeepAliveLoop<P> {
    portal: P,
    timing: TimingConfig,
    logout_on_exit: bool,
    session: SessionState,
    status: SessionStatus,
}

impl<P: CaptivePortal> KeepAliveLoop<P> {
    pub fn new(portal: P, timing: TimingConfig, logout_on_exit: bool) -> Self {
        Self {
            portal,
            timing,
            logout_on_exit,
            session: SessionState::NotAuthenticated,
            status: SessionStatus::default(),
        }
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    pub fn status(&self) -> &SessionStatus {
        &self.status
    }

    /// Probe the gateway and log in if the portal intercepts us.
    ///
    /// Never fails: network and portal errors are logged and reported as
    /// `NotAuthenticated` so the caller can simply try again later.
    pub async fn authenticate(&mut self) -> SessionState {
        let state = match self.try_authenticate().await {
            Ok(state) => state,
            Err(e) => {
                tracing::error!("Authentication attempt failed: {}", e);
                SessionState::NotAuthenticated
            }
        };
        self.record(&state);
        state
    }

    async fn try_authenticate(&self) -> Result<SessionState> {
        match self.portal.probe().await? {
            Probe::Online => {
                tracing::info!("Already online");
                Ok(SessionState::online())
            }
            Probe::Captive { login_page } => {
                tracing::info!("Not logged in, portal at {}", login_page);
                let state = self.portal.login(&login_page).await?;
                if state.is_authenticated() {
                    tracing::info!("Successfully logged in");
                } else {
                    tracing::warn!("Gateway rejected the login, check username and password");
                }
                Ok(state)
            }
        }
    }

    /// Run one iteration and return how long to sleep before the next.
    pub async fn tick(&mut self) -> Duration {
        if let Some(url) = self.session.keepalive_url().map(str::to_string) {
            match self.portal.keep_alive(&url).await {
                Ok(true) => {
                    tracing::info!("Keeping alive ({} seconds)", self.timing.keepalive_secs);
                    let state = self.session.clone();
                    self.record(&state);
                    return self.next_delay();
                }
                Ok(false) => tracing::warn!("Keep-alive was not honoured, session expired"),
                Err(e) => tracing::error!("Keep-alive request failed: {}", e),
            }
            self.session = SessionState::NotAuthenticated;
        }

        self.authenticate().await;
        self.next_delay()
    }

    /// Keep-alive cadence while holding a keep-alive link, retry cadence otherwise.
    fn next_delay(&self) -> Duration {
        if self.session.keepalive_url().is_some() {
            Duration::from_secs(self.timing.keepalive_secs)
        } else {
            Duration::from_secs(self.timing.retry_secs)
        }
    }

    fn record(&mut self, state: &SessionState) {
        self.status.record(state, Utc::now());
        self.session = state.clone();
    }

    /// Single tick, for one-shot checks.
    pub async fn run_once(&mut self) -> SessionStatus {
        self.tick().await;
        self.status.clone()
    }

    /// Tick until `shutdown` resolves.
    ///
    /// Shutdown is only observed between iterations, while sleeping.
    pub async fn run<F>(mut self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);

        loop {
            let delay = self.tick().await;
            tracing::debug!("Next check in {} seconds", delay.as_secs());

            tokio::select! {
                _ = &mut shutdown => break,
                _ = tokio::time::sleep(delay) => {}
            }
        }

        self.shutdown().await;
    }

    async fn shutdown(&mut self) {
        match self.session.keepalive_url() {
            Some(url) if self.logout_on_exit => {
                let url = logout_url(url);
                match self.portal.logout(&url).await {
                    Ok(()) => tracing::info!("Successfully logged out"),
                    Err(e) => tracing::error!("Logout failed: {}", e),
                }
                self.session = SessionState::NotAuthenticated;
            }
            _ => tracing::info!("Exiting"),
        }
    }
}
