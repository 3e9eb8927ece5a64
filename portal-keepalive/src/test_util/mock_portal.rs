use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use portal_common::{Probe, SessionState};

use crate::error::Result;
use crate::portal::CaptivePortal;

pub const MOCK_LOGIN_PAGE: &str = "http://portal.test/fgtauth?0123";

/// Call counters shared between a `MockPortal` and the test inspecting it.
#[derive(Debug, Default)]
pub struct MockCalls {
    pub probe: AtomicUsize,
    pub login: AtomicUsize,
    pub keep_alive: AtomicUsize,
    pub logouts: Mutex<Vec<String>>,
}

/// Scripted `CaptivePortal`.
///
/// Queued answers are served first; once a queue is empty the portal falls
/// back to: probe intercepted, login answers `default_login`, keep-alive honoured.
pub struct MockPortal {
    default_login: SessionState,
    probes: Mutex<VecDeque<Result<Probe>>>,
    logins: Mutex<VecDeque<Result<SessionState>>>,
    keep_alives: Mutex<VecDeque<Result<bool>>>,
    calls: Arc<MockCalls>,
}

impl MockPortal {
    pub fn new(default_login: SessionState) -> Self {
        Self {
            default_login,
            probes: Mutex::new(VecDeque::new()),
            logins: Mutex::new(VecDeque::new()),
            keep_alives: Mutex::new(VecDeque::new()),
            calls: Arc::new(MockCalls::default()),
        }
    }

    pub fn with_probe(self, answer: Result<Probe>) -> Self {
        self.probes.lock().unwrap().push_back(answer);
        self
    }

    pub fn with_login(self, answer: Result<SessionState>) -> Self {
        self.logins.lock().unwrap().push_back(answer);
        self
    }

    pub fn with_keep_alive(self, answer: Result<bool>) -> Self {
        self.keep_alives.lock().unwrap().push_back(answer);
        self
    }

    pub fn calls(&self) -> Arc<MockCalls> {
        self.calls.clone()
    }
}

#[async_trait]
impl CaptivePortal for MockPortal {
    async fn probe(&self) -> Result<Probe> {
        self.calls.probe.fetch_add(1, Ordering::SeqCst);
        self.probes.lock().unwrap().pop_front().unwrap_or_else(|| {
            Ok(Probe::Captive {
                login_page: MOCK_LOGIN_PAGE.to_string(),
            })
        })
    }

    async fn login(&self, _login_page: &str) -> Result<SessionState> {
        self.calls.login.fetch_add(1, Ordering::SeqCst);
        self.logins
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(self.default_login.clone()))
    }

    async fn keep_alive(&self, _keepalive_url: &str) -> Result<bool> {
        self.calls.keep_alive.fetch_add(1, Ordering::SeqCst);
        self.keep_alives.lock().unwrap().pop_front().unwrap_or(Ok(true))
    }

    async fn logout(&self, logout_url: &str) -> Result<()> {
        self.calls.logouts.lock().unwrap().push(logout_url.to_string());
        Ok(())
    }
}
