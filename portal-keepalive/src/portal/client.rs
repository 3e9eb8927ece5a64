//! HTTP client for FortiGate-style captive portals.

use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;
use reqwest::{Client, Url};

use portal_common::{Credentials, Probe, SessionState};

use super::parse::{
    find_hidden_input, find_script_redirect, hidden_input_pattern, origin_root,
    script_redirect_pattern,
};
use super::CaptivePortal;
use crate::config::{ConfigError, PortalConfig};
use crate::error::{Error, Result};

/// Captive portal client.
///
/// Owns the HTTP client (and with it the cookie jar the portal relies on) for
/// the lifetime of the keep-alive loop.
pub struct PortalClient {
    http_client: Client,
    credentials: Credentials,
    probe_url: Url,
    online_url: Url,
    login_url: Option<Url>,
    form_action: Option<Url>,
    username_field: String,
    password_field: String,
    token: Option<(String, Regex)>,
    extra_fields: Vec<(String, String)>,
    success_marker: Regex,
    script_redirect: Regex,
}

impl PortalClient {
    /// Build a client from validated settings. Makes no network calls.
    pub fn new(config: &PortalConfig, credentials: Credentials) -> std::result::Result<Self, ConfigError> {
        let http_client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .cookie_store(true)
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .build()
            .map_err(|e| ConfigError::HttpClient(e.to_string()))?;

        let token = if config.token_field.is_empty() {
            None
        } else {
            let pattern = hidden_input_pattern(&config.token_field).map_err(|source| {
                ConfigError::InvalidPattern {
                    field: "portal.token_field",
                    source,
                }
            })?;
            Some((config.token_field.clone(), pattern))
        };

        let success_marker =
            Regex::new(&config.success_marker).map_err(|source| ConfigError::InvalidPattern {
                field: "portal.success_marker",
                source,
            })?;
        let script_redirect =
            script_redirect_pattern().map_err(|source| ConfigError::InvalidPattern {
                field: "script redirect",
                source,
            })?;

        Ok(Self {
            http_client,
            credentials,
            probe_url: parse_url("portal.probe_url", &config.probe_url)?,
            online_url: parse_url("portal.online_url", &config.online_url)?,
            login_url: config
                .login_url
                .as_deref()
                .map(|url| parse_url("portal.login_url", url))
                .transpose()?,
            form_action: config
                .form_action
                .as_deref()
                .map(|url| parse_url("portal.form_action", url))
                .transpose()?,
            username_field: config.username_field.clone(),
            password_field: config.password_field.clone(),
            token,
            extra_fields: config.extra_form_fields()?,
            success_marker,
            script_redirect,
        })
    }

    /// GET the keep-alive link; alive only if served without a redirect.
    async fn fetch_keepalive(&self, url: &Url) -> Result<bool> {
        let response = self.http_client.get(url.clone()).send().await?;
        let alive = response.status().is_success() && response.url() == url;
        if !alive {
            tracing::debug!(
                "Keep-alive {} answered {} at {}",
                url,
                response.status(),
                response.url()
            );
        }
        Ok(alive)
    }

    fn login_form(&self, page_body: &str) -> Result<Vec<(String, String)>> {
        let mut form = vec![
            (self.username_field.clone(), self.credentials.username.clone()),
            (self.password_field.clone(), self.credentials.password.clone()),
        ];

        if let Some((field, pattern)) = &self.token {
            let value = find_hidden_input(pattern, page_body)
                .ok_or_else(|| Error::Portal(format!("login page has no '{}' token", field)))?;
            form.push((field.clone(), value));
        }

        form.extend(self.extra_fields.iter().cloned());
        Ok(form)
    }
}

fn parse_url(field: &'static str, value: &str) -> std::result::Result<Url, ConfigError> {
    Url::parse(value).map_err(|_| ConfigError::InvalidUrl {
        field,
        value: value.to_string(),
    })
}

fn resolve(base: &Url, target: &str) -> Result<Url> {
    base.join(target)
        .map_err(|e| Error::Portal(format!("invalid link '{}': {}", target, e)))
}

#[async_trait]
impl CaptivePortal for PortalClient {
    async fn probe(&self) -> Result<Probe> {
        let response = self.http_client.get(self.probe_url.clone()).send().await?;
        let status = response.status();
        let final_url = response.url().clone();

        if status.is_success() && final_url == self.online_url {
            return Ok(Probe::Online);
        }

        if let Some(login_url) = &self.login_url {
            return Ok(Probe::Captive {
                login_page: login_url.to_string(),
            });
        }

        if !status.is_success() {
            return Err(Error::Portal(format!("probe returned {}", status)));
        }

        let body = response.text().await?;
        if let Some(target) = find_script_redirect(&self.script_redirect, &body) {
            return Ok(Probe::Captive {
                login_page: resolve(&final_url, &target)?.to_string(),
            });
        }

        if final_url != self.probe_url {
            return Ok(Probe::Captive {
                login_page: final_url.to_string(),
            });
        }

        Err(Error::Portal(format!(
            "probe to {} was intercepted but no login page was found",
            self.probe_url
        )))
    }

    async fn login(&self, login_page: &str) -> Result<SessionState> {
        let page_url = Url::parse(login_page)
            .map_err(|e| Error::Portal(format!("invalid login page '{}': {}", login_page, e)))?;

        let page = self.http_client.get(page_url).send().await?;
        if !page.status().is_success() {
            return Err(Error::Portal(format!("login page returned {}", page.status())));
        }
        let page_url = page.url().clone();
        let page_body = page.text().await?;

        let form = self.login_form(&page_body)?;
        let action = self
            .form_action
            .clone()
            .unwrap_or_else(|| origin_root(&page_url));
        tracing::debug!("Posting login form to {}", action);

        let response = self.http_client.post(action).form(&form).send().await?;
        let status = response.status();
        if !status.is_success() {
            tracing::warn!("Login form returned {}", status);
            return Ok(SessionState::NotAuthenticated);
        }
        let response_url = response.url().clone();
        let body = response.text().await?;

        let Some(captures) = self.success_marker.captures(&body) else {
            return Ok(SessionState::NotAuthenticated);
        };

        let link = captures
            .get(1)
            .map(|m| m.as_str())
            .filter(|link| !link.is_empty());
        let Some(link) = link else {
            return Ok(SessionState::online());
        };

        let keepalive_url = resolve(&response_url, link)?;
        if !self.fetch_keepalive(&keepalive_url).await? {
            tracing::warn!("Gateway refused the keep-alive page right after login");
            return Ok(SessionState::NotAuthenticated);
        }

        Ok(SessionState::Authenticated {
            keepalive_url: Some(keepalive_url.to_string()),
        })
    }

    async fn keep_alive(&self, keepalive_url: &str) -> Result<bool> {
        let url = Url::parse(keepalive_url)
            .map_err(|e| Error::Portal(format!("invalid keep-alive link '{}': {}", keepalive_url, e)))?;
        self.fetch_keepalive(&url).await
    }

    async fn logout(&self, logout_url: &str) -> Result<()> {
        let response = self.http_client.get(logout_url).send().await?;
        if !response.status().is_success() {
            return Err(Error::Portal(format!("logout returned {}", response.status())));
        }
        Ok(())
    }
}
