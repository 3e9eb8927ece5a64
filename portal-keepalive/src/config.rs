//! Configuration for the keep-alive loop.

use config::{Config as ConfigLoader, Environment, File};
use portal_common::{Credentials, MissingCredential};
use serde::Deserialize;

use crate::cli::Args;

/// Main configuration structure, built once at startup and handed to the loop.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub credentials: CredentialsConfig,
    #[serde(default)]
    pub portal: PortalConfig,
    #[serde(default)]
    pub timing: TimingConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Raw credentials as supplied; validated by [`Config::credentials`].
#[derive(Clone, Deserialize, Default)]
pub struct CredentialsConfig {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

impl std::fmt::Debug for CredentialsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialsConfig")
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// How to reach and talk to the gateway portal.
#[derive(Debug, Clone, Deserialize)]
pub struct PortalConfig {
    /// URL fetched to find out whether traffic is intercepted.
    #[serde(default = "default_probe_url")]
    pub probe_url: String,
    /// Final URL of the probe when the internet is reachable.
    #[serde(default = "default_online_url")]
    pub online_url: String,
    /// Fixed login page. When unset, the page is discovered from the probe.
    #[serde(default)]
    pub login_url: Option<String>,
    /// Where the login form is posted. Defaults to the login page's origin root.
    #[serde(default)]
    pub form_action: Option<String>,
    #[serde(default = "default_username_field")]
    pub username_field: String,
    #[serde(default = "default_password_field")]
    pub password_field: String,
    /// Hidden input copied from the login page into the form. Empty disables it.
    #[serde(default = "default_token_field")]
    pub token_field: String,
    /// Additional `name=value` form fields.
    #[serde(default = "default_extra_fields")]
    pub extra_fields: Vec<String>,
    /// Regex the login response must match. Its first capture group, when
    /// present and non-empty, is the keep-alive link.
    #[serde(default = "default_success_marker")]
    pub success_marker: String,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
    /// Skip TLS verification (portals often use self-signed certificates).
    #[serde(default)]
    pub accept_invalid_certs: bool,
    /// Send the logout request on shutdown.
    #[serde(default = "default_true")]
    pub logout_on_exit: bool,
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            probe_url: default_probe_url(),
            online_url: default_online_url(),
            login_url: None,
            form_action: None,
            username_field: default_username_field(),
            password_field: default_password_field(),
            token_field: default_token_field(),
            extra_fields: default_extra_fields(),
            success_marker: default_success_marker(),
            user_agent: default_user_agent(),
            request_timeout_secs: default_request_timeout(),
            accept_invalid_certs: false,
            logout_on_exit: true,
        }
    }
}

impl PortalConfig {
    /// Parse `extra_fields` into name/value pairs.
    pub fn extra_form_fields(&self) -> Result<Vec<(String, String)>, ConfigError> {
        self.extra_fields
            .iter()
            .map(|field| {
                field
                    .split_once('=')
                    .filter(|(name, _)| !name.is_empty())
                    .map(|(name, value)| (name.to_string(), value.to_string()))
                    .ok_or_else(|| ConfigError::InvalidFormField(field.clone()))
            })
            .collect()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TimingConfig {
    /// Delay before the next check when no keep-alive link is held.
    #[serde(default = "default_retry_secs")]
    pub retry_secs: u64,
    /// Delay between keep-alive requests.
    #[serde(default = "default_keepalive_secs")]
    pub keepalive_secs: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            retry_secs: default_retry_secs(),
            keepalive_secs: default_keepalive_secs(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Errors only, regardless of `RUST_LOG`.
    #[serde(default)]
    pub quiet: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            quiet: false,
        }
    }
}

impl LoggingConfig {
    /// Filter directives for the subscriber: `quiet` first, then a non-empty
    /// `RUST_LOG`, then `level`.
    pub fn directives(&self, rust_log: Option<String>) -> String {
        if self.quiet {
            return "error".to_string();
        }
        rust_log
            .filter(|directives| !directives.trim().is_empty())
            .unwrap_or_else(|| self.level.clone())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0}")]
    Load(#[from] config::ConfigError),
    #[error("Missing required setting: {0}")]
    Missing(&'static str),
    #[error("{0} must be greater than zero")]
    ZeroInterval(&'static str),
    #[error("Invalid URL in {field}: {value}")]
    InvalidUrl { field: &'static str, value: String },
    #[error("Invalid pattern in {field}: {source}")]
    InvalidPattern {
        field: &'static str,
        #[source]
        source: regex::Error,
    },
    #[error("Invalid form field (expected name=value): {0}")]
    InvalidFormField(String),
    #[error("Failed to build HTTP client: {0}")]
    HttpClient(String),
}

// Default values
fn default_probe_url() -> String {
    "http://1.1.1.1/".to_string()
}
fn default_online_url() -> String {
    "https://1.1.1.1/".to_string()
}
fn default_username_field() -> String {
    "username".to_string()
}
fn default_password_field() -> String {
    "password".to_string()
}
fn default_token_field() -> String {
    "magic".to_string()
}
fn default_extra_fields() -> Vec<String> {
    vec!["4Tredir=/".to_string()]
}
fn default_success_marker() -> String {
    r#"window\.location="([^"]*)""#.to_string()
}
fn default_user_agent() -> String {
    "Mozilla/5.0".to_string()
}
fn default_request_timeout() -> u64 {
    10
}
fn default_retry_secs() -> u64 {
    60
}
fn default_keepalive_secs() -> u64 {
    2200
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_true() -> bool {
    true
}

impl Config {
    /// Load configuration from CLI flags, environment variables and file.
    ///
    /// Configuration sources (in order of precedence):
    /// 1. Command line flags
    /// 2. Environment variables (KEEPALIVE__SECTION__KEY format)
    /// 3. Config file (`--config`, default `config.*`, if present)
    /// 4. Built-in defaults
    pub fn load(args: &Args) -> Result<Self, ConfigError> {
        let config = ConfigLoader::builder()
            .set_default("timing.retry_secs", default_retry_secs() as i64)?
            .set_default("timing.keepalive_secs", default_keepalive_secs() as i64)?
            .set_default("logging.level", default_log_level())?
            .add_source(File::with_name(&args.config).required(false))
            // Values stay strings until deserialized so passwords like "0123" survive.
            .add_source(Environment::with_prefix("KEEPALIVE").separator("__"))
            .set_override_option("credentials.username", args.username.clone())?
            .set_override_option("credentials.password", args.password.clone())?
            .set_override_option("timing.retry_secs", args.retry.map(|s| s as i64))?
            .set_override_option("timing.keepalive_secs", args.keepalive.map(|s| s as i64))?
            .set_override_option("logging.quiet", args.quiet.then_some(true))?
            .build()?;

        Ok(config.try_deserialize()?)
    }

    /// Check the settings that do not depend on the portal client.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.timing.retry_secs == 0 {
            return Err(ConfigError::ZeroInterval("timing.retry_secs"));
        }
        if self.timing.keepalive_secs == 0 {
            return Err(ConfigError::ZeroInterval("timing.keepalive_secs"));
        }
        if self.portal.request_timeout_secs == 0 {
            return Err(ConfigError::ZeroInterval("portal.request_timeout_secs"));
        }
        self.credentials()?;
        Ok(())
    }

    /// Validated credentials. Missing values are fatal.
    pub fn credentials(&self) -> Result<Credentials, ConfigError> {
        Credentials::new(
            self.credentials.username.clone(),
            self.credentials.password.clone(),
        )
        .map_err(|missing| match missing {
            MissingCredential::Username => ConfigError::Missing("credentials.username"),
            MissingCredential::Password => ConfigError::Missing("credentials.password"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_credentials() -> Config {
        Config {
            credentials: CredentialsConfig {
                username: Some("alice".to_string()),
                password: Some("secret".to_string()),
            },
            ..Config::default()
        }
    }

    #[test]
    fn test_default_portal_config() {
        let portal = PortalConfig::default();
        assert_eq!(portal.probe_url, "http://1.1.1.1/");
        assert_eq!(portal.online_url, "https://1.1.1.1/");
        assert_eq!(portal.token_field, "magic");
        assert_eq!(portal.user_agent, "Mozilla/5.0");
        assert!(portal.logout_on_exit);
        assert!(!portal.accept_invalid_certs);
    }

    #[test]
    fn test_default_timing_config() {
        let timing = TimingConfig::default();
        assert_eq!(timing.retry_secs, 60);
        assert_eq!(timing.keepalive_secs, 2200);
    }

    #[test]
    fn test_extra_form_fields() {
        let portal = PortalConfig::default();
        assert_eq!(
            portal.extra_form_fields().unwrap(),
            vec![("4Tredir".to_string(), "/".to_string())]
        );

        let portal = PortalConfig {
            extra_fields: vec!["a=b=c".to_string(), "empty=".to_string()],
            ..PortalConfig::default()
        };
        assert_eq!(
            portal.extra_form_fields().unwrap(),
            vec![
                ("a".to_string(), "b=c".to_string()),
                ("empty".to_string(), String::new())
            ]
        );

        let portal = PortalConfig {
            extra_fields: vec!["novalue".to_string()],
            ..PortalConfig::default()
        };
        assert!(matches!(
            portal.extra_form_fields(),
            Err(ConfigError::InvalidFormField(_))
        ));
    }

    #[test]
    fn test_validate_missing_username() {
        let mut config = with_credentials();
        config.credentials.username = None;
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::Missing("credentials.username")));
    }

    #[test]
    fn test_validate_missing_password() {
        let mut config = with_credentials();
        config.credentials.password = Some(String::new());
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::Missing("credentials.password")));
    }

    #[test]
    fn test_validate_zero_interval() {
        let mut config = with_credentials();
        config.timing.retry_secs = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ZeroInterval("timing.retry_secs"))
        ));
    }

    #[test]
    fn test_validate_ok() {
        let config = with_credentials();
        assert!(config.validate().is_ok());
        assert_eq!(config.credentials().unwrap().username, "alice");
    }

    #[test]
    fn test_validate_blank_username() {
        let mut config = with_credentials();
        config.credentials.username = Some("   ".to_string());
        assert!(matches!(
            config.credentials(),
            Err(ConfigError::Missing("credentials.username"))
        ));
    }

    #[test]
    fn test_log_directives_quiet_beats_rust_log() {
        let logging = LoggingConfig {
            quiet: true,
            ..LoggingConfig::default()
        };
        assert_eq!(logging.directives(Some("debug".to_string())), "error");
        assert_eq!(logging.directives(None), "error");
    }

    #[test]
    fn test_log_directives_rust_log_beats_level() {
        let logging = LoggingConfig::default();
        assert_eq!(
            logging.directives(Some("portal_keepalive=debug".to_string())),
            "portal_keepalive=debug"
        );
        assert_eq!(logging.directives(Some("  ".to_string())), "info");
        assert_eq!(logging.directives(None), "info");
    }

    #[test]
    fn test_credentials_debug_redacted() {
        let config = with_credentials();
        let debug = format!("{:?}", config);
        assert!(!debug.contains("secret"));
        assert!(debug.contains("<redacted>"));
    }
}
