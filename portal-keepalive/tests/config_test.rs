//! Configuration layering: defaults, file, command line.

use clap::Parser;
use portal_keepalive::cli::Args;
use portal_keepalive::Config;

fn write_config(dir: &tempfile::TempDir, contents: &str) -> String {
    let file = dir.path().join("keepalive.toml");
    std::fs::write(&file, contents).unwrap();
    dir.path().join("keepalive").to_str().unwrap().to_string()
}

#[test]
fn test_load_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(
        &dir,
        r#"
[credentials]
username = "alice"
password = "0123"

[portal]
probe_url = "http://neverssl.com/"
success_marker = "Welcome"
extra_fields = ["4Tredir=/", "lang=en"]

[timing]
retry_secs = 15
"#,
    );

    let args = Args::parse_from(["portal-keepalive", "-c", path.as_str()]);
    let config = Config::load(&args).unwrap();

    assert_eq!(config.credentials.username.as_deref(), Some("alice"));
    assert_eq!(config.credentials.password.as_deref(), Some("0123"));
    assert_eq!(config.portal.probe_url, "http://neverssl.com/");
    assert_eq!(config.portal.success_marker, "Welcome");
    assert_eq!(config.portal.extra_fields.len(), 2);
    assert_eq!(config.timing.retry_secs, 15);
    assert_eq!(config.timing.keepalive_secs, 2200);
    assert_eq!(config.logging.level, "info");
    assert!(!config.logging.quiet);
    assert!(config.validate().is_ok());
}

#[test]
fn test_cli_overrides_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(
        &dir,
        r#"
[credentials]
username = "alice"
password = "secret"

[timing]
retry_secs = 15
keepalive_secs = 600
"#,
    );

    let args = Args::parse_from([
        "portal-keepalive",
        "-c",
        path.as_str(),
        "-u",
        "bob",
        "-r",
        "5",
        "-q",
    ]);
    let config = Config::load(&args).unwrap();

    assert_eq!(config.credentials.username.as_deref(), Some("bob"));
    assert_eq!(config.credentials.password.as_deref(), Some("secret"));
    assert_eq!(config.timing.retry_secs, 5);
    assert_eq!(config.timing.keepalive_secs, 600);
    assert!(config.logging.quiet);
    assert_eq!(config.logging.directives(Some("debug".to_string())), "error");
}

#[test]
fn test_defaults_without_file() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("absent").to_str().unwrap().to_string();

    let args = Args::parse_from(["portal-keepalive", "-c", missing.as_str()]);
    let config = Config::load(&args).unwrap();

    assert_eq!(config.portal.probe_url, "http://1.1.1.1/");
    assert_eq!(config.timing.retry_secs, 60);
    assert_eq!(config.timing.keepalive_secs, 2200);
    assert!(config.validate().is_err());
}
