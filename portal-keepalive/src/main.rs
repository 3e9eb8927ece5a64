//! Portal Keep-Alive - logs into a captive portal gateway and keeps the session alive.

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use portal_keepalive::cli::{self, Args};
use portal_keepalive::{Config, KeepAliveLoop, PortalClient};

/// Exit code for `--once` when the gateway did not let us in.
const EXIT_NOT_AUTHENTICATED: u8 = 2;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Load configuration
    let mut config = Config::load(&args)
        .map_err(|e| format!("Failed to load configuration: {}", e))?;
    if args.interactive {
        cli::prompt_missing_credentials(&mut config)?;
    }
    config.validate().map_err(|e| {
        format!(
            "Invalid configuration: {}. \
             Pass -u/--username and -p/--password, set KEEPALIVE__CREDENTIALS__USERNAME and \
             KEEPALIVE__CREDENTIALS__PASSWORD, or use --interactive.",
            e
        )
    })?;
    let credentials = config.credentials()?;

    // Initialize tracing
    tracing_subscriber::registry()
        .with(EnvFilter::new(config.logging.directives(std::env::var("RUST_LOG").ok())))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let username = credentials.username.clone();
    let client = PortalClient::new(&config.portal, credentials)
        .map_err(|e| format!("Invalid portal configuration: {}", e))?;
    tracing::info!(
        "Starting portal-keepalive for {} (probe {}, retry {}s, keep-alive {}s)",
        username,
        config.portal.probe_url,
        config.timing.retry_secs,
        config.timing.keepalive_secs
    );

    let mut keepalive = KeepAliveLoop::new(client, config.timing.clone(), config.portal.logout_on_exit);

    if args.once {
        let status = keepalive.run_once().await;
        println!("{}", serde_json::to_string_pretty(&status)?);
        return Ok(if status.authenticated {
            ExitCode::SUCCESS
        } else {
            ExitCode::from(EXIT_NOT_AUTHENTICATED)
        });
    }

    keepalive.run(shutdown_signal()).await;

    Ok(ExitCode::SUCCESS)
}

/// Resolves on Ctrl-C, or SIGTERM on unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown requested");
}
