//! Command line interface.

use std::io::{self, BufRead, Write};

use clap::Parser;

use crate::config::Config;

#[derive(Parser, Debug, Clone)]
#[command(name = "portal-keepalive")]
#[command(version)]
#[command(about = "Log into a captive portal gateway and keep the session alive", long_about = None)]
pub struct Args {
    /// Portal username
    ///
    /// Can also be set via KEEPALIVE__CREDENTIALS__USERNAME
    #[arg(short = 'u', long)]
    pub username: Option<String>,

    /// Portal password
    ///
    /// Can also be set via KEEPALIVE__CREDENTIALS__PASSWORD
    #[arg(short = 'p', long)]
    pub password: Option<String>,

    /// Seconds to wait before retrying (default: 60)
    #[arg(short = 'r', long, value_parser = clap::value_parser!(u64).range(1..))]
    pub retry: Option<u64>,

    /// Seconds to wait between keep-alive requests (default: 2200)
    #[arg(short = 'k', long, value_parser = clap::value_parser!(u64).range(1..))]
    pub keepalive: Option<u64>,

    /// Config file, extension optional (default: config)
    #[arg(short = 'c', long, default_value = "config")]
    pub config: String,

    /// Only log errors
    #[arg(short = 'q', long)]
    pub quiet: bool,

    /// Prompt on the terminal for missing credentials
    #[arg(short = 'i', long)]
    pub interactive: bool,

    /// Run a single check, print the session status as JSON and exit
    #[arg(long)]
    pub once: bool,
}

/// Fill in missing credentials from the terminal.
pub fn prompt_missing_credentials(config: &mut Config) -> io::Result<()> {
    let creds = &mut config.credentials;

    if creds.username.as_deref().map_or(true, |u| u.trim().is_empty()) {
        print!("Username: ");
        io::stdout().flush()?;
        let mut line = String::new();
        io::stdin().lock().read_line(&mut line)?;
        creds.username = Some(line.trim().to_string());
    }

    if creds.password.as_deref().map_or(true, str::is_empty) {
        creds.password = Some(rpassword::prompt_password("Password: ")?);
    }

    Ok(())
}
