//! AI news agent command-line tool.
//!
//! Provides subcommands for creating and validating the agent configuration
//! and for exercising the SMTP delivery path without the content pipeline
//! (`probe`, `send-test`).

mod setup;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::EnvFilter;

use ainews_core::config::AppConfig;
use ainews_core::MailDispatcher;

// ---------------------------------------------------------------------------
// CLI argument definitions
// ---------------------------------------------------------------------------

/// AI news agent command-line tool.
#[derive(Parser, Debug)]
#[command(
    name = "ainews",
    version,
    about = "Configure and test the AI news digest agent"
)]
struct Cli {
    /// Path to the TOML configuration file. Defaults to
    /// `<config dir>/ainews/config.toml`.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Interactively create a configuration file.
    Init,

    /// Validate a configuration file.
    Validate,

    /// Test SMTP connectivity, TLS upgrade, and authentication without
    /// sending any mail.
    Probe,

    /// Send a test digest to all configured recipients.
    SendTest,
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> ExitCode {
    // Pick up SMTP credentials from a local .env if present.
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let config_path = match cli.config {
        Some(path) => path,
        None => default_config_path()?,
    };

    match cli.command {
        Commands::Init => {
            init_minimal_logging();
            setup::run_init(&config_path)
        }
        Commands::Validate => {
            init_minimal_logging();
            cmd_validate(&config_path)
        }
        Commands::Probe => {
            let (dispatcher, _guard) = setup_dispatch_command(&config_path)?;
            cmd_probe(&dispatcher)
        }
        Commands::SendTest => {
            let (dispatcher, _guard) = setup_dispatch_command(&config_path)?;
            cmd_send_test(&dispatcher)
        }
    }
}

// ---------------------------------------------------------------------------
// Logging & config helpers
// ---------------------------------------------------------------------------

fn default_config_path() -> Result<PathBuf> {
    let base = dirs::config_dir().context("could not determine the user configuration directory")?;
    Ok(base.join("ainews").join("config.toml"))
}

/// Shared setup for the commands that deliver or probe mail: parse the
/// config file, bring up full logging, then resolve secrets, validate, and
/// build the dispatcher. Logging comes up before resolution so that
/// resolution warnings (unset env vars) reach the subscriber.
fn setup_dispatch_command(config_path: &Path) -> Result<(MailDispatcher, WorkerGuard)> {
    let mut config =
        AppConfig::load_from_file(config_path).context("failed to load configuration")?;

    let guard = init_logging(&config)?;

    config.resolve_env_vars();
    config
        .validate()
        .context("configuration validation failed")?;

    let dispatcher = MailDispatcher::from_config(&config.email)
        .context("failed to initialize mail dispatcher")?;

    Ok((dispatcher, guard))
}

/// Console-only warn-level logging for commands that run before (or without)
/// a loaded configuration.
fn init_minimal_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new("warn"))
        .with_target(false)
        .without_time()
        .init();
}

/// Full logging per the agent configuration: console plus a daily-rolling
/// file in the configured log directory. The returned guard must stay alive
/// for the duration of the process.
fn init_logging(config: &AppConfig) -> Result<WorkerGuard> {
    std::fs::create_dir_all(&config.agent.log_dir).context("failed to create log directory")?;
    let file_appender = tracing_appender::rolling::daily(&config.agent.log_dir, "ainews.log");
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    let filter =
        EnvFilter::try_new(&config.agent.log_level).unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(file_writer.and(std::io::stderr))
        .with_ansi(false)
        .init();

    Ok(guard)
}

// ---------------------------------------------------------------------------
// Subcommand implementations
// ---------------------------------------------------------------------------

fn cmd_validate(config_path: &Path) -> Result<()> {
    println!("Validating configuration: {}", config_path.display());
    println!();

    let mut config =
        AppConfig::load_from_file(config_path).context("failed to parse configuration")?;
    println!("  [OK] TOML structure is valid");

    config.resolve_env_vars();
    println!("  [OK] Environment variable references processed");

    match config.validate() {
        Ok(()) => {
            println!("  [OK] All required fields are valid");
        }
        Err(e) => {
            println!("  [FAIL] Validation error: {}", e);
            anyhow::bail!("configuration validation failed");
        }
    }

    println!();
    println!("Configuration summary:");
    println!(
        "  SMTP server : {}:{}",
        config.email.smtp.server, config.email.smtp.port
    );
    println!(
        "  STARTTLS    : {}",
        if config.email.smtp.use_tls {
            "enabled"
        } else {
            "disabled"
        }
    );
    println!("  Username    : {}", config.email.credentials.username);
    println!(
        "  Password    : {}",
        if config.email.credentials.password.is_some() {
            "set"
        } else {
            "NOT SET"
        }
    );
    println!("  Recipients  : {}", config.email.recipients.len());
    println!();
    println!("Configuration is valid.");

    Ok(())
}

fn cmd_probe(dispatcher: &MailDispatcher) -> Result<()> {
    println!("Testing SMTP connection...");
    info!("smtp connection test requested");

    dispatcher
        .probe_connection()
        .context("SMTP connection test failed")?;

    info!("smtp connection test succeeded");
    println!("Connection, TLS negotiation, and authentication all succeeded.");
    Ok(())
}

fn cmd_send_test(dispatcher: &MailDispatcher) -> Result<()> {
    println!("Sending test digest...");
    info!("test digest requested");

    let report = dispatcher
        .send_diagnostic()
        .context("test digest was not sent")?;

    info!(
        delivered = report.delivered.len(),
        attempted = report.attempted(),
        "test digest dispatched"
    );
    println!(
        "Delivered to {}/{} recipients.",
        report.delivered.len(),
        report.attempted()
    );
    for (recipient, error) in &report.failed {
        warn!(to = %recipient, error = %error, "test digest not delivered");
        println!("  [FAIL] {}: {}", recipient, error);
    }

    if report.all_delivered() {
        Ok(())
    } else {
        anyhow::bail!("some recipients did not receive the test digest");
    }
}
