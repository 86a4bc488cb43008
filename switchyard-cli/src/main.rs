// Lint configuration for this crate
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! Switchyard CLI - query routing across public data APIs.
//!
//! # Examples
//!
//! ```bash
//! # Free text, classified and routed
//! switchyard run "weather in Lisbon"
//!
//! # A specific provider, with its fallback chain
//! switchyard run brave "rust async runtimes"
//!
//! # An intent, skipping classification
//! switchyard run news "chip launch" --multiple
//!
//! # Inspect classification only
//! switchyard classify "AAPL stock price"
//!
//! # Credential status, then real requests
//! switchyard probe
//! switchyard probe --live --format json --pretty
//!
//! # Store an API key
//! switchyard credential set brave
//! ```

mod commands;
mod output;

use std::path::PathBuf;
use std::process;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use switchyard_providers::OrchestrationError;
use switchyard_store::{LogLevel, SettingsStore};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use commands::{classify, config, credential, probe, providers, run};

// ============================================================================
// CLI Definition
// ============================================================================

/// Switchyard CLI - query routing across public data APIs.
#[derive(Parser)]
#[command(name = "switchyard")]
#[command(about = "Route queries to public data providers with fallback")]
#[command(long_about = r#"
Switchyard classifies a query, picks providers for its intent and runs
them with rate limiting, retries and fallback chains.

Intents:
  search, news, weather, stocks, movies, tech, general

Examples:
  switchyard run "weather in Lisbon"     # Classified and routed
  switchyard run brave "rust"            # One provider and its fallbacks
  switchyard run news "elections"        # One intent
  switchyard providers                   # Provider catalog
  switchyard probe --live                # Real request per provider
"#)]
#[command(version)]
pub struct Cli {
    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Commands,

    /// Output format (text or json).
    #[arg(long, short = 'f', default_value = "text", global = true)]
    pub format: OutputFormat,

    /// Pretty-print JSON output.
    #[arg(long, global = true)]
    pub pretty: bool,

    /// Settings file (defaults to the platform config dir).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbose output (show debug info).
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Disable colored output.
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Quiet mode (no logging, no error messages).
    #[arg(long, short, global = true)]
    pub quiet: bool,
}

/// CLI commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Run a query against a provider, an intent or free text.
    #[command(visible_alias = "r")]
    Run(run::RunArgs),

    /// Classify a query without running it.
    #[command(visible_alias = "c")]
    Classify(classify::ClassifyArgs),

    /// Check provider availability.
    Probe(probe::ProbeArgs),

    /// List registered providers.
    #[command(visible_alias = "p")]
    Providers,

    /// Manage provider credentials.
    Credential(credential::CredentialArgs),

    /// Show configuration.
    Config(config::ConfigArgs),
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum OutputFormat {
    /// Human-readable text with colors.
    #[default]
    Text,
    /// JSON output for scripting.
    Json,
}

/// CLI exit codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Success.
    Success = 0,
    /// General error.
    Error = 1,
    /// Bad settings, unknown provider or inconsistent catalog.
    Configuration = 2,
    /// Every candidate provider failed.
    AllProvidersFailed = 3,
    /// No provider configured or available for the intent.
    NoAvailableProvider = 4,
    /// Interrupted.
    Cancelled = 130,
}

impl ExitCode {
    /// Exit code for a failed orchestration.
    pub fn for_orchestration(err: &OrchestrationError) -> Self {
        match err {
            OrchestrationError::Configuration(_) => Self::Configuration,
            OrchestrationError::AllProvidersFailed { .. } => Self::AllProvidersFailed,
            OrchestrationError::NoAvailableProvider { .. } => Self::NoAvailableProvider,
            OrchestrationError::Cancelled => Self::Cancelled,
        }
    }

    /// Exit code for any command error.
    pub fn for_error(err: &anyhow::Error) -> Self {
        if let Some(err) = err.downcast_ref::<OrchestrationError>() {
            return Self::for_orchestration(err);
        }
        if err.downcast_ref::<switchyard_store::StoreError>().is_some() {
            return Self::Configuration;
        }
        Self::Error
    }
}

// ============================================================================
// Logging Setup
// ============================================================================

fn setup_logging(verbose: bool, quiet: bool, level: LogLevel) {
    if quiet {
        return;
    }

    // RUST_LOG wins over flags and settings.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("switchyard=debug")
        } else {
            EnvFilter::new(format!("switchyard={level}"))
        }
    });

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .without_time()
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();
}

// ============================================================================
// Main Entry Point
// ============================================================================

async fn load_settings(cli: &Cli) -> Result<SettingsStore> {
    let store = match &cli.config {
        Some(path) => SettingsStore::load(path.clone()).await?,
        None => SettingsStore::load_default().await?,
    };
    Ok(store)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let store = match load_settings(&cli).await {
        Ok(store) => store,
        Err(e) => {
            if !cli.quiet {
                eprintln!("Error: {e}");
            }
            process::exit(ExitCode::Configuration as i32);
        }
    };
    setup_logging(cli.verbose, cli.quiet, store.get().await.log_level);

    let result = match &cli.command {
        Commands::Run(args) => run::run(args, &cli, &store).await,
        Commands::Classify(args) => classify::run(args, &cli, &store).await,
        Commands::Probe(args) => probe::run(args, &cli, &store).await,
        Commands::Providers => providers::run(&cli, &store).await,
        Commands::Credential(args) => credential::run(args, &cli, &store).await,
        Commands::Config(args) => config::run(args, &cli, &store).await,
    };

    if let Err(e) = result {
        if !cli.quiet {
            eprintln!("Error: {e:#}");
        }
        process::exit(ExitCode::for_error(&e) as i32);
    }

    Ok(())
}
