//! Config command - inspect configuration.

use anyhow::Result;
use clap::{Args, Subcommand};
use switchyard_store::{SettingsStore, default_config_dir};

use crate::output::JsonFormatter;
use crate::{Cli, OutputFormat};

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Config subcommands.
#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show effective configuration.
    Show,

    /// Show configuration paths.
    Path,

    /// Write the effective configuration to the settings file.
    Init,
}

/// Runs the config command.
pub async fn run(args: &ConfigArgs, cli: &Cli, store: &SettingsStore) -> Result<()> {
    match &args.action {
        ConfigAction::Show => show_config(cli, store).await,
        ConfigAction::Path => show_paths(cli, store),
        ConfigAction::Init => init_config(cli, store).await,
    }
}

async fn show_config(cli: &Cli, store: &SettingsStore) -> Result<()> {
    let settings = store.get().await;

    match cli.format {
        OutputFormat::Text => {
            let t = &settings.transport;
            println!("Switchyard Configuration");
            println!("{}", "─".repeat(40));
            println!();
            println!("Transport:");
            println!("  Min interval:  {} ms", t.min_interval_ms);
            println!("  Timeout:       {} ms", t.timeout_ms);
            println!("  Max attempts:  {}", t.max_attempts);
            println!("  Base delay:    {} ms", t.base_delay_ms);
            println!("  User agent:    {}", t.user_agent);
            println!();
            println!("Orchestrator:");
            println!("  Max providers: {}", settings.orchestrator.max_providers);
            println!(
                "  Multi below:   {:.2} confidence",
                settings.orchestrator.multi_provider_confidence
            );
            println!();
            println!(
                "Proxy relay:     {}",
                settings.proxy.relay_url.as_deref().unwrap_or("none")
            );
            println!(
                "Credentials:     {}{}",
                settings.credentials.backend,
                if settings.credentials.env_overlay {
                    " (+ SWITCHYARD_* env)"
                } else {
                    ""
                }
            );
            println!("Log level:       {}", settings.log_level);
        }
        OutputFormat::Json => {
            let formatter = JsonFormatter::new(cli.pretty);
            println!("{}", formatter.format(&settings)?);
        }
    }

    Ok(())
}

fn show_paths(cli: &Cli, store: &SettingsStore) -> Result<()> {
    let config_dir = default_config_dir();
    let settings_path = store.path();

    match cli.format {
        OutputFormat::Text => {
            println!("Configuration Paths");
            println!("{}", "─".repeat(40));
            println!();
            println!("Config dir:    {}", config_dir.display());
            println!("Settings file: {}", settings_path.display());
        }
        OutputFormat::Json => {
            let paths = serde_json::json!({
                "config_dir": config_dir.display().to_string(),
                "settings_file": settings_path.display().to_string(),
            });
            let formatter = JsonFormatter::new(cli.pretty);
            println!("{}", formatter.format(&paths)?);
        }
    }

    Ok(())
}

async fn init_config(cli: &Cli, store: &SettingsStore) -> Result<()> {
    store.save().await?;
    if !cli.quiet {
        println!("Wrote {}", store.path().display());
    }
    Ok(())
}
