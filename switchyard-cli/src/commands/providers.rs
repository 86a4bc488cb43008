//! Providers command - list registered providers.

use anyhow::Result;
use switchyard_store::SettingsStore;
use tracing::info;

use super::build_orchestrator;
use crate::output::{JsonFormatter, ProviderOutput, TextFormatter};
use crate::{Cli, OutputFormat};

/// Runs the providers command.
pub async fn run(cli: &Cli, store: &SettingsStore) -> Result<()> {
    info!("Listing providers");

    let settings = store.get().await;
    let orchestrator = build_orchestrator(&settings)?;

    let mut providers = Vec::with_capacity(orchestrator.registry().len());
    for desc in orchestrator.registry().all() {
        providers.push(ProviderOutput {
            info: desc.info(),
            available: orchestrator.is_available(desc).await,
        });
    }

    match cli.format {
        OutputFormat::Text => {
            let formatter = TextFormatter::new(!cli.no_color);

            println!("{}", formatter.format_providers_header());
            println!("{}", "─".repeat(72));
            for provider in &providers {
                println!("{}", formatter.format_provider_line(provider));
            }

            println!();
            println!(
                "Total: {} providers ({} available)",
                providers.len(),
                providers.iter().filter(|p| p.available).count()
            );
        }
        OutputFormat::Json => {
            let formatter = JsonFormatter::new(cli.pretty);
            println!("{}", formatter.format(&providers)?);
        }
    }

    Ok(())
}
