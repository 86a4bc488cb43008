//! Probe command - provider availability and live checks.

use anyhow::Result;
use clap::Args;
use switchyard_providers::HealthProber;
use switchyard_store::SettingsStore;
use tracing::info;

use super::{build_orchestrator, interrupt_token};
use crate::output::{JsonFormatter, TextFormatter};
use crate::{Cli, OutputFormat};

/// Arguments for the probe command.
#[derive(Args)]
pub struct ProbeArgs {
    /// Send one real request to every available provider.
    #[arg(long)]
    pub live: bool,

    /// Query for live probes (defaults to each provider's own).
    #[arg(long, requires = "live")]
    pub query: Option<String>,
}

/// Runs the probe command.
pub async fn run(args: &ProbeArgs, cli: &Cli, store: &SettingsStore) -> Result<()> {
    let settings = store.get().await;
    let orchestrator = build_orchestrator(&settings)?;
    let prober = HealthProber::new(&orchestrator);

    if args.live {
        info!("Probing providers live");
        let cancel = interrupt_token();
        let report = prober.probe_live(args.query.as_deref(), &cancel).await?;

        match cli.format {
            OutputFormat::Text => {
                let formatter = TextFormatter::new(!cli.no_color);
                for (id, probe) in &report {
                    println!("{}", formatter.format_live_probe(id, probe));
                }
                let ok = report.values().filter(|p| p.success).count();
                println!();
                println!("{ok}/{} providers answered", report.len());
            }
            OutputFormat::Json => {
                let formatter = JsonFormatter::new(cli.pretty);
                println!("{}", formatter.format(&report)?);
            }
        }
    } else {
        let report = prober.probe_all().await;

        match cli.format {
            OutputFormat::Text => {
                let formatter = TextFormatter::new(!cli.no_color);
                for (id, health) in &report {
                    println!("{}", formatter.format_health(id, health));
                }
            }
            OutputFormat::Json => {
                let formatter = JsonFormatter::new(cli.pretty);
                println!("{}", formatter.format(&report)?);
            }
        }
    }

    Ok(())
}
