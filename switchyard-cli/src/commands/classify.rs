//! Classify command - show how a query would be routed.

use anyhow::Result;
use clap::Args;
use serde::Serialize;
use switchyard_core::{IntentResult, ProviderId};
use switchyard_providers::Orchestrator;
use switchyard_store::SettingsStore;

use super::build_orchestrator;
use crate::output::{JsonFormatter, TextFormatter};
use crate::{Cli, OutputFormat};

/// Arguments for the classify command.
#[derive(Args)]
pub struct ClassifyArgs {
    /// Query to classify.
    #[arg(required = true, num_args = 1..)]
    pub query: Vec<String>,
}

/// Classification plus the providers the intent routes to.
#[derive(Debug, Serialize)]
pub struct Classification {
    /// Classifier output.
    #[serde(flatten)]
    pub result: IntentResult,
    /// Whether multi mode would be used by default.
    pub multiple: bool,
    /// Primary providers for the intent.
    pub primary: Vec<ProviderId>,
    /// Fallback providers for the intent.
    pub fallback: Vec<ProviderId>,
}

impl Classification {
    /// Classifies `query` with the orchestrator's routing table.
    pub fn new(orchestrator: &Orchestrator, query: &str, threshold: f64) -> Self {
        let result = orchestrator.classify(query);
        let (primary, fallback) = orchestrator
            .routing()
            .route(result.intent)
            .map(|route| (route.primary.clone(), route.fallback.clone()))
            .unwrap_or_default();
        Self {
            multiple: result.confidence < threshold,
            result,
            primary,
            fallback,
        }
    }
}

/// Runs the classify command.
pub async fn run(args: &ClassifyArgs, cli: &Cli, store: &SettingsStore) -> Result<()> {
    let settings = store.get().await;
    let orchestrator = build_orchestrator(&settings)?;
    let query = args.query.join(" ");
    let classification = Classification::new(
        &orchestrator,
        &query,
        settings.orchestrator.multi_provider_confidence,
    );

    match cli.format {
        OutputFormat::Text => {
            let formatter = TextFormatter::new(!cli.no_color);
            println!("{}", formatter.format_classification(&classification));
        }
        OutputFormat::Json => {
            let formatter = JsonFormatter::new(cli.pretty);
            println!("{}", formatter.format(&classification)?);
        }
    }

    Ok(())
}
