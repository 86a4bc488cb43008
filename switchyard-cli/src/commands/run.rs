//! Run command - execute a query through the orchestrator.

use std::process;
use std::time::Duration;

use anyhow::Result;
use clap::Args;
use switchyard_providers::{DEFAULT_LIMIT, ExecuteOptions, InvokeOptions, OrchestrationError};
use switchyard_store::SettingsStore;
use tracing::info;

use super::{build_orchestrator, interrupt_token};
use crate::output::{JsonFormatter, TextFormatter};
use crate::{Cli, ExitCode, OutputFormat};

/// Arguments for the run command.
#[derive(Args)]
pub struct RunArgs {
    /// Provider id (`brave`), intent (`news`) or free text.
    pub target: String,

    /// Query passed to the provider or intent.
    pub query: Option<String>,

    /// Run several providers concurrently.
    #[arg(long, conflicts_with = "single")]
    pub multiple: bool,

    /// Run only the best provider and its fallbacks.
    #[arg(long)]
    pub single: bool,

    /// Providers to run in multi mode.
    #[arg(long)]
    pub max_providers: Option<usize>,

    /// Also select providers whose credential is missing.
    #[arg(long)]
    pub include_unavailable: bool,

    /// Maximum number of result items per provider.
    #[arg(long, short = 'n', default_value_t = DEFAULT_LIMIT)]
    pub limit: usize,

    /// Per-attempt timeout in seconds.
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Attempts per provider request.
    #[arg(long)]
    pub attempts: Option<u32>,
}

impl RunArgs {
    /// Orchestrator options for these arguments.
    pub fn execute_options(&self) -> ExecuteOptions {
        let use_multiple = if self.multiple {
            Some(true)
        } else if self.single {
            Some(false)
        } else {
            None
        };

        ExecuteOptions {
            use_multiple,
            max_providers: self.max_providers,
            include_unavailable: self.include_unavailable,
            invoke: InvokeOptions {
                limit: self.limit,
                timeout: self.timeout.map(Duration::from_secs),
                max_attempts: self.attempts,
                ..InvokeOptions::default()
            },
        }
    }
}

/// Runs the run command.
pub async fn run(args: &RunArgs, cli: &Cli, store: &SettingsStore) -> Result<()> {
    let settings = store.get().await;
    let orchestrator = build_orchestrator(&settings)?;
    let options = args.execute_options();
    let cancel = interrupt_token();

    info!(request = %args.target, "Running query");
    let outcome = orchestrator
        .execute(&args.target, args.query.as_deref(), &options, &cancel)
        .await;

    let results = match outcome {
        Ok(results) => results,
        Err(err) => {
            print_error(&err, cli)?;
            process::exit(ExitCode::for_orchestration(&err) as i32);
        }
    };

    match cli.format {
        OutputFormat::Text => {
            let formatter = TextFormatter::new(!cli.no_color);
            let blocks: Vec<String> = results.iter().map(|r| formatter.format_result(r)).collect();
            println!("{}", blocks.join("\n\n"));
        }
        OutputFormat::Json => {
            let formatter = JsonFormatter::new(cli.pretty);
            println!("{}", formatter.format_results(&results)?);
        }
    }

    let code = if results.iter().any(|r| r.success) {
        ExitCode::Success
    } else {
        ExitCode::AllProvidersFailed
    };
    if code != ExitCode::Success {
        process::exit(code as i32);
    }
    Ok(())
}

fn print_error(err: &OrchestrationError, cli: &Cli) -> Result<()> {
    match cli.format {
        OutputFormat::Text => {
            if !cli.quiet {
                let formatter = TextFormatter::new(!cli.no_color);
                eprintln!("{}", formatter.format_error(err));
            }
        }
        OutputFormat::Json => {
            let formatter = JsonFormatter::new(cli.pretty);
            println!("{}", formatter.format_error(err)?);
        }
    }
    Ok(())
}
