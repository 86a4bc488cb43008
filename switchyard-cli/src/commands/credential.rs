//! Credential command - store and check provider API keys.

use std::io::{self, BufRead};

use anyhow::{Result, bail};
use clap::{Args, Subcommand};
use serde::Serialize;
use switchyard_fetch::EnvOverlayCredentialStore;
use switchyard_providers::ProviderRegistry;
use switchyard_store::{SettingsStore, open_credential_store};
use tracing::info;

use crate::output::{JsonFormatter, TextFormatter};
use crate::{Cli, ExitCode, OutputFormat};

/// Arguments for the credential command.
#[derive(Args)]
pub struct CredentialArgs {
    #[command(subcommand)]
    pub action: CredentialAction,
}

/// Credential subcommands.
#[derive(Subcommand)]
pub enum CredentialAction {
    /// Store a credential. Reads the secret from stdin unless given.
    Set {
        /// Credential name (the provider id).
        name: String,

        /// Secret value. Prefer stdin, arguments end up in shell history.
        #[arg(long)]
        value: Option<String>,
    },

    /// Check whether a credential is present.
    Check {
        /// Credential name (the provider id).
        name: String,
    },
}

/// Result of a credential check.
#[derive(Debug, Serialize)]
pub struct CredentialStatus {
    /// Credential name.
    pub name: String,
    /// Whether a secret is present.
    pub present: bool,
    /// Backend consulted.
    pub backend: String,
    /// Environment variable that overrides the backend.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub env_var: Option<String>,
}

/// Runs the credential command.
pub async fn run(args: &CredentialArgs, cli: &Cli, store: &SettingsStore) -> Result<()> {
    let settings = store.get().await;
    let registry = ProviderRegistry::builtin()?;
    let credentials = open_credential_store(&settings.credentials);

    match &args.action {
        CredentialAction::Set { name, value } => {
            check_known(&registry, name)?;
            let secret = match value {
                Some(value) => value.clone(),
                None => read_secret()?,
            };
            if secret.is_empty() {
                bail!("Empty secret for credential `{name}`");
            }
            if !credentials.set(name, &secret).await {
                bail!("Failed to store credential `{name}` in {}", credentials.label());
            }
            info!(credential = %name, backend = credentials.label(), "Credential stored");
            if !cli.quiet && cli.format == OutputFormat::Text {
                println!("Stored `{name}` in {}", credentials.label());
            }
        }
        CredentialAction::Check { name } => {
            check_known(&registry, name)?;
            let status = CredentialStatus {
                name: name.clone(),
                present: credentials.has(name).await,
                backend: credentials.label().to_string(),
                env_var: settings
                    .credentials
                    .env_overlay
                    .then(|| EnvOverlayCredentialStore::variable_name(name)),
            };

            match cli.format {
                OutputFormat::Text => {
                    let formatter = TextFormatter::new(!cli.no_color);
                    println!("{}", formatter.format_credential(&status));
                }
                OutputFormat::Json => {
                    let formatter = JsonFormatter::new(cli.pretty);
                    println!("{}", formatter.format(&status)?);
                }
            }

            if !status.present {
                std::process::exit(ExitCode::Error as i32);
            }
        }
    }

    Ok(())
}

/// Rejects names no registered provider uses.
fn check_known(registry: &ProviderRegistry, name: &str) -> Result<()> {
    let known = registry
        .all()
        .any(|d| d.credential_type.as_deref() == Some(name));
    if !known {
        let mut names: Vec<&str> = registry
            .all()
            .filter_map(|d| d.credential_type.as_deref())
            .collect();
        names.sort_unstable();
        bail!(
            "No provider uses credential `{name}` (known: {})",
            names.join(", ")
        );
    }
    Ok(())
}

fn read_secret() -> Result<String> {
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_known_accepts_keyed_providers() {
        let registry = ProviderRegistry::builtin().unwrap();
        assert!(check_known(&registry, "brave").is_ok());
        assert!(check_known(&registry, "tmdb").is_ok());
    }

    #[test]
    fn test_check_known_rejects_keyless_and_unknown() {
        let registry = ProviderRegistry::builtin().unwrap();
        assert!(check_known(&registry, "wttr").is_err());
        let err = check_known(&registry, "nope").unwrap_err().to_string();
        assert!(err.contains("known: "), "{err}");
        assert!(err.contains("brave"), "{err}");
    }
}
