//! Text output formatting with colors.

use chrono::Local;
use switchyard_core::{CandidateFailure, OrchestrationResult, ProviderHealth, ProviderId};
use switchyard_providers::{LiveProbe, OrchestrationError};

use super::json::ProviderOutput;
use crate::commands::classify::Classification;
use crate::commands::credential::CredentialStatus;

// ============================================================================
// ANSI Colors
// ============================================================================

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const RED: &str = "\x1b[31m";
const CYAN: &str = "\x1b[36m";

const OK_MARK: &str = "✓";
const FAIL_MARK: &str = "✗";

/// Snippets longer than this are cut with an ellipsis.
const SNIPPET_WIDTH: usize = 160;

/// Text formatter with optional colors.
pub struct TextFormatter {
    use_colors: bool,
    snippet_width: usize,
}

impl TextFormatter {
    /// Creates a new text formatter.
    pub fn new(use_colors: bool) -> Self {
        Self {
            use_colors,
            snippet_width: SNIPPET_WIDTH,
        }
    }

    /// Formats one orchestration result.
    pub fn format_result(&self, result: &OrchestrationResult) -> String {
        let mut lines = Vec::new();

        let mut header = if result.success {
            format!("{} {}", self.green(OK_MARK), self.bold(result.provider_id.as_str()))
        } else {
            format!("{} {}", self.red(FAIL_MARK), self.bold(result.provider_id.as_str()))
        };
        if result.is_degraded() {
            header.push(' ');
            header.push_str(&self.yellow("(fallback)"));
        }
        if let Some(data) = &result.data {
            header.push_str(&format!(" · {} items", data.items.len()));
        }
        header.push_str(&self.dim(&format!(
            " · {} ms · {}",
            result.latency_ms,
            result.completed_at.with_timezone(&Local).format("%H:%M:%S")
        )));
        lines.push(header);

        if let Some(data) = &result.data {
            if let Some(summary) = &data.summary {
                lines.push(format!("  {summary}"));
            }
            for (n, item) in data.items.iter().enumerate() {
                lines.push(format!("  {}. {}", n + 1, item.title));
                if let Some(url) = &item.url {
                    lines.push(format!("     {}", self.cyan(url)));
                }
                if let Some(snippet) = &item.snippet {
                    lines.push(format!("     {}", self.dim(&self.truncate(snippet))));
                }
            }
        }

        if let Some(error) = &result.error {
            lines.push(format!(
                "  {} [{}] {}",
                self.red("Error:"),
                error.code,
                error.message
            ));
        }

        if !result.failures.is_empty() {
            lines.push(format!("  {}", self.dim("Tried:")));
            for failure in &result.failures {
                lines.push(format!("    {}", self.format_failure(failure)));
            }
        }

        lines.join("\n")
    }

    /// Formats a terminal orchestration error.
    pub fn format_error(&self, err: &OrchestrationError) -> String {
        let mut lines = vec![format!("{} {}", self.red("Error:"), err)];
        if let OrchestrationError::AllProvidersFailed { failures, .. } = err {
            for failure in failures {
                lines.push(format!("  {}", self.format_failure(failure)));
            }
        }
        lines.join("\n")
    }

    fn format_failure(&self, failure: &CandidateFailure) -> String {
        let status = failure
            .error
            .http_status
            .map(|s| format!(" HTTP {s}"))
            .unwrap_or_default();
        let mark = if failure.skipped {
            self.dim("skipped")
        } else {
            self.red("failed")
        };
        format!(
            "{:<15} {} [{}{}] {}",
            failure.provider_id.as_str(),
            mark,
            failure.error.code,
            status,
            failure.error.message
        )
    }

    /// Formats a query classification.
    pub fn format_classification(&self, c: &Classification) -> String {
        let mut lines = vec![format!(
            "Intent:     {} ({:.2} confidence)",
            self.bold(c.result.intent.as_str()),
            c.result.confidence
        )];
        lines.push(format!(
            "Mode:       {}",
            if c.multiple { "multiple" } else { "single" }
        ));
        lines.push(format!("Primary:    {}", join_ids(&c.primary)));
        lines.push(format!("Fallback:   {}", join_ids(&c.fallback)));

        if !c.result.alternatives.is_empty() {
            lines.push("Candidates:".to_string());
            for alt in &c.result.alternatives {
                lines.push(format!(
                    "  {:<10} score {:<3} {}",
                    alt.intent.as_str(),
                    alt.score,
                    self.dim(&format!("{:.2}", alt.confidence))
                ));
            }
        }

        lines.join("\n")
    }

    /// Formats a credential-only health entry.
    pub fn format_health(&self, id: &ProviderId, health: &ProviderHealth) -> String {
        if health.available {
            format!("{:<15} {} available", id.as_str(), self.green(OK_MARK))
        } else {
            format!(
                "{:<15} {} {}",
                id.as_str(),
                self.red(FAIL_MARK),
                health.reason.as_deref().unwrap_or("unavailable")
            )
        }
    }

    /// Formats a live probe entry.
    pub fn format_live_probe(&self, id: &ProviderId, probe: &LiveProbe) -> String {
        if probe.success {
            return format!(
                "{:<15} {} {} items {}",
                id.as_str(),
                self.green(OK_MARK),
                probe.items,
                self.dim(&format!("{} ms", probe.latency_ms))
            );
        }

        let reason = probe
            .error
            .as_ref()
            .map_or_else(|| "failed".to_string(), |e| format!("[{}] {}", e.code, e.message));
        if probe.available {
            format!(
                "{:<15} {} {} {}",
                id.as_str(),
                self.red(FAIL_MARK),
                reason,
                self.dim(&format!("{} ms", probe.latency_ms))
            )
        } else {
            format!("{:<15} {} {}", id.as_str(), self.yellow("-"), self.dim(&reason))
        }
    }

    /// Formats the providers table header.
    pub fn format_providers_header(&self) -> String {
        self.bold(&format!(
            "{:<15} {:<24} {:<9} {:<8} {:<10} {}",
            "ID", "NAME", "CATEGORY", "PRIORITY", "AUTH", "FALLBACK"
        ))
    }

    /// Formats one providers table row.
    pub fn format_provider_line(&self, provider: &ProviderOutput) -> String {
        let info = &provider.info;
        let auth = match (&info.credential_type, provider.available) {
            (None, _) => self.dim("none"),
            (Some(_), true) => self.green("key set"),
            (Some(_), false) => self.yellow("key unset"),
        };
        // Widen by the escape bytes so colored cells stay aligned.
        let auth_width = 10 + auth.len() - visible_len(&auth);
        format!(
            "{:<15} {:<24} {:<9} {:<8} {:<auth_width$} {}",
            info.id.as_str(),
            info.display_name,
            info.category.as_str(),
            info.priority.to_string(),
            auth,
            join_ids(&info.fallback_chain),
        )
    }

    /// Formats a credential check.
    pub fn format_credential(&self, status: &CredentialStatus) -> String {
        let state = if status.present {
            self.green("present")
        } else {
            self.red("missing")
        };
        let mut line = format!("{}: {} ({})", self.bold(&status.name), state, status.backend);
        if let Some(var) = &status.env_var {
            line.push_str(&self.dim(&format!(", overridden by ${var}")));
        }
        line
    }

    fn truncate(&self, text: &str) -> String {
        if text.chars().count() <= self.snippet_width {
            return text.to_string();
        }
        let cut: String = text.chars().take(self.snippet_width - 1).collect();
        format!("{}…", cut.trim_end())
    }

    // ========================================================================
    // Color/style helpers
    // ========================================================================

    fn paint(&self, code: &str, text: &str) -> String {
        if self.use_colors {
            format!("{code}{text}{RESET}")
        } else {
            text.to_string()
        }
    }

    fn bold(&self, text: &str) -> String {
        self.paint(BOLD, text)
    }

    fn dim(&self, text: &str) -> String {
        self.paint(DIM, text)
    }

    fn green(&self, text: &str) -> String {
        self.paint(GREEN, text)
    }

    fn yellow(&self, text: &str) -> String {
        self.paint(YELLOW, text)
    }

    fn red(&self, text: &str) -> String {
        self.paint(RED, text)
    }

    fn cyan(&self, text: &str) -> String {
        self.paint(CYAN, text)
    }
}

fn join_ids(ids: &[ProviderId]) -> String {
    if ids.is_empty() {
        return "-".to_string();
    }
    ids.iter()
        .map(ProviderId::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Length without ANSI escape sequences.
fn visible_len(text: &str) -> usize {
    let mut len = 0;
    let mut in_escape = false;
    for c in text.chars() {
        match (in_escape, c) {
            (false, '\x1b') => in_escape = true,
            (true, 'm') => in_escape = false,
            (true, _) => {}
            (false, _) => len += 1,
        }
    }
    len
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_visible_len_ignores_escapes() {
        let formatter = TextFormatter::new(true);
        assert_eq!(visible_len(&formatter.green("key set")), 7);
        assert_eq!(visible_len("plain"), 5);
    }

    #[test]
    fn test_truncate_long_snippet() {
        let formatter = TextFormatter::new(false);
        let long = "word ".repeat(100);
        let cut = formatter.truncate(&long);
        assert!(cut.ends_with('…'));
        assert!(cut.chars().count() <= SNIPPET_WIDTH);
        assert_eq!(formatter.truncate("short"), "short");
    }

    #[test]
    fn test_join_ids() {
        assert_eq!(join_ids(&[]), "-");
        assert_eq!(join_ids(&["brave".into(), "serpapi".into()]), "brave, serpapi");
    }
}
