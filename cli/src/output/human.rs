//! Human-readable terminal renderer.

use std::path::Path;

use anyhow::Result;
use certpush_common::types::StoreStatus;
use owo_colors::OwoColorize as _;

use crate::domain::{CertpushConfig, HostDeploymentResult, HostEntry, HostSet, RunReport};
use crate::output::OutputContext;

/// Renders domain types as human-readable terminal output using `OutputContext`.
pub struct HumanRenderer<'a> {
    ctx: &'a OutputContext,
}

impl<'a> HumanRenderer<'a> {
    /// Create a new `HumanRenderer` wrapping the given output context.
    #[must_use]
    pub fn new(ctx: &'a OutputContext) -> Self {
        Self { ctx }
    }

    /// Render the CLI version information.
    pub fn render_version(&self, version: &str) {
        if self.ctx.quiet {
            return;
        }
        self.ctx.info(&format!("certpush v{version}"));
    }

    /// Render the end-of-run summary.
    ///
    /// Failed hosts and the staged-but-uncommitted warning go to stderr so
    /// they survive `--quiet`.
    pub fn render_report(&self, report: &RunReport) {
        if !self.ctx.quiet {
            println!();
            self.ctx.header("Deployment summary");
        }
        for result in &report.hosts {
            if result.is_success() {
                self.ctx.success(&host_line(result));
            } else {
                self.ctx.error(&host_line(result));
                for err in result.errors.iter().filter(|e| !e.is_derived()) {
                    eprintln!("      {}", err.to_string().style(self.ctx.styles.dim));
                }
            }
        }
        for host in &report.skipped {
            self.ctx.warn(&format!("{host}: skipped (cancelled)"));
        }
        for host in &report.orphans_pruned {
            self.ctx.info(&format!("{host}: removed from host list, API key deleted"));
        }
        for host in &report.orphans_retained {
            self.ctx.info(&format!("{host}: removed from host list, API key kept"));
        }
        if let Some(warning) = rollback_warning(report) {
            eprintln!();
            eprintln!("  {} {warning}", "!".style(self.ctx.styles.warning));
        }
        if !self.ctx.quiet {
            println!();
            println!("  {}", summary_line(report).style(self.ctx.styles.bold));
        }
    }

    /// Render a credential store snapshot.
    pub fn render_status(&self, status: &StoreStatus, store_path: &Path) {
        if self.ctx.quiet {
            return;
        }
        self.ctx.kv("Store:", &store_path.display().to_string());
        self.ctx
            .kv("User:", status.user.as_deref().unwrap_or("(not remembered)"));
        self.ctx.kv(
            "Password:",
            if status.password_saved {
                "saved"
            } else {
                "not saved"
            },
        );
        println!();
        if status.hosts.is_empty() {
            self.ctx.info("No hosts remembered. Run `certpush deploy --hosts ...` first.");
            return;
        }
        self.ctx.header("Hosts:");
        for host in &status.hosts {
            let key = if host.has_api_key {
                "API key stored"
            } else {
                "no API key"
            };
            println!(
                "    {:<32} {}  {}",
                host.host,
                key,
                short_fingerprint(&host.fingerprint).style(self.ctx.styles.dim)
            );
        }
        if status.orphan_keys > 0 {
            println!();
            self.ctx.warn(&format!(
                "{} stored API key(s) belong to no remembered host. Run `certpush forget --all` to clear them.",
                status.orphan_keys
            ));
        }
    }

    /// Render which of the requested hosts had anything stored.
    pub fn render_forgotten(&self, targets: &HostSet, forgotten: &[HostEntry]) {
        for host in targets {
            if forgotten.contains(host) {
                self.ctx.success(&format!("{host}: forgotten"));
            } else {
                self.ctx.info(&format!("{host}: nothing stored"));
            }
        }
    }

    /// Render the outcome of clearing the store.
    pub fn render_cleared(&self, entries_removed: usize) {
        self.ctx
            .success(&format!("Removed {entries_removed} stored entries."));
    }

    /// Confirm a settings change.
    ///
    /// # Errors
    ///
    /// Returns an error if `key` is not a known setting.
    pub fn render_config_set(&self, key: &str, config: &CertpushConfig) -> Result<()> {
        self.ctx.success(&format!("Set {key} = {}", config.get(key)?));
        Ok(())
    }

    /// Render the current certpush configuration.
    pub fn render_config(&self, config: &CertpushConfig, path: &Path) {
        println!();
        println!(
            "  {}",
            format!("Configuration ({})", path.display()).style(self.ctx.styles.header)
        );
        println!();
        println!("  {:<28} {}", "policy.save_password:", config.policy.save_password);
        println!(
            "  {:<28} {}",
            "policy.delete_orphan_keys:", config.policy.delete_orphan_keys
        );
        println!(
            "  {:<28} {}",
            "transport.timeout_secs:", config.transport.timeout_secs
        );
        println!("  {:<28} {}", "transport.insecure:", config.transport.insecure);
        println!();
        println!("  {}", "Environment:".style(self.ctx.styles.bold));
        for var in ["CERTPUSH_CONFIG", "CERTPUSH_STORE", "NO_COLOR"] {
            println!(
                "    {:<18} {}",
                format!("{var}:"),
                std::env::var(var).unwrap_or_else(|_| "(not set)".to_string())
            );
        }
        println!();
    }
}

/// One-line outcome for a host.
#[must_use]
pub fn host_line(result: &HostDeploymentResult) -> String {
    let host = &result.host;
    if result.is_success() {
        let key = if result.key_regenerated {
            " (new API key)"
        } else {
            ""
        };
        return format!("{host}: deployed and committed{key}");
    }
    if !result.key_obtained {
        return format!("{host}: no usable API key");
    }
    if result.upload_failure {
        return format!("{host}: upload failed, nothing committed");
    }
    format!("{host}: commit failed")
}

/// `"3 hosts: 2 succeeded, 1 failed"` plus skipped hosts when cancelled.
#[must_use]
pub fn summary_line(report: &RunReport) -> String {
    let total = report.hosts.len() + report.skipped.len();
    let noun = if total == 1 { "host" } else { "hosts" };
    let mut line = format!(
        "{total} {noun}: {} succeeded, {} failed",
        report.succeeded(),
        report.failed()
    );
    if !report.skipped.is_empty() {
        line.push_str(&format!(", {} skipped", report.skipped.len()));
    }
    line
}

/// Warning listing hosts left with staged objects that were never committed.
#[must_use]
pub fn rollback_warning(report: &RunReport) -> Option<String> {
    let partial: Vec<String> = report
        .hosts
        .iter()
        .filter(|h| h.key_obtained && !h.committed)
        .map(|h| h.host.to_string())
        .collect();
    if partial.is_empty() {
        return None;
    }
    Some(format!(
        "Uploads are not rolled back. These hosts may hold staged, uncommitted objects: {}",
        partial.join(", ")
    ))
}

fn short_fingerprint(fingerprint: &str) -> &str {
    fingerprint.get(..12).unwrap_or(fingerprint)
}
