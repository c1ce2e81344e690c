//! Output formatting module

pub mod human;
pub mod json;
pub mod reporter;
pub mod styles;

use std::path::Path;

use anyhow::Result;
use certpush_common::types::StoreStatus;
use console::Term;
use owo_colors::OwoColorize as _;
pub use styles::Styles;

use crate::domain::{CertpushConfig, HostEntry, HostSet, RunReport};
use human::HumanRenderer;
use json::JsonRenderer;

/// Output context carrying styling and terminal state.
pub struct OutputContext {
    /// Stylesheet for colored output.
    pub styles: Styles,
    /// Whether stdout is a TTY.
    pub is_tty: bool,
    /// Whether to suppress non-error output.
    pub quiet: bool,
}

impl OutputContext {
    /// Create output context based on CLI flags and environment.
    #[must_use]
    pub fn new(no_color: bool, quiet: bool) -> Self {
        let is_tty = Term::stdout().is_term();
        let use_colors = !no_color && is_tty && std::env::var("NO_COLOR").is_err();

        let mut styles = Styles::default();
        if use_colors {
            styles.colorize();
        }

        Self {
            styles,
            is_tty,
            quiet,
        }
    }

    /// Print a success message prefixed with `✓`. Suppressed when `quiet`.
    pub fn success(&self, msg: &str) {
        if !self.quiet {
            println!("  {} {msg}", "✓".style(self.styles.success));
        }
    }

    /// Print a warning message prefixed with `⚠`. Suppressed when `quiet`.
    pub fn warn(&self, msg: &str) {
        if !self.quiet {
            println!("  {} {msg}", "⚠".style(self.styles.warning));
        }
    }

    /// Print an error message prefixed with `✗` to stderr. Never suppressed.
    pub fn error(&self, msg: &str) {
        eprintln!("  {} {msg}", "✗".style(self.styles.error));
    }

    /// Print an info message prefixed with `ℹ`. Suppressed when `quiet`.
    pub fn info(&self, msg: &str) {
        if !self.quiet {
            println!("  {} {msg}", "ℹ".style(self.styles.info));
        }
    }

    /// Print a section header. Suppressed when `quiet`.
    pub fn header(&self, msg: &str) {
        if !self.quiet {
            println!("  {}", msg.style(self.styles.header));
        }
    }

    /// Print a key-value pair with the key dimmed. Suppressed when `quiet`.
    pub fn kv(&self, key: &str, value: &str) {
        if !self.quiet {
            println!("  {}  {value}", key.style(self.styles.dim));
        }
    }
}

/// Picks human or JSON rendering for a command's result.
pub enum Renderer<'a> {
    Human(HumanRenderer<'a>),
    Json(JsonRenderer),
}

impl Renderer<'_> {
    /// Render a deployment run summary.
    ///
    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub fn render_report(&self, report: &RunReport) -> Result<()> {
        match self {
            Self::Human(r) => {
                r.render_report(report);
                Ok(())
            }
            Self::Json(r) => r.render(report),
        }
    }

    /// Render a credential store snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub fn render_status(&self, status: &StoreStatus, store_path: &Path) -> Result<()> {
        match self {
            Self::Human(r) => {
                r.render_status(status, store_path);
                Ok(())
            }
            Self::Json(r) => r.render(status),
        }
    }

    /// Render the settings file contents.
    ///
    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub fn render_config(&self, config: &CertpushConfig, path: &Path) -> Result<()> {
        match self {
            Self::Human(r) => {
                r.render_config(config, path);
                Ok(())
            }
            Self::Json(r) => r.render(config),
        }
    }

    /// Render the outcome of `forget --host`.
    ///
    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub fn render_forgotten(&self, targets: &HostSet, forgotten: &[HostEntry]) -> Result<()> {
        match self {
            Self::Human(r) => {
                r.render_forgotten(targets, forgotten);
                Ok(())
            }
            Self::Json(r) => r.render(&serde_json::json!({ "forgotten": forgotten })),
        }
    }

    /// Render the outcome of `forget --all`.
    ///
    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub fn render_cleared(&self, entries_removed: usize) -> Result<()> {
        match self {
            Self::Human(r) => {
                r.render_cleared(entries_removed);
                Ok(())
            }
            Self::Json(r) => r.render(&serde_json::json!({ "entries_removed": entries_removed })),
        }
    }

    /// Render a settings change.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown or JSON serialization fails.
    pub fn render_config_set(&self, key: &str, config: &CertpushConfig) -> Result<()> {
        match self {
            Self::Human(r) => r.render_config_set(key, config),
            Self::Json(r) => r.render(config),
        }
    }

    /// Render the CLI version.
    ///
    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub fn render_version(&self, version: &str) -> Result<()> {
        match self {
            Self::Human(r) => {
                r.render_version(version);
                Ok(())
            }
            Self::Json(r) => r.render(&serde_json::json!({ "version": version })),
        }
    }
}
