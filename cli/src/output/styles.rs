//! Colours for deployment output.
//!
//! Every field starts as a plain `Style`; `OutputContext` calls
//! [`Styles::colorize`] only when stdout is a terminal and `--no-color` /
//! `NO_COLOR` are absent.

use owo_colors::Style;

#[derive(Default, Clone)]
pub struct Styles {
    /// Committed hosts and `✓` progress lines.
    pub success: Style,
    /// Skipped hosts, `!` progress lines, and the staged-upload warning.
    pub warning: Style,
    /// Hosts that failed before or during commit.
    pub error: Style,
    /// Orphan notices and `→` progress lines.
    pub info: Style,
    /// Appliance messages under a failed host, fingerprints.
    pub dim: Style,
    /// The run summary.
    pub bold: Style,
    /// Section titles ("Deployment summary", "Hosts:").
    pub header: Style,
}

impl Styles {
    pub fn colorize(&mut self) {
        self.success = Style::new().green();
        self.warning = Style::new().yellow();
        self.error = Style::new().red();
        self.info = Style::new().blue();
        self.dim = Style::new().dimmed();
        self.bold = Style::new().bold();
        self.header = Style::new().bold().cyan();
    }
}
