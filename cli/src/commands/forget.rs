//! `certpush forget` — delete stored API keys and remembered state.

use std::process::ExitCode;

use anyhow::{Result, bail};
use clap::Args;

use crate::app::AppContext;
use crate::application::services::credentials_service;
use crate::domain::HostSet;

/// Arguments for the forget command.
#[derive(Args, Debug)]
pub struct ForgetArgs {
    /// Host whose stored API key should be deleted (repeatable)
    #[arg(long = "host", value_name = "HOST", conflicts_with = "all")]
    pub hosts: Vec<String>,

    /// Delete every stored entry, including the remembered user and password
    #[arg(long)]
    pub all: bool,
}

/// Run `certpush forget`.
///
/// # Errors
///
/// Returns an error if no target was given, the prompt fails, or the store
/// cannot be written.
pub async fn run(app: &AppContext, args: &ForgetArgs) -> Result<ExitCode> {
    if args.all {
        return forget_all(app).await;
    }

    let targets = HostSet::parse(&args.hosts.join(","));
    if targets.is_empty() {
        bail!("Nothing to forget. Pass --host <HOST> (repeatable) or --all.");
    }

    let forgotten = credentials_service::forget_hosts(&app.store, &targets).await?;
    app.renderer().render_forgotten(&targets, &forgotten)?;
    Ok(ExitCode::SUCCESS)
}

async fn forget_all(app: &AppContext) -> Result<ExitCode> {
    if !app.output.quiet && !app.is_json() {
        println!();
        println!("This will permanently remove:");
        println!("  • Every stored API key");
        println!("  • The remembered host list, user, and password");
        println!();
    }

    if !app.non_interactive && !app.confirm("Continue?", false)? {
        app.output.info("Cancelled.");
        return Ok(ExitCode::SUCCESS);
    }

    let removed = credentials_service::forget_all(&app.store).await?;
    app.renderer().render_cleared(removed)?;
    Ok(ExitCode::SUCCESS)
}
