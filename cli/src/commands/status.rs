//! `certpush status` — show what is remembered between runs.

use std::process::ExitCode;

use anyhow::Result;

use crate::app::AppContext;
use crate::application::services::credentials_service;

/// Run `certpush status`. Never prints secrets.
///
/// # Errors
///
/// Returns an error if the credential store cannot be read.
pub async fn run(app: &AppContext) -> Result<ExitCode> {
    let status = credentials_service::store_status(&app.store).await?;
    app.renderer().render_status(&status, app.store.path())?;
    Ok(ExitCode::SUCCESS)
}
