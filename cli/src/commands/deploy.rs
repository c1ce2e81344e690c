//! `certpush deploy` — push a certificate and private key to every host.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::Args;
use tracing::{debug, info, warn};

use crate::app::AppContext;
use crate::application::ports::ProgressReporter;
use crate::application::services::config_service;
use crate::application::services::orchestrator::{
    Cancellation, failed_hosts, resolve_run_config, run_deployment,
};
use crate::domain::{DeployError, RunInputs};
use crate::infra::fs::LocalFs;
use crate::infra::transport::HttpsTransport;

/// Arguments for the deploy command.
#[derive(Args, Debug, Default)]
pub struct DeployArgs {
    /// Appliance hosts, separated by commas or whitespace. Defaults to the remembered list.
    #[arg(long, env = "CERTPUSH_HOSTS", value_name = "HOSTS")]
    pub hosts: Option<String>,

    /// Admin user. Defaults to the remembered user.
    #[arg(long, env = "CERTPUSH_USER")]
    pub user: Option<String>,

    /// Admin password, needed whenever an API key must be generated
    #[arg(long, env = "CERTPUSH_PASS", hide_env_values = true)]
    pub password: Option<String>,

    /// PEM certificate file
    #[arg(long, env = "CERTPUSH_CERT", value_name = "PATH")]
    pub cert: Option<PathBuf>,

    /// PEM private key file
    #[arg(long, env = "CERTPUSH_KEY", value_name = "PATH")]
    pub key: Option<PathBuf>,

    /// Certificate object name on the appliance [default: certificate file stem]
    #[arg(long, value_name = "NAME")]
    pub cert_name: Option<String>,

    /// Passphrase protecting the private key
    #[arg(long, env = "CERTPUSH_KEY_PASSPHRASE", hide_env_values = true)]
    pub key_passphrase: Option<String>,

    /// ECC certificate: upload the private key before the certificate
    #[arg(long)]
    pub ecc: bool,

    /// Commit every pending change, not only this admin's
    #[arg(long)]
    pub force_commit: bool,

    /// Do not remember the password after this run
    #[arg(long)]
    pub no_save_password: bool,

    /// Keep stored API keys of hosts dropped from the host list
    #[arg(long)]
    pub keep_orphan_keys: bool,

    /// Exit with status 2 when any host fails
    #[arg(long)]
    pub strict: bool,
}

impl DeployArgs {
    /// Convert flags into run inputs; certificate and key paths are mandatory.
    ///
    /// # Errors
    ///
    /// Returns [`DeployError::ConfigMissing`] when `--cert` or `--key` is absent.
    pub fn to_inputs(&self) -> Result<RunInputs, DeployError> {
        let cert_path = self.cert.clone().ok_or(DeployError::ConfigMissing {
            what: "certificate",
            flag: "cert",
            env: "CERTPUSH_CERT",
        })?;
        let key_path = self.key.clone().ok_or(DeployError::ConfigMissing {
            what: "private key",
            flag: "key",
            env: "CERTPUSH_KEY",
        })?;
        Ok(RunInputs {
            hosts: self.hosts.clone(),
            user: self.user.clone(),
            password: self.password.clone(),
            cert_path,
            key_path,
            cert_name: self.cert_name.clone(),
            key_passphrase: self.key_passphrase.clone(),
            is_ecc_variant: self.ecc,
            force_commit: self.force_commit,
            save_password: self.no_save_password.then_some(false),
            delete_orphan_keys: self.keep_orphan_keys.then_some(false),
        })
    }
}

/// Exit status after a second Ctrl-C (128 + SIGINT).
const INTERRUPTED_EXIT: i32 = 130;

/// The first interrupt cancels between hosts. Returns `true` when a second
/// one arrives, so the caller can abort a host stuck in the transport.
async fn watch_interrupts<F, Fut>(cancel: &Cancellation, mut next_interrupt: F) -> bool
where
    F: FnMut() -> Fut,
    Fut: Future<Output = std::io::Result<()>>,
{
    if next_interrupt().await.is_err() {
        return false;
    }
    info!("interrupt received; stopping after the current host");
    eprintln!("Interrupted: finishing the current host. Press Ctrl-C again to abort now.");
    cancel.cancel();
    if next_interrupt().await.is_err() {
        return false;
    }
    warn!("second interrupt; aborting the run");
    true
}

/// Run `certpush deploy`.
///
/// # Errors
///
/// Returns an error when configuration cannot be resolved or the credential
/// store fails. Host failures are reported, not returned.
pub async fn run(app: &AppContext, args: &DeployArgs) -> Result<ExitCode> {
    let settings = config_service::load_config(&app.config_store)?;
    let inputs = args.to_inputs()?;
    let config = resolve_run_config(&inputs, &settings, &app.store, &LocalFs).await?;
    let transport = HttpsTransport::new(&settings.transport)?;
    let reporter = app.terminal_reporter();

    let cancel = Cancellation::new();
    let watcher = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if watch_interrupts(&cancel, tokio::signal::ctrl_c).await {
                std::process::exit(INTERRUPTED_EXIT);
            }
        })
    };

    if config.credentials_changed {
        reporter.warn("credentials changed since the last run; every API key will be regenerated");
    }
    let report = run_deployment(&config, &app.store, &transport, &reporter, &cancel).await;
    watcher.abort();
    let report = report?;

    app.renderer().render_report(&report)?;

    let failed = failed_hosts(&report);
    debug!(failed = failed.len(), skipped = report.skipped.len(), "deploy finished");
    if args.strict && (!failed.is_empty() || report.cancelled) {
        return Ok(ExitCode::from(2));
    }
    Ok(ExitCode::SUCCESS)
}
