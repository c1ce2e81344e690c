//! Application service — deployment run orchestration.
//!
//! Resolves the run configuration once and walks the effective host set in
//! sorted order. Credentials, the host list, and orphan pruning are written
//! only after every host has been processed.

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::Result;
use certpush_common::{api_key_entry, keys};
use chrono::Utc;
use tracing::{info, warn};

use crate::application::ports::{
    ApplianceTransport, ArtifactReader, CredentialStore, ProgressReporter,
};
use crate::application::services::deploy_sequencer::deploy_host;
use crate::domain::artifact::{default_certificate_name, validate_certificate_name};
use crate::domain::run::{resolve_credentials, resolve_hosts};
use crate::domain::{
    ArtifactKind, ArtifactPair, CertpushConfig, DeployError, DeploymentArtifact, HostEntry,
    HostSet, Reconciliation, Remembered, RunConfig, RunInputs, RunPolicy, RunReport, reconcile,
};

/// Cooperative cancellation checked between hosts.
#[derive(Debug, Clone, Default)]
pub struct Cancellation(Arc<AtomicBool>);

impl Cancellation {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Load the state remembered from previous runs.
///
/// # Errors
///
/// Returns an error if the store cannot be read.
pub async fn load_remembered(store: &impl CredentialStore) -> Result<Remembered> {
    Ok(Remembered {
        hosts: store
            .load(keys::HOSTS)
            .await?
            .map(|h| HostSet::parse(&h))
            .unwrap_or_default(),
        user: store.load(keys::USER).await?,
        password: store.load(keys::PASSWORD).await?,
    })
}

/// Resolve operator input, settings, and remembered state into a `RunConfig`.
///
/// Runs before any appliance is contacted. A missing password is only fatal
/// when no effective host holds a stored key that could make it unnecessary.
///
/// # Errors
///
/// Returns [`DeployError`] for missing hosts, user, or password, and for
/// unreadable artifacts; store errors are propagated.
pub async fn resolve_run_config(
    inputs: &RunInputs,
    settings: &CertpushConfig,
    store: &impl CredentialStore,
    reader: &impl ArtifactReader,
) -> Result<RunConfig> {
    let remembered = load_remembered(store).await?;
    let declared = resolve_hosts(inputs, &remembered)?;
    let (credentials, credentials_changed) = resolve_credentials(inputs, &remembered)?;

    if credentials.pass.is_none() {
        let effective = reconcile(&remembered.hosts, &declared).effective;
        let mut any_key = false;
        for host in &effective {
            if store.load(&api_key_entry(&host.fingerprint())).await?.is_some() {
                any_key = true;
                break;
            }
        }
        if !any_key {
            return Err(DeployError::ConfigMissing {
                what: "password",
                flag: "password",
                env: "CERTPUSH_PASS",
            }
            .into());
        }
    }

    let artifacts = read_artifacts(inputs, reader)?;

    Ok(RunConfig {
        declared,
        remembered,
        credentials,
        credentials_changed,
        artifacts,
        key_passphrase: inputs.key_passphrase.clone().filter(|p| !p.is_empty()),
        policy: RunPolicy::resolve(inputs, settings),
    })
}

fn read_artifacts(
    inputs: &RunInputs,
    reader: &impl ArtifactReader,
) -> std::result::Result<ArtifactPair, DeployError> {
    let logical_name = match &inputs.cert_name {
        Some(name) => name.trim().to_string(),
        None => default_certificate_name(&inputs.cert_path).unwrap_or_default(),
    };
    validate_certificate_name(&logical_name)?;

    let read = |kind: ArtifactKind, path: &Path| -> std::result::Result<DeploymentArtifact, DeployError> {
        let what = match kind {
            ArtifactKind::Certificate => "certificate",
            ArtifactKind::PrivateKey => "private key",
        };
        let payload = reader
            .read_artifact(path)
            .map_err(|e| DeployError::ArtifactUnreadable {
                what,
                path: path.display().to_string(),
                reason: format!("{e:#}"),
            })?;
        let file_name = path
            .file_name()
            .map_or_else(|| format!("{what}.pem"), |n| n.to_string_lossy().into_owned());
        Ok(DeploymentArtifact {
            kind,
            logical_name: logical_name.clone(),
            file_name,
            payload,
        })
    };

    Ok(ArtifactPair {
        certificate: read(ArtifactKind::Certificate, &inputs.cert_path)?,
        private_key: read(ArtifactKind::PrivateKey, &inputs.key_path)?,
    })
}

/// Deploy to every effective host and report per-host results.
///
/// Host failures never stop the loop. Cancellation skips the remaining
/// hosts and every post-loop write (credentials, host list, orphan
/// pruning), so the next run sees the same change again.
///
/// # Errors
///
/// Returns an error only when the credential store fails.
pub async fn run_deployment(
    config: &RunConfig,
    store: &impl CredentialStore,
    transport: &impl ApplianceTransport,
    reporter: &impl ProgressReporter,
    cancel: &Cancellation,
) -> Result<RunReport> {
    let mut report = RunReport::new(Utc::now());
    let reconciliation = reconcile(&config.remembered.hosts, &config.declared);
    info!(
        hosts = reconciliation.effective.len(),
        changed = reconciliation.changed,
        orphans = reconciliation.orphans.len(),
        "host set reconciled"
    );

    for host in &reconciliation.effective {
        if cancel.is_cancelled() {
            report.skipped.push(host.clone());
            continue;
        }
        let result = deploy_host(transport, store, reporter, host, config).await?;
        if result.is_success() {
            reporter.success(&format!("{host}: certificate deployed and committed"));
        }
        report.hosts.push(result);
    }

    if cancel.is_cancelled() {
        report.cancelled = true;
        warn!(skipped = report.skipped.len(), "run cancelled; host list and orphan keys left untouched");
        reporter.warn("cancelled: remaining hosts skipped; partially deployed hosts are not rolled back");
        return Ok(report);
    }

    persist_credentials(store, config, &report, reporter).await?;

    if reconciliation.changed {
        store
            .save(keys::HOSTS, &reconciliation.effective.to_persisted())
            .await?;
        report.hosts_persisted = true;
        prune_orphans(store, &reconciliation, config.policy.delete_orphan_keys, &mut report).await?;
    }

    Ok(report)
}

/// Remember the user and, by policy, the password.
///
/// Changed credentials are only remembered once at least one host issued a
/// key for them; otherwise the previous ones are kept.
async fn persist_credentials(
    store: &impl CredentialStore,
    config: &RunConfig,
    report: &RunReport,
    reporter: &impl ProgressReporter,
) -> Result<()> {
    let creds = &config.credentials;
    let confirmed = report.hosts.iter().any(|h| h.key_regenerated);
    if config.credentials_changed && !confirmed {
        warn!("no host accepted the new credentials; remembered credentials kept");
        reporter.warn("no host accepted the new credentials; the remembered ones were kept");
        if !config.policy.save_password {
            store.delete(keys::PASSWORD).await?;
        }
        return Ok(());
    }
    if config.remembered.user.as_deref() != Some(creds.user.as_str()) {
        store.save(keys::USER, &creds.user).await?;
    }
    if config.policy.save_password {
        if let Some(pass) = creds.pass.as_deref() {
            if config.remembered.password.as_deref() != Some(pass) {
                store.save(keys::PASSWORD, pass).await?;
            }
        }
    } else {
        store.delete(keys::PASSWORD).await?;
    }
    Ok(())
}

async fn prune_orphans(
    store: &impl CredentialStore,
    reconciliation: &Reconciliation,
    delete_orphan_keys: bool,
    report: &mut RunReport,
) -> Result<()> {
    for orphan in &reconciliation.orphans {
        if delete_orphan_keys {
            store.delete(&api_key_entry(&orphan.fingerprint())).await?;
            info!(host = %orphan, "orphan API key deleted");
            report.orphans_pruned.push(orphan.clone());
        } else {
            report.orphans_retained.push(orphan.clone());
        }
    }
    Ok(())
}

/// Hosts from `report` that did not fully succeed.
#[must_use]
pub fn failed_hosts(report: &RunReport) -> Vec<&HostEntry> {
    report
        .hosts
        .iter()
        .filter(|h| !h.is_success())
        .map(|h| &h.host)
        .collect()
}
