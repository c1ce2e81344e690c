//! Application service — per-host deployment sequence.
//!
//! key lifecycle → upload ×2 (order by key family) → commit, gated on both
//! uploads succeeding. Imports only from `crate::domain` and
//! `crate::application`.

use anyhow::{Result, ensure};
use tracing::{info, warn};

use crate::application::ports::{ApplianceTransport, CredentialStore, ProgressReporter};
use crate::application::services::exchange::execute;
use crate::application::services::key_lifecycle::{KeyOutcome, obtain_key};
use crate::domain::{
    ApiKey, ApiRequest, ArtifactPair, CommitMode, HostDeploymentResult, HostEntry, HostError,
    RunConfig,
};

/// What to upload and how to commit it, shared by every host in a run.
#[derive(Debug, Clone, Copy)]
pub struct DeployPlan<'a> {
    pub artifacts: &'a ArtifactPair,
    pub is_ecc_variant: bool,
    pub commit_mode: CommitMode,
    /// Acting admin; scopes a partial commit to this user's changes.
    pub user: &'a str,
    pub key_passphrase: Option<&'a str>,
}

impl<'a> DeployPlan<'a> {
    #[must_use]
    pub fn from_config(config: &'a RunConfig) -> Self {
        Self {
            artifacts: &config.artifacts,
            is_ecc_variant: config.policy.is_ecc_variant,
            commit_mode: config.policy.commit_mode,
            user: &config.credentials.user,
            key_passphrase: config.key_passphrase.as_deref(),
        }
    }
}

/// Obtain a key for `host`, then upload and commit.
///
/// # Errors
///
/// Returns an error only when the credential store fails.
pub async fn deploy_host(
    transport: &impl ApplianceTransport,
    store: &impl CredentialStore,
    reporter: &impl ProgressReporter,
    host: &HostEntry,
    config: &RunConfig,
) -> Result<HostDeploymentResult> {
    let outcome = obtain_key(
        transport,
        store,
        reporter,
        host,
        &config.credentials,
        config.credentials_changed,
    )
    .await?;

    match outcome {
        KeyOutcome::Ready { key, regenerated } => {
            let mut result =
                deploy(transport, reporter, host, &key, &DeployPlan::from_config(config)).await?;
            result.key_regenerated = regenerated;
            Ok(result)
        }
        KeyOutcome::Failed(err) => {
            reporter.warn(&err.to_string());
            let mut result = HostDeploymentResult::new(host.clone());
            result.errors.push(err);
            Ok(result)
        }
    }
}

/// Upload both artifacts and commit if neither upload failed.
///
/// Both uploads are always attempted. A rejected commit is not rolled back.
///
/// # Errors
///
/// Returns an error if `key` was not issued for `host`.
pub async fn deploy(
    transport: &impl ApplianceTransport,
    reporter: &impl ProgressReporter,
    host: &HostEntry,
    key: &ApiKey,
    plan: &DeployPlan<'_>,
) -> Result<HostDeploymentResult> {
    ensure!(
        key.belongs_to(host),
        "API key for fingerprint {} cannot be used on {host}",
        key.fingerprint()
    );

    let mut result = HostDeploymentResult::new(host.clone());
    result.key_obtained = true;

    for artifact in plan.artifacts.upload_order(plan.is_ecc_variant) {
        reporter.step(&format!(
            "{host}: uploading {} '{}'...",
            artifact.kind, artifact.logical_name
        ));
        let request = ApiRequest::upload(key, artifact, plan.key_passphrase);
        let outcome = execute(transport, host, &request).await;
        if outcome.success {
            info!(host = %host, kind = ?request.kind, "upload accepted");
        } else {
            let err = HostError::UploadFailed {
                host: host.to_string(),
                artifact: artifact.kind.to_string(),
                message: outcome.describe(),
            };
            reporter.warn(&err.to_string());
            result.upload_failure = true;
            result.errors.push(err);
        }
    }

    if result.upload_failure {
        let err = HostError::CommitSkipped {
            host: host.to_string(),
        };
        reporter.warn(&err.to_string());
        result.errors.push(err);
        return Ok(result);
    }

    if plan.commit_mode == CommitMode::Force {
        warn!(host = %host, "force commit: all pending changes on the appliance will be committed");
    }
    reporter.step(&format!("{host}: committing..."));
    let outcome = execute(
        transport,
        host,
        &ApiRequest::commit(key, plan.user, plan.commit_mode),
    )
    .await;
    if outcome.success {
        result.committed = true;
        info!(host = %host, mode = ?plan.commit_mode, "commit accepted");
    } else {
        let err = HostError::CommitFailed {
            host: host.to_string(),
            message: outcome.describe(),
        };
        reporter.warn(&err.to_string());
        result.errors.push(err);
    }

    Ok(result)
}
