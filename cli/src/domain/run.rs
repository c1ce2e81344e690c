//! Run inputs, remembered state, and the resolved immutable run configuration.

use std::path::PathBuf;

use crate::domain::artifact::ArtifactPair;
use crate::domain::config::CertpushConfig;
use crate::domain::credentials::{Credentials, credentials_changed};
use crate::domain::error::DeployError;
use crate::domain::hosts::HostSet;
use crate::domain::operation::CommitMode;

/// Raw operator input for one run. Absent values fall back to remembered state.
#[derive(Debug, Clone, Default)]
pub struct RunInputs {
    pub hosts: Option<String>,
    pub user: Option<String>,
    pub password: Option<String>,
    pub cert_path: PathBuf,
    pub key_path: PathBuf,
    pub cert_name: Option<String>,
    pub key_passphrase: Option<String>,
    pub is_ecc_variant: bool,
    pub force_commit: bool,
    /// `Some(false)` when disabled for this run; `None` uses the settings file.
    pub save_password: Option<bool>,
    /// `Some(false)` when disabled for this run; `None` uses the settings file.
    pub delete_orphan_keys: Option<bool>,
}

/// State persisted by a previous run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Remembered {
    pub hosts: HostSet,
    pub user: Option<String>,
    pub password: Option<String>,
}

/// Per-run policy flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunPolicy {
    pub save_password: bool,
    pub delete_orphan_keys: bool,
    pub is_ecc_variant: bool,
    pub commit_mode: CommitMode,
}

impl RunPolicy {
    /// Merge per-run overrides over the settings file.
    #[must_use]
    pub fn resolve(inputs: &RunInputs, settings: &CertpushConfig) -> Self {
        Self {
            save_password: inputs
                .save_password
                .unwrap_or(settings.policy.save_password),
            delete_orphan_keys: inputs
                .delete_orphan_keys
                .unwrap_or(settings.policy.delete_orphan_keys),
            is_ecc_variant: inputs.is_ecc_variant,
            commit_mode: if inputs.force_commit {
                CommitMode::Force
            } else {
                CommitMode::Scoped
            },
        }
    }
}

/// Everything a run needs, resolved once before any host is contacted.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub declared: HostSet,
    pub remembered: Remembered,
    pub credentials: Credentials,
    /// Forces key regeneration on every host.
    pub credentials_changed: bool,
    pub artifacts: ArtifactPair,
    pub key_passphrase: Option<String>,
    pub policy: RunPolicy,
}

/// Resolve the declared host set, falling back to the remembered one.
///
/// # Errors
///
/// Returns `ConfigMissing` when neither yields a host.
pub fn resolve_hosts(inputs: &RunInputs, remembered: &Remembered) -> Result<HostSet, DeployError> {
    let declared = inputs
        .hosts
        .as_deref()
        .map(HostSet::parse)
        .unwrap_or_default();
    if declared.is_empty() && remembered.hosts.is_empty() {
        return Err(DeployError::ConfigMissing {
            what: "host list",
            flag: "hosts",
            env: "CERTPUSH_HOSTS",
        });
    }
    Ok(declared)
}

/// Resolve credentials and whether they changed since the last run.
///
/// The password may legitimately be absent; whether that is fatal depends on
/// which hosts already hold a stored key.
///
/// # Errors
///
/// Returns `ConfigMissing` when no user is supplied or remembered.
pub fn resolve_credentials(
    inputs: &RunInputs,
    remembered: &Remembered,
) -> Result<(Credentials, bool), DeployError> {
    let supplied_user = inputs.user.as_deref().map(str::trim).filter(|u| !u.is_empty());
    let supplied_pass = inputs.password.as_deref().filter(|p| !p.is_empty());

    let user = supplied_user
        .map(str::to_owned)
        .or_else(|| remembered.user.clone())
        .ok_or(DeployError::ConfigMissing {
            what: "username",
            flag: "user",
            env: "CERTPUSH_USER",
        })?;
    let pass = supplied_pass
        .map(str::to_owned)
        .or_else(|| remembered.password.clone());

    let changed = credentials_changed(
        supplied_user,
        supplied_pass,
        remembered.user.as_deref(),
        remembered.password.as_deref(),
    );
    Ok((Credentials { user, pass }, changed))
}
