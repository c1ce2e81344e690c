//! Typed domain error enums.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, `std::process`, or `std::net`.
//! All error types implement `thiserror::Error` and convert to `anyhow::Error`
//! via the `?` operator.

use serde::Serialize;
use thiserror::Error;

// ── Run errors ────────────────────────────────────────────────────────────────

/// Fatal errors that abort a run before any appliance is contacted.
#[derive(Debug, Error)]
pub enum DeployError {
    #[error(
        "No {what} configured. Pass --{flag} (or set {env}); nothing is remembered from a previous run."
    )]
    ConfigMissing {
        what: &'static str,
        flag: &'static str,
        env: &'static str,
    },

    #[error("Cannot read {what} file {path}: {reason}")]
    ArtifactUnreadable {
        what: &'static str,
        path: String,
        reason: String,
    },

    #[error("Invalid certificate name '{0}': must be 1-63 characters without whitespace or quotes")]
    InvalidCertificateName(String),
}

// ── Host errors ───────────────────────────────────────────────────────────────

/// Host-scoped failures. Collected per host; never abort the batch.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "code", rename_all = "snake_case")]
pub enum HostError {
    #[error(
        "{host}: API key must be regenerated but no password is available. Pass --password for this run."
    )]
    KeyMissingPassword { host: String },

    #[error("{host}: appliance unreachable ({detail})")]
    HostUnreachable { host: String, detail: String },

    #[error("{host}: appliance rejected the credentials: {message}")]
    AuthRejected { host: String, message: String },

    #[error("{host}: {artifact} upload failed: {message}")]
    UploadFailed {
        host: String,
        artifact: String,
        message: String,
    },

    #[error("{host}: commit skipped because an upload failed")]
    CommitSkipped { host: String },

    #[error(
        "{host}: commit failed: {message}. Uploaded objects remain staged on the appliance and were not rolled back."
    )]
    CommitFailed { host: String, message: String },
}

impl HostError {
    /// Stable machine-readable code, matching the serialized `code` tag.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::KeyMissingPassword { .. } => "key_missing_password",
            Self::HostUnreachable { .. } => "host_unreachable",
            Self::AuthRejected { .. } => "auth_rejected",
            Self::UploadFailed { .. } => "upload_failed",
            Self::CommitSkipped { .. } => "commit_skipped",
            Self::CommitFailed { .. } => "commit_failed",
        }
    }

    /// `CommitSkipped` is derived from an earlier failure, not a failure itself.
    #[must_use]
    pub fn is_derived(&self) -> bool {
        matches!(self, Self::CommitSkipped { .. })
    }
}

// ── Config errors ─────────────────────────────────────────────────────────────

/// Errors related to configuration key/value validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Unknown setting: {key}\n\nValid settings: {valid}")]
    UnknownKey { key: String, valid: String },

    #[error("Invalid value for {key}: {value}\n\nValid values: {valid}")]
    InvalidValue {
        key: String,
        value: String,
        valid: String,
    },
}
