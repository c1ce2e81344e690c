//! Per-host and per-run deployment results.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::error::HostError;
use crate::domain::hosts::HostEntry;

/// What happened on one host this run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HostDeploymentResult {
    pub host: HostEntry,
    pub key_obtained: bool,
    /// The key was regenerated this run rather than reused.
    pub key_regenerated: bool,
    pub upload_failure: bool,
    pub committed: bool,
    pub errors: Vec<HostError>,
}

impl HostDeploymentResult {
    #[must_use]
    pub fn new(host: HostEntry) -> Self {
        Self {
            host,
            key_obtained: false,
            key_regenerated: false,
            upload_failure: false,
            committed: false,
            errors: Vec::new(),
        }
    }

    /// Keys, uploads and commit all succeeded.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.key_obtained && !self.upload_failure && self.committed
    }
}

/// Aggregate outcome of one `deploy` run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub started_at: DateTime<Utc>,
    pub hosts: Vec<HostDeploymentResult>,
    /// Hosts never attempted because the run was cancelled.
    pub skipped: Vec<HostEntry>,
    /// Orphan hosts whose stored API key was deleted.
    pub orphans_pruned: Vec<HostEntry>,
    /// Orphan hosts whose stored API key was kept by policy.
    pub orphans_retained: Vec<HostEntry>,
    /// The declared host list replaced the remembered one.
    pub hosts_persisted: bool,
    pub cancelled: bool,
}

impl RunReport {
    #[must_use]
    pub fn new(started_at: DateTime<Utc>) -> Self {
        Self {
            started_at,
            hosts: Vec::new(),
            skipped: Vec::new(),
            orphans_pruned: Vec::new(),
            orphans_retained: Vec::new(),
            hosts_persisted: false,
            cancelled: false,
        }
    }

    #[must_use]
    pub fn succeeded(&self) -> usize {
        self.hosts.iter().filter(|h| h.is_success()).count()
    }

    #[must_use]
    pub fn failed(&self) -> usize {
        self.hosts.len() - self.succeeded()
    }

    /// Every attempted host succeeded and none were skipped.
    #[must_use]
    pub fn all_succeeded(&self) -> bool {
        self.failed() == 0 && self.skipped.is_empty() && !self.cancelled
    }
}
