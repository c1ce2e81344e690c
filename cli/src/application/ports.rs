//! Port trait definitions for the Application layer.
//!
//! Ports are the interfaces (contracts) that infrastructure must fulfill.
//! This file imports only from `crate::domain` — never from `crate::infra`,
//! `crate::commands`, or `crate::output`.

use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::domain::{ApiRequest, CertpushConfig, HostEntry};

// ── Credential Store Port ─────────────────────────────────────────────────────

/// Durable named-entry persistence for hosts, credentials, and API keys.
///
/// Entries are overwritten wholesale; deleting a missing entry is not an error.
#[allow(async_fn_in_trait)]
pub trait CredentialStore {
    /// Load one entry, returning `None` if it does not exist.
    async fn load(&self, name: &str) -> Result<Option<String>>;
    /// Create or overwrite one entry.
    async fn save(&self, name: &str, value: &str) -> Result<()>;
    /// Remove one entry.
    async fn delete(&self, name: &str) -> Result<()>;
    /// Names of all stored entries, sorted.
    async fn entry_names(&self) -> Result<Vec<String>>;
}

// ── Transport Port ────────────────────────────────────────────────────────────

/// Sends one request to an appliance's management API.
///
/// Implementations must bound every call with a timeout.
#[allow(async_fn_in_trait)]
pub trait ApplianceTransport {
    /// Send `request` to `host` and return the raw response body.
    ///
    /// # Errors
    ///
    /// Returns an error only for transport-level failures (DNS, connect,
    /// TLS, timeout) where no response body was received.
    async fn send(&self, host: &HostEntry, request: &ApiRequest) -> Result<String>;
}

// ── Artifact Port ─────────────────────────────────────────────────────────────

/// Reads certificate and key files.
pub trait ArtifactReader {
    /// Read a file's bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is missing, unreadable, or empty.
    fn read_artifact(&self, path: &Path) -> Result<Vec<u8>>;
}

// ── Settings Port ─────────────────────────────────────────────────────────────

/// Abstracts settings persistence.
pub trait ConfigStore {
    /// Load settings, returning defaults when no file exists.
    fn load(&self) -> Result<CertpushConfig>;
    /// Persist settings.
    fn save(&self, config: &CertpushConfig) -> Result<()>;
    /// Location of the settings file.
    fn path(&self) -> Result<PathBuf>;
}

// ── Progress Reporting Port ───────────────────────────────────────────────────

/// Abstracts progress reporting so services can emit events without
/// depending on the Presentation layer. Sync trait — no async needed.
pub trait ProgressReporter {
    /// Emit an in-progress step message.
    fn step(&self, message: &str);
    /// Emit a success message.
    fn success(&self, message: &str);
    /// Emit a warning message.
    fn warn(&self, message: &str);
}
