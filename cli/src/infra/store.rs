//! Infrastructure implementation of the `CredentialStore` port.
//!
//! `JsonCredentialStore` keeps every entry in one JSON file. Each operation
//! is a read-modify-write under a process-wide lock, run on the blocking pool,
//! finished with an atomic write (temp file + rename) at mode 0600.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::application::ports::CredentialStore;

/// On-disk layout of the store file.
#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    entries: BTreeMap<String, String>,
}

/// Credential store backed by `~/.certpush/store.json`.
#[derive(Clone)]
pub struct JsonCredentialStore {
    path: PathBuf,
    lock: Arc<Mutex<()>>,
}

impl JsonCredentialStore {
    /// Create a store at `CERTPUSH_STORE`, or `~/.certpush/store.json`.
    ///
    /// # Errors
    ///
    /// Returns an error if the home directory cannot be determined.
    pub fn new() -> Result<Self> {
        if let Ok(val) = std::env::var("CERTPUSH_STORE") {
            return Ok(Self::with_path(PathBuf::from(val)));
        }
        let home =
            dirs::home_dir().ok_or_else(|| anyhow::anyhow!("cannot determine home directory"))?;
        Ok(Self::with_path(home.join(".certpush").join("store.json")))
    }

    /// Create a store with an explicit path (used in tests).
    #[must_use]
    pub fn with_path(path: PathBuf) -> Self {
        Self {
            path,
            lock: Arc::new(Mutex::new(())),
        }
    }

    #[must_use]
    pub fn path(&self) -> &std::path::Path {
        &self.path
    }

    fn read_file(&self) -> Result<StoreFile> {
        if !self.path.exists() {
            return Ok(StoreFile::default());
        }
        let content = std::fs::read_to_string(&self.path)
            .with_context(|| format!("reading store file {}", self.path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("parsing store file {}", self.path.display()))
    }

    fn write_file(&self, file: &StoreFile) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating directory {}", parent.display()))?;
        }
        let content = serde_json::to_string_pretty(file).context("serializing store")?;

        let temp_path = self.path.with_extension("json.tmp");
        std::fs::write(&temp_path, &content)
            .with_context(|| format!("writing temp file {}", temp_path.display()))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&temp_path, std::fs::Permissions::from_mode(0o600))
                .with_context(|| format!("setting permissions on {}", temp_path.display()))?;
        }

        std::fs::rename(&temp_path, &self.path)
            .with_context(|| format!("finalizing store file {}", self.path.display()))?;
        Ok(())
    }

    /// Run `f` against the file contents under the lock; write back if it
    /// reports a change.
    fn with_file<T>(&self, f: impl FnOnce(&mut StoreFile) -> (T, bool)) -> Result<T> {
        let _guard = self
            .lock
            .lock()
            .map_err(|_| anyhow::anyhow!("credential store lock poisoned"))?;
        let mut file = self.read_file()?;
        let (value, changed) = f(&mut file);
        if changed {
            file.updated_at = Some(Utc::now());
            self.write_file(&file)?;
        }
        Ok(value)
    }

    async fn blocking<T, F>(&self, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&JsonCredentialStore) -> Result<T> + Send + 'static,
    {
        let store = self.clone();
        tokio::task::spawn_blocking(move || f(&store))
            .await
            .context("credential store task panicked")?
    }
}

impl CredentialStore for JsonCredentialStore {
    async fn load(&self, name: &str) -> Result<Option<String>> {
        let name = name.to_owned();
        self.blocking(move |s| s.with_file(|file| (file.entries.get(&name).cloned(), false)))
            .await
    }

    async fn save(&self, name: &str, value: &str) -> Result<()> {
        let name = name.to_owned();
        let value = value.to_owned();
        self.blocking(move |s| {
            s.with_file(|file| {
                let changed = file.entries.get(&name) != Some(&value);
                file.entries.insert(name, value);
                ((), changed)
            })
        })
        .await
    }

    async fn delete(&self, name: &str) -> Result<()> {
        let name = name.to_owned();
        self.blocking(move |s| s.with_file(|file| ((), file.entries.remove(&name).is_some())))
            .await
    }

    async fn entry_names(&self) -> Result<Vec<String>> {
        self.blocking(|s| s.with_file(|file| (file.entries.keys().cloned().collect(), false)))
            .await
    }
}
