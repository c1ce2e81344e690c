//! Application service — settings use-cases.

use anyhow::Result;

use crate::application::ports::ConfigStore;
use crate::domain::config::CertpushConfig;

/// Load settings.
pub fn load_config(store: &impl ConfigStore) -> Result<CertpushConfig> {
    store.load()
}

/// Validate, apply, and persist one setting. Returns the updated settings.
///
/// Nothing is written when validation fails.
pub fn set_value(store: &impl ConfigStore, key: &str, value: &str) -> Result<CertpushConfig> {
    let mut config = store.load()?;
    config.set(key, value)?;
    store.save(&config)?;
    Ok(config)
}
