//! Domain types and validators for certpush settings.
//!
//! Pure functions only — no I/O, no async, no filesystem access.

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::domain::error::ConfigError;

// ── Constants ────────────────────────────────────────────────────────────────

pub const VALID_CONFIG_KEYS: &[&str] = &[
    "policy.save_password",
    "policy.delete_orphan_keys",
    "transport.timeout_secs",
    "transport.insecure",
];
pub const VALID_BOOLS: &[&str] = &["true", "false"];
pub const MAX_TIMEOUT_SECS: u64 = 600;

// ── Config schema ────────────────────────────────────────────────────────────

/// Top-level settings stored in `~/.certpush/config.yaml`.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct CertpushConfig {
    /// Credential persistence policy.
    pub policy: PolicyConfig,
    /// Appliance connection settings.
    pub transport: TransportConfig,
}

/// Credential persistence policy.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PolicyConfig {
    /// Remember the admin password between runs.
    pub save_password: bool,
    /// Delete stored API keys of hosts dropped from the host list.
    pub delete_orphan_keys: bool,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            save_password: true,
            delete_orphan_keys: true,
        }
    }
}

/// Appliance connection settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct TransportConfig {
    /// Per-request timeout.
    pub timeout_secs: u64,
    /// Accept self-signed appliance management certificates.
    pub insecure: bool,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            insecure: false,
        }
    }
}

impl CertpushConfig {
    /// Current value of a whitelisted key, as text.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is not in the allowed list.
    pub fn get(&self, key: &str) -> Result<String> {
        validate_config_key(key)?;
        Ok(match key {
            "policy.save_password" => self.policy.save_password.to_string(),
            "policy.delete_orphan_keys" => self.policy.delete_orphan_keys.to_string(),
            "transport.timeout_secs" => self.transport.timeout_secs.to_string(),
            _ => self.transport.insecure.to_string(),
        })
    }

    /// Validate and apply one setting.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown or the value is invalid for it.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        validate_config_key(key)?;
        validate_config_value(key, value)?;
        match key {
            "policy.save_password" => self.policy.save_password = value == "true",
            "policy.delete_orphan_keys" => self.policy.delete_orphan_keys = value == "true",
            "transport.timeout_secs" => self.transport.timeout_secs = value.parse()?,
            _ => self.transport.insecure = value == "true",
        }
        Ok(())
    }
}

// ── Validators ───────────────────────────────────────────────────────────────

/// Validates a configuration key against the whitelist.
///
/// # Errors
///
/// Returns an error if the key is not in the allowed list.
pub fn validate_config_key(key: &str) -> Result<()> {
    if !VALID_CONFIG_KEYS.contains(&key) {
        return Err(ConfigError::UnknownKey {
            key: key.to_string(),
            valid: VALID_CONFIG_KEYS.join(", "),
        }
        .into());
    }
    Ok(())
}

/// Validates a configuration value for the given key.
///
/// # Errors
///
/// Returns an error if the value is not valid for the key.
pub fn validate_config_value(key: &str, value: &str) -> Result<()> {
    let valid = if key == "transport.timeout_secs" {
        value
            .parse::<u64>()
            .is_ok_and(|secs| (1..=MAX_TIMEOUT_SECS).contains(&secs))
    } else {
        VALID_BOOLS.contains(&value)
    };
    if !valid {
        let valid = if key == "transport.timeout_secs" {
            format!("1-{MAX_TIMEOUT_SECS}")
        } else {
            VALID_BOOLS.join(", ")
        };
        return Err(ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
            valid,
        }
        .into());
    }
    Ok(())
}

// ── Unit tests ───────────────────────────────────────────────────────────────
