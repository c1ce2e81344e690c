//! Entry names used in the persisted credential store.

use sha2::{Digest, Sha256};

/// Scalar store entries.
pub mod keys {
    /// Remembered target host list
    /// Value: comma-separated, normalized (lowercase, sorted, deduplicated)
    pub const HOSTS: &str = "hosts";

    /// Appliance admin username
    pub const USER: &str = "user";

    /// Appliance admin password
    /// Absent when the save-password policy is disabled.
    pub const PASSWORD: &str = "password";

    /// Per-host API keys
    /// Format: api_key.{fingerprint}
    /// Value: the API key issued by the appliance's keygen call
    pub const API_KEY_PREFIX: &str = "api_key";
}

/// Length of a host fingerprint (hex-encoded SHA-256).
pub const FINGERPRINT_LEN: usize = 64;

/// Deterministic fingerprint of a normalized host address.
///
/// The caller is responsible for normalizing the address first; two
/// addresses that differ only by case produce different fingerprints here.
pub fn host_fingerprint(normalized_address: &str) -> String {
    let digest = Sha256::digest(normalized_address.as_bytes());
    digest.iter().map(|b| format!("{b:02x}")).collect()
}

/// Store entry holding the API key for the host with `fingerprint`.
pub fn api_key_entry(fingerprint: &str) -> String {
    format!("{}.{}", keys::API_KEY_PREFIX, fingerprint)
}

/// Inverse of [`api_key_entry`]. Returns `None` for any other entry name.
pub fn fingerprint_from_entry(entry: &str) -> Option<&str> {
    let fingerprint = entry
        .strip_prefix(keys::API_KEY_PREFIX)?
        .strip_prefix('.')?;
    validate_fingerprint(fingerprint).ok()?;
    Some(fingerprint)
}

/// Validate that a fingerprint is 64 lowercase hex characters.
/// Always call before building entry names from data read back from disk.
pub fn validate_fingerprint(fingerprint: &str) -> Result<(), &'static str> {
    if fingerprint.len() != FINGERPRINT_LEN {
        return Err("fingerprint must be exactly 64 characters");
    }
    if !fingerprint
        .chars()
        .all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase())
    {
        return Err("fingerprint must be lowercase hex [a-f0-9]");
    }
    Ok(())
}
