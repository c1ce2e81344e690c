//! Application service — per-host API key lifecycle.
//!
//! ```text
//! NoKey ──► Regenerating ──► {Valid, Failed}
//! Stored ──► Testing ──► Valid
//!                    └─► Invalid ──► Regenerating ──► {Valid, Failed}
//! ```
//!
//! A changed user or password skips the probe and goes straight to
//! regeneration. A stored key that fails its probe is dropped from memory
//! only; the store entry is overwritten once regeneration succeeds.
//! A key issued under the previous credentials is deleted when its
//! replacement cannot be obtained, so a later run regenerates it instead of
//! probing it back into use.

use anyhow::Result;
use certpush_common::api_key_entry;
use tracing::{debug, info, warn};

use crate::application::ports::{ApplianceTransport, CredentialStore, ProgressReporter};
use crate::application::services::exchange::execute;
use crate::domain::{ApiKey, ApiRequest, Credentials, HostEntry, HostError, Validity};

/// Lifecycle position of a host's key within one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyState {
    NoKey,
    Testing,
    Valid,
    Invalid,
    Regenerating,
    Failed,
}

/// Terminal result of the lifecycle for one host.
#[derive(Debug)]
pub enum KeyOutcome {
    /// Proceed to uploads with this key.
    Ready { key: ApiKey, regenerated: bool },
    /// Skip the host.
    Failed(HostError),
}

/// Probe a key with a lightweight authenticated call.
///
/// Any non-success, including no response at all, is `Invalid`.
pub async fn probe(transport: &impl ApplianceTransport, host: &HostEntry, key: &ApiKey) -> Validity {
    let outcome = execute(transport, host, &ApiRequest::key_test(key)).await;
    if outcome.success {
        Validity::Valid
    } else {
        debug!(host = %host, reason = %outcome.describe(), "stored API key rejected");
        Validity::Invalid
    }
}

/// Exchange credentials for a new key. Does not persist it.
///
/// # Errors
///
/// - `KeyMissingPassword` when no password is available.
/// - `HostUnreachable` when the appliance did not respond.
/// - `AuthRejected` when it responded without issuing a key.
pub async fn regenerate(
    transport: &impl ApplianceTransport,
    host: &HostEntry,
    credentials: &Credentials,
) -> std::result::Result<ApiKey, HostError> {
    let Some(pass) = credentials.pass.as_deref() else {
        return Err(HostError::KeyMissingPassword {
            host: host.to_string(),
        });
    };
    let outcome = execute(transport, host, &ApiRequest::key_gen(&credentials.user, pass)).await;
    match outcome.extracted_key {
        Some(secret) if outcome.success => Ok(ApiKey::issued(host.fingerprint(), secret)),
        _ if outcome.reachable => Err(HostError::AuthRejected {
            host: host.to_string(),
            message: outcome.describe(),
        }),
        _ => Err(HostError::HostUnreachable {
            host: host.to_string(),
            detail: outcome.describe(),
        }),
    }
}

/// Run the lifecycle for one host and persist a regenerated key.
///
/// # Errors
///
/// Returns an error only when the credential store fails. Appliance-side
/// failures are reported as [`KeyOutcome::Failed`].
pub async fn obtain_key(
    transport: &impl ApplianceTransport,
    store: &impl CredentialStore,
    reporter: &impl ProgressReporter,
    host: &HostEntry,
    credentials: &Credentials,
    credentials_changed: bool,
) -> Result<KeyOutcome> {
    let fingerprint = host.fingerprint();
    let entry = api_key_entry(&fingerprint);
    let mut current = store
        .load(&entry)
        .await?
        .map(|secret| ApiKey::stored(fingerprint.clone(), secret));

    let mut state = if current.is_some() {
        KeyState::Testing
    } else {
        KeyState::NoKey
    };

    let superseded = credentials_changed && current.is_some();
    if superseded {
        info!(host = %host, "credentials changed; regenerating API key");
        current = None;
        state = transition(host, state, KeyState::Regenerating);
    }

    if let Some(mut key) = current.take() {
        reporter.step(&format!("{host}: testing stored API key..."));
        let validity = probe(transport, host, &key).await;
        key.set_validity(validity);
        if validity == Validity::Valid {
            transition(host, state, KeyState::Valid);
            return Ok(KeyOutcome::Ready {
                key,
                regenerated: false,
            });
        }
        state = transition(host, state, KeyState::Invalid);
    }

    state = transition(host, state, KeyState::Regenerating);
    reporter.step(&format!("{host}: generating API key..."));
    match regenerate(transport, host, credentials).await {
        Ok(key) => {
            store.save(&entry, key.secret()).await?;
            transition(host, state, KeyState::Valid);
            info!(host = %host, fingerprint = %fingerprint, "API key regenerated and stored");
            Ok(KeyOutcome::Ready {
                key,
                regenerated: true,
            })
        }
        Err(err) => {
            transition(host, state, KeyState::Failed);
            warn!(host = %host, code = err.code(), "API key unavailable");
            if superseded {
                store.delete(&entry).await?;
                info!(host = %host, fingerprint = %fingerprint, "superseded API key deleted");
            }
            Ok(KeyOutcome::Failed(err))
        }
    }
}

fn transition(host: &HostEntry, from: KeyState, to: KeyState) -> KeyState {
    if from != to {
        debug!(host = %host, ?from, ?to, "key state");
    }
    to
}
