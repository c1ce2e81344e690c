//! Application service — inspect and forget remembered state.

use anyhow::Result;
use certpush_common::{
    HostKeyStatus, StoreStatus, api_key_entry, fingerprint_from_entry, keys,
};
use tracing::info;

use crate::application::ports::CredentialStore;
use crate::application::services::orchestrator::load_remembered;
use crate::domain::{HostEntry, HostSet};

/// Summarize the store without exposing secrets.
///
/// # Errors
///
/// Returns an error if the store cannot be read.
pub async fn store_status(store: &impl CredentialStore) -> Result<StoreStatus> {
    let remembered = load_remembered(store).await?;
    let names = store.entry_names().await?;
    let stored_fingerprints: Vec<&str> = names
        .iter()
        .filter_map(|n| fingerprint_from_entry(n))
        .collect();

    let hosts: Vec<HostKeyStatus> = remembered
        .hosts
        .iter()
        .map(|host| {
            let fingerprint = host.fingerprint();
            HostKeyStatus {
                host: host.to_string(),
                has_api_key: stored_fingerprints.contains(&fingerprint.as_str()),
                fingerprint,
            }
        })
        .collect();
    let orphan_keys = stored_fingerprints
        .iter()
        .filter(|fp| !hosts.iter().any(|h| h.fingerprint == **fp))
        .count();

    Ok(StoreStatus {
        hosts,
        user: remembered.user,
        password_saved: remembered.password.is_some(),
        orphan_keys,
    })
}

/// Delete the stored keys of `targets` and drop them from the remembered
/// host list. Returns the hosts that were remembered or held a key.
///
/// # Errors
///
/// Returns an error if the store cannot be read or written.
pub async fn forget_hosts(
    store: &impl CredentialStore,
    targets: &HostSet,
) -> Result<Vec<HostEntry>> {
    let remembered = load_remembered(store).await?;
    let mut forgotten = Vec::new();
    for host in targets {
        let entry = api_key_entry(&host.fingerprint());
        let had_key = store.load(&entry).await?.is_some();
        if had_key {
            store.delete(&entry).await?;
        }
        if had_key || remembered.hosts.contains(host) {
            info!(host = %host, "host forgotten");
            forgotten.push(host.clone());
        }
    }

    let remaining = remembered.hosts.difference(targets);
    if remaining != remembered.hosts {
        if remaining.is_empty() {
            store.delete(keys::HOSTS).await?;
        } else {
            store.save(keys::HOSTS, &remaining.to_persisted()).await?;
        }
    }
    Ok(forgotten)
}

/// Delete every stored entry. Returns the number of entries removed.
///
/// # Errors
///
/// Returns an error if the store cannot be read or written.
pub async fn forget_all(store: &impl CredentialStore) -> Result<usize> {
    let names = store.entry_names().await?;
    for name in &names {
        store.delete(name).await?;
    }
    info!(entries = names.len(), "credential store cleared");
    Ok(names.len())
}
