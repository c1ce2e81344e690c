//! `status` and `forget` use-cases.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use certpush_cli::application::services::credentials_service::{
    forget_all, forget_hosts, store_status,
};
use certpush_cli::domain::HostSet;
use certpush_common::{api_key_entry, host_fingerprint, keys};

use crate::mocks::MemoryStore;

fn key_entry(host: &str) -> String {
    api_key_entry(&host_fingerprint(host))
}

fn populated() -> MemoryStore {
    MemoryStore::new()
        .with(keys::HOSTS, "fw1,fw2")
        .with(keys::USER, "admin")
        .with(keys::PASSWORD, "pw")
        .with(&key_entry("fw1"), "k1")
        .with(&key_entry("gone"), "kx")
}

#[tokio::test]
async fn status_reports_keys_without_secrets() {
    let status = store_status(&populated()).await.unwrap();

    assert_eq!(status.user.as_deref(), Some("admin"));
    assert!(status.password_saved);
    assert_eq!(status.hosts.len(), 2);
    assert!(status.hosts[0].has_api_key);
    assert!(!status.hosts[1].has_api_key);
    assert_eq!(status.orphan_keys, 1);

    let json = serde_json::to_string(&status).unwrap();
    assert!(!json.contains("k1") && !json.contains("\"pw\""), "got: {json}");
}

#[tokio::test]
async fn status_of_empty_store() {
    let status = store_status(&MemoryStore::new()).await.unwrap();
    assert!(status.hosts.is_empty());
    assert!(status.user.is_none());
    assert!(!status.password_saved);
}

#[tokio::test]
async fn forget_host_drops_key_and_list_entry() {
    let store = populated();

    let forgotten = forget_hosts(&store, &HostSet::parse("FW1, unknown"))
        .await
        .unwrap();

    assert_eq!(forgotten.len(), 1);
    assert_eq!(forgotten[0].to_string(), "fw1");
    assert!(store.get(&key_entry("fw1")).is_none());
    assert_eq!(store.get(keys::HOSTS).as_deref(), Some("fw2"));
    assert_eq!(store.get(keys::USER).as_deref(), Some("admin"));
}

#[tokio::test]
async fn forgetting_every_remembered_host_removes_the_list() {
    let store = populated();

    forget_hosts(&store, &HostSet::parse("fw1 fw2")).await.unwrap();

    assert!(store.get(keys::HOSTS).is_none());
}

#[tokio::test]
async fn forget_all_clears_everything() {
    let store = populated();

    let removed = forget_all(&store).await.unwrap();

    assert_eq!(removed, 5);
    assert!(store.names().is_empty());
}
