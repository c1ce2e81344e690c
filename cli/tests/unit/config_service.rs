//! Settings use-cases over an in-memory settings store.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use certpush_cli::application::services::config_service::{load_config, set_value};
use certpush_cli::domain::CertpushConfig;

use crate::mocks::MemoryConfigStore;

#[test]
fn load_returns_defaults_for_an_empty_store() {
    let store = MemoryConfigStore::default();
    assert_eq!(load_config(&store).unwrap(), CertpushConfig::default());
}

#[test]
fn set_value_persists_the_updated_settings() {
    let store = MemoryConfigStore::default();

    let updated = set_value(&store, "transport.timeout_secs", "45").unwrap();

    assert_eq!(updated.transport.timeout_secs, 45);
    assert_eq!(store.current(), updated);
    assert_eq!(store.saves(), 1);
}

#[test]
fn invalid_value_writes_nothing() {
    let store = MemoryConfigStore::default();

    assert!(set_value(&store, "transport.timeout_secs", "0").is_err());
    assert!(set_value(&store, "policy.nope", "true").is_err());

    assert_eq!(store.saves(), 0);
    assert_eq!(store.current(), CertpushConfig::default());
}
