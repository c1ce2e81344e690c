//! End-to-end runs through the orchestrator with mocked ports.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::path::PathBuf;

use certpush_cli::application::services::orchestrator::{
    Cancellation, failed_hosts, resolve_run_config, run_deployment,
};
use certpush_cli::domain::{
    CertpushConfig, DeployError, HostEntry, OperationKind, RunConfig, RunInputs, RunReport,
};
use certpush_common::{api_key_entry, host_fingerprint, keys};

use crate::mocks::{
    BrokenStore, CollectingReporter, FakeFiles, MemoryStore, Reply, ScriptedTransport, error_body,
};

fn inputs(hosts: &str) -> RunInputs {
    RunInputs {
        hosts: Some(hosts.to_string()),
        user: Some("admin".into()),
        password: Some("pw".into()),
        cert_path: PathBuf::from("/certs/site.pem"),
        key_path: PathBuf::from("/certs/site.key"),
        ..RunInputs::default()
    }
}

fn key_entry(host: &str) -> String {
    api_key_entry(&host_fingerprint(host))
}

async fn resolve(inputs: &RunInputs, store: &MemoryStore) -> RunConfig {
    resolve_run_config(inputs, &CertpushConfig::default(), store, &FakeFiles::new())
        .await
        .unwrap()
}

async fn run(config: &RunConfig, store: &MemoryStore, transport: &ScriptedTransport) -> RunReport {
    run_deployment(
        config,
        store,
        transport,
        &CollectingReporter::default(),
        &Cancellation::new(),
    )
    .await
    .unwrap()
}

// ── Host set handling ────────────────────────────────────────────────────────

#[tokio::test]
async fn duplicate_hosts_collapse_and_each_gets_its_own_key() {
    let store = MemoryStore::new();
    let transport = ScriptedTransport::new();
    let config = resolve(
        &inputs("fw1.example.com, FW1.example.com , fw2.example.com"),
        &store,
    )
    .await;

    let report = run(&config, &store, &transport).await;

    let hosts: Vec<String> = report.hosts.iter().map(|h| h.host.to_string()).collect();
    assert_eq!(hosts, vec!["fw1.example.com", "fw2.example.com"]);
    assert!(report.all_succeeded());
    for host in ["fw1.example.com", "fw2.example.com"] {
        assert_eq!(transport.count(host, OperationKind::KeyGen), 1, "{host}");
        assert_eq!(
            store.get(&key_entry(host)),
            Some(format!("key-{host}")),
            "{host}"
        );
    }
    assert_eq!(
        store.get(keys::HOSTS).as_deref(),
        Some("fw1.example.com,fw2.example.com")
    );
    assert!(report.hosts_persisted);
}

#[tokio::test]
async fn hosts_are_processed_in_sorted_order() {
    let store = MemoryStore::new();
    let transport = ScriptedTransport::new();
    let config = resolve(&inputs("c.example, a.example b.example"), &store).await;

    run(&config, &store, &transport).await;

    let mut seen: Vec<String> = transport.calls().into_iter().map(|c| c.host).collect();
    seen.dedup();
    assert_eq!(seen, vec!["a.example", "b.example", "c.example"]);
}

#[tokio::test]
async fn no_declared_hosts_falls_back_to_remembered_without_rewriting() {
    let store = MemoryStore::new()
        .with(keys::HOSTS, "a.example,b.example")
        .with(&key_entry("a.example"), "ka")
        .with(&key_entry("b.example"), "kb");
    let transport = ScriptedTransport::new();
    let config = resolve(
        &RunInputs {
            hosts: None,
            ..inputs("")
        },
        &store,
    )
    .await;

    let report = run(&config, &store, &transport).await;

    assert_eq!(report.hosts.len(), 2);
    assert!(!report.hosts_persisted);
    assert_eq!(transport.count("a.example", OperationKind::KeyGen), 0);
}

#[tokio::test]
async fn orphan_keys_are_deleted_by_default() {
    let store = MemoryStore::new()
        .with(keys::HOSTS, "a,b,c")
        .with(&key_entry("a"), "ka")
        .with(&key_entry("b"), "kb")
        .with(&key_entry("c"), "kc");
    let transport = ScriptedTransport::new();
    let config = resolve(&inputs("b,c"), &store).await;

    let report = run(&config, &store, &transport).await;

    assert_eq!(report.orphans_pruned, vec![HostEntry::parse("a").unwrap()]);
    assert!(store.get(&key_entry("a")).is_none());
    assert_eq!(store.get(&key_entry("b")).as_deref(), Some("kb"));
    assert_eq!(store.get(keys::HOSTS).as_deref(), Some("b,c"));
    assert!(transport.kinds_for("a").is_empty(), "orphans are never contacted");
}

#[tokio::test]
async fn orphan_keys_survive_when_deletion_is_disabled() {
    let store = MemoryStore::new()
        .with(keys::HOSTS, "a,b,c")
        .with(&key_entry("a"), "ka");
    let transport = ScriptedTransport::new();
    let config = resolve(
        &RunInputs {
            delete_orphan_keys: Some(false),
            ..inputs("b,c")
        },
        &store,
    )
    .await;

    let report = run(&config, &store, &transport).await;

    assert!(report.orphans_pruned.is_empty());
    assert_eq!(report.orphans_retained, vec![HostEntry::parse("a").unwrap()]);
    assert_eq!(store.get(&key_entry("a")).as_deref(), Some("ka"));
    assert_eq!(store.get(keys::HOSTS).as_deref(), Some("b,c"));
}

// ── Credential persistence ───────────────────────────────────────────────────

#[tokio::test]
async fn save_password_false_leaves_no_password_but_keeps_keys() {
    let store = MemoryStore::new().with(keys::PASSWORD, "pw");
    let transport = ScriptedTransport::new();
    let config = resolve(
        &RunInputs {
            save_password: Some(false),
            ..inputs("fw1")
        },
        &store,
    )
    .await;

    let report = run(&config, &store, &transport).await;

    assert!(report.all_succeeded());
    assert!(store.get(keys::PASSWORD).is_none());
    assert_eq!(store.get(keys::USER).as_deref(), Some("admin"));
    assert!(store.get(&key_entry("fw1")).is_some());
}

#[tokio::test]
async fn password_is_remembered_by_default() {
    let store = MemoryStore::new();
    let config = resolve(&inputs("fw1"), &store).await;

    run(&config, &store, &ScriptedTransport::new()).await;

    assert_eq!(store.get(keys::PASSWORD).as_deref(), Some("pw"));
}

#[tokio::test]
async fn changed_password_regenerates_every_stored_key() {
    let store = MemoryStore::new()
        .with(keys::HOSTS, "fw1,fw2")
        .with(keys::USER, "admin")
        .with(keys::PASSWORD, "old")
        .with(&key_entry("fw1"), "k1")
        .with(&key_entry("fw2"), "k2");
    let transport = ScriptedTransport::new();
    let config = resolve(&inputs("fw1,fw2"), &store).await;
    assert!(config.credentials_changed);

    run(&config, &store, &transport).await;

    for host in ["fw1", "fw2"] {
        assert_eq!(transport.count(host, OperationKind::KeyTest), 0);
        assert_eq!(transport.count(host, OperationKind::KeyGen), 1);
    }
    assert_eq!(store.get(keys::PASSWORD).as_deref(), Some("pw"));
}

#[tokio::test]
async fn host_missed_by_a_password_change_regenerates_on_the_next_run() {
    let store = MemoryStore::new()
        .with(keys::HOSTS, "fw1,fw2")
        .with(keys::USER, "admin")
        .with(keys::PASSWORD, "old")
        .with(&key_entry("fw1"), "k1")
        .with(&key_entry("fw2"), "k2");

    let first = ScriptedTransport::new().on("fw2", OperationKind::KeyGen, Reply::Unreachable);
    let config = resolve(&inputs("fw1,fw2"), &store).await;
    assert!(config.credentials_changed);
    let report = run(&config, &store, &first).await;

    assert!(report.hosts[0].is_success());
    assert_eq!(report.hosts[1].errors[0].code(), "host_unreachable");
    assert_eq!(store.get(keys::PASSWORD).as_deref(), Some("pw"));
    assert!(store.get(&key_entry("fw2")).is_none(), "pre-rotation key must not survive");

    let second = ScriptedTransport::new();
    let config = resolve(&inputs("fw1,fw2"), &store).await;
    assert!(!config.credentials_changed);
    let report = run(&config, &store, &second).await;

    assert!(report.all_succeeded());
    assert_eq!(second.count("fw1", OperationKind::KeyGen), 0);
    assert_eq!(second.count("fw2", OperationKind::KeyTest), 0);
    assert_eq!(second.count("fw2", OperationKind::KeyGen), 1);
    assert_eq!(store.get(&key_entry("fw2")).as_deref(), Some("key-fw2"));
}

#[tokio::test]
async fn credentials_rejected_by_every_host_are_not_remembered() {
    let store = MemoryStore::new()
        .with(keys::HOSTS, "fw1,fw2")
        .with(keys::USER, "admin")
        .with(keys::PASSWORD, "old")
        .with(&key_entry("fw1"), "k1")
        .with(&key_entry("fw2"), "k2");
    let transport = ScriptedTransport::new()
        .on("fw1", OperationKind::KeyGen, Reply::Body(error_body("Invalid credential")))
        .on("fw2", OperationKind::KeyGen, Reply::Body(error_body("Invalid credential")));
    let reporter = CollectingReporter::default();
    let config = resolve(&inputs("fw1,fw2"), &store).await;

    let report = run_deployment(&config, &store, &transport, &reporter, &Cancellation::new())
        .await
        .unwrap();

    assert_eq!(report.failed(), 2);
    assert_eq!(store.get(keys::PASSWORD).as_deref(), Some("old"));
    assert_eq!(store.get(keys::USER).as_deref(), Some("admin"));
    assert!(
        reporter
            .warnings()
            .iter()
            .any(|w| w.contains("remembered ones were kept"))
    );
}

// ── Failure isolation ────────────────────────────────────────────────────────

#[tokio::test]
async fn one_unreachable_host_does_not_stop_the_batch() {
    let store = MemoryStore::new();
    let transport =
        ScriptedTransport::new().on("fw1", OperationKind::KeyGen, Reply::Unreachable);
    let config = resolve(&inputs("fw1,fw2"), &store).await;

    let report = run(&config, &store, &transport).await;

    assert_eq!(report.succeeded(), 1);
    assert_eq!(failed_hosts(&report), vec![&HostEntry::parse("fw1").unwrap()]);
    assert_eq!(report.hosts[0].errors[0].code(), "host_unreachable");
    assert_eq!(transport.kinds_for("fw1"), vec![OperationKind::KeyGen]);
    assert!(report.hosts[1].committed);
}

#[tokio::test]
async fn failed_upload_means_no_commit_for_that_host_only() {
    let store = MemoryStore::new();
    let transport = ScriptedTransport::new().on(
        "fw1",
        OperationKind::UploadKey,
        Reply::Body(error_body("bad key")),
    );
    let config = resolve(&inputs("fw1,fw2"), &store).await;

    let report = run(&config, &store, &transport).await;

    assert!(!report.hosts[0].committed);
    assert_eq!(transport.count("fw1", OperationKind::Commit), 0);
    assert!(report.hosts[1].committed);
}

#[tokio::test]
async fn missing_password_with_a_stored_key_proceeds() {
    let store = MemoryStore::new()
        .with(keys::HOSTS, "fw1,fw2")
        .with(keys::USER, "admin")
        .with(&key_entry("fw1"), "k1");
    let transport = ScriptedTransport::new();
    let config = resolve(
        &RunInputs {
            hosts: None,
            password: None,
            ..inputs("")
        },
        &store,
    )
    .await;

    let report = run(&config, &store, &transport).await;

    assert!(report.hosts[0].is_success());
    assert_eq!(report.hosts[1].errors[0].code(), "key_missing_password");
    assert!(transport.kinds_for("fw2").is_empty());
}

#[tokio::test]
async fn store_write_failure_is_fatal() {
    let transport = ScriptedTransport::new();
    let config = resolve(&inputs("fw1"), &MemoryStore::new()).await;

    let result = run_deployment(
        &config,
        &BrokenStore,
        &transport,
        &CollectingReporter::default(),
        &Cancellation::new(),
    )
    .await;

    assert!(result.is_err());
    assert_eq!(transport.kinds_for("fw1"), vec![OperationKind::KeyGen]);
}

// ── Cancellation ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn cancelled_run_skips_hosts_and_leaves_store_untouched() {
    let store = MemoryStore::new()
        .with(keys::HOSTS, "old")
        .with(keys::USER, "operator")
        .with(keys::PASSWORD, "old-pw")
        .with(&key_entry("old"), "k");
    let transport = ScriptedTransport::new();
    let config = resolve(&inputs("fw1,fw2"), &store).await;
    assert!(config.credentials_changed);
    let cancel = Cancellation::new();
    cancel.cancel();

    let report = run_deployment(
        &config,
        &store,
        &transport,
        &CollectingReporter::default(),
        &cancel,
    )
    .await
    .unwrap();

    assert!(report.cancelled);
    assert_eq!(report.skipped.len(), 2);
    assert!(transport.calls().is_empty());
    assert_eq!(store.get(keys::HOSTS).as_deref(), Some("old"));
    assert!(store.get(&key_entry("old")).is_some());
    assert_eq!(store.get(keys::USER).as_deref(), Some("operator"));
    assert_eq!(store.get(keys::PASSWORD).as_deref(), Some("old-pw"));
    assert!(!report.all_succeeded());
}

// ── Configuration resolution ─────────────────────────────────────────────────

#[tokio::test]
async fn no_hosts_anywhere_is_config_missing() {
    let err = resolve_run_config(
        &RunInputs {
            hosts: None,
            ..inputs("")
        },
        &CertpushConfig::default(),
        &MemoryStore::new(),
        &FakeFiles::new(),
    )
    .await
    .unwrap_err();

    assert!(matches!(
        err.downcast_ref::<DeployError>(),
        Some(DeployError::ConfigMissing { what: "host list", .. })
    ));
}

#[tokio::test]
async fn no_user_anywhere_is_config_missing() {
    let err = resolve_run_config(
        &RunInputs {
            user: None,
            ..inputs("fw1")
        },
        &CertpushConfig::default(),
        &MemoryStore::new(),
        &FakeFiles::new(),
    )
    .await
    .unwrap_err();

    assert!(matches!(
        err.downcast_ref::<DeployError>(),
        Some(DeployError::ConfigMissing { what: "username", .. })
    ));
}

#[tokio::test]
async fn no_password_and_no_stored_keys_is_config_missing() {
    let err = resolve_run_config(
        &RunInputs {
            password: None,
            ..inputs("fw1")
        },
        &CertpushConfig::default(),
        &MemoryStore::new(),
        &FakeFiles::new(),
    )
    .await
    .unwrap_err();

    assert!(matches!(
        err.downcast_ref::<DeployError>(),
        Some(DeployError::ConfigMissing {
            what: "password",
            ..
        })
    ));
}

#[tokio::test]
async fn unreadable_key_file_is_reported_before_any_host() {
    let err = resolve_run_config(
        &inputs("fw1"),
        &CertpushConfig::default(),
        &MemoryStore::new(),
        &FakeFiles::without("/certs/site.key"),
    )
    .await
    .unwrap_err();

    let msg = err.to_string();
    assert!(msg.contains("private key") && msg.contains("/certs/site.key"), "got: {msg}");
}

#[tokio::test]
async fn certificate_name_defaults_to_file_stem() {
    let config = resolve(&inputs("fw1"), &MemoryStore::new()).await;
    assert_eq!(config.artifacts.certificate.logical_name, "site");
    assert_eq!(config.artifacts.private_key.file_name, "site.key");
}

#[tokio::test]
async fn settings_policy_applies_when_no_flag_overrides_it() {
    let mut settings = CertpushConfig::default();
    settings.policy.save_password = false;

    let config = resolve_run_config(
        &inputs("fw1"),
        &settings,
        &MemoryStore::new(),
        &FakeFiles::new(),
    )
    .await
    .unwrap();

    assert!(!config.policy.save_password);
    assert!(config.policy.delete_orphan_keys);
}
