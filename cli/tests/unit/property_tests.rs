//! Property-based tests for host-set normalization and reconciliation.
//!
//! Uses `proptest` to verify invariants across many random inputs.

#![allow(clippy::expect_used)]

use proptest::prelude::*;

use certpush_cli::domain::config::{validate_config_key, validate_config_value};
use certpush_cli::domain::{HostSet, normalize, reconcile};

fn host() -> impl Strategy<Value = String> {
    "[a-zA-Z][a-zA-Z0-9-]{0,10}(\\.[a-zA-Z]{2,5}){0,2}"
}

fn separator() -> impl Strategy<Value = &'static str> {
    prop_oneof![Just(","), Just(", "), Just(" ,"), Just("  "), Just("\n"), Just(",,")]
}

fn host_list() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(host(), 0..8)
}

fn join(hosts: &[String], sep: &str) -> String {
    hosts.join(sep)
}

// ============================================================================
// normalize()
// ============================================================================

proptest! {
    /// Normalizing twice is the same as normalizing once.
    #[test]
    fn prop_normalize_is_idempotent(hosts in host_list(), sep in separator()) {
        let once = normalize(&join(&hosts, sep));
        prop_assert_eq!(normalize(&once), once);
    }

    /// Order, case, separators, and duplicates do not matter.
    #[test]
    fn prop_normalize_is_order_and_case_insensitive(
        hosts in host_list(),
        sep in separator(),
        rotate in 0usize..8,
    ) {
        let mut shuffled: Vec<String> = hosts.iter().map(|h| h.to_uppercase()).collect();
        if !shuffled.is_empty() {
            let by = rotate % shuffled.len();
            shuffled.rotate_left(by);
            shuffled.push(shuffled[0].clone());
        }
        prop_assert_eq!(normalize(&join(&hosts, ",")), normalize(&join(&shuffled, sep)));
    }

    /// The persisted form is sorted, lowercase, and free of blanks and duplicates.
    #[test]
    fn prop_normalized_form_is_canonical(hosts in host_list(), sep in separator()) {
        let normalized = normalize(&join(&hosts, sep));
        if normalized.is_empty() {
            prop_assert!(hosts.is_empty());
        } else {
            let parts: Vec<&str> = normalized.split(',').collect();
            let mut sorted = parts.clone();
            sorted.sort_unstable();
            sorted.dedup();
            prop_assert_eq!(&parts, &sorted);
            prop_assert!(parts.iter().all(|p| !p.is_empty() && *p == p.to_lowercase()));
        }
    }
}

// ============================================================================
// reconcile()
// ============================================================================

proptest! {
    /// Orphans are exactly the remembered hosts that were not declared.
    #[test]
    fn prop_orphans_are_remembered_minus_declared(
        remembered in host_list(),
        declared in host_list(),
    ) {
        let remembered = HostSet::parse(&remembered.join(","));
        let declared = HostSet::parse(&declared.join(","));
        let r = reconcile(&remembered, &declared);

        if declared.is_empty() {
            prop_assert_eq!(&r.effective, &remembered);
            prop_assert!(r.orphans.is_empty());
            prop_assert!(!r.changed);
        } else {
            prop_assert_eq!(&r.effective, &declared);
            prop_assert_eq!(r.changed, declared != remembered);
            for host in &r.orphans {
                prop_assert!(remembered.contains(host) && !declared.contains(host));
            }
            for host in &remembered {
                prop_assert_eq!(r.orphans.contains(host), !declared.contains(host));
            }
        }
    }
}

// ============================================================================
// validate_config_key() and validate_config_value()
// ============================================================================

proptest! {
    /// Keys outside the whitelist are rejected.
    #[test]
    fn prop_arbitrary_keys_rejected(key in "[a-z]{1,12}\\.[a-z_]{1,20}") {
        let known = [
            "policy.save_password",
            "policy.delete_orphan_keys",
            "transport.timeout_secs",
            "transport.insecure",
        ];
        if !known.contains(&key.as_str()) {
            prop_assert!(validate_config_key(&key).is_err(), "accepted invalid key: {key}");
        }
    }

    /// Timeouts within range are accepted, everything above is rejected.
    #[test]
    fn prop_timeout_range(secs in 0u64..2000) {
        let ok = validate_config_value("transport.timeout_secs", &secs.to_string()).is_ok();
        prop_assert_eq!(ok, (1..=600).contains(&secs));
    }
}
