//! Credentials and per-host API keys.
//!
//! Secrets never appear in `Debug` output.

use std::fmt;

use crate::domain::hosts::HostEntry;

/// Appliance admin credentials. `pass` is absent when the save-password
/// policy discarded it and none was supplied this run.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub user: String,
    pub pass: Option<String>,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("user", &self.user)
            .field("pass", &self.pass.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Result of the last validity probe for a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Validity {
    Unknown,
    Valid,
    Invalid,
}

/// An API key bound to the host it was issued by.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey {
    host_fingerprint: String,
    secret: String,
    validity: Validity,
}

impl ApiKey {
    /// A key read back from the store; not yet probed.
    #[must_use]
    pub fn stored(host_fingerprint: String, secret: String) -> Self {
        Self {
            host_fingerprint,
            secret,
            validity: Validity::Unknown,
        }
    }

    /// A key freshly issued by a successful keygen exchange.
    #[must_use]
    pub fn issued(host_fingerprint: String, secret: String) -> Self {
        Self {
            host_fingerprint,
            secret,
            validity: Validity::Valid,
        }
    }

    #[must_use]
    pub fn secret(&self) -> &str {
        &self.secret
    }

    #[must_use]
    pub fn fingerprint(&self) -> &str {
        &self.host_fingerprint
    }

    #[must_use]
    pub fn validity(&self) -> Validity {
        self.validity
    }

    pub fn set_validity(&mut self, validity: Validity) {
        self.validity = validity;
    }

    /// Whether this key was issued for `host`.
    #[must_use]
    pub fn belongs_to(&self, host: &HostEntry) -> bool {
        self.host_fingerprint == host.fingerprint()
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiKey")
            .field("host_fingerprint", &self.host_fingerprint)
            .field("secret", &"<redacted>")
            .field("validity", &self.validity)
            .finish()
    }
}

/// Whether supplied credentials differ from the remembered ones.
///
/// A value counts as changed only when it was supplied this run and a
/// different value is remembered. With nothing remembered there is no basis
/// for comparison and the validity probe decides.
#[must_use]
pub fn credentials_changed(
    supplied_user: Option<&str>,
    supplied_pass: Option<&str>,
    remembered_user: Option<&str>,
    remembered_pass: Option<&str>,
) -> bool {
    fn differs(supplied: Option<&str>, remembered: Option<&str>) -> bool {
        matches!((supplied, remembered), (Some(s), Some(r)) if s != r)
    }
    differs(supplied_user, remembered_user) || differs(supplied_pass, remembered_pass)
}
