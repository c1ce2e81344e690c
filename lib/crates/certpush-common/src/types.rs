use serde::{Deserialize, Serialize};

/// Stored key presence for one remembered host.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HostKeyStatus {
    pub host: String,
    pub fingerprint: String,
    pub has_api_key: bool,
}

/// Snapshot of the credential store, without secrets.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct StoreStatus {
    pub hosts: Vec<HostKeyStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    pub password_saved: bool,
    /// API keys whose fingerprint matches no remembered host.
    pub orphan_keys: usize,
}
