pub mod store_keys;
pub mod types;

pub use store_keys::{api_key_entry, fingerprint_from_entry, host_fingerprint, keys, validate_fingerprint};
pub use types::*;
