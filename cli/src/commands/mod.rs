//! Command implementations

pub mod config;
pub mod deploy;
pub mod forget;
pub mod status;
pub mod version;
