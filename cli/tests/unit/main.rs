//! Unit tests for the certpush CLI
//!
//! These tests drive the application services through mocked ports and run
//! fast without network or filesystem I/O.

mod architecture;
mod config_service;
mod credentials_service;
mod orchestrator;
mod property_tests;
