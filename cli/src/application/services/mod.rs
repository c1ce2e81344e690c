//! Application services — use-case orchestration.
//!
//! Each service module implements a single use-case by composing domain logic
//! with port trait calls. Services import only from `crate::domain` and
//! `crate::application::ports` — never from `crate::infra`, `crate::commands`,
//! or `crate::output`.

pub mod config_service;
pub mod credentials_service;
pub mod deploy_sequencer;
pub mod exchange;
pub mod key_lifecycle;
pub mod orchestrator;
