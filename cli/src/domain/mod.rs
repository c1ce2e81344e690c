//! Domain layer — pure business logic, types, and validation.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, `std::process`, or `std::net`.
//! All functions are synchronous and take data in, returning data out.

pub mod artifact;
pub mod config;
pub mod credentials;
pub mod error;
pub mod hosts;
pub mod operation;
pub mod report;
pub mod response;
pub mod run;

pub use artifact::{ArtifactKind, ArtifactPair, DeploymentArtifact};
pub use config::{CertpushConfig, validate_config_key, validate_config_value};
pub use credentials::{ApiKey, Credentials, Validity};
pub use error::{ConfigError, DeployError, HostError};
pub use hosts::{HostEntry, HostSet, Reconciliation, normalize, reconcile};
pub use operation::{ApiRequest, CommitMode, OperationKind, RequestBody};
pub use report::{HostDeploymentResult, RunReport};
pub use response::{OperationOutcome, interpret};
pub use run::{Remembered, RunConfig, RunInputs, RunPolicy};
