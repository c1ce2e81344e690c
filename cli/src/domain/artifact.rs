//! Certificate and private-key artifacts.
//!
//! Payloads are opaque bytes; nothing here parses PEM.

use std::fmt;

use crate::domain::error::DeployError;

/// Maximum certificate object name accepted by the appliance.
pub const MAX_CERTIFICATE_NAME_LEN: usize = 63;

/// What an artifact is, and therefore how it is imported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    Certificate,
    PrivateKey,
}

impl ArtifactKind {
    /// Value of the import `category` field.
    #[must_use]
    pub fn category(self) -> &'static str {
        match self {
            Self::Certificate => "certificate",
            Self::PrivateKey => "private-key",
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Certificate => "certificate",
            Self::PrivateKey => "private key",
        })
    }
}

/// One file to upload. Read once, never modified.
#[derive(Clone, PartialEq, Eq)]
pub struct DeploymentArtifact {
    pub kind: ArtifactKind,
    /// Certificate object name on the appliance. Key and certificate share it.
    pub logical_name: String,
    /// File name sent in the multipart `file` part.
    pub file_name: String,
    pub payload: Vec<u8>,
}

impl fmt::Debug for DeploymentArtifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeploymentArtifact")
            .field("kind", &self.kind)
            .field("logical_name", &self.logical_name)
            .field("file_name", &self.file_name)
            .field("payload_len", &self.payload.len())
            .finish()
    }
}

/// The certificate/key pair deployed to every host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPair {
    pub certificate: DeploymentArtifact,
    pub private_key: DeploymentArtifact,
}

impl ArtifactPair {
    /// Upload order for the key algorithm family.
    ///
    /// The appliance rejects ECC pairings unless the key is imported first,
    /// and RSA pairings unless the certificate is.
    #[must_use]
    pub fn upload_order(&self, is_ecc_variant: bool) -> [&DeploymentArtifact; 2] {
        if is_ecc_variant {
            [&self.private_key, &self.certificate]
        } else {
            [&self.certificate, &self.private_key]
        }
    }
}

/// Validate a certificate object name.
///
/// # Errors
///
/// Returns an error if the name is empty, too long, or contains whitespace,
/// control characters, or quotes.
pub fn validate_certificate_name(name: &str) -> Result<(), DeployError> {
    let valid = !name.is_empty()
        && name.chars().count() <= MAX_CERTIFICATE_NAME_LEN
        && !name
            .chars()
            .any(|c| c.is_whitespace() || c.is_control() || c == '"' || c == '\'');
    if valid {
        Ok(())
    } else {
        Err(DeployError::InvalidCertificateName(name.to_string()))
    }
}

/// Default certificate object name: the certificate file stem.
#[must_use]
pub fn default_certificate_name(cert_path: &std::path::Path) -> Option<String> {
    cert_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .filter(|s| !s.is_empty())
}
