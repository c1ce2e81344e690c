//! Appliance API operations and request construction.
//!
//! Builds the request bodies the transport sends; the transport owns
//! encoding (form URL-encoding, multipart framing).

use std::fmt;

use serde::Serialize;

use crate::domain::artifact::{ArtifactKind, DeploymentArtifact};
use crate::domain::credentials::ApiKey;

/// Field names whose values are never printed.
const SECRET_FIELDS: &[&str] = &["key", "password", "passphrase"];

/// Every call the orchestrator makes against an appliance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    KeyTest,
    KeyGen,
    UploadCert,
    UploadKey,
    Commit,
}

impl OperationKind {
    /// Upload operation for an artifact kind.
    #[must_use]
    pub fn upload_for(kind: ArtifactKind) -> Self {
        match kind {
            ArtifactKind::Certificate => Self::UploadCert,
            ArtifactKind::PrivateKey => Self::UploadKey,
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::KeyTest => "key test",
            Self::KeyGen => "key generation",
            Self::UploadCert => "certificate upload",
            Self::UploadKey => "private key upload",
            Self::Commit => "commit",
        })
    }
}

/// Commit scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CommitMode {
    /// Commit only changes made by the acting admin, excluding
    /// device-and-network, shared-object, and policy-and-objects scopes.
    #[default]
    Scoped,
    /// Commit every pending change on the appliance, including other
    /// administrators' work. Dangerous.
    Force,
}

/// Binary part of a multipart upload.
#[derive(Clone, PartialEq, Eq)]
pub struct FilePart {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Request body shape.
#[derive(Clone, PartialEq, Eq)]
pub enum RequestBody {
    /// `application/x-www-form-urlencoded`
    Form(Vec<(&'static str, String)>),
    /// `multipart/form-data` with a trailing `file` part.
    Multipart {
        fields: Vec<(&'static str, String)>,
        file: FilePart,
    },
}

/// One request against the appliance API.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiRequest {
    pub kind: OperationKind,
    pub body: RequestBody,
}

impl ApiRequest {
    /// Cheap authenticated call used to probe key validity.
    #[must_use]
    pub fn key_test(key: &ApiKey) -> Self {
        Self {
            kind: OperationKind::KeyTest,
            body: RequestBody::Form(vec![
                ("type", "version".to_string()),
                ("key", key.secret().to_string()),
            ]),
        }
    }

    /// Exchange user/password for a new API key.
    #[must_use]
    pub fn key_gen(user: &str, password: &str) -> Self {
        Self {
            kind: OperationKind::KeyGen,
            body: RequestBody::Form(vec![
                ("type", "keygen".to_string()),
                ("user", user.to_string()),
                ("password", password.to_string()),
            ]),
        }
    }

    /// Import a certificate or private key under its logical name.
    #[must_use]
    pub fn upload(key: &ApiKey, artifact: &DeploymentArtifact, passphrase: Option<&str>) -> Self {
        let mut fields = vec![
            ("type", "import".to_string()),
            ("category", artifact.kind.category().to_string()),
            ("certificate-name", artifact.logical_name.clone()),
            ("key", key.secret().to_string()),
            ("format", "pem".to_string()),
        ];
        if artifact.kind == ArtifactKind::PrivateKey {
            if let Some(passphrase) = passphrase {
                fields.push(("passphrase", passphrase.to_string()));
            }
        }
        Self {
            kind: OperationKind::upload_for(artifact.kind),
            body: RequestBody::Multipart {
                fields,
                file: FilePart {
                    file_name: artifact.file_name.clone(),
                    bytes: artifact.payload.clone(),
                },
            },
        }
    }

    /// Commit staged changes.
    #[must_use]
    pub fn commit(key: &ApiKey, user: &str, mode: CommitMode) -> Self {
        let mut fields = vec![("type", "commit".to_string())];
        if mode == CommitMode::Scoped {
            fields.push(("action", "partial".to_string()));
        }
        fields.push(("key", key.secret().to_string()));
        fields.push(("cmd", commit_command(user, mode)));
        Self {
            kind: OperationKind::Commit,
            body: RequestBody::Form(fields),
        }
    }

    /// Value of a named field, if present.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&str> {
        let fields = match &self.body {
            RequestBody::Form(fields) | RequestBody::Multipart { fields, .. } => fields,
        };
        fields
            .iter()
            .find(|(k, _)| *k == name)
            .map(|(_, v)| v.as_str())
    }
}

impl fmt::Debug for ApiRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let redact = |fields: &[(&'static str, String)]| -> Vec<(&'static str, String)> {
            fields
                .iter()
                .map(|(k, v)| {
                    if SECRET_FIELDS.contains(k) {
                        (*k, "<redacted>".to_string())
                    } else {
                        (*k, v.clone())
                    }
                })
                .collect()
        };
        let mut s = f.debug_struct("ApiRequest");
        s.field("kind", &self.kind);
        match &self.body {
            RequestBody::Form(fields) => s.field("form", &redact(fields)),
            RequestBody::Multipart { fields, file } => s
                .field("multipart", &redact(fields))
                .field("file_name", &file.file_name)
                .field("file_len", &file.bytes.len()),
        };
        s.finish()
    }
}

/// XML command body for a commit.
#[must_use]
pub fn commit_command(user: &str, mode: CommitMode) -> String {
    match mode {
        CommitMode::Force => "<commit><force></force></commit>".to_string(),
        CommitMode::Scoped => format!(
            "<commit><partial>\
             <admin><member>{}</member></admin>\
             <device-and-network>excluded</device-and-network>\
             <shared-object>excluded</shared-object>\
             <policy-and-objects>excluded</policy-and-objects>\
             </partial></commit>",
            xml_escape(user)
        ),
    }
}

fn xml_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}
