//! Infrastructure implementation of the `ApplianceTransport` port over HTTPS.

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::multipart::{Form, Part};
use tracing::{debug, warn};

use crate::application::ports::ApplianceTransport;
use crate::domain::config::TransportConfig;
use crate::domain::{ApiRequest, HostEntry, RequestBody};

/// Largest response body accepted from an appliance.
const MAX_RESPONSE_BYTES: usize = 4 * 1024 * 1024;

/// Sends API requests to `https://<host>/api/`.
pub struct HttpsTransport {
    client: reqwest::Client,
}

impl HttpsTransport {
    /// Build a client with the configured timeout and TLS verification.
    ///
    /// # Errors
    ///
    /// Returns an error if the TLS backend cannot be initialized.
    pub fn new(config: &TransportConfig) -> Result<Self> {
        let timeout = Duration::from_secs(config.timeout_secs);
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .danger_accept_invalid_certs(config.insecure)
            .user_agent(concat!("certpush/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("building HTTPS client")?;
        Ok(Self { client })
    }

    /// API endpoint for a host.
    #[must_use]
    pub fn endpoint(host: &HostEntry) -> String {
        format!("https://{}/api/", host.address())
    }
}

impl ApplianceTransport for HttpsTransport {
    async fn send(&self, host: &HostEntry, request: &ApiRequest) -> Result<String> {
        let url = Self::endpoint(host);
        let builder = self.client.post(&url);
        let builder = match &request.body {
            RequestBody::Form(fields) => builder.form(fields),
            RequestBody::Multipart { fields, file } => {
                let mut form = Form::new();
                for (name, value) in fields {
                    form = form.text(*name, value.clone());
                }
                let part = Part::bytes(file.bytes.clone())
                    .file_name(file.file_name.clone())
                    .mime_str("application/octet-stream")
                    .context("building multipart file part")?;
                builder.multipart(form.part("file", part))
            }
        };

        let mut response = builder
            .send()
            .await
            .with_context(|| format!("no response from {url}"))?;
        let status = response.status();
        let expected = response
            .content_length()
            .and_then(|n| usize::try_from(n).ok())
            .unwrap_or(0);
        let mut body = Vec::with_capacity(expected.min(MAX_RESPONSE_BYTES));
        while let Some(chunk) = response
            .chunk()
            .await
            .with_context(|| format!("reading response from {url}"))?
        {
            if append_capped(&mut body, &chunk, MAX_RESPONSE_BYTES) {
                warn!(host = %host, kind = ?request.kind, limit = MAX_RESPONSE_BYTES, "response truncated");
                break;
            }
        }
        debug!(host = %host, kind = ?request.kind, %status, bytes = body.len(), "response received");

        Ok(String::from_utf8_lossy(&body).into_owned())
    }
}

/// Append as much of `chunk` as fits under `cap`. Returns `true` once the
/// cap is reached and the rest of the body should not be read.
fn append_capped(body: &mut Vec<u8>, chunk: &[u8], cap: usize) -> bool {
    let room = cap.saturating_sub(body.len());
    body.extend_from_slice(&chunk[..chunk.len().min(room)]);
    chunk.len() >= room
}
