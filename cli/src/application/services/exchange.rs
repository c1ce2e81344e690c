//! Single request/response exchange with an appliance.

use tracing::debug;

use crate::application::ports::ApplianceTransport;
use crate::domain::{ApiRequest, HostEntry, OperationOutcome, interpret};

/// Send one request and interpret whatever came back.
///
/// A transport failure becomes an unreachable outcome; it is never retried.
pub async fn execute(
    transport: &impl ApplianceTransport,
    host: &HostEntry,
    request: &ApiRequest,
) -> OperationOutcome {
    match transport.send(host, request).await {
        Ok(raw) => {
            let outcome = interpret(&raw, request.kind);
            debug!(
                host = %host,
                kind = ?request.kind,
                success = outcome.success,
                reachable = outcome.reachable,
                "appliance responded"
            );
            outcome
        }
        Err(e) => {
            debug!(host = %host, kind = ?request.kind, error = %e, "no response from appliance");
            OperationOutcome::unreachable(request.kind, format!("{e:#}"))
        }
    }
}
