use std::time::Duration;

use thiserror::Error;

/// Failure reported by a provider client at the API boundary, carrying the
/// rendered SDK error so callers can diagnose without re-querying.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct ProviderError {
    pub message: String,
}

impl ProviderError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Errors that abort an issuance run. Nothing here is retried.
#[derive(Debug, Error)]
pub enum IssuanceError {
    #[error("invalid domain '{domain}': {reason}")]
    InvalidDomain { domain: String, reason: String },

    #[error("certificate request for '{domain}' was rejected: {detail}")]
    RequestRejected { domain: String, detail: String },

    #[error("malformed {operation} response for '{target}': {detail}")]
    MalformedResponse {
        operation: &'static str,
        target: String,
        detail: String,
    },

    #[error("{operation} failed for '{target}': {detail}")]
    ProviderCall {
        operation: &'static str,
        target: String,
        detail: String,
    },

    #[error("no hosted zone named '{zone_name}' found for domain '{domain}'")]
    ZoneNotFound { domain: String, zone_name: String },

    #[error("change batch for zone '{zone_name}' ({zone_id}) was rejected: {detail}")]
    PublishRejected {
        zone_id: String,
        zone_name: String,
        detail: String,
    },

    #[error("no validation records published for certificate '{handle}' within {timeout:?}")]
    ChallengesUnavailable { handle: String, timeout: Duration },

    #[error("timeout ({timeout:?}) reached for validation of certificate '{handle}'")]
    ValidationTimeout { handle: String, timeout: Duration },
}
