//! Error types for provider orchestration
//!
//! Only configuration and remote-backend failures ever reach a caller, and
//! only when the caller forced the remote backend. Everything downstream of
//! a successful backend response (malformed proposals, resolution misses,
//! bad fragments) is absorbed into diagnostics by the patch layer.

/// Failure from the remote content backend.
#[derive(Debug, Clone, thiserror::Error)]
pub enum BackendError {
    /// No credential is configured for the remote backend.
    #[error("remote backend is not configured")]
    Unavailable,

    /// Transport failure or non-success response, carrying the upstream
    /// status when one was received.
    #[error("remote backend request failed: {message}")]
    Request {
        status: Option<u16>,
        message: String,
    },

    /// The response could not be interpreted as a document at all.
    #[error("remote backend response uninterpretable: {0}")]
    Protocol(String),
}

/// Failure surfaced by the orchestrator.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ProviderError {
    /// The caller forced the remote backend, but none is configured.
    #[error("remote backend is not configured")]
    NotConfigured,

    /// Remote backend failure under a forcing policy.
    #[error(transparent)]
    Backend(#[from] BackendError),
}

impl ProviderError {
    /// HTTP-style status for the error envelope: client error for missing
    /// configuration, the upstream status when one is mirrorable, 500
    /// otherwise.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            ProviderError::NotConfigured | ProviderError::Backend(BackendError::Unavailable) => 400,
            ProviderError::Backend(BackendError::Request { status, .. }) => status
                .filter(|s| (400..=599).contains(s))
                .unwrap_or(500),
            ProviderError::Backend(BackendError::Protocol(_)) => 500,
        }
    }
}
