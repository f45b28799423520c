//! Content backend seam
//!
//! The orchestrator talks to the remote model exclusively through this
//! trait, which keeps it testable against hand-written doubles and free of
//! transport details.

use crate::error::BackendError;
use async_trait::async_trait;
use pagesmith_patch::EditBatch;

/// A remote content-producing service.
#[async_trait]
pub trait ContentBackend: Send + Sync {
    /// Whether a credential/configuration is present. An unconfigured
    /// backend is treated by the orchestrator as absent.
    fn is_configured(&self) -> bool;

    /// Generate a complete, self-contained HTML document from a prompt.
    async fn generate_document(&self, prompt: &str) -> Result<String, BackendError>;

    /// Propose targeted edits for `document` under `instruction`.
    ///
    /// Shape problems in the response degrade to an empty batch with a
    /// diagnostic note; only configuration, transport, and
    /// empty-response failures surface as errors.
    async fn propose_edits(
        &self,
        document: &str,
        instruction: &str,
    ) -> Result<EditBatch, BackendError>;
}
