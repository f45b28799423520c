//! Provider orchestration
//!
//! One request, one backend decision. Policies:
//! - `remote`: strict; missing configuration is the caller's error
//! - `local`: always the fallback generator; cannot fail
//! - `auto`: remote first when configured, local on any remote failure
//!
//! The remote attempt and the local fallback are strictly sequential; a
//! discarded parallel remote call would still be billed. Every path records
//! the elapsed wall-clock time of its dominant step as metadata.

use crate::backend::ContentBackend;
use crate::error::ProviderError;
use crate::local;
use pagesmith_patch::{apply_edits, EditBatch};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;

/// Caller directive for backend selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Policy {
    #[default]
    Auto,
    Remote,
    Local,
}

/// Which backend produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    Remote,
    Local,
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackendKind::Remote => write!(f, "remote"),
            BackendKind::Local => write!(f, "local"),
        }
    }
}

/// Edit application counts for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EditStats {
    pub proposed: usize,
    pub applied: usize,
    pub skipped: usize,
}

/// Structured notes attached to a result; metadata only, never used for
/// control decisions.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Diagnostics {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback_reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub edits: Option<EditStats>,
}

/// Uniform envelope for every orchestrated operation.
#[derive(Debug, Clone, Serialize)]
pub struct ProviderResult {
    pub document: String,
    pub backend: BackendKind,
    pub elapsed_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diagnostics: Option<Diagnostics>,
}

/// Per-request backend selection and failover.
pub struct Orchestrator {
    remote: Option<Arc<dyn ContentBackend>>,
}

impl Orchestrator {
    /// Create an orchestrator. Pass `None` when no remote backend exists at
    /// all; a backend whose `is_configured()` is false counts as absent.
    #[must_use]
    pub fn new(remote: Option<Arc<dyn ContentBackend>>) -> Self {
        Self { remote }
    }

    /// Whether a configured remote backend is available.
    #[must_use]
    pub fn has_remote(&self) -> bool {
        self.remote_if_configured().is_some()
    }

    fn remote_if_configured(&self) -> Option<&Arc<dyn ContentBackend>> {
        self.remote.as_ref().filter(|b| b.is_configured())
    }

    /// Generate a document from a prompt under the given policy.
    pub async fn generate(
        &self,
        prompt: &str,
        policy: Policy,
    ) -> Result<ProviderResult, ProviderError> {
        match policy {
            Policy::Local => Ok(generate_local(prompt, None)),
            Policy::Remote => {
                let backend = self
                    .remote_if_configured()
                    .ok_or(ProviderError::NotConfigured)?;
                let started = Instant::now();
                let document = backend.generate_document(prompt).await?;
                let elapsed = elapsed_ms(started);
                tracing::info!(elapsed_ms = elapsed, "remote generation succeeded");
                Ok(ProviderResult {
                    document,
                    backend: BackendKind::Remote,
                    elapsed_ms: elapsed,
                    diagnostics: None,
                })
            }
            Policy::Auto => {
                if let Some(backend) = self.remote_if_configured() {
                    let started = Instant::now();
                    match backend.generate_document(prompt).await {
                        Ok(document) => {
                            let elapsed = elapsed_ms(started);
                            tracing::info!(elapsed_ms = elapsed, "remote generation succeeded");
                            return Ok(ProviderResult {
                                document,
                                backend: BackendKind::Remote,
                                elapsed_ms: elapsed,
                                diagnostics: None,
                            });
                        }
                        Err(e) => {
                            tracing::warn!(error = %e, "remote generation failed, falling back to local");
                            return Ok(generate_local(
                                prompt,
                                Some(format!("remote generation failed: {e}")),
                            ));
                        }
                    }
                }
                Ok(generate_local(prompt, None))
            }
        }
    }

    /// Apply a natural-language edit instruction to a document under the
    /// given policy. The local path is an identity operation: without a
    /// backend there is no edit capability, so the document comes back
    /// unchanged rather than heuristically altered.
    pub async fn edit(
        &self,
        document: &str,
        instruction: &str,
        policy: Policy,
    ) -> Result<ProviderResult, ProviderError> {
        match policy {
            Policy::Local => Ok(identity_result(document, None)),
            Policy::Remote => {
                let backend = self
                    .remote_if_configured()
                    .ok_or(ProviderError::NotConfigured)?;
                edit_remote(backend.as_ref(), document, instruction).await
            }
            Policy::Auto => {
                let Some(backend) = self.remote_if_configured() else {
                    return Ok(identity_result(document, None));
                };
                match edit_remote(backend.as_ref(), document, instruction).await {
                    Ok(result) => Ok(result),
                    Err(e) => {
                        tracing::warn!(error = %e, "remote edit failed, returning document unchanged");
                        Ok(identity_result(
                            document,
                            Some(format!("remote edit failed: {e}")),
                        ))
                    }
                }
            }
        }
    }
}

async fn edit_remote(
    backend: &dyn ContentBackend,
    document: &str,
    instruction: &str,
) -> Result<ProviderResult, ProviderError> {
    let started = Instant::now();
    let batch: EditBatch = backend.propose_edits(document, instruction).await?;
    let elapsed = elapsed_ms(started);

    let report = apply_edits(document, &batch);
    let stats = EditStats {
        proposed: batch.edits.len(),
        applied: report.applied_count(),
        skipped: report.skipped_count(),
    };
    tracing::info!(
        proposed = stats.proposed,
        applied = stats.applied,
        skipped = stats.skipped,
        "edit batch applied"
    );

    Ok(ProviderResult {
        document: report.document,
        backend: BackendKind::Remote,
        elapsed_ms: elapsed,
        diagnostics: Some(Diagnostics {
            fallback_reason: None,
            notes: batch.notes,
            edits: Some(stats),
        }),
    })
}

fn generate_local(prompt: &str, fallback_reason: Option<String>) -> ProviderResult {
    let started = Instant::now();
    let document = local::generate(prompt);
    ProviderResult {
        document,
        backend: BackendKind::Local,
        elapsed_ms: elapsed_ms(started),
        diagnostics: fallback_reason.map(|reason| Diagnostics {
            fallback_reason: Some(reason),
            ..Diagnostics::default()
        }),
    }
}

fn identity_result(document: &str, fallback_reason: Option<String>) -> ProviderResult {
    ProviderResult {
        document: document.to_string(),
        backend: BackendKind::Local,
        elapsed_ms: 0,
        diagnostics: fallback_reason.map(|reason| Diagnostics {
            fallback_reason: Some(reason),
            ..Diagnostics::default()
        }),
    }
}

fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}
