//! Pagesmith Provider - content backend orchestration
//!
//! Decides, per request, which content-producing backend to consult and
//! how to fail over between them:
//! - [`backend::ContentBackend`]: the trait seam in front of the remote
//!   text-generation service
//! - [`remote::RemoteBackend`]: chat-completion client over HTTP
//! - [`local`]: deterministic no-dependency fallback generator
//! - [`orchestrator::Orchestrator`]: policy handling, fallback, timing and
//!   diagnostics, normalized into one [`ProviderResult`] envelope
//! - [`coalesce::RequestCoalescer`]: single-flight for identical
//!   concurrent generation requests

#![warn(unreachable_pub)]

pub mod backend;
pub mod coalesce;
pub mod error;
pub mod local;
pub mod orchestrator;
pub mod remote;

pub use backend::ContentBackend;
pub use coalesce::RequestCoalescer;
pub use error::{BackendError, ProviderError};
pub use orchestrator::{BackendKind, Diagnostics, EditStats, Orchestrator, Policy, ProviderResult};
pub use remote::{RemoteBackend, RemoteConfig};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
