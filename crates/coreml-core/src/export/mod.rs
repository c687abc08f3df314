//! CoreML export delegation.
//!
//! The export itself is performed by the Ultralytics Python library, invoked
//! through an embedded script running in a subprocess. This module provides
//! the `ExportBackend` seam, the `UltralyticsBackend` implementation, and
//! the request/outcome types the CLI works with.

mod backend;
pub(crate) mod pipeline;
pub(crate) mod scripts;
mod types;

pub use backend::{ExportBackend, UltralyticsBackend};
pub use types::{
    BackendStatus, ExportOutcome, ExportRequest, ExportStatus, ScriptProgressLine,
};
