//! CoreML export for Ultralytics YOLO11 weights.
//!
//! This crate is the library behind the `yolo-coreml` CLI: it resolves a
//! weights identifier, delegates to the Ultralytics export capability in a
//! Python subprocess, and reports the produced `.mlpackage`. The tool is a
//! thin adapter — model loading, any weights download, and the package
//! layout are owned by the external library.
//!
//! # Example
//!
//! ```rust,ignore
//! use coreml_export::{CancellationToken, ExportBackend, ExportRequest, UltralyticsBackend};
//!
//! #[tokio::main]
//! async fn main() -> coreml_export::Result<()> {
//!     let request = ExportRequest::default();
//!     let backend = UltralyticsBackend::default();
//!     let outcome = backend.export(&request, &CancellationToken::new()).await?;
//!     println!("{outcome}");
//!     Ok(())
//! }
//! ```

pub mod cancel;
pub mod config;
pub mod error;
pub mod export;
pub mod naming;
pub mod weights;

// Re-export commonly used types
pub use cancel::{CancellationToken, CancelledError};
pub use error::{ExportError, Result};
pub use export::{
    BackendStatus, ExportBackend, ExportOutcome, ExportRequest, ExportStatus, UltralyticsBackend,
};
pub use naming::derive_output_name;
pub use weights::{resolve_weights, SizeVariant};
