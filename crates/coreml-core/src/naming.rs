//! Output name derivation.
//!
//! The output base name is display-only: the export capability owns the
//! on-disk naming of the produced package, so no filesystem normalization
//! is applied here.

use std::path::Path;

use crate::error::{ExportError, Result};

/// Derive the output base name for an export.
///
/// Strips the extension from the explicit output value when given, else from
/// the weights identifier's filename component.
///
/// # Examples
///
/// ```
/// use coreml_export::naming::derive_output_name;
///
/// assert_eq!(derive_output_name(None, "yolo11l.pt").unwrap(), "yolo11l");
/// assert_eq!(derive_output_name(Some("foo.mlpackage"), "yolo11l.pt").unwrap(), "foo");
/// ```
pub fn derive_output_name(output: Option<&str>, weights_id: &str) -> Result<String> {
    let source = match output {
        Some(explicit) if !explicit.is_empty() => explicit,
        _ => weights_id,
    };

    Path::new(source)
        .file_stem()
        .and_then(|stem| stem.to_str())
        .map(str::to_owned)
        .filter(|stem| !stem.is_empty())
        .ok_or_else(|| ExportError::Validation {
            field: "output".into(),
            message: format!("cannot derive an output name from '{source}'"),
        })
}
