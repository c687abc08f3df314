//! Types for CoreML export operations.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{ExportError, Result};
use crate::naming;
use crate::weights::{self, SizeVariant};

/// Request to export YOLO11 weights to a CoreML package.
///
/// Constructed once per invocation from command-line input; immutable after
/// construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ExportRequest {
    /// Size variant used to derive the weights identifier when no explicit
    /// path is given
    pub size: SizeVariant,
    /// Optional explicit path to .pt weights
    #[serde(default)]
    pub weights: Option<PathBuf>,
    /// Square image edge length for the exported model
    pub image_size: u32,
    /// Export with FP16 (half-precision) weights
    pub half: bool,
    /// Bake non-maximum suppression into the exported model
    pub nms: bool,
    /// Optional output name override (display only; the export capability
    /// owns the on-disk package name)
    #[serde(default)]
    pub output: Option<String>,
}

impl Default for ExportRequest {
    fn default() -> Self {
        Self {
            size: SizeVariant::default(),
            weights: None,
            image_size: crate::config::ExportConfig::DEFAULT_IMAGE_SIZE,
            half: true,
            nms: true,
            output: None,
        }
    }
}

impl ExportRequest {
    /// Reject request input the export capability would choke on.
    pub fn validate(&self) -> Result<()> {
        if self.image_size == 0 {
            return Err(ExportError::Validation {
                field: "imgsz".into(),
                message: "must be greater than zero".into(),
            });
        }
        Ok(())
    }

    /// The resolved weights identifier: the explicit path when given, else
    /// `yolo11<size>.pt`.
    pub fn weights_identifier(&self) -> String {
        weights::resolve_weights(self.weights.as_deref(), self.size)
    }

    /// The output base name derived from the output override or the weights
    /// identifier.
    pub fn output_name(&self) -> Result<String> {
        naming::derive_output_name(self.output.as_deref(), &self.weights_identifier())
    }
}

/// Status of an export operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportStatus {
    /// Checking that the export capability is importable
    Probing,
    /// Loading weights (may download when not cached locally)
    Loading,
    /// Export capability is converting the model
    Exporting,
    /// Writing the output package
    Writing,
    /// Export completed successfully
    Completed,
    /// Export was cancelled by the user
    Cancelled,
    /// Export failed
    Error,
}

impl ExportStatus {
    /// Map a script stage string to a status.
    pub fn from_stage(stage: &str) -> Option<Self> {
        match stage {
            "loading" => Some(ExportStatus::Loading),
            "exporting" => Some(ExportStatus::Exporting),
            "writing" => Some(ExportStatus::Writing),
            "complete" => Some(ExportStatus::Completed),
            "error" => Some(ExportStatus::Error),
            _ => None,
        }
    }
}

/// JSON progress line emitted by the export script on stdout.
#[derive(Debug, Clone, Deserialize)]
pub struct ScriptProgressLine {
    pub stage: String,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub output_path: Option<String>,
    #[serde(default)]
    pub output_size: Option<u64>,
}

/// Descriptor of a completed export.
///
/// The path value comes from the export capability and is treated as opaque;
/// this type only carries it to the caller for display.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ExportOutcome {
    /// Package path as reported by the export capability
    pub output_path: PathBuf,
    /// On-disk size of the package, when the script could measure it
    #[serde(default)]
    pub output_size: Option<u64>,
    /// Target format tag
    pub format: String,
    /// ISO 8601 completion timestamp
    pub completed_at: String,
}

impl fmt::Display for ExportOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.output_path.display())?;
        if let Some(size) = self.output_size {
            write!(f, " ({size} bytes)")?;
        }
        Ok(())
    }
}

/// Availability of an export backend's external environment.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct BackendStatus {
    /// Backend name (e.g. "ultralytics")
    pub name: String,
    /// Whether the external capability answered the probe
    pub ready: bool,
    /// Library version reported by the probe
    #[serde(default)]
    pub version: Option<String>,
}
