//! Export backends.
//!
//! The export capability is modeled as a narrow, swappable seam: one trait
//! with an availability probe and a single export operation covering model
//! load + export. The only production implementation delegates to the
//! Ultralytics Python library through the embedded export script.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::info;

use super::pipeline;
use super::scripts;
use super::types::{BackendStatus, ExportOutcome, ExportRequest};
use crate::cancel::CancellationToken;
use crate::config::{ExportConfig, PathsConfig, PythonConfig};
use crate::error::{ExportError, Result};
use crate::weights;

/// Narrow seam over the external model-loading-and-export capability.
#[async_trait]
pub trait ExportBackend {
    /// Check that the external capability is reachable.
    async fn probe(&self) -> Result<BackendStatus>;

    /// Load the requested weights and export them to the target format.
    ///
    /// Loading may download weights that are not cached locally; both the
    /// download and the on-disk package naming are owned by the external
    /// capability.
    async fn export(
        &self,
        request: &ExportRequest,
        cancel_token: &CancellationToken,
    ) -> Result<ExportOutcome>;
}

/// Export backend backed by the Ultralytics Python library.
pub struct UltralyticsBackend {
    python: PathBuf,
    scripts_dir: PathBuf,
}

impl Default for UltralyticsBackend {
    fn default() -> Self {
        Self::new(PythonConfig::DEFAULT_INTERPRETER)
    }
}

impl UltralyticsBackend {
    /// Create a backend using the given Python interpreter.
    pub fn new(python: impl Into<PathBuf>) -> Self {
        Self {
            python: python.into(),
            scripts_dir: scripts::scripts_dir(),
        }
    }

    /// Override the script deployment directory.
    pub fn with_scripts_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.scripts_dir = dir.into();
        self
    }

    /// Build the argument vector for the export script.
    fn script_args(script: &Path, request: &ExportRequest) -> Vec<String> {
        let mut args = vec![
            script.display().to_string(),
            "--weights".to_string(),
            request.weights_identifier(),
            "--imgsz".to_string(),
            request.image_size.to_string(),
        ];
        args.push(if request.half { "--half" } else { "--no-half" }.to_string());
        args.push(if request.nms { "--nms" } else { "--no-nms" }.to_string());
        args
    }
}

#[async_trait]
impl ExportBackend for UltralyticsBackend {
    async fn probe(&self) -> Result<BackendStatus> {
        let mut command = Command::new(&self.python);
        command.args(["-c", "import ultralytics; print(ultralytics.__version__)"]);

        let output = tokio::time::timeout(PythonConfig::PROBE_TIMEOUT, command.output())
            .await
            .map_err(|_| ExportError::MissingDependency {
                message: format!(
                    "probe of {} timed out after {:?}",
                    self.python.display(),
                    PythonConfig::PROBE_TIMEOUT
                ),
            })?
            .map_err(|e| ExportError::MissingDependency {
                message: format!("failed to run {}: {e}", self.python.display()),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ExportError::MissingDependency {
                message: format!("`import ultralytics` failed: {}", stderr.trim()),
            });
        }

        let version = String::from_utf8_lossy(&output.stdout).trim().to_string();
        Ok(BackendStatus {
            name: "ultralytics".to_string(),
            ready: true,
            version: (!version.is_empty()).then_some(version),
        })
    }

    async fn export(
        &self,
        request: &ExportRequest,
        cancel_token: &CancellationToken,
    ) -> Result<ExportOutcome> {
        request.validate()?;

        let status = self.probe().await?;
        info!(
            "Using ultralytics {} via {}",
            status.version.as_deref().unwrap_or("(unknown version)"),
            self.python.display()
        );

        let weights_id = request.weights_identifier();
        if let Some(path) = request.weights.as_deref() {
            weights::warn_if_unrecognized(path);
        }
        let output_name = request.output_name()?;

        info!("Loading YOLO11 weights: {}", weights_id);
        info!(
            "Exporting to CoreML (.{}) as: {}.{} | imgsz={} half={} nms={}",
            ExportConfig::PACKAGE_EXTENSION,
            output_name,
            ExportConfig::PACKAGE_EXTENSION,
            request.image_size,
            request.half,
            request.nms
        );

        scripts::ensure_scripts_deployed(&self.scripts_dir)?;
        let script = self.scripts_dir.join(PathsConfig::EXPORT_SCRIPT_FILENAME);

        let mut child = Command::new(&self.python)
            .args(Self::script_args(&script, request))
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| ExportError::ExportFailed {
                message: format!("failed to spawn export process: {e}"),
            })?;

        let stderr = child.stderr.take().expect("stderr was piped");
        let stderr_task = pipeline::drain_stderr(stderr);

        let streamed = pipeline::stream_export_progress(&mut child, cancel_token).await?;

        if let Some(message) = streamed.error {
            child.wait().await.ok();
            stderr_task.await.ok();
            return Err(ExportError::ExportFailed { message });
        }

        pipeline::wait_and_check_exit(&mut child, "export").await?;
        stderr_task.await.ok();

        let completion = streamed.completion.ok_or_else(|| ExportError::ExportFailed {
            message: "export script exited without reporting an output package".to_string(),
        })?;
        let output_path = completion.output_path.ok_or_else(|| ExportError::ExportFailed {
            message: "export script completed without an output path".to_string(),
        })?;

        Ok(ExportOutcome {
            output_path: PathBuf::from(output_path),
            output_size: completion.output_size,
            format: ExportConfig::TARGET_FORMAT.to_string(),
            completed_at: chrono::Utc::now().to_rfc3339(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_script_args_for_default_request() {
        let request = ExportRequest::default();
        let args = UltralyticsBackend::script_args(Path::new("export_coreml.py"), &request);

        assert_eq!(
            args,
            vec![
                "export_coreml.py",
                "--weights",
                "yolo11l.pt",
                "--imgsz",
                "640",
                "--half",
                "--nms",
            ]
        );
    }

    #[test]
    fn test_script_args_with_toggles_off() {
        let request = ExportRequest {
            image_size: 320,
            half: false,
            nms: false,
            ..Default::default()
        };
        let args = UltralyticsBackend::script_args(Path::new("export_coreml.py"), &request);

        assert!(args.contains(&"--no-half".to_string()));
        assert!(args.contains(&"--no-nms".to_string()));
        assert!(args.contains(&"320".to_string()));
        assert!(!args.contains(&"--half".to_string()));
        assert!(!args.contains(&"--nms".to_string()));
    }

    #[tokio::test]
    async fn test_probe_with_missing_interpreter() {
        let backend = UltralyticsBackend::new("/nonexistent/python3");
        let err = backend.probe().await.unwrap_err();
        assert!(matches!(err, ExportError::MissingDependency { .. }));
    }

    #[tokio::test]
    async fn test_export_fails_fast_on_missing_interpreter() {
        let dir = tempfile::tempdir().unwrap();
        let backend =
            UltralyticsBackend::new("/nonexistent/python3").with_scripts_dir(dir.path());

        let err = backend
            .export(&ExportRequest::default(), &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ExportError::MissingDependency { .. }));
    }

    #[tokio::test]
    async fn test_export_rejects_invalid_request() {
        let backend = UltralyticsBackend::default();
        let request = ExportRequest {
            image_size: 0,
            ..Default::default()
        };

        let err = backend
            .export(&request, &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ExportError::Validation { .. }));
    }
}
