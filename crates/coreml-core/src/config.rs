//! Centralized configuration for the export tool.
//!
//! Constants for export defaults, the Python interpreter boundary, and the
//! on-disk layout of deployed scripts.

use std::time::Duration;

/// Export defaults and format tags.
pub struct ExportConfig;

impl ExportConfig {
    /// Square image edge length used when no `--imgsz` is given.
    pub const DEFAULT_IMAGE_SIZE: u32 = 640;
    /// Target format tag passed to the export capability.
    pub const TARGET_FORMAT: &'static str = "coreml";
    /// Extension of the produced package.
    pub const PACKAGE_EXTENSION: &'static str = "mlpackage";
    /// Prefix of derived weights identifiers (`yolo11<size>.pt`).
    pub const WEIGHTS_PREFIX: &'static str = "yolo11";
    /// Extension of derived weights identifiers.
    pub const WEIGHTS_EXTENSION: &'static str = "pt";
}

/// Python interpreter boundary configuration.
pub struct PythonConfig;

impl PythonConfig {
    /// Interpreter used when no `--python` override is given.
    pub const DEFAULT_INTERPRETER: &'static str = "python3";
    /// Timeout for the `import ultralytics` availability probe.
    pub const PROBE_TIMEOUT: Duration = Duration::from_secs(30);
    /// Hint printed to stderr when the probe fails.
    pub const INSTALL_HINT: &'static str =
        "Ultralytics is not installed in this environment. \
         Activate the intended Python environment and run `pip install ultralytics`, \
         or point --python at an interpreter that has it.";
}

/// Shared directory and path configuration.
pub struct PathsConfig;

impl PathsConfig {
    /// Directory name under the platform cache dir.
    pub const CACHE_DIR_NAME: &'static str = "yolo-coreml";
    /// Subdirectory holding deployed export scripts.
    pub const SCRIPTS_DIR_NAME: &'static str = "scripts";
    /// Filename of the deployed export script.
    pub const EXPORT_SCRIPT_FILENAME: &'static str = "export_coreml.py";
    /// Filename of the deployed Python requirements.
    pub const REQUIREMENTS_FILENAME: &'static str = "requirements.txt";
}
