//! Embedded Python export script and deployment utilities.
//!
//! The script is stored as a string constant and written to disk on first
//! use or when the embedded version changes (detected via hash comparison).

use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use tracing::info;

use crate::config::PathsConfig;
use crate::error::IoResultExt;
use crate::Result;

/// Python requirements for the export environment.
///
/// Not installed by this tool; surfaced in diagnostics when the environment
/// probe fails.
pub const REQUIREMENTS: &str = "\
ultralytics>=8.3.0
coremltools>=8.0
";

/// Python script driving the Ultralytics CoreML export.
pub const EXPORT_SCRIPT: &str = r#"#!/usr/bin/env python3
"""Export Ultralytics YOLO11 weights to a CoreML .mlpackage.

Loads the model, runs the CoreML export, and reports progress as JSON lines
on stdout.
"""
import argparse
import json
import os
import sys

def progress(stage, **kwargs):
    """Emit a JSON progress line to stdout."""
    print(json.dumps({"stage": stage, **kwargs}), flush=True)

def package_size(path):
    """Size of the exported package (a directory for .mlpackage)."""
    if os.path.isdir(path):
        total = 0
        for root, _dirs, files in os.walk(path):
            for name in files:
                total += os.path.getsize(os.path.join(root, name))
        return total
    if os.path.isfile(path):
        return os.path.getsize(path)
    return None

def main():
    parser = argparse.ArgumentParser(description="Export YOLO11 weights to CoreML")
    parser.add_argument("--weights", required=True, help="Weights path or identifier")
    parser.add_argument("--imgsz", type=int, default=640, help="Inference image size (square)")
    parser.add_argument("--half", action=argparse.BooleanOptionalAction, default=True, help="Use FP16 weights")
    parser.add_argument("--nms", action=argparse.BooleanOptionalAction, default=True, help="Embed NMS in the exported model")
    args = parser.parse_args()

    try:
        from ultralytics import YOLO
    except ImportError as e:
        progress("error", message=f"Missing required package: {e}")
        sys.exit(1)

    progress("loading", message=f"Loading weights: {args.weights}")
    model = YOLO(args.weights)  # downloads the weights when not cached locally

    progress("exporting", message=f"imgsz={args.imgsz} half={args.half} nms={args.nms}")
    result = model.export(
        format="coreml",
        nms=bool(args.nms),
        imgsz=int(args.imgsz),
        half=bool(args.half),
    )

    output_path = str(result)
    progress("complete", output_path=output_path, output_size=package_size(output_path))

if __name__ == "__main__":
    main()
"#;

/// Compute a short hash of a string for staleness checking.
fn content_hash(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    let hash = hasher.finalize();
    hex::encode(&hash[..8])
}

/// Default directory for deployed export scripts.
pub fn scripts_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join(PathsConfig::CACHE_DIR_NAME)
        .join(PathsConfig::SCRIPTS_DIR_NAME)
}

/// Deploy embedded scripts to `dir` if missing or outdated.
///
/// Uses a `.hash` sidecar file to detect when the embedded script has
/// changed and needs to be rewritten.
pub fn ensure_scripts_deployed(dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir).with_path(dir)?;

    deploy_script(dir, PathsConfig::EXPORT_SCRIPT_FILENAME, EXPORT_SCRIPT)?;
    deploy_script(dir, PathsConfig::REQUIREMENTS_FILENAME, REQUIREMENTS)?;

    info!("Export script deployed to {}", dir.display());
    Ok(())
}

fn deploy_script(dir: &Path, filename: &str, content: &str) -> Result<()> {
    let script_path = dir.join(filename);
    let hash_path = dir.join(format!("{}.hash", filename));
    let current_hash = content_hash(content);

    // Check if script is already up to date
    if script_path.exists() {
        if let Ok(stored_hash) = std::fs::read_to_string(&hash_path) {
            if stored_hash.trim() == current_hash {
                return Ok(());
            }
        }
    }

    std::fs::write(&script_path, content).with_path(&script_path)?;
    std::fs::write(&hash_path, &current_hash).with_path(&hash_path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PathsConfig;

    #[test]
    fn test_deploy_writes_script_and_hash() {
        let dir = tempfile::tempdir().unwrap();
        ensure_scripts_deployed(dir.path()).unwrap();

        let script_path = dir.path().join(PathsConfig::EXPORT_SCRIPT_FILENAME);
        let hash_path = dir
            .path()
            .join(format!("{}.hash", PathsConfig::EXPORT_SCRIPT_FILENAME));

        assert_eq!(std::fs::read_to_string(&script_path).unwrap(), EXPORT_SCRIPT);
        assert_eq!(
            std::fs::read_to_string(&hash_path).unwrap(),
            content_hash(EXPORT_SCRIPT)
        );
        assert!(dir.path().join(PathsConfig::REQUIREMENTS_FILENAME).exists());
    }

    #[test]
    fn test_deploy_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        ensure_scripts_deployed(dir.path()).unwrap();
        ensure_scripts_deployed(dir.path()).unwrap();

        let script_path = dir.path().join(PathsConfig::EXPORT_SCRIPT_FILENAME);
        assert_eq!(std::fs::read_to_string(&script_path).unwrap(), EXPORT_SCRIPT);
    }

    #[test]
    fn test_stale_script_is_rewritten() {
        let dir = tempfile::tempdir().unwrap();
        ensure_scripts_deployed(dir.path()).unwrap();

        let script_path = dir.path().join(PathsConfig::EXPORT_SCRIPT_FILENAME);
        std::fs::write(&script_path, "outdated").unwrap();
        let hash_path = dir
            .path()
            .join(format!("{}.hash", PathsConfig::EXPORT_SCRIPT_FILENAME));
        std::fs::write(&hash_path, "stale").unwrap();

        ensure_scripts_deployed(dir.path()).unwrap();
        assert_eq!(std::fs::read_to_string(&script_path).unwrap(), EXPORT_SCRIPT);
    }
}
