//! Weights identifier resolution and local checkpoint inspection.
//!
//! The weights identifier is either an explicit path or derived from the
//! size variant as `yolo11<size>.pt`. When an explicit file exists locally,
//! its header is sniffed so an obviously wrong file produces a warning
//! before the export subprocess spends time on it. The external library
//! remains the authority: inspection is never fatal.

use std::fmt;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::ExportConfig;
use crate::error::ExportError;

/// YOLO11 size variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SizeVariant {
    #[serde(rename = "n")]
    Nano,
    #[serde(rename = "s")]
    Small,
    #[serde(rename = "m")]
    Medium,
    #[default]
    #[serde(rename = "l")]
    Large,
    #[serde(rename = "x")]
    XLarge,
}

impl SizeVariant {
    /// All variants, in ascending model size.
    pub const ALL: [SizeVariant; 5] = [
        SizeVariant::Nano,
        SizeVariant::Small,
        SizeVariant::Medium,
        SizeVariant::Large,
        SizeVariant::XLarge,
    ];

    /// Single-letter form used in weights identifiers.
    pub fn as_str(&self) -> &'static str {
        match self {
            SizeVariant::Nano => "n",
            SizeVariant::Small => "s",
            SizeVariant::Medium => "m",
            SizeVariant::Large => "l",
            SizeVariant::XLarge => "x",
        }
    }
}

impl fmt::Display for SizeVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SizeVariant {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "n" => Ok(SizeVariant::Nano),
            "s" => Ok(SizeVariant::Small),
            "m" => Ok(SizeVariant::Medium),
            "l" => Ok(SizeVariant::Large),
            "x" => Ok(SizeVariant::XLarge),
            other => Err(ExportError::Validation {
                field: "size".into(),
                message: format!("unknown size variant '{other}' (expected one of n, s, m, l, x)"),
            }),
        }
    }
}

/// Resolve the weights identifier for an export.
///
/// An explicit non-empty path is passed through unchanged; otherwise the
/// identifier is derived as `yolo11<size>.pt`. The identifier does not have
/// to exist locally — the export capability downloads known identifiers.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use coreml_export::weights::{resolve_weights, SizeVariant};
///
/// assert_eq!(resolve_weights(None, SizeVariant::Large), "yolo11l.pt");
/// assert_eq!(
///     resolve_weights(Some(Path::new("/models/custom.pt")), SizeVariant::Large),
///     "/models/custom.pt"
/// );
/// ```
pub fn resolve_weights(explicit: Option<&Path>, size: SizeVariant) -> String {
    match explicit {
        Some(path) if !path.as_os_str().is_empty() => path.to_string_lossy().into_owned(),
        _ => format!(
            "{}{}.{}",
            ExportConfig::WEIGHTS_PREFIX,
            size,
            ExportConfig::WEIGHTS_EXTENSION
        ),
    }
}

/// Container format of a local checkpoint file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeightsFormat {
    /// Modern PyTorch checkpoint (ZIP container).
    TorchZip,
    /// Legacy raw-pickle checkpoint.
    Pickle,
    Unknown,
}

/// Magic bytes for checkpoint format detection.
mod magic {
    /// ZIP header (used by PyTorch .pt files)
    pub const ZIP: &[u8; 4] = &[0x50, 0x4B, 0x03, 0x04];
    /// Pickle protocol markers
    pub const PICKLE_V2: u8 = 0x80;
    pub const PICKLE_PROTO_MIN: u8 = 2;
    pub const PICKLE_PROTO_MAX: u8 = 5;
}

/// Detect the checkpoint container format from a file header.
fn detect_format(header: &[u8]) -> WeightsFormat {
    if header.len() < 4 {
        return WeightsFormat::Unknown;
    }

    if &header[..4] == magic::ZIP {
        return WeightsFormat::TorchZip;
    }

    if header[0] == magic::PICKLE_V2
        && header[1] >= magic::PICKLE_PROTO_MIN
        && header[1] <= magic::PICKLE_PROTO_MAX
    {
        return WeightsFormat::Pickle;
    }

    WeightsFormat::Unknown
}

/// Inspect a local weights file, returning `None` when it does not exist or
/// cannot be read.
pub fn inspect_weights_file(path: &Path) -> Option<WeightsFormat> {
    let mut file = std::fs::File::open(path).ok()?;
    let mut header = [0u8; 8];
    let bytes_read = file.read(&mut header).ok()?;
    Some(detect_format(&header[..bytes_read]))
}

/// Warn when an explicit local weights file does not look like a PyTorch
/// checkpoint. Missing files are left to the export capability, which
/// resolves known identifiers by download.
pub fn warn_if_unrecognized(path: &Path) {
    match inspect_weights_file(path) {
        Some(WeightsFormat::Unknown) => {
            warn!(
                "{} does not look like a PyTorch checkpoint; the export may fail",
                path.display()
            );
        }
        Some(format) => {
            debug!("Local weights {} detected as {:?}", path.display(), format);
        }
        None => {
            debug!(
                "Weights {} not present locally; leaving resolution to the export capability",
                path.display()
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::PathBuf;

    #[test]
    fn test_derived_identifier_for_all_sizes() {
        for size in SizeVariant::ALL {
            assert_eq!(
                resolve_weights(None, size),
                format!("yolo11{}.pt", size.as_str())
            );
        }
    }

    #[test]
    fn test_explicit_path_unchanged() {
        let path = PathBuf::from("/path/to/custom.pt");
        assert_eq!(
            resolve_weights(Some(&path), SizeVariant::Nano),
            "/path/to/custom.pt"
        );
    }

    #[test]
    fn test_empty_explicit_path_derives() {
        assert_eq!(
            resolve_weights(Some(Path::new("")), SizeVariant::Medium),
            "yolo11m.pt"
        );
    }

    #[test]
    fn test_size_variant_round_trip() {
        for size in SizeVariant::ALL {
            assert_eq!(size.as_str().parse::<SizeVariant>().unwrap(), size);
        }
    }

    #[test]
    fn test_size_variant_rejects_unknown() {
        assert!("q".parse::<SizeVariant>().is_err());
        assert!("large".parse::<SizeVariant>().is_err());
        assert!("".parse::<SizeVariant>().is_err());
    }

    #[test]
    fn test_default_size_is_large() {
        assert_eq!(SizeVariant::default(), SizeVariant::Large);
    }

    #[test]
    fn test_detect_format_zip() {
        let mut header = vec![0u8; 8];
        header[..4].copy_from_slice(magic::ZIP);
        assert_eq!(detect_format(&header), WeightsFormat::TorchZip);
    }

    #[test]
    fn test_detect_format_pickle() {
        let header = [magic::PICKLE_V2, 4, 0, 0];
        assert_eq!(detect_format(&header), WeightsFormat::Pickle);
    }

    #[test]
    fn test_detect_format_unknown() {
        assert_eq!(detect_format(b"text"), WeightsFormat::Unknown);
        assert_eq!(detect_format(&[]), WeightsFormat::Unknown);
    }

    #[test]
    fn test_inspect_missing_file() {
        assert!(inspect_weights_file(Path::new("/nonexistent/weights.pt")).is_none());
    }

    #[test]
    fn test_inspect_local_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("weights.pt");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(magic::ZIP).unwrap();
        file.write_all(&[0u8; 16]).unwrap();

        assert_eq!(inspect_weights_file(&path), Some(WeightsFormat::TorchZip));
    }
}
