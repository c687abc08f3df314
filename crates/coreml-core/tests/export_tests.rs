//! Integration tests for the export request surface.
//!
//! These exercise the library the way the CLI does: build a request, check
//! the resolved weights identifier and output name, and verify that failure
//! paths surface the right error kinds without reaching the network.

use std::path::PathBuf;

use coreml_export::{
    CancellationToken, ExportBackend, ExportError, ExportRequest, SizeVariant, UltralyticsBackend,
};
use tempfile::TempDir;

#[test]
fn derived_weights_identifier_covers_all_sizes() {
    for (size, expected) in [
        (SizeVariant::Nano, "yolo11n.pt"),
        (SizeVariant::Small, "yolo11s.pt"),
        (SizeVariant::Medium, "yolo11m.pt"),
        (SizeVariant::Large, "yolo11l.pt"),
        (SizeVariant::XLarge, "yolo11x.pt"),
    ] {
        let request = ExportRequest {
            size,
            ..Default::default()
        };
        assert_eq!(request.weights_identifier(), expected);
    }
}

#[test]
fn explicit_weights_path_wins_over_size() {
    let request = ExportRequest {
        size: SizeVariant::Nano,
        weights: Some(PathBuf::from("/models/trained-run-42.pt")),
        ..Default::default()
    };
    assert_eq!(request.weights_identifier(), "/models/trained-run-42.pt");
}

#[test]
fn output_name_follows_weights_identifier() {
    let request = ExportRequest {
        size: SizeVariant::Small,
        ..Default::default()
    };
    assert_eq!(request.output_name().unwrap(), "yolo11s");

    let request = ExportRequest {
        weights: Some(PathBuf::from("/models/trained-run-42.pt")),
        ..Default::default()
    };
    assert_eq!(request.output_name().unwrap(), "trained-run-42");
}

#[test]
fn explicit_output_overrides_weights_identifier() {
    let request = ExportRequest {
        output: Some("foo.mlpackage".into()),
        ..Default::default()
    };
    assert_eq!(request.output_name().unwrap(), "foo");
}

#[tokio::test]
async fn missing_interpreter_is_a_missing_dependency() {
    let scripts_dir = TempDir::new().unwrap();
    let backend =
        UltralyticsBackend::new("/nonexistent/python3").with_scripts_dir(scripts_dir.path());

    let err = backend
        .export(&ExportRequest::default(), &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(err, ExportError::MissingDependency { .. }));
}

#[tokio::test]
async fn invalid_image_size_is_rejected_before_any_probe() {
    let backend = UltralyticsBackend::new("/nonexistent/python3");
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
