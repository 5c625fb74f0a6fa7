#[path = "../common/mod.rs"]
mod common;

use std::fs;

use mf_translate::manifest::{load_dir, load_files, load_from_str, ManifestLoadError};
use tempfile::TempDir;

#[test]
fn test_load_dir_with_both_manifests() {
    let store = load_dir(
        &common::fixtures_dir(),
        common::SEMANTIC_MANIFEST,
        common::BUILD_MANIFEST,
    )
    .unwrap();
    assert_eq!(store.models().len(), 4);
    assert!(!store.column_index().is_empty());
}

#[test]
fn test_build_manifest_is_optional() {
    let dir = TempDir::new().unwrap();
    fs::copy(
        common::fixtures_dir().join(common::SEMANTIC_MANIFEST),
        dir.path().join("semantic_manifest.json"),
    )
    .unwrap();

    let store = load_dir(dir.path(), "semantic_manifest.json", "manifest.json").unwrap();
    assert_eq!(store.metrics().len(), 9);
    assert!(store.column_index().is_empty());
}

#[test]
fn test_missing_semantic_manifest() {
    let dir = TempDir::new().unwrap();
    let err = load_dir(dir.path(), "semantic_manifest.json", "manifest.json").unwrap_err();
    assert!(matches!(err, ManifestLoadError::FileNotFound { .. }));
    assert!(err.to_string().contains("does not exist"));
}

#[test]
fn test_explicit_build_manifest_must_exist() {
    let dir = TempDir::new().unwrap();
    let semantic = dir.path().join("semantic.json");
    fs::write(&semantic, r#"{"semantic_models": [], "metrics": []}"#).unwrap();

    let missing = dir.path().join("manifest.json");
    let err = load_files(&semantic, Some(&missing)).unwrap_err();
    assert!(matches!(err, ManifestLoadError::FileNotFound { .. }));
}

#[test]
fn test_malformed_manifests_are_rejected() {
    let err = load_from_str("[1, 2, 3]", None).unwrap_err();
    assert!(matches!(
        err,
        ManifestLoadError::MissingField { ref field, .. } if field == "semantic_models"
    ));

    let err = load_from_str(r#"{"semantic_models": [{"entities": []}]}"#, None).unwrap_err();
    assert!(matches!(err, ManifestLoadError::Json { .. }));

    let err = load_from_str(r#"{"semantic_models": []}"#, Some("{}")).unwrap_err();
    assert!(matches!(err, ManifestLoadError::MissingField { .. }));
}

#[test]
fn test_unknown_keys_are_ignored() {
    let json = r#"{
        "semantic_models": [{
            "name": "orders",
            "defaults": {"agg_time_dimension": "ordered_at"},
            "entities": [{"name": "order_id", "type": "primary", "role": null}],
            "dimensions": [],
            "measures": [{"name": "order_total", "agg": "sum", "agg_params": null}]
        }],
        "metrics": [],
        "project_configuration": {}
    }"#;
    let store = load_from_str(json, None).unwrap();
    assert!(store.measure_by_name("order_total").is_some());
}
