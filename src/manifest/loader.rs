//! Manifest loading.
//!
//! Parses the MetricFlow semantic manifest (`semantic_manifest.json`) and,
//! optionally, the dbt build manifest (`manifest.json`) into a [`ManifestStore`].
//!
//! # Example
//!
//! ```rust,ignore
//! use mf_translate::manifest::loader::load_dir;
//!
//! let store = load_dir(Path::new("target"), "semantic_manifest.json", "manifest.json")?;
//! ```

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use super::store::{ManifestStore, PhysicalColumnIndex};
use super::types::{Metric, SemanticModel};

/// Errors that can occur when loading manifests.
#[derive(Debug, Error)]
pub enum ManifestLoadError {
    /// Manifest file does not exist
    #[error("The file {path} does not exist.")]
    FileNotFound { path: String },

    /// IO error reading a manifest
    #[error("IO error reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Manifest is not valid JSON or has the wrong shape
    #[error("The {document} is not a valid JSON manifest: {source}")]
    Json {
        document: String,
        #[source]
        source: serde_json::Error,
    },

    /// Manifest parsed but lacks a required top-level key
    #[error("The {document} has no `{field}` key")]
    MissingField { document: String, field: String },
}

pub type LoadResult<T> = Result<T, ManifestLoadError>;

/// Top-level shape of `semantic_manifest.json`.
#[derive(Debug, Deserialize)]
pub struct SemanticManifest {
    #[serde(default)]
    pub semantic_models: Vec<SemanticModel>,
    #[serde(default)]
    pub metrics: Vec<Metric>,
}

/// A node of the dbt build manifest; only relation and columns are used.
#[derive(Debug, Deserialize)]
pub struct BuildNode {
    #[serde(default)]
    pub relation_name: Option<String>,
    #[serde(default)]
    pub columns: HashMap<String, serde_json::Value>,
}

/// Top-level shape of the dbt `manifest.json`.
#[derive(Debug, Deserialize)]
pub struct BuildManifest {
    #[serde(default)]
    pub nodes: HashMap<String, BuildNode>,
}

impl BuildManifest {
    /// Index node columns by relation name. Nodes without a relation are skipped.
    pub fn column_index(self) -> PhysicalColumnIndex {
        let mut index = PhysicalColumnIndex::new();
        for node in self.nodes.into_values() {
            if let Some(relation) = node.relation_name {
                index.insert(relation, node.columns.into_keys());
            }
        }
        index
    }
}

/// Parse a manifest document, requiring `field` at its top level.
fn parse_document<T>(json: &str, document: &str, field: &str) -> LoadResult<T>
where
    T: serde::de::DeserializeOwned,
{
    let json_error = |source| ManifestLoadError::Json {
        document: document.to_string(),
        source,
    };
    let value: serde_json::Value = serde_json::from_str(json).map_err(json_error)?;
    if value.get(field).is_none() {
        return Err(ManifestLoadError::MissingField {
            document: document.to_string(),
            field: field.to_string(),
        });
    }
    serde_json::from_value(value).map_err(json_error)
}

pub fn parse_semantic_manifest(json: &str) -> LoadResult<SemanticManifest> {
    parse_document(json, "semantic manifest", "semantic_models")
}

pub fn parse_build_manifest(json: &str) -> LoadResult<BuildManifest> {
    parse_document(json, "build manifest", "nodes")
}

/// Build a store from manifest JSON strings.
///
/// The build manifest is optional; without it no physical column index exists
/// and bare identifiers are left unqualified.
pub fn load_from_str(semantic_json: &str, build_json: Option<&str>) -> LoadResult<ManifestStore> {
    let semantic = parse_semantic_manifest(semantic_json)?;
    let columns = match build_json {
        Some(json) => parse_build_manifest(json)?.column_index(),
        None => PhysicalColumnIndex::new(),
    };

    tracing::debug!(
        models = semantic.semantic_models.len(),
        metrics = semantic.metrics.len(),
        relations = columns.len(),
        "loaded manifests"
    );

    Ok(ManifestStore::new(
        semantic.semantic_models,
        semantic.metrics,
        columns,
    ))
}

fn read_file(path: &Path) -> LoadResult<String> {
    if !path.exists() {
        return Err(ManifestLoadError::FileNotFound {
            path: path.display().to_string(),
        });
    }
    fs::read_to_string(path).map_err(|source| ManifestLoadError::Io {
        path: path.display().to_string(),
        source,
    })
}

/// Load manifests from files. A missing build manifest is an error only when
/// a path is given for it.
pub fn load_files(semantic_path: &Path, build_path: Option<&Path>) -> LoadResult<ManifestStore> {
    let semantic_json = read_file(semantic_path)?;
    let build_json = build_path.map(read_file).transpose()?;
    load_from_str(&semantic_json, build_json.as_deref())
}

/// Load manifests from a dbt `target/` directory.
///
/// The semantic manifest is required. The build manifest is used when present.
pub fn load_dir(dir: &Path, semantic_file: &str, build_file: &str) -> LoadResult<ManifestStore> {
    let build_path = dir.join(build_file);
    let build_path = build_path.exists().then_some(build_path);
    load_files(&dir.join(semantic_file), build_path.as_deref())
}
