//! Manifest store: semantic models, metrics and physical column metadata.

pub mod loader;
pub mod store;
pub mod types;

pub use loader::{load_dir, load_files, load_from_str, LoadResult, ManifestLoadError};
pub use store::{ManifestStore, OwnedMeasure, PhysicalColumnIndex};
pub use types::{
    Aggregation, Dimension, DimensionKind, Entity, EntityKind, Measure, Metric, MetricFilter,
    MetricInput, MetricKind, SemanticModel, TimeGranularity, WhereFilter,
};
