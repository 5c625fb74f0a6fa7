//! # mf-translate
//!
//! Translates MetricFlow semantic models and metrics into BI tool
//! definitions: LookML views, Cube cubes and Lightdash dbt metrics.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │   semantic_manifest.json  +  manifest.json (optional)   │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [manifest]
//! ┌─────────────────────────────────────────────────────────┐
//! │     ManifestStore (models, metrics, physical columns)   │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [translate] references + expressions
//!                          ▼ [compose]   metrics -> measures
//!                          ▼ [assemble]  one view per model
//! ┌─────────────────────────────────────────────────────────┐
//! │              DialectView (Looker/Cube/Lightdash)        │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [emit]
//! ┌─────────────────────────────────────────────────────────┐
//! │            LookML  /  Cube YAML  /  dbt YAML            │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! [`merge`] folds generated dbt YAML into existing schema files, and
//! [`query`] maps MetricFlow queries onto Looker queries.

pub mod assemble;
pub mod compose;
pub mod config;
pub mod dialect;
pub mod emit;
pub mod manifest;
pub mod merge;
pub mod query;
pub mod translate;

/// Re-exports for convenient usage.
pub mod prelude {
    pub use crate::assemble::{
        AssembleOptions, DialectView, TargetDatabase, TimezoneConversion, ViewAssembler,
    };
    pub use crate::compose::{Composer, Composition, Diagnostic, FilterStyle};
    pub use crate::dialect::{Dialect, TargetDialect};
    pub use crate::emit::emit;
    pub use crate::manifest::{load_dir, load_from_str, ManifestStore};
    pub use crate::translate::{ExpressionTranslator, ReferenceResolver};
}

pub use dialect::Dialect;
pub use manifest::ManifestStore;
