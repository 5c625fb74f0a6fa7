//! Serializers for assembled views.
//!
//! - [`emit_lookml`]: LookML `view:` text
//! - [`emit_cube`]: Cube model YAML
//! - [`emit_lightdash`]: dbt schema YAML with Lightdash `meta`
//!
//! Boolean flags are rendered in each target's native form (`yes` in LookML,
//! `public: false` in Cube, `hidden: true` in Lightdash).

pub mod cube;
pub mod format;
pub mod lightdash;
pub mod lookml;

pub use cube::emit_cube;
pub use lightdash::emit_lightdash;
pub use lookml::emit_lookml;

use thiserror::Error;

use crate::assemble::DialectView;
use crate::dialect::Dialect;

#[derive(Debug, Error)]
pub enum EmitError {
    #[error("YAML serialization failed: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

pub type EmitResult<T> = Result<T, EmitError>;

/// Serialize a view in the format of the dialect it was assembled for.
pub fn emit(view: &DialectView) -> EmitResult<String> {
    match view.dialect {
        Dialect::Looker => Ok(emit_lookml(view)),
        Dialect::Cube => emit_cube(view),
        Dialect::Lightdash => emit_lightdash(view),
    }
}
