//! Reference resolution errors.

use thiserror::Error;

pub type ResolveResult<T> = Result<T, ResolveError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    /// No model declares the entity as primary together with the field.
    #[error("Could not resolve reference '{reference}' from model '{model}'")]
    Unresolved { reference: String, model: String },

    /// Several models declare the entity as primary and the same field.
    #[error("Reference '{reference}' is ambiguous: declared by models {}", models.join(", "))]
    Ambiguous {
        reference: String,
        models: Vec<String>,
    },

    /// The reference text is not `entity`, `entity__field` or a column name.
    #[error("Invalid reference '{reference}'")]
    InvalidReference { reference: String },
}
