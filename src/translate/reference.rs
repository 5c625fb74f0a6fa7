//! Symbolic references as they appear in MetricFlow templates.

use std::fmt;

use super::error::{ResolveError, ResolveResult};

/// Separator between entity and field in `entity__field`.
pub const REFERENCE_SEPARATOR: &str = "__";

/// A reference to be resolved against the manifest.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Reference {
    /// `entity__field`: a dimension (or entity) of the model whose primary
    /// entity is `entity`.
    Field { entity: String, field: String },
    /// Bare `entity`: the primary key of the model declaring it primary.
    Entity { entity: String },
    /// A physical column of the model's own table.
    Column { name: String },
}

impl Reference {
    /// Parse `entity__field` or bare `entity`.
    ///
    /// Identifiers containing more than one separator are rejected; a bare
    /// column can only be constructed with [`Reference::column`].
    pub fn parse(text: &str) -> ResolveResult<Self> {
        let text = text.trim();
        let invalid = || ResolveError::InvalidReference {
            reference: text.to_string(),
        };

        let parts: Vec<&str> = text.split(REFERENCE_SEPARATOR).collect();
        if parts.iter().any(|p| !is_identifier(p)) {
            return Err(invalid());
        }

        match parts.as_slice() {
            [entity] => Ok(Reference::Entity {
                entity: (*entity).to_string(),
            }),
            [entity, field] => Ok(Reference::Field {
                entity: (*entity).to_string(),
                field: (*field).to_string(),
            }),
            _ => Err(invalid()),
        }
    }

    pub fn column(name: impl Into<String>) -> Self {
        Reference::Column { name: name.into() }
    }

    /// The field this reference names in its owning model.
    pub fn field_name(&self) -> &str {
        match self {
            Reference::Field { field, .. } => field,
            Reference::Entity { entity } => entity,
            Reference::Column { name } => name,
        }
    }
}

fn is_identifier(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_alphanumeric() || c == '_')
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reference::Field { entity, field } => {
                write!(f, "{entity}{REFERENCE_SEPARATOR}{field}")
            }
            Reference::Entity { entity } => f.write_str(entity),
            Reference::Column { name } => f.write_str(name),
        }
    }
}
