//! Assembled, dialect-specific views.

use serde::Serialize;

use crate::compose::{ComposedMeasure, Diagnostic};
use crate::dialect::Dialect;

/// A dimension as emitted into a view/cube. Entities become hidden dimensions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ViewDimension {
    pub name: String,
    pub label: Option<String>,
    pub description: Option<String>,
    pub sql: Option<String>,
    pub dimension_type: Option<String>,
    /// Truncation timeframes, coarsest last; empty for non-time dimensions.
    pub timeframes: Vec<String>,
    pub hidden: bool,
    pub primary_key: bool,
}

impl ViewDimension {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            label: None,
            description: None,
            sql: None,
            dimension_type: None,
            timeframes: Vec::new(),
            hidden: false,
            primary_key: false,
        }
    }

    pub fn is_time(&self) -> bool {
        !self.timeframes.is_empty()
    }
}

/// Everything one semantic model translates to in one dialect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DialectView {
    /// View/cube name; defaults to the model name.
    pub name: String,
    /// The semantic model the view was assembled from.
    pub model: String,
    #[serde(skip)]
    pub dialect: Dialect,
    /// Physical relation backing the model.
    pub table: Option<String>,
    /// Time dimensions with timeframes, for dialects that separate them.
    pub dimension_groups: Vec<ViewDimension>,
    pub dimensions: Vec<ViewDimension>,
    pub measures: Vec<ComposedMeasure>,
    /// Metrics of this model that could not be translated.
    pub diagnostics: Vec<Diagnostic>,
}

impl DialectView {
    pub fn measure(&self, name: &str) -> Option<&ComposedMeasure> {
        self.measures.iter().find(|m| m.name == name)
    }

    pub fn dimension(&self, name: &str) -> Option<&ViewDimension> {
        self.dimensions
            .iter()
            .chain(&self.dimension_groups)
            .find(|d| d.name == name)
    }
}
