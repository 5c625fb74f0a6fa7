//! Target dialect definitions.
//!
//! This module provides a trait-based abstraction over the syntax differences
//! between the BI tools we translate to. Reference resolution and expression
//! rewriting are shared; each dialect only decides how the results are spelled:
//!
//! - Field references: `${field}` (Looker, Lightdash) vs `{field}` (Cube)
//! - Self-table token: `${TABLE}` vs `{CUBE}`
//! - Aggregation type names and which aggregations exist at all
//! - Time dimension timeframe names
//! - A handful of compatibility rules (plain `count` without SQL, filtered
//!   `count` upgraded to `count_distinct`, single-line SQL)
//!
//! # Usage
//!
//! ```ignore
//! use mf_translate::dialect::{Dialect, TargetDialect};
//!
//! let dialect = Dialect::Cube;
//! assert_eq!(dialect.render_field(Some("orders"), "status"), "{orders.status}");
//! ```

mod cube;
mod helpers;
mod lightdash;
mod looker;

pub use cube::Cube;
pub use lightdash::Lightdash;
pub use looker::Looker;

use crate::manifest::{Aggregation, TimeGranularity};

/// Target dialect trait - defines how translated references are rendered.
///
/// The default implementations follow Looker conventions where possible.
pub trait TargetDialect: std::fmt::Debug {
    /// Dialect name for display/logging.
    fn name(&self) -> &'static str;

    // =========================================================================
    // References
    // =========================================================================

    /// Wrap a field reference in the dialect's substitution syntax.
    ///
    /// - Looker/Lightdash: `${orders.status}`
    /// - Cube: `{orders.status}`
    fn wrap_reference(&self, reference: &str) -> String;

    /// Token standing for the view's own table (`${TABLE}`, `{CUBE}`).
    fn table_token(&self) -> &'static str;

    /// Render a field, qualified by its owning model unless it lives in the
    /// model being translated.
    fn render_field(&self, model: Option<&str>, field: &str) -> String {
        match model {
            Some(model) => self.wrap_reference(&format!("{model}.{field}")),
            None => self.wrap_reference(field),
        }
    }

    /// Render a physical column of the view's own table.
    fn render_column(&self, column: &str) -> String {
        format!("{}.{}", self.table_token(), column)
    }

    // =========================================================================
    // SQL layout
    // =========================================================================

    /// Whether translated SQL must be collapsed onto a single line.
    fn single_line_sql(&self) -> bool {
        false
    }

    /// Whether dimension SQL made of several tokens is wrapped in parentheses.
    fn parenthesize_dimension_sql(&self) -> bool {
        false
    }

    /// Whether an entity without `expr` still gets `sql` (its own name).
    fn entity_sql_defaults_to_name(&self) -> bool {
        true
    }

    /// Whether a dimension without `expr` still gets `sql` (its own name).
    fn dimension_sql_defaults_to_name(&self) -> bool {
        false
    }

    // =========================================================================
    // Dimensions
    // =========================================================================

    /// Type of the hidden dimension generated for an entity, if any.
    fn entity_type(&self) -> Option<&'static str> {
        Some("string")
    }

    /// Type of a categorical dimension.
    fn categorical_type(&self) -> &'static str {
        "string"
    }

    /// Type of a time dimension, with or without a declared granularity.
    fn time_type(&self, has_granularity: bool) -> &'static str;

    /// Whether granular time dimensions are emitted as separate dimension
    /// groups rather than alongside the other dimensions.
    fn uses_dimension_groups(&self) -> bool {
        false
    }

    // =========================================================================
    // Measures
    // =========================================================================

    /// Dialect type name for an aggregation, or `None` when the dialect has
    /// no equivalent.
    fn aggregation_type(&self, agg: &Aggregation) -> Option<&'static str> {
        helpers::standard_aggregation(agg)
    }

    /// Type name for a computed (non-aggregate) measure.
    fn number_type(&self) -> &'static str {
        "number"
    }

    /// Whether a plain row count with no filters is emitted without SQL.
    fn omits_plain_count_sql(&self) -> bool {
        false
    }

    /// Whether `count` with row-level filters is upgraded to `count_distinct`.
    fn upgrades_filtered_count(&self) -> bool {
        true
    }

    // =========================================================================
    // Time
    // =========================================================================

    /// Timeframe name for a granularity.
    fn timeframe(&self, granularity: TimeGranularity) -> &'static str;
}

/// Supported target dialects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Dialect {
    #[default]
    Looker,
    Cube,
    Lightdash,
}

impl Dialect {
    /// Get the dialect implementation.
    pub fn dialect(&self) -> &'static dyn TargetDialect {
        match self {
            Dialect::Looker => &Looker,
            Dialect::Cube => &Cube,
            Dialect::Lightdash => &Lightdash,
        }
    }
}

// Implement TargetDialect for Dialect enum by delegating to concrete types
impl TargetDialect for Dialect {
    fn name(&self) -> &'static str {
        self.dialect().name()
    }

    fn wrap_reference(&self, reference: &str) -> String {
        self.dialect().wrap_reference(reference)
    }

    fn table_token(&self) -> &'static str {
        self.dialect().table_token()
    }

    fn render_field(&self, model: Option<&str>, field: &str) -> String {
        self.dialect().render_field(model, field)
    }

    fn render_column(&self, column: &str) -> String {
        self.dialect().render_column(column)
    }

    fn single_line_sql(&self) -> bool {
        self.dialect().single_line_sql()
    }

    fn parenthesize_dimension_sql(&self) -> bool {
        self.dialect().parenthesize_dimension_sql()
    }

    fn entity_sql_defaults_to_name(&self) -> bool {
        self.dialect().entity_sql_defaults_to_name()
    }

    fn dimension_sql_defaults_to_name(&self) -> bool {
        self.dialect().dimension_sql_defaults_to_name()
    }

    fn entity_type(&self) -> Option<&'static str> {
        self.dialect().entity_type()
    }

    fn categorical_type(&self) -> &'static str {
        self.dialect().categorical_type()
    }

    fn time_type(&self, has_granularity: bool) -> &'static str {
        self.dialect().time_type(has_granularity)
    }

    fn uses_dimension_groups(&self) -> bool {
        self.dialect().uses_dimension_groups()
    }

    fn aggregation_type(&self, agg: &Aggregation) -> Option<&'static str> {
        self.dialect().aggregation_type(agg)
    }

    fn number_type(&self) -> &'static str {
        self.dialect().number_type()
    }

    fn omits_plain_count_sql(&self) -> bool {
        self.dialect().omits_plain_count_sql()
    }

    fn upgrades_filtered_count(&self) -> bool {
        self.dialect().upgrades_filtered_count()
    }

    fn timeframe(&self, granularity: TimeGranularity) -> &'static str {
        self.dialect().timeframe(granularity)
    }
}

impl std::fmt::Display for Dialect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.dialect().name())
    }
}
