//! Cube dialect.
//!
//! - `{field}` / `{cube.field}` substitution, `{CUBE}` for the cube table
//! - `avg` instead of `average`; no `median`
//! - Multi-token dimension SQL is parenthesised

use super::helpers;
use super::TargetDialect;
use crate::manifest::{Aggregation, TimeGranularity};

/// Cube dialect.
#[derive(Debug, Clone, Copy)]
pub struct Cube;

impl TargetDialect for Cube {
    fn name(&self) -> &'static str {
        "cube"
    }

    fn wrap_reference(&self, reference: &str) -> String {
        helpers::wrap_brace(reference)
    }

    fn table_token(&self) -> &'static str {
        "{CUBE}"
    }

    fn parenthesize_dimension_sql(&self) -> bool {
        true
    }

    fn dimension_sql_defaults_to_name(&self) -> bool {
        true
    }

    fn time_type(&self, _has_granularity: bool) -> &'static str {
        "time"
    }

    fn aggregation_type(&self, agg: &Aggregation) -> Option<&'static str> {
        match agg {
            Aggregation::Average => Some("avg"),
            Aggregation::Median => None,
            other => helpers::standard_aggregation(other),
        }
    }

    fn timeframe(&self, granularity: TimeGranularity) -> &'static str {
        helpers::timeframe_lower(granularity)
    }
}
