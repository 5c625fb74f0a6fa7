//! Shared helper functions for target dialect implementations.
//!
//! This module provides reusable building blocks that dialects can compose
//! to implement the `TargetDialect` trait with minimal duplication.

use crate::manifest::{Aggregation, TimeGranularity};

// =============================================================================
// Reference Wrapping
// =============================================================================

/// Wrap a reference in `${...}`.
/// Used by: Looker, Lightdash
pub fn wrap_dollar_brace(reference: &str) -> String {
    format!("${{{reference}}}")
}

/// Wrap a reference in `{...}`.
/// Used by: Cube
pub fn wrap_brace(reference: &str) -> String {
    format!("{{{reference}}}")
}

// =============================================================================
// Aggregations
// =============================================================================

/// Aggregations every target understands under their MetricFlow name.
/// `sum_boolean`, percentiles and unknown aggregations have no portable name.
pub fn standard_aggregation(agg: &Aggregation) -> Option<&'static str> {
    match agg {
        Aggregation::Count => Some("count"),
        Aggregation::CountDistinct => Some("count_distinct"),
        Aggregation::Sum => Some("sum"),
        Aggregation::Min => Some("min"),
        Aggregation::Max => Some("max"),
        Aggregation::Average => Some("average"),
        Aggregation::Median => Some("median"),
        Aggregation::SumBoolean | Aggregation::Percentile | Aggregation::Other(_) => None,
    }
}

// =============================================================================
// Timeframes
// =============================================================================

/// Lowercase granularity names (`day`, `week`, ...).
/// Used by: Cube
pub fn timeframe_lower(granularity: TimeGranularity) -> &'static str {
    granularity.as_str()
}

/// Uppercase granularity names (`DAY`, `WEEK`, ...).
/// Used by: Lightdash
pub fn timeframe_upper(granularity: TimeGranularity) -> &'static str {
    match granularity {
        TimeGranularity::Day => "DAY",
        TimeGranularity::Week => "WEEK",
        TimeGranularity::Month => "MONTH",
        TimeGranularity::Quarter => "QUARTER",
        TimeGranularity::Year => "YEAR",
    }
}
