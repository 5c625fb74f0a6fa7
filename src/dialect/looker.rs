//! Looker (LookML) dialect.
//!
//! - `${field}` / `${view.field}` substitution, `${TABLE}` for the view table
//! - SQL kept on a single line
//! - `type: count` needs no `sql` when unfiltered
//! - Time dimension groups use `date` for daily granularity

use super::helpers;
use super::TargetDialect;
use crate::manifest::{Aggregation, TimeGranularity};

/// Looker dialect.
#[derive(Debug, Clone, Copy)]
pub struct Looker;

impl TargetDialect for Looker {
    fn name(&self) -> &'static str {
        "looker"
    }

    fn wrap_reference(&self, reference: &str) -> String {
        helpers::wrap_dollar_brace(reference)
    }

    fn table_token(&self) -> &'static str {
        "${TABLE}"
    }

    fn single_line_sql(&self) -> bool {
        true
    }

    fn entity_sql_defaults_to_name(&self) -> bool {
        false
    }

    fn entity_type(&self) -> Option<&'static str> {
        None
    }

    fn time_type(&self, has_granularity: bool) -> &'static str {
        if has_granularity {
            "time"
        } else {
            "date_time"
        }
    }

    fn uses_dimension_groups(&self) -> bool {
        true
    }

    fn aggregation_type(&self, agg: &Aggregation) -> Option<&'static str> {
        helpers::standard_aggregation(agg)
    }

    fn omits_plain_count_sql(&self) -> bool {
        true
    }

    fn timeframe(&self, granularity: TimeGranularity) -> &'static str {
        match granularity {
            TimeGranularity::Day => "date",
            other => other.as_str(),
        }
    }
}
