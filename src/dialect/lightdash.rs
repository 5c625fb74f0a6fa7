//! Lightdash dialect.
//!
//! Lightdash metrics live in dbt model YAML and use Looker-like `${...}`
//! substitution. Filtered counts keep `type: count`; the `case when` wrapping
//! already restricts the counted rows. Percentile measures are skipped, as
//! their `agg_params` are not read.

use super::helpers;
use super::TargetDialect;
use crate::manifest::TimeGranularity;

/// Lightdash dialect.
#[derive(Debug, Clone, Copy)]
pub struct Lightdash;

impl TargetDialect for Lightdash {
    fn name(&self) -> &'static str {
        "lightdash"
    }

    fn wrap_reference(&self, reference: &str) -> String {
        helpers::wrap_dollar_brace(reference)
    }

    fn table_token(&self) -> &'static str {
        "${TABLE}"
    }

    fn time_type(&self, _has_granularity: bool) -> &'static str {
        "timestamp"
    }

    fn upgrades_filtered_count(&self) -> bool {
        false
    }

    fn timeframe(&self, granularity: TimeGranularity) -> &'static str {
        helpers::timeframe_upper(granularity)
    }
}
