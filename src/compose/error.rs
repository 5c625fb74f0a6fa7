//! Composition errors and skip reasons.

use std::fmt;

use thiserror::Error;

use crate::manifest::{Aggregation, MetricKind};
use crate::translate::ResolveError;

pub type ComposeResult<T> = Result<T, ComposeError>;

/// Why a metric was skipped rather than translated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// Conversion, cumulative, derived or unknown metric kinds.
    UnsupportedKind(MetricKind),
    /// A ratio side is not a simple metric.
    NonSimpleRatioInput {
        side: RatioSide,
        input: String,
        kind: MetricKind,
    },
    /// Numerator and denominator measures live in different models.
    CrossModelRatio {
        numerator_model: String,
        denominator_model: String,
    },
    /// The measure's aggregation has no equivalent in the dialect.
    UnsupportedAggregation {
        measure: String,
        agg: Aggregation,
        dialect: &'static str,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RatioSide {
    Numerator,
    Denominator,
}

impl RatioSide {
    pub fn as_str(&self) -> &'static str {
        match self {
            RatioSide::Numerator => "numerator",
            RatioSide::Denominator => "denominator",
        }
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::UnsupportedKind(kind) => {
                write!(f, "{kind} metrics are not supported")
            }
            SkipReason::NonSimpleRatioInput { side, input, kind } => write!(
                f,
                "{} metric '{input}' is {kind}; only simple ratio inputs are supported",
                side.as_str()
            ),
            SkipReason::CrossModelRatio {
                numerator_model,
                denominator_model,
            } => write!(
                f,
                "numerator ({numerator_model}) and denominator ({denominator_model}) come from different models"
            ),
            SkipReason::UnsupportedAggregation {
                measure,
                agg,
                dialect,
            } => write!(
                f,
                "aggregation '{agg}' of measure '{measure}' is not supported by {dialect}"
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ComposeError {
    /// Recoverable: the metric is skipped.
    #[error("Skipped metric '{metric}': {reason}")]
    Unsupported { metric: String, reason: SkipReason },

    #[error("Metric '{metric}' references unknown measure '{measure}'")]
    UnknownMeasure { metric: String, measure: String },

    #[error("Metric '{metric}' references unknown metric '{reference}'")]
    UnknownMetric { metric: String, reference: String },

    #[error("Metric '{metric}' has no `{parameter}` type parameter")]
    MissingParameter {
        metric: String,
        parameter: &'static str,
    },

    #[error(transparent)]
    Resolve(#[from] ResolveError),
}

impl ComposeError {
    pub fn unsupported(metric: &str, reason: SkipReason) -> Self {
        ComposeError::Unsupported {
            metric: metric.to_string(),
            reason,
        }
    }

    /// Unsupported metrics are expected in real manifests; everything else
    /// points at a broken manifest.
    pub fn is_skip(&self) -> bool {
        matches!(self, ComposeError::Unsupported { .. })
    }
}
