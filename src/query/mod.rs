//! MetricFlow query translation.
//!
//! Converts a MetricFlow query (metrics, group-by fields, order-by fields) into
//! the equivalent Looker query against the generated views, so that both
//! semantic layers can be queried for the same numbers. Running the queries
//! and comparing their results is left to the caller.

use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::dialect::{Dialect, TargetDialect};
use crate::manifest::{ManifestStore, TimeGranularity};
use crate::translate::reference::REFERENCE_SEPARATOR;
use crate::translate::{ReferenceResolver, ResolveError};

/// Prefix marking a descending sort (and carried through on group-by fields).
const DESCENDING: char = '-';

#[derive(Debug, Clone, PartialEq, Error)]
pub enum QueryError {
    #[error("A query needs at least one metric")]
    NoMetrics,

    #[error("Unknown metric '{name}'")]
    UnknownMetric { name: String },

    #[error("Metric '{metric}' depends on unknown measure '{measure}'")]
    UnknownMeasure { metric: String, measure: String },

    #[error("Metric '{metric}' has no input measures")]
    NoMeasures { metric: String },

    #[error(
        "All query metrics must depend on a single semantic model. Multiple models detected: {first} and {second}"
    )]
    MultipleModels { first: String, second: String },

    #[error("No Looker model configured (set [looker] model or MF_TRANSLATE_LOOKER_MODEL)")]
    MissingLookerModel,

    #[error(transparent)]
    Resolve(#[from] ResolveError),
}

pub type QueryResult<T> = Result<T, QueryError>;

/// A MetricFlow query, as given to `mf query`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetricFlowQuery {
    pub metrics: Vec<String>,
    pub group_by: Vec<String>,
    pub order_by: Vec<String>,
    /// Explore to query; defaults to the metrics' semantic model.
    pub explore: Option<String>,
}

impl MetricFlowQuery {
    pub fn new<I, S>(metrics: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            metrics: metrics.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    pub fn group_by<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.group_by = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn order_by<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.order_by = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn explore(mut self, explore: impl Into<String>) -> Self {
        self.explore = Some(explore.into());
        self
    }
}

/// A Looker inline query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LookerQuery {
    pub model: String,
    pub view: String,
    pub fields: Vec<String>,
    pub sorts: Option<Vec<String>>,
    /// `-1`: no row limit.
    pub limit: i64,
}

/// The single semantic model all metrics' input measures belong to.
pub fn parent_model_for_metrics(store: &ManifestStore, metrics: &[String]) -> QueryResult<String> {
    let mut parent: Option<&str> = None;
    for name in metrics {
        let metric = store
            .metric_by_name(name)
            .ok_or_else(|| QueryError::UnknownMetric { name: name.clone() })?;

        let mut measures: Vec<&str> = metric
            .type_params
            .input_measures
            .iter()
            .map(|m| m.name.as_str())
            .collect();
        if measures.is_empty() {
            measures.extend(metric.measure_name());
        }
        if measures.is_empty() {
            return Err(QueryError::NoMeasures {
                metric: name.clone(),
            });
        }

        for measure in measures {
            let owner = store
                .measure_by_name(measure)
                .ok_or_else(|| QueryError::UnknownMeasure {
                    metric: name.clone(),
                    measure: measure.to_string(),
                })?
                .model
                .name
                .as_str();
            match parent {
                Some(first) if first != owner => {
                    return Err(QueryError::MultipleModels {
                        first: first.to_string(),
                        second: owner.to_string(),
                    })
                }
                _ => parent = Some(owner),
            }
        }
    }
    parent.map(str::to_string).ok_or(QueryError::NoMetrics)
}

/// `entity__dim` -> `model.dim`, `entity` -> `model.entity`, and a time
/// dimension with a grain, `entity__dim__month` -> `model.dim_month`, the
/// matching field of the Looker dimension group.
fn looker_field(resolver: &ReferenceResolver<'_>, field: &str) -> QueryResult<String> {
    match field.rsplit_once(REFERENCE_SEPARATOR) {
        Some((reference, grain)) if reference.contains(REFERENCE_SEPARATOR) => {
            let granularity: TimeGranularity =
                grain.parse().map_err(|_| ResolveError::InvalidReference {
                    reference: field.to_string(),
                })?;
            let dimension = resolver.resolve_str(reference, "")?.fully_qualified();
            Ok(format!("{dimension}_{}", Dialect::Looker.timeframe(granularity)))
        }
        _ => Ok(resolver.resolve_str(field, "")?.fully_qualified()),
    }
}

/// Split a leading `-` off a field name.
fn split_direction(field: &str) -> (&str, &str) {
    match field.strip_prefix(DESCENDING) {
        Some(rest) => ("-", rest),
        None => ("", field),
    }
}

/// Translate a MetricFlow query into a Looker query on `looker_model`.
pub fn to_looker_query(
    store: &ManifestStore,
    query: &MetricFlowQuery,
    looker_model: Option<&str>,
) -> QueryResult<LookerQuery> {
    let looker_model = looker_model
        .filter(|m| !m.is_empty())
        .ok_or(QueryError::MissingLookerModel)?;
    if query.metrics.is_empty() {
        return Err(QueryError::NoMetrics);
    }

    let parent = parent_model_for_metrics(store, &query.metrics)?;
    let resolver = ReferenceResolver::new(store);

    let mut fields: Vec<String> = query
        .metrics
        .iter()
        .map(|metric| format!("{parent}.{metric}"))
        .collect();
    for field in &query.group_by {
        let (prefix, field) = split_direction(field);
        fields.push(format!("{prefix}{}", looker_field(&resolver, field)?));
    }

    let sorts = if query.order_by.is_empty() {
        None
    } else {
        let mut sorts = Vec::with_capacity(query.order_by.len());
        for field in &query.order_by {
            let (prefix, field) = split_direction(field);
            if store.metric_by_name(field).is_some() {
                sorts.push(format!("{prefix}{parent}.{field}"));
            } else {
                sorts.push(format!("{prefix}{}", looker_field(&resolver, field)?));
            }
        }
        Some(sorts)
    };

    let query = LookerQuery {
        model: looker_model.to_string(),
        view: query.explore.clone().unwrap_or_else(|| parent.clone()),
        fields,
        sorts,
        limit: -1,
    };
    debug!(view = %query.view, fields = ?query.fields, "translated query");
    Ok(query)
}
