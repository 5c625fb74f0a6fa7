//! Metric composition.
//!
//! Turns MetricFlow metrics into flat aggregation objects:
//!
//! - `simple` metrics become one measure. Metric filters are folded into a
//!   `case when (f1) and (f2) then (expr) end` expression.
//! - `ratio` metrics become a hidden `<metric>_numerator`, a hidden
//!   `<metric>_denominator` and a visible `number` measure dividing them,
//!   guarded with `nullif(.., 0)`.
//! - Every other kind is skipped.
//!
//! Measure SQL and filters are translated relative to the model owning the
//! measure, which is also the model the composed measure is assigned to.

use serde::{Deserialize, Serialize};
use tracing::{debug, error, warn};

use crate::dialect::{Dialect, TargetDialect};
use crate::manifest::{
    Aggregation, ManifestStore, Metric, MetricInput, MetricKind, OwnedMeasure, SemanticModel,
    WhereFilter,
};
use crate::translate::{ExpressionTranslator, ResolveResult};

use super::diagnostic::Diagnostic;
use super::error::{ComposeError, ComposeResult, RatioSide, SkipReason};

/// How metric filters reach the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterStyle {
    /// Fold filters into a `case when` around the measure expression.
    #[default]
    CaseWhen,
    /// Emit filters as a separate list next to the measure SQL (Cube only).
    MeasureFilters,
}

/// One dialect-neutral aggregation object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComposedMeasure {
    pub name: String,
    /// Dialect type name (`sum`, `count_distinct`, `number`, ...).
    pub measure_type: String,
    /// `None` for a plain row count in dialects that need no expression.
    pub sql: Option<String>,
    /// Translated filters, only populated with [`FilterStyle::MeasureFilters`].
    pub filters: Vec<String>,
    pub label: Option<String>,
    pub description: Option<String>,
    pub hidden: bool,
    /// Model whose view receives this measure.
    pub owning_model: String,
}

/// The measures produced for one metric.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricGroup {
    pub metric: String,
    pub measures: Vec<ComposedMeasure>,
}

/// Result of composing a list of metrics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Composition {
    pub groups: Vec<MetricGroup>,
    pub diagnostics: Vec<Diagnostic>,
}

impl Composition {
    /// Measures assigned to `model`, in metric order.
    pub fn measures_for<'c>(&'c self, model: &'c str) -> impl Iterator<Item = &'c ComposedMeasure> {
        self.groups
            .iter()
            .flat_map(|g| g.measures.iter())
            .filter(move |m| m.owning_model == model)
    }
}

/// Composes metrics for one dialect.
#[derive(Debug, Clone, Copy)]
pub struct Composer<'a> {
    store: &'a ManifestStore,
    translator: ExpressionTranslator<'a>,
    filter_style: FilterStyle,
}

impl<'a> Composer<'a> {
    pub fn new(store: &'a ManifestStore, dialect: Dialect) -> Self {
        Self {
            store,
            translator: ExpressionTranslator::new(store, dialect),
            filter_style: FilterStyle::default(),
        }
    }

    /// Select the filter style. Measure filters only exist in Cube; other
    /// dialects keep `case when`.
    pub fn with_filter_style(mut self, filter_style: FilterStyle) -> Self {
        self.filter_style = filter_style;
        self
    }

    pub fn dialect(&self) -> Dialect {
        self.translator.dialect()
    }

    pub fn translator(&self) -> &ExpressionTranslator<'a> {
        &self.translator
    }

    fn measure_filters(&self) -> bool {
        self.filter_style == FilterStyle::MeasureFilters && self.dialect() == Dialect::Cube
    }

    /// Compose every metric in the store.
    pub fn compose_all(&self) -> Composition {
        self.compose_metrics(self.store.metrics())
    }

    /// Compose a list of metrics. Failures are isolated per metric and
    /// recorded as diagnostics.
    pub fn compose_metrics(&self, metrics: &[Metric]) -> Composition {
        let mut composition = Composition::default();
        for metric in metrics {
            match self.compose(metric) {
                Ok(measures) => {
                    debug!(
                        metric = %metric.name,
                        dialect = %self.dialect(),
                        measures = measures.len(),
                        "composed metric"
                    );
                    composition.groups.push(MetricGroup {
                        metric: metric.name.clone(),
                        measures,
                    });
                }
                Err(err) => {
                    if err.is_skip() {
                        warn!(metric = %metric.name, dialect = %self.dialect(), reason = %err, "skipped metric");
                    } else {
                        error!(metric = %metric.name, dialect = %self.dialect(), reason = %err, "failed to translate metric");
                    }
                    composition
                        .diagnostics
                        .push(Diagnostic::from_compose_error(&metric.name, &err));
                }
            }
        }
        composition
    }

    /// Compose one metric.
    pub fn compose(&self, metric: &Metric) -> ComposeResult<Vec<ComposedMeasure>> {
        match &metric.kind {
            MetricKind::Simple => {
                let mut measure = self.compose_simple(metric, &[])?;
                measure.label = metric
                    .label
                    .as_ref()
                    .filter(|label| **label != metric.name)
                    .cloned();
                measure.description = metric
                    .description
                    .as_ref()
                    .filter(|d| !d.is_empty() && !is_generated_description(d, metric))
                    .cloned();
                Ok(vec![measure])
            }
            MetricKind::Ratio => self.compose_ratio(metric),
            other => Err(ComposeError::unsupported(
                &metric.name,
                SkipReason::UnsupportedKind(other.clone()),
            )),
        }
    }

    /// A simple metric with extra filters appended after its own.
    fn compose_simple(
        &self,
        metric: &Metric,
        extra_filters: &[WhereFilter],
    ) -> ComposeResult<ComposedMeasure> {
        let measure_name = metric
            .measure_name()
            .ok_or_else(|| ComposeError::MissingParameter {
                metric: metric.name.clone(),
                parameter: "measure",
            })?;
        let owned = self
            .store
            .measure_by_name(measure_name)
            .ok_or_else(|| ComposeError::UnknownMeasure {
                metric: metric.name.clone(),
                measure: measure_name.to_string(),
            })?;

        let filters: Vec<&WhereFilter> = metric.filters().iter().chain(extra_filters).collect();
        let measure_type = self.measure_type(metric, owned, !filters.is_empty())?;

        let (sql, filters) = if self.measure_filters() {
            let sql = self.translate(owned.measure.sql(), owned.model)?;
            let filters = filters
                .iter()
                .map(|f| self.translate(&f.template, owned.model))
                .collect::<ResolveResult<Vec<_>>>()?;
            (Some(sql), filters)
        } else {
            (self.case_when_sql(owned, &filters)?, Vec::new())
        };

        Ok(ComposedMeasure {
            name: metric.name.clone(),
            measure_type,
            sql,
            filters,
            label: None,
            description: None,
            hidden: false,
            owning_model: owned.owning_model().to_string(),
        })
    }

    fn measure_type(&self, metric: &Metric, owned: OwnedMeasure<'_>, filtered: bool) -> ComposeResult<String> {
        let dialect = self.dialect();
        let agg = &owned.measure.agg;
        let unsupported = || {
            ComposeError::unsupported(
                &metric.name,
                SkipReason::UnsupportedAggregation {
                    measure: owned.measure.name.clone(),
                    agg: agg.clone(),
                    dialect: dialect.name(),
                },
            )
        };

        if *agg == Aggregation::Count
            && filtered
            && dialect.upgrades_filtered_count()
            && !self.measure_filters()
        {
            return dialect
                .aggregation_type(&Aggregation::CountDistinct)
                .map(str::to_string)
                .ok_or_else(unsupported);
        }
        dialect
            .aggregation_type(agg)
            .map(str::to_string)
            .ok_or_else(unsupported)
    }

    /// Measure SQL with filters folded into a `case when`.
    fn case_when_sql(
        &self,
        owned: OwnedMeasure<'_>,
        filters: &[&WhereFilter],
    ) -> ResolveResult<Option<String>> {
        if filters.is_empty() {
            if owned.measure.agg == Aggregation::Count && self.dialect().omits_plain_count_sql() {
                return Ok(None);
            }
            return self.translate(owned.measure.sql(), owned.model).map(Some);
        }

        let mut sql = String::new();
        for (i, filter) in filters.iter().enumerate() {
            let condition = self.translate(&filter.template, owned.model)?;
            if i == 0 {
                sql.push_str(&format!("case when ({condition})"));
            } else {
                sql.push_str(&format!("\n               and ({condition})"));
            }
        }
        let expr = self.translate(owned.measure.sql(), owned.model)?;
        sql.push_str(&format!("\n            then ({expr})"));
        sql.push_str("\n         end");
        Ok(Some(sql))
    }

    fn compose_ratio(&self, metric: &Metric) -> ComposeResult<Vec<ComposedMeasure>> {
        let missing = |parameter| ComposeError::MissingParameter {
            metric: metric.name.clone(),
            parameter,
        };
        let numerator_input = metric
            .type_params
            .numerator
            .as_ref()
            .ok_or_else(|| missing("numerator"))?;
        let denominator_input = metric
            .type_params
            .denominator
            .as_ref()
            .ok_or_else(|| missing("denominator"))?;

        let numerator = self.compose_ratio_side(metric, numerator_input, RatioSide::Numerator)?;
        let denominator =
            self.compose_ratio_side(metric, denominator_input, RatioSide::Denominator)?;

        if numerator.owning_model != denominator.owning_model {
            return Err(ComposeError::unsupported(
                &metric.name,
                SkipReason::CrossModelRatio {
                    numerator_model: numerator.owning_model,
                    denominator_model: denominator.owning_model,
                },
            ));
        }

        let dialect = self.dialect();
        let ratio = ComposedMeasure {
            name: metric.name.clone(),
            measure_type: dialect.number_type().to_string(),
            sql: Some(format!(
                "{} / nullif({}, 0)",
                dialect.render_field(None, &numerator.name),
                dialect.render_field(None, &denominator.name)
            )),
            filters: Vec::new(),
            label: metric.label.clone().filter(|l| !l.is_empty()),
            description: metric.description.clone().filter(|d| !d.is_empty()),
            hidden: false,
            owning_model: numerator.owning_model.clone(),
        };

        Ok(vec![numerator, denominator, ratio])
    }

    /// A hidden measure for one side of a ratio. Filters apply in the order
    /// input metric, ratio input, ratio metric.
    fn compose_ratio_side(
        &self,
        ratio: &Metric,
        input: &MetricInput,
        side: RatioSide,
    ) -> ComposeResult<ComposedMeasure> {
        let input_metric =
            self.store
                .metric_by_name(&input.name)
                .ok_or_else(|| ComposeError::UnknownMetric {
                    metric: ratio.name.clone(),
                    reference: input.name.clone(),
                })?;

        if input_metric.kind != MetricKind::Simple {
            return Err(ComposeError::unsupported(
                &ratio.name,
                SkipReason::NonSimpleRatioInput {
                    side,
                    input: input.name.clone(),
                    kind: input_metric.kind.clone(),
                },
            ));
        }

        let extra: Vec<WhereFilter> = input
            .filters()
            .iter()
            .chain(ratio.filters())
            .cloned()
            .collect();
        let mut measure = self.compose_simple(input_metric, &extra)?;
        measure.name = format!("{}_{}", ratio.name, side.as_str());
        measure.hidden = true;
        Ok(measure)
    }

    fn translate(&self, expression: &str, model: &SemanticModel) -> ResolveResult<String> {
        self.translator.translate(expression, model)
    }
}

/// dbt's text for metrics generated with `create_metric: true`.
fn is_generated_description(description: &str, metric: &Metric) -> bool {
    let generated = |name: &str| description == format!("Metric created from measure {name}");
    generated(&metric.name) || metric.measure_name().is_some_and(generated)
}
