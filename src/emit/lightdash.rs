//! Lightdash dbt schema YAML emission.
//!
//! Lightdash reads metrics and dimensions from `meta` blocks of dbt model
//! YAML. The fragment produced here is meant to be merged into an existing
//! schema file with [`crate::merge::merge_dbt_yaml`].

use serde::Serialize;
use serde_yaml::Mapping;

use crate::assemble::{DialectView, ViewDimension};
use crate::compose::ComposedMeasure;

use super::EmitResult;

#[derive(Debug, Serialize)]
struct SchemaFile<'a> {
    version: u8,
    models: Vec<DbtModel<'a>>,
}

#[derive(Debug, Serialize)]
struct DbtModel<'a> {
    name: &'a str,
    meta: ModelMeta,
    columns: Vec<DbtColumn<'a>>,
}

#[derive(Debug, Serialize)]
struct ModelMeta {
    /// Metric name -> definition, in composition order.
    metrics: Mapping,
}

#[derive(Debug, Serialize)]
struct DbtColumn<'a> {
    name: &'a str,
    meta: ColumnMeta<'a>,
}

#[derive(Debug, Serialize)]
struct ColumnMeta<'a> {
    dimension: LightdashDimension<'a>,
}

#[derive(Debug, Serialize)]
struct LightdashDimension<'a> {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    dimension_type: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    label: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    sql: Option<&'a str>,
    #[serde(skip_serializing_if = "no_intervals")]
    time_intervals: &'a [String],
    #[serde(skip_serializing_if = "is_false")]
    hidden: bool,
}

#[derive(Debug, Serialize)]
struct LightdashMetric<'a> {
    #[serde(rename = "type")]
    metric_type: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    label: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    sql: Option<&'a str>,
    #[serde(skip_serializing_if = "is_false")]
    hidden: bool,
}

fn is_false(b: &bool) -> bool {
    !*b
}

fn no_intervals(intervals: &&[String]) -> bool {
    intervals.is_empty()
}

fn column(d: &ViewDimension) -> DbtColumn<'_> {
    DbtColumn {
        name: &d.name,
        meta: ColumnMeta {
            dimension: LightdashDimension {
                dimension_type: d.dimension_type.as_deref(),
                label: d.label.as_deref(),
                description: d.description.as_deref(),
                sql: d.sql.as_deref(),
                time_intervals: &d.timeframes,
                hidden: d.hidden,
            },
        },
    }
}

fn metric(m: &ComposedMeasure) -> LightdashMetric<'_> {
    LightdashMetric {
        metric_type: &m.measure_type,
        label: m.label.as_deref(),
        description: m.description.as_deref(),
        sql: m.sql.as_deref(),
        hidden: m.hidden,
    }
}

/// Render a view as a dbt schema fragment carrying Lightdash metadata.
pub fn emit_lightdash(view: &DialectView) -> EmitResult<String> {
    let mut metrics = Mapping::new();
    for measure in &view.measures {
        metrics.insert(
            serde_yaml::Value::String(measure.name.clone()),
            serde_yaml::to_value(metric(measure))?,
        );
    }

    let model = DbtModel {
        name: &view.name,
        meta: ModelMeta { metrics },
        columns: view
            .dimensions
            .iter()
            .chain(&view.dimension_groups)
            .map(column)
            .collect(),
    };
    Ok(serde_yaml::to_string(&SchemaFile {
        version: 2,
        models: vec![model],
    })?)
}
