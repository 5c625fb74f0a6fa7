//! Cube model YAML emission.

use serde::Serialize;

use crate::assemble::{DialectView, ViewDimension};
use crate::compose::ComposedMeasure;

use super::EmitResult;

#[derive(Debug, Serialize)]
struct CubeFile<'a> {
    cubes: Vec<CubeDef<'a>>,
}

#[derive(Debug, Serialize)]
struct CubeDef<'a> {
    name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    sql_table: Option<&'a str>,
    dimensions: Vec<CubeDimension<'a>>,
    measures: Vec<CubeMeasure<'a>>,
}

#[derive(Debug, Serialize)]
struct CubeDimension<'a> {
    name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    title: Option<&'a str>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    dimension_type: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    sql: Option<&'a str>,
    #[serde(skip_serializing_if = "is_false")]
    primary_key: bool,
    #[serde(skip_serializing_if = "is_true")]
    public: bool,
}

#[derive(Debug, Serialize)]
struct CubeMeasure<'a> {
    name: &'a str,
    #[serde(rename = "type")]
    measure_type: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    sql: Option<&'a str>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    filters: Vec<CubeFilter<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    title: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
    #[serde(skip_serializing_if = "is_true")]
    public: bool,
}

#[derive(Debug, Serialize)]
struct CubeFilter<'a> {
    sql: &'a str,
}

fn is_false(b: &bool) -> bool {
    !*b
}

fn is_true(b: &bool) -> bool {
    *b
}

impl<'a> From<&'a ViewDimension> for CubeDimension<'a> {
    fn from(d: &'a ViewDimension) -> Self {
        Self {
            name: &d.name,
            description: d.description.as_deref(),
            title: d.label.as_deref(),
            dimension_type: d.dimension_type.as_deref(),
            sql: d.sql.as_deref(),
            primary_key: d.primary_key,
            public: !d.hidden,
        }
    }
}

impl<'a> From<&'a ComposedMeasure> for CubeMeasure<'a> {
    fn from(m: &'a ComposedMeasure) -> Self {
        Self {
            name: &m.name,
            measure_type: &m.measure_type,
            sql: m.sql.as_deref(),
            filters: m.filters.iter().map(|sql| CubeFilter { sql }).collect(),
            title: m.label.as_deref(),
            description: m.description.as_deref(),
            public: !m.hidden,
        }
    }
}

/// Render a view as a Cube model file with a single cube.
pub fn emit_cube(view: &DialectView) -> EmitResult<String> {
    let cube = CubeDef {
        name: &view.name,
        sql_table: view.table.as_deref(),
        dimensions: view
            .dimensions
            .iter()
            .chain(&view.dimension_groups)
            .map(CubeDimension::from)
            .collect(),
        measures: view.measures.iter().map(CubeMeasure::from).collect(),
    };
    Ok(serde_yaml::to_string(&CubeFile { cubes: vec![cube] })?)
}
