//! LookML view emission.

use crate::assemble::{DialectView, ViewDimension};
use crate::compose::ComposedMeasure;

use super::format::{quote_string, yes_no, IndentWriter};

/// Render a view as a LookML `view:` block.
pub fn emit_lookml(view: &DialectView) -> String {
    let mut w = IndentWriter::default();
    w.write_block(&format!("view: {}", view.name), |w| {
        if let Some(table) = &view.table {
            w.write_line(&format!("sql_table_name: {table} ;;"));
        }
        for dimension in &view.dimensions {
            w.blank_line();
            write_dimension(w, "dimension", dimension);
        }
        for group in &view.dimension_groups {
            w.blank_line();
            write_dimension(w, "dimension_group", group);
        }
        for measure in &view.measures {
            w.blank_line();
            write_measure(w, measure);
        }
    });
    w.into_string()
}

fn write_dimension(w: &mut IndentWriter, keyword: &str, dimension: &ViewDimension) {
    w.write_block(&format!("{keyword}: {}", dimension.name), |w| {
        write_labels(w, dimension.label.as_deref(), dimension.description.as_deref());
        if let Some(kind) = &dimension.dimension_type {
            w.write_line(&format!("type: {kind}"));
        }
        if !dimension.timeframes.is_empty() {
            w.write_line(&format!("timeframes: [{}]", dimension.timeframes.join(", ")));
        }
        if dimension.primary_key {
            w.write_line(&format!("primary_key: {}", yes_no(true)));
        }
        if dimension.hidden {
            w.write_line(&format!("hidden: {}", yes_no(true)));
        }
        if let Some(sql) = &dimension.sql {
            w.write_line(&format!("sql: {sql} ;;"));
        }
    });
}

fn write_measure(w: &mut IndentWriter, measure: &ComposedMeasure) {
    w.write_block(&format!("measure: {}", measure.name), |w| {
        write_labels(w, measure.label.as_deref(), measure.description.as_deref());
        w.write_line(&format!("type: {}", measure.measure_type));
        if measure.hidden {
            w.write_line(&format!("hidden: {}", yes_no(true)));
        }
        if let Some(sql) = &measure.sql {
            w.write_line(&format!("sql: {sql} ;;"));
        }
    });
}

fn write_labels(w: &mut IndentWriter, label: Option<&str>, description: Option<&str>) {
    if let Some(label) = label {
        w.write_line(&format!("label: {}", quote_string(label)));
    }
    if let Some(description) = description {
        w.write_line(&format!("description: {}", quote_string(description)));
    }
}
