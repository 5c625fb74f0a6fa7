#[path = "../common/mod.rs"]
mod common;

use mf_translate::compose::{ComposeError, Composer, FilterStyle, Severity, SkipReason};
use mf_translate::dialect::Dialect;
use mf_translate::manifest::{
    Aggregation, Entity, ManifestStore, Measure, Metric, MetricKind, PhysicalColumnIndex,
    SemanticModel,
};

fn compose_one(dialect: Dialect, metric: &str) -> mf_translate::compose::ComposedMeasure {
    let store = common::jaffle_store();
    let metric = store.metric_by_name(metric).unwrap();
    let mut measures = Composer::new(&store, dialect).compose(metric).unwrap();
    assert_eq!(measures.len(), 1);
    measures.remove(0)
}

#[test]
fn test_simple_metric() {
    let measure = compose_one(Dialect::Looker, "order_total");
    assert_eq!(measure.name, "order_total");
    assert_eq!(measure.measure_type, "sum");
    assert_eq!(measure.sql.as_deref(), Some("${TABLE}.order_total"));
    assert_eq!(measure.label.as_deref(), Some("Order Total"));
    // dbt's generated description is dropped.
    assert_eq!(measure.description, None);
    assert_eq!(measure.owning_model, "orders");
    assert!(!measure.hidden);
    assert!(measure.filters.is_empty());
}

#[test]
fn test_label_equal_to_name_and_empty_description_are_dropped() {
    let measure = compose_one(Dialect::Cube, "order_count");
    assert_eq!(measure.label, None);
    assert_eq!(measure.description, None);
    assert_eq!(measure.measure_type, "count");
    assert_eq!(measure.sql.as_deref(), Some("1"));
}

#[test]
fn test_plain_count_sql_omitted_in_looker() {
    let measure = compose_one(Dialect::Looker, "order_count");
    assert_eq!(measure.measure_type, "count");
    assert_eq!(measure.sql, None);
}

#[test]
fn test_filtered_count_becomes_distinct_case_when() {
    let looker = compose_one(Dialect::Looker, "discounted_orders");
    assert_eq!(looker.measure_type, "count_distinct");
    assert_eq!(
        looker.sql.as_deref(),
        Some("case when (${discount_code} is not null)\n            then (1)\n         end")
    );
    assert_eq!(looker.label.as_deref(), Some("Discounted orders"));
    assert_eq!(
        looker.description.as_deref(),
        Some("Orders placed with a discount code")
    );

    let cube = compose_one(Dialect::Cube, "discounted_orders");
    assert_eq!(cube.measure_type, "count_distinct");
    assert_eq!(
        cube.sql.as_deref(),
        Some("case when ({discount_code} is not null)\n            then (1)\n         end")
    );

    // Lightdash keeps `count`; the case when restricts the rows.
    let lightdash = compose_one(Dialect::Lightdash, "discounted_orders");
    assert_eq!(lightdash.measure_type, "count");
    assert!(lightdash.sql.as_deref().unwrap().starts_with("case when (${discount_code}"));
}

#[test]
fn test_cube_measure_filters() {
    let store = common::jaffle_store();
    let metric = store.metric_by_name("discounted_orders").unwrap();
    let measures = Composer::new(&store, Dialect::Cube)
        .with_filter_style(FilterStyle::MeasureFilters)
        .compose(metric)
        .unwrap();
    assert_eq!(measures[0].measure_type, "count");
    assert_eq!(measures[0].sql.as_deref(), Some("1"));
    assert_eq!(measures[0].filters, vec!["{discount_code} is not null"]);
}

#[test]
fn test_measure_filters_ignored_outside_cube() {
    let store = common::jaffle_store();
    let metric = store.metric_by_name("discounted_orders").unwrap();
    let measures = Composer::new(&store, Dialect::Looker)
        .with_filter_style(FilterStyle::MeasureFilters)
        .compose(metric)
        .unwrap();
    assert!(measures[0].filters.is_empty());
    assert!(measures[0].sql.as_deref().unwrap().starts_with("case when"));
}

#[test]
fn test_filters_are_and_ed_in_order() {
    let store = common::orders_and_locations(vec![Metric::simple("eu_order_total", "order_total")
        .with_filter("{{ Dimension('location_id__location_name') }} = 'Brooklyn'")
        .with_filter("{{ Dimension('order_id__discount_code') }} is null")]);
    let metric = store.metric_by_name("eu_order_total").unwrap();
    let measures = Composer::new(&store, Dialect::Looker).compose(metric).unwrap();
    assert_eq!(measures[0].measure_type, "sum");
    assert_eq!(
        measures[0].sql.as_deref(),
        Some(
            "case when (${locations.location_name} = 'Brooklyn')\n               and (${discount_code} is null)\n            then (${TABLE}.order_total)\n         end"
        )
    );
}

#[test]
fn test_unsupported_aggregation_per_dialect() {
    let store = common::jaffle_store();
    let metric = store.metric_by_name("median_delivery_minutes").unwrap();

    let looker = Composer::new(&store, Dialect::Looker).compose(metric).unwrap();
    assert_eq!(looker[0].measure_type, "median");

    let err = Composer::new(&store, Dialect::Cube).compose(metric).unwrap_err();
    assert!(err.is_skip());
    assert!(matches!(
        err,
        ComposeError::Unsupported {
            reason: SkipReason::UnsupportedAggregation { dialect: "cube", .. },
            ..
        }
    ));
}

#[test]
fn test_unsupported_kinds_are_skipped() {
    let store = common::jaffle_store();
    let composer = Composer::new(&store, Dialect::Looker);
    for name in ["cumulative_order_total", "order_conversion_rate"] {
        let metric = store.metric_by_name(name).unwrap();
        let err = composer.compose(metric).unwrap_err();
        assert!(matches!(
            err,
            ComposeError::Unsupported {
                reason: SkipReason::UnsupportedKind(_),
                ..
            }
        ));
    }

    let derived = Metric::of_kind("order_gross_profit", MetricKind::Derived);
    assert!(composer.compose(&derived).unwrap_err().is_skip());
}

#[test]
fn test_compose_all_isolates_failures() {
    let store = common::jaffle_store();

    let looker = Composer::new(&store, Dialect::Looker).compose_all();
    let composed: Vec<&str> = looker.groups.iter().map(|g| g.metric.as_str()).collect();
    assert_eq!(
        composed,
        vec![
            "order_total",
            "order_count",
            "discounted_orders",
            "delivery_count",
            "pc_deliveries_with_5_stars",
            "median_delivery_minutes",
        ]
    );
    let skipped: Vec<&str> = looker.diagnostics.iter().map(|d| d.subject.as_str()).collect();
    assert_eq!(
        skipped,
        vec!["orders_per_delivery", "cumulative_order_total", "order_conversion_rate"]
    );
    assert!(looker.diagnostics.iter().all(|d| d.severity == Severity::Warning));

    let cube = Composer::new(&store, Dialect::Cube).compose_all();
    assert_eq!(cube.groups.len(), 5);
    assert_eq!(cube.diagnostics.len(), 4);
}

#[test]
fn test_one_failing_metric_among_many() {
    let store = common::orders_and_locations(vec![
        Metric::simple("order_total", "order_total"),
        Metric::simple("refund_total", "refund_total"),
        Metric::simple("order_count", "order_count"),
    ]);
    let composition = Composer::new(&store, Dialect::Cube).compose_all();

    assert_eq!(composition.groups.len(), 2);
    assert_eq!(composition.diagnostics.len(), 1);
    let diagnostic = &composition.diagnostics[0];
    assert_eq!(diagnostic.subject, "refund_total");
    assert_eq!(diagnostic.severity, Severity::Error);
    assert!(diagnostic.message.contains("unknown measure 'refund_total'"));
}

#[test]
fn test_unresolvable_filter_is_an_error_diagnostic() {
    let store = common::orders_and_locations(vec![Metric::simple("vip_orders", "order_count")
        .with_filter("{{ Dimension('customer__tier') }} = 'vip'")]);
    let composition = Composer::new(&store, Dialect::Looker).compose_all();
    assert!(composition.groups.is_empty());
    assert_eq!(composition.diagnostics[0].severity, Severity::Error);
}

#[test]
fn test_unsupported_marker_is_an_error_diagnostic() {
    let store = common::orders_and_locations(vec![Metric::simple("recent_orders", "order_count")
        .with_filter("{{ TimeDimension('metric_time', 'day') }} >= '2024-01-01'")]);
    let composition = Composer::new(&store, Dialect::Cube).compose_all();
    assert!(composition.groups.is_empty());
    assert_eq!(composition.diagnostics[0].subject, "recent_orders");
    assert_eq!(composition.diagnostics[0].severity, Severity::Error);
}

#[test]
fn test_percentile_is_skipped_everywhere() {
    let orders = SemanticModel::new("orders")
        .with_entity(Entity::primary("order_id"))
        .with_measure(Measure::new("order_total_p95", Aggregation::Percentile).with_expr("order_total"));
    let store = ManifestStore::new(
        vec![orders],
        vec![Metric::simple("p95_order_total", "order_total_p95")],
        PhysicalColumnIndex::new(),
    );
    for dialect in [Dialect::Looker, Dialect::Cube, Dialect::Lightdash] {
        let composition = Composer::new(&store, dialect).compose_all();
        assert!(composition.groups.is_empty(), "{dialect} kept a percentile");
        assert_eq!(composition.diagnostics[0].severity, Severity::Warning);
    }
}

#[test]
fn test_measures_for_model() {
    let store = common::jaffle_store();
    let composition = Composer::new(&store, Dialect::Looker).compose_all();
    let orders: Vec<&str> = composition
        .measures_for("orders")
        .map(|m| m.name.as_str())
        .collect();
    assert_eq!(orders, vec!["order_total", "order_count", "discounted_orders"]);
    assert_eq!(composition.measures_for("locations").count(), 0);
}
