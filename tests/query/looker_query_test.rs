#[path = "../common/mod.rs"]
mod common;

use mf_translate::manifest::{Metric, MetricKind};
use mf_translate::query::{
    parent_model_for_metrics, to_looker_query, LookerQuery, MetricFlowQuery, QueryError,
};
use mf_translate::translate::ResolveError;

#[test]
fn test_single_metric() {
    let store = common::jaffle_store();
    let query = to_looker_query(&store, &MetricFlowQuery::new(["order_total"]), Some("jaffle"))
        .unwrap();
    assert_eq!(
        query,
        LookerQuery {
            model: "jaffle".into(),
            view: "orders".into(),
            fields: vec!["orders.order_total".into()],
            sorts: None,
            limit: -1,
        }
    );
}

#[test]
fn test_group_and_order_by() {
    let store = common::jaffle_store();
    let query = MetricFlowQuery::new(["order_total", "discounted_orders"])
        .group_by(["location_id__location_name", "order_id"])
        .order_by(["-order_total", "location_id__location_name"]);
    let looker = to_looker_query(&store, &query, Some("jaffle")).unwrap();

    assert_eq!(
        looker.fields,
        vec![
            "orders.order_total",
            "orders.discounted_orders",
            "locations.location_name",
            "orders.order_id",
        ]
    );
    assert_eq!(
        looker.sorts,
        Some(vec![
            "-orders.order_total".to_string(),
            "locations.location_name".to_string(),
        ])
    );
}

#[test]
fn test_time_grain_maps_to_dimension_group_field() {
    let store = common::jaffle_store();
    let query = MetricFlowQuery::new(["delivery_count"])
        .group_by(["delivery__delivered_at__month", "delivery__delivered_at__day"])
        .order_by(["-delivery__delivered_at__month"]);
    let looker = to_looker_query(&store, &query, Some("jaffle")).unwrap();
    assert_eq!(
        looker.fields,
        vec![
            "deliveries.delivery_count",
            "deliveries.delivered_at_month",
            "deliveries.delivered_at_date",
        ]
    );
    assert_eq!(looker.sorts, Some(vec!["-deliveries.delivered_at_month".to_string()]));

    let query = MetricFlowQuery::new(["delivery_count"]).group_by(["delivery__delivered_at__hour"]);
    assert_eq!(
        to_looker_query(&store, &query, Some("jaffle")).unwrap_err(),
        QueryError::Resolve(ResolveError::InvalidReference {
            reference: "delivery__delivered_at__hour".into()
        })
    );
}

#[test]
fn test_explore_override() {
    let store = common::jaffle_store();
    let query = MetricFlowQuery::new(["pc_deliveries_with_5_stars"])
        .group_by(["order_id__discount_code"])
        .explore("order_deliveries");
    let looker = to_looker_query(&store, &query, Some("jaffle")).unwrap();
    assert_eq!(looker.view, "order_deliveries");
    assert_eq!(
        looker.fields,
        vec!["deliveries.pc_deliveries_with_5_stars", "orders.discount_code"]
    );
}

#[test]
fn test_parent_model() {
    let store = common::jaffle_store();
    let names = |names: &[&str]| names.iter().map(|n| n.to_string()).collect::<Vec<_>>();

    assert_eq!(
        parent_model_for_metrics(&store, &names(&["order_conversion_rate"])).unwrap(),
        "customers"
    );
    assert_eq!(
        parent_model_for_metrics(&store, &names(&["order_total", "delivery_count"])).unwrap_err(),
        QueryError::MultipleModels {
            first: "orders".into(),
            second: "deliveries".into(),
        }
    );
    assert!(matches!(
        parent_model_for_metrics(&store, &names(&["orders_per_delivery"])).unwrap_err(),
        QueryError::MultipleModels { .. }
    ));
    assert_eq!(
        parent_model_for_metrics(&store, &names(&["revenue"])).unwrap_err(),
        QueryError::UnknownMetric {
            name: "revenue".into()
        }
    );
}

#[test]
fn test_metric_without_measures() {
    let store = common::orders_and_locations(vec![Metric::of_kind("order_gap", MetricKind::Derived)]);
    let err = to_looker_query(&store, &MetricFlowQuery::new(["order_gap"]), Some("jaffle"))
        .unwrap_err();
    assert_eq!(
        err,
        QueryError::NoMeasures {
            metric: "order_gap".into()
        }
    );
}

#[test]
fn test_errors() {
    let store = common::jaffle_store();

    let empty: [&str; 0] = [];
    assert_eq!(
        to_looker_query(&store, &MetricFlowQuery::new(empty), Some("jaffle")).unwrap_err(),
        QueryError::NoMetrics
    );

    let query = MetricFlowQuery::new(["order_total"]).group_by(["customer__region"]);
    assert!(matches!(
        to_looker_query(&store, &query, Some("jaffle")).unwrap_err(),
        QueryError::Resolve(ResolveError::Unresolved { .. })
    ));

    assert_eq!(
        to_looker_query(&store, &MetricFlowQuery::new(["order_total"]), None).unwrap_err(),
        QueryError::MissingLookerModel
    );
}

#[test]
fn test_serializes_as_looker_json() {
    let store = common::jaffle_store();
    let query = to_looker_query(&store, &MetricFlowQuery::new(["order_total"]), Some("jaffle"))
        .unwrap();
    let json = serde_json::to_value(&query).unwrap();
    assert_eq!(
        json,
        serde_json::json!({
            "model": "jaffle",
            "view": "orders",
            "fields": ["orders.order_total"],
            "sorts": null,
            "limit": -1
        })
    );
}
