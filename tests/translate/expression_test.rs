#[path = "../common/mod.rs"]
mod common;

use mf_translate::dialect::Dialect;
use mf_translate::manifest::ManifestStore;
use mf_translate::translate::{ExpressionTranslator, ResolveError};

fn translate(store: &ManifestStore, dialect: Dialect, model: &str, expr: &str) -> String {
    let model = store.model_by_name(model).unwrap();
    ExpressionTranslator::new(store, dialect)
        .translate(expr, model)
        .unwrap()
}

#[test]
fn test_bare_columns_are_qualified() {
    let store = common::jaffle_store();
    assert_eq!(
        translate(&store, Dialect::Looker, "orders", "order_total > 100"),
        "${TABLE}.order_total > 100"
    );
    assert_eq!(
        translate(&store, Dialect::Cube, "orders", "order_total > 100"),
        "{CUBE}.order_total > 100"
    );
    // Substrings of longer identifiers are not columns.
    assert_eq!(
        translate(&store, Dialect::Looker, "orders", "order_total_usd + 1"),
        "order_total_usd + 1"
    );
}

#[test]
fn test_references_are_substituted() {
    let store = common::jaffle_store();
    let expr = "{{ Dimension('delivery__delivery_rating') }} = 5 \
                and {{ Dimension('order_id__discount_code') }} is not null";
    assert_eq!(
        translate(&store, Dialect::Looker, "deliveries", expr),
        "${delivery_rating} = 5 and ${orders.discount_code} is not null"
    );
    assert_eq!(
        translate(&store, Dialect::Cube, "deliveries", expr),
        "{delivery_rating} = 5 and {orders.discount_code} is not null"
    );
}

#[test]
fn test_columns_and_references_together() {
    let store = common::jaffle_store();
    // `discount_code` inside the marker is not a bare column.
    assert_eq!(
        translate(
            &store,
            Dialect::Lightdash,
            "orders",
            "coalesce(discount_code, {{ Dimension('location_id__location_name') }})"
        ),
        "coalesce(${TABLE}.discount_code, ${locations.location_name})"
    );
}

#[test]
fn test_pass_through_is_unchanged() {
    let store = common::jaffle_store();
    for dialect in [Dialect::Looker, Dialect::Cube, Dialect::Lightdash] {
        assert_eq!(
            translate(&store, dialect, "orders", "  case when 1 = 1 then 'a' end  "),
            "case when 1 = 1 then 'a' end"
        );
    }
}

#[test]
fn test_translated_output_is_stable() {
    let store = common::jaffle_store();
    let once = translate(
        &store,
        Dialect::Looker,
        "deliveries",
        "delivery_minutes / 60 + {{ Dimension('delivery__delivery_rating') }}",
    );
    assert_eq!(once, "${TABLE}.delivery_minutes / 60 + ${delivery_rating}");
    assert_eq!(translate(&store, Dialect::Looker, "deliveries", &once), once);
}

#[test]
fn test_no_column_index_leaves_words_alone() {
    let store = common::jaffle_store();
    assert_eq!(
        translate(&store, Dialect::Looker, "customers", "customer_id"),
        "customer_id"
    );
}

#[test]
fn test_entity_marker() {
    let store = common::jaffle_store();
    assert_eq!(
        translate(&store, Dialect::Cube, "deliveries", "{{ Entity('order_id') }} is not null"),
        "{orders.order_id} is not null"
    );
}

#[test]
fn test_entity_pair_marker() {
    let store = common::jaffle_store();
    // `location_id` is a foreign entity of the model keyed by `order_id`.
    let expr = "{{ Entity('order_id__location_id') }} is not null";
    assert_eq!(
        translate(&store, Dialect::Looker, "deliveries", expr),
        "${orders.location_id} is not null"
    );
    assert_eq!(
        translate(&store, Dialect::Looker, "orders", expr),
        "${location_id} is not null"
    );
    assert_eq!(
        translate(&store, Dialect::Looker, "deliveries", expr),
        translate(
            &store,
            Dialect::Looker,
            "deliveries",
            "{{ Dimension('order_id__location_id') }} is not null"
        )
    );
}

#[test]
fn test_looker_sql_is_single_line() {
    let store = common::jaffle_store();
    let expr = "case\n  when order_total > 100 then 'large'\n  else 'small'\nend";
    assert_eq!(
        translate(&store, Dialect::Looker, "orders", expr),
        "case   when ${TABLE}.order_total > 100 then 'large'   else 'small' end"
    );
    assert_eq!(
        translate(&store, Dialect::Cube, "orders", expr),
        "case\n  when {CUBE}.order_total > 100 then 'large'\n  else 'small'\nend"
    );
}

#[test]
fn test_errors_propagate() {
    let store = common::jaffle_store();
    let orders = store.model_by_name("orders").unwrap();
    let translator = ExpressionTranslator::new(&store, Dialect::Looker);

    let err = translator
        .translate("{{ Dimension('customer__region') }} = 'EU'", orders)
        .unwrap_err();
    assert!(matches!(err, ResolveError::Unresolved { .. }));

    let err = translator
        .translate("{{ Dimension('order_id__ordered_at__month') }}", orders)
        .unwrap_err();
    assert!(matches!(err, ResolveError::InvalidReference { .. }));
    let err = translator
        .translate("{{ Metric('order_total', group_by=['order_id']) }} > 10", orders)
        .unwrap_err();
    assert!(matches!(err, ResolveError::InvalidReference { .. }));
}
