//! Shared fixtures for integration tests.
#![allow(dead_code)]

use std::path::PathBuf;

use mf_translate::manifest::{
    load_dir, Aggregation, Dimension, Entity, ManifestStore, Measure, Metric,
    PhysicalColumnIndex, SemanticModel,
};

pub const SEMANTIC_MANIFEST: &str = "semantic_manifest.json";
pub const BUILD_MANIFEST: &str = "manifest.json";

/// Directory holding the jaffle shop manifests.
pub fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests").join("fixtures")
}

/// The jaffle shop manifests, with physical columns.
pub fn jaffle_store() -> ManifestStore {
    load_dir(&fixtures_dir(), SEMANTIC_MANIFEST, BUILD_MANIFEST).expect("fixture manifests load")
}

/// `orders` with primary `order_id`, and `locations` with primary
/// `location_id` and `location_name`.
pub fn orders_and_locations(metrics: Vec<Metric>) -> ManifestStore {
    let orders = SemanticModel::new("orders")
        .with_relation("jaffle.main.orders")
        .with_entity(Entity::primary("order_id"))
        .with_entity(Entity::foreign("location_id"))
        .with_dimension(Dimension::categorical("discount_code"))
        .with_measure(Measure::new("order_total", Aggregation::Sum))
        .with_measure(Measure::new("order_count", Aggregation::Count).with_expr("1"));
    let locations = SemanticModel::new("locations")
        .with_relation("jaffle.main.locations")
        .with_entity(Entity::primary("location_id"))
        .with_dimension(Dimension::categorical("location_name"));
    let columns = PhysicalColumnIndex::new()
        .with_relation(
            "jaffle.main.orders",
            ["order_id", "location_id", "order_total", "discount_code"],
        )
        .with_relation("jaffle.main.locations", ["location_id", "location_name"]);
    ManifestStore::new(vec![orders, locations], metrics, columns)
}
