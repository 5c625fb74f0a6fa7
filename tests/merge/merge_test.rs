use mf_translate::merge::{merge_dbt_yaml, merge_values, MergeError};
use serde_yaml::Value;

fn yaml(text: &str) -> Value {
    serde_yaml::from_str(text).unwrap()
}

const EXISTING: &str = r#"
version: 2
models:
  - name: orders
    description: One row per order
    columns:
      - name: order_id
        description: Primary key
        tests: [unique, not_null]
      - name: discount_code
  - name: customers
    description: Customer dimension
"#;

const GENERATED: &str = r#"
version: 2
models:
  - name: orders
    meta:
      metrics:
        order_total:
          type: sum
          sql: ${TABLE}.order_total
    columns:
      - name: order_id
        meta:
          dimension:
            hidden: true
      - name: ordered_at
        meta:
          dimension:
            type: timestamp
"#;

#[test]
fn test_generated_metadata_merges_into_existing_schema() {
    let merged = yaml(&merge_dbt_yaml(EXISTING, GENERATED).unwrap());

    let models = merged["models"].as_sequence().unwrap();
    assert_eq!(models.len(), 2);

    let orders = &models[0];
    assert_eq!(orders["description"], Value::from("One row per order"));
    assert_eq!(
        orders["meta"]["metrics"]["order_total"]["sql"],
        Value::from("${TABLE}.order_total")
    );

    let columns = orders["columns"].as_sequence().unwrap();
    let names: Vec<&str> = columns.iter().filter_map(|c| c["name"].as_str()).collect();
    assert_eq!(names, vec!["order_id", "discount_code", "ordered_at"]);

    // Existing keys survive, new keys are added.
    assert_eq!(columns[0]["description"], Value::from("Primary key"));
    assert_eq!(columns[0]["tests"], yaml("[unique, not_null]"));
    assert_eq!(columns[0]["meta"]["dimension"]["hidden"], Value::from(true));

    assert_eq!(models[1]["name"], Value::from("customers"));
}

#[test]
fn test_update_scalars_win() {
    let merged = yaml(&merge_dbt_yaml("version: 1\nname: a\n", "version: 2\n").unwrap());
    assert_eq!(merged, yaml("version: 2\nname: a"));
}

#[test]
fn test_merge_is_stable_when_reapplied() {
    let once = merge_dbt_yaml(EXISTING, GENERATED).unwrap();
    let twice = merge_dbt_yaml(&once, GENERATED).unwrap();
    assert_eq!(yaml(&once), yaml(&twice));
}

#[test]
fn test_nested_named_lists() {
    let mut source = yaml(
        r#"
sources:
  - name: raw
    tables:
      - name: orders
        loaded_at_field: _loaded_at
"#,
    );
    merge_values(
        &mut source,
        yaml(
            r#"
sources:
  - name: raw
    tables:
      - name: orders
        freshness: {warn_after: {count: 12, period: hour}}
      - name: customers
"#,
        ),
    );
    let tables = source["sources"][0]["tables"].as_sequence().unwrap();
    assert_eq!(tables.len(), 2);
    assert_eq!(tables[0]["loaded_at_field"], Value::from("_loaded_at"));
    assert_eq!(tables[0]["freshness"]["warn_after"]["count"], Value::from(12));
}

#[test]
fn test_invalid_documents() {
    assert!(matches!(
        merge_dbt_yaml("models: [", "version: 2").unwrap_err(),
        MergeError::Parse { document: "source", .. }
    ));
    assert!(matches!(
        merge_dbt_yaml("version: 2", "just a string").unwrap_err(),
        MergeError::NotMapping { document: "update" }
    ));
}
