//! Structural YAML merge.
//!
//! Merges generated dbt schema fragments into existing schema files:
//!
//! - mappings merge key by key, recursively
//! - lists whose items are all mappings with a `name` key merge item by item,
//!   matched on `name`; unmatched update items are appended
//! - any other value, including other lists, is replaced by the update
//!
//! Keys and list items only present in the source are kept.

use serde_yaml::{Mapping, Value};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MergeError {
    #[error("Failed to parse {document} YAML: {source}")]
    Parse {
        document: &'static str,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("The {document} YAML must be a mapping at the top level")]
    NotMapping { document: &'static str },

    #[error("Failed to write merged YAML: {0}")]
    Serialize(#[from] serde_yaml::Error),
}

pub type MergeResult<T> = Result<T, MergeError>;

/// Merge `update` into `source` in place.
pub fn merge_values(source: &mut Value, update: Value) {
    match (source, update) {
        (Value::Mapping(source), Value::Mapping(update)) => merge_mappings(source, update),
        (Value::Sequence(source), Value::Sequence(update)) if all_named(&source[..], &update) => {
            merge_named_lists(source, update)
        }
        (source, update) => *source = update,
    }
}

fn merge_mappings(source: &mut Mapping, update: Mapping) {
    for (key, value) in update {
        match source.get_mut(&key) {
            Some(existing) => merge_values(existing, value),
            None => {
                source.insert(key, value);
            }
        }
    }
}

fn item_name(item: &Value) -> Option<&Value> {
    item.as_mapping()?.get("name")
}

fn all_named(source: &[Value], update: &[Value]) -> bool {
    source.iter().chain(update).all(|item| item_name(item).is_some())
}

fn merge_named_lists(source: &mut Vec<Value>, update: Vec<Value>) {
    for item in update {
        let position = item_name(&item)
            .and_then(|name| source.iter().position(|s| item_name(s) == Some(name)));
        match position {
            Some(i) => merge_values(&mut source[i], item),
            None => source.push(item),
        }
    }
}

fn parse_root(yaml: &str, document: &'static str) -> MergeResult<Value> {
    let value: Value =
        serde_yaml::from_str(yaml).map_err(|source| MergeError::Parse { document, source })?;
    match value {
        Value::Null => Ok(Value::Mapping(Mapping::new())),
        Value::Mapping(_) => Ok(value),
        _ => Err(MergeError::NotMapping { document }),
    }
}

/// Merge two dbt schema YAML documents and return the merged YAML.
pub fn merge_dbt_yaml(source_yaml: &str, update_yaml: &str) -> MergeResult<String> {
    let mut source = parse_root(source_yaml, "source")?;
    let update = parse_root(update_yaml, "update")?;
    merge_values(&mut source, update);
    Ok(serde_yaml::to_string(&source)?)
}
