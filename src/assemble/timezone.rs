//! Time zone conversion of Cube time dimensions.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Warehouse the generated SQL runs on; selects the conversion function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetDatabase {
    BigQuery,
    Snowflake,
}

impl FromStr for TargetDatabase {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bigquery" => Ok(TargetDatabase::BigQuery),
            "snowflake" => Ok(TargetDatabase::Snowflake),
            other => Err(format!(
                "unsupported target database '{other}' (expected bigquery or snowflake)"
            )),
        }
    }
}

impl fmt::Display for TargetDatabase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetDatabase::BigQuery => f.write_str("bigquery"),
            TargetDatabase::Snowflake => f.write_str("snowflake"),
        }
    }
}

/// Converts time dimension SQL into a fixed time zone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimezoneConversion {
    pub timezone: String,
    pub database: TargetDatabase,
}

impl TimezoneConversion {
    pub fn new(timezone: impl Into<String>, database: TargetDatabase) -> Self {
        Self {
            timezone: timezone.into(),
            database,
        }
    }

    pub fn apply(&self, sql: &str) -> String {
        match self.database {
            TargetDatabase::BigQuery => format!("TIMESTAMP({sql}, '{}')", self.timezone),
            TargetDatabase::Snowflake => format!("CONVERT_TIMEZONE('{}', {sql})", self.timezone),
        }
    }
}
