//! Semantic manifest types.
//!
//! These mirror the MetricFlow `semantic_manifest.json` layout closely enough
//! to deserialize it directly, while exposing the accessors the translation
//! engine works with (`physical_relation()`, `filters()`, `granularity()`, ...).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

/// Treat an explicit JSON `null` the same as a missing key.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// ============================================================================
// Semantic models
// ============================================================================

/// The physical table backing a semantic model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeRelation {
    pub relation_name: String,
    #[serde(default)]
    pub alias: Option<String>,
    #[serde(default)]
    pub schema_name: Option<String>,
    #[serde(default)]
    pub database: Option<String>,
}

/// A named table-like entity: entities, dimensions and measures over one relation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SemanticModel {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub node_relation: Option<NodeRelation>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub entities: Vec<Entity>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub dimensions: Vec<Dimension>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub measures: Vec<Measure>,
}

impl SemanticModel {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            node_relation: None,
            entities: Vec::new(),
            dimensions: Vec::new(),
            measures: Vec::new(),
        }
    }

    pub fn with_relation(mut self, relation_name: impl Into<String>) -> Self {
        self.node_relation = Some(NodeRelation {
            relation_name: relation_name.into(),
            alias: None,
            schema_name: None,
            database: None,
        });
        self
    }

    pub fn with_entity(mut self, entity: Entity) -> Self {
        self.entities.push(entity);
        self
    }

    pub fn with_dimension(mut self, dimension: Dimension) -> Self {
        self.dimensions.push(dimension);
        self
    }

    pub fn with_measure(mut self, measure: Measure) -> Self {
        self.measures.push(measure);
        self
    }

    /// Name of the backing table, if the model declares one.
    pub fn physical_relation(&self) -> Option<&str> {
        self.node_relation.as_ref().map(|r| r.relation_name.as_str())
    }

    pub fn entity(&self, name: &str) -> Option<&Entity> {
        self.entities.iter().find(|e| e.name == name)
    }

    pub fn dimension(&self, name: &str) -> Option<&Dimension> {
        self.dimensions.iter().find(|d| d.name == name)
    }

    pub fn measure(&self, name: &str) -> Option<&Measure> {
        self.measures.iter().find(|m| m.name == name)
    }

    /// Whether this model declares `name` as a primary entity.
    pub fn has_primary_entity(&self, name: &str) -> bool {
        self.entities
            .iter()
            .any(|e| e.name == name && e.kind == EntityKind::Primary)
    }

    /// Whether `field` names a dimension or an entity of this model.
    pub fn declares_field(&self, field: &str) -> bool {
        self.dimension(field).is_some() || self.entity(field).is_some()
    }
}

/// Entity kinds. `natural` entities are accepted so MetricFlow manifests load,
/// but only `primary` entities take part in reference resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Primary,
    Foreign,
    Unique,
    Natural,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: EntityKind,
    #[serde(default)]
    pub expr: Option<String>,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl Entity {
    pub fn new(name: impl Into<String>, kind: EntityKind) -> Self {
        Self {
            name: name.into(),
            kind,
            expr: None,
            label: None,
            description: None,
        }
    }

    pub fn primary(name: impl Into<String>) -> Self {
        Self::new(name, EntityKind::Primary)
    }

    pub fn foreign(name: impl Into<String>) -> Self {
        Self::new(name, EntityKind::Foreign)
    }

    pub fn with_expr(mut self, expr: impl Into<String>) -> Self {
        self.expr = Some(expr.into());
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// The SQL for this entity: `expr` when given, otherwise the entity name.
    pub fn sql(&self) -> &str {
        self.expr.as_deref().unwrap_or(&self.name)
    }

    pub fn is_primary(&self) -> bool {
        self.kind == EntityKind::Primary
    }
}

// ============================================================================
// Dimensions
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DimensionKind {
    Categorical,
    Time,
}

/// Time granularities in their fixed coarsening order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TimeGranularity {
    Day,
    Week,
    Month,
    Quarter,
    Year,
}

impl TimeGranularity {
    pub const ALL: [TimeGranularity; 5] = [
        TimeGranularity::Day,
        TimeGranularity::Week,
        TimeGranularity::Month,
        TimeGranularity::Quarter,
        TimeGranularity::Year,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TimeGranularity::Day => "day",
            TimeGranularity::Week => "week",
            TimeGranularity::Month => "month",
            TimeGranularity::Quarter => "quarter",
            TimeGranularity::Year => "year",
        }
    }

    /// This granularity and every coarser one, finest first.
    pub fn and_coarser(&self) -> &'static [TimeGranularity] {
        let start = Self::ALL.iter().position(|g| g == self).unwrap_or(0);
        &Self::ALL[start..]
    }
}

impl FromStr for TimeGranularity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "day" => Ok(TimeGranularity::Day),
            "week" => Ok(TimeGranularity::Week),
            "month" => Ok(TimeGranularity::Month),
            "quarter" => Ok(TimeGranularity::Quarter),
            "year" => Ok(TimeGranularity::Year),
            other => Err(format!("unsupported time granularity '{other}'")),
        }
    }
}

impl fmt::Display for TimeGranularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DimensionTypeParams {
    #[serde(default)]
    pub time_granularity: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dimension {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: DimensionKind,
    #[serde(default)]
    pub expr: Option<String>,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub type_params: Option<DimensionTypeParams>,
}

impl Dimension {
    pub fn categorical(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: DimensionKind::Categorical,
            expr: None,
            label: None,
            description: None,
            type_params: None,
        }
    }

    pub fn time(name: impl Into<String>, granularity: Option<TimeGranularity>) -> Self {
        Self {
            name: name.into(),
            kind: DimensionKind::Time,
            expr: None,
            label: None,
            description: None,
            type_params: granularity.map(|g| DimensionTypeParams {
                time_granularity: Some(g.as_str().to_string()),
            }),
        }
    }

    pub fn with_expr(mut self, expr: impl Into<String>) -> Self {
        self.expr = Some(expr.into());
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn is_time(&self) -> bool {
        self.kind == DimensionKind::Time
    }

    /// Declared granularity of a time dimension.
    ///
    /// Granularities outside day..year (e.g. `hour`) are treated as absent.
    pub fn granularity(&self) -> Option<TimeGranularity> {
        if !self.is_time() {
            return None;
        }
        self.type_params
            .as_ref()?
            .time_granularity
            .as_deref()?
            .parse()
            .ok()
    }
}

// ============================================================================
// Measures
// ============================================================================

/// Measure aggregation. Unrecognised names are preserved in `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Aggregation {
    Count,
    CountDistinct,
    Sum,
    SumBoolean,
    Min,
    Max,
    Average,
    Median,
    Percentile,
    Other(String),
}

impl Aggregation {
    pub fn as_str(&self) -> &str {
        match self {
            Aggregation::Count => "count",
            Aggregation::CountDistinct => "count_distinct",
            Aggregation::Sum => "sum",
            Aggregation::SumBoolean => "sum_boolean",
            Aggregation::Min => "min",
            Aggregation::Max => "max",
            Aggregation::Average => "average",
            Aggregation::Median => "median",
            Aggregation::Percentile => "percentile",
            Aggregation::Other(name) => name,
        }
    }
}

impl From<String> for Aggregation {
    fn from(s: String) -> Self {
        match s.to_ascii_lowercase().as_str() {
            "count" => Aggregation::Count,
            "count_distinct" => Aggregation::CountDistinct,
            "sum" => Aggregation::Sum,
            "sum_boolean" => Aggregation::SumBoolean,
            "min" => Aggregation::Min,
            "max" => Aggregation::Max,
            "average" | "avg" => Aggregation::Average,
            "median" => Aggregation::Median,
            "percentile" => Aggregation::Percentile,
            _ => Aggregation::Other(s),
        }
    }
}

impl From<Aggregation> for String {
    fn from(agg: Aggregation) -> Self {
        agg.as_str().to_string()
    }
}

impl fmt::Display for Aggregation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measure {
    pub name: String,
    pub agg: Aggregation,
    #[serde(default)]
    pub expr: Option<String>,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl Measure {
    pub fn new(name: impl Into<String>, agg: Aggregation) -> Self {
        Self {
            name: name.into(),
            agg,
            expr: None,
            label: None,
            description: None,
        }
    }

    pub fn with_expr(mut self, expr: impl Into<String>) -> Self {
        self.expr = Some(expr.into());
        self
    }

    /// The SQL being aggregated: `expr` when given, otherwise the measure name.
    pub fn sql(&self) -> &str {
        self.expr.as_deref().unwrap_or(&self.name)
    }
}

// ============================================================================
// Metrics
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum MetricKind {
    Simple,
    Ratio,
    Conversion,
    Cumulative,
    Derived,
    Other(String),
}

impl MetricKind {
    pub fn as_str(&self) -> &str {
        match self {
            MetricKind::Simple => "simple",
            MetricKind::Ratio => "ratio",
            MetricKind::Conversion => "conversion",
            MetricKind::Cumulative => "cumulative",
            MetricKind::Derived => "derived",
            MetricKind::Other(name) => name,
        }
    }
}

impl From<String> for MetricKind {
    fn from(s: String) -> Self {
        match s.to_ascii_lowercase().as_str() {
            "simple" => MetricKind::Simple,
            "ratio" => MetricKind::Ratio,
            "conversion" => MetricKind::Conversion,
            "cumulative" => MetricKind::Cumulative,
            "derived" => MetricKind::Derived,
            _ => MetricKind::Other(s),
        }
    }
}

impl From<MetricKind> for String {
    fn from(kind: MetricKind) -> Self {
        kind.as_str().to_string()
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A raw SQL boolean predicate, possibly containing `{{ Dimension(...) }}` references.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WhereFilter {
    #[serde(rename = "where_sql_template")]
    pub template: String,
}

impl WhereFilter {
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricFilter {
    #[serde(default, deserialize_with = "null_as_default")]
    pub where_filters: Vec<WhereFilter>,
}

impl MetricFilter {
    pub fn new(where_filters: Vec<WhereFilter>) -> Self {
        Self { where_filters }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeasureReference {
    pub name: String,
}

/// The numerator or denominator of a ratio metric.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricInput {
    pub name: String,
    #[serde(default)]
    pub filter: Option<MetricFilter>,
}

impl MetricInput {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            filter: None,
        }
    }

    pub fn with_filter(mut self, template: impl Into<String>) -> Self {
        self.filter
            .get_or_insert_with(MetricFilter::default)
            .where_filters
            .push(WhereFilter::new(template));
        self
    }

    pub fn filters(&self) -> &[WhereFilter] {
        self.filter
            .as_ref()
            .map(|f| f.where_filters.as_slice())
            .unwrap_or(&[])
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricTypeParams {
    #[serde(default)]
    pub measure: Option<MeasureReference>,
    #[serde(default)]
    pub numerator: Option<MetricInput>,
    #[serde(default)]
    pub denominator: Option<MetricInput>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub input_measures: Vec<MeasureReference>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metric {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: MetricKind,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub filter: Option<MetricFilter>,
    #[serde(default)]
    pub type_params: MetricTypeParams,
}

impl Metric {
    fn with_kind(name: impl Into<String>, kind: MetricKind) -> Self {
        Self {
            name: name.into(),
            kind,
            label: None,
            description: None,
            filter: None,
            type_params: MetricTypeParams::default(),
        }
    }

    /// A simple metric over one measure.
    pub fn simple(name: impl Into<String>, measure: impl Into<String>) -> Self {
        let measure = measure.into();
        let mut metric = Self::with_kind(name, MetricKind::Simple);
        metric.type_params.measure = Some(MeasureReference {
            name: measure.clone(),
        });
        metric.type_params.input_measures = vec![MeasureReference { name: measure }];
        metric
    }

    /// A ratio metric over two other metrics.
    pub fn ratio(name: impl Into<String>, numerator: MetricInput, denominator: MetricInput) -> Self {
        let mut metric = Self::with_kind(name, MetricKind::Ratio);
        metric.type_params.numerator = Some(numerator);
        metric.type_params.denominator = Some(denominator);
        metric
    }

    /// A metric of any other kind, carrying no type params.
    pub fn of_kind(name: impl Into<String>, kind: MetricKind) -> Self {
        Self::with_kind(name, kind)
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_filter(mut self, template: impl Into<String>) -> Self {
        self.filter
            .get_or_insert_with(MetricFilter::default)
            .where_filters
            .push(WhereFilter::new(template));
        self
    }

    pub fn with_input_measures(mut self, measures: &[&str]) -> Self {
        self.type_params.input_measures = measures
            .iter()
            .map(|m| MeasureReference {
                name: (*m).to_string(),
            })
            .collect();
        self
    }

    /// Metric-level where filters, in declaration order.
    pub fn filters(&self) -> &[WhereFilter] {
        self.filter
            .as_ref()
            .map(|f| f.where_filters.as_slice())
            .unwrap_or(&[])
    }

    pub fn measure_name(&self) -> Option<&str> {
        self.type_params.measure.as_ref().map(|m| m.name.as_str())
    }
}
