//! In-memory manifest store.
//!
//! Holds semantic models, metrics and physical column metadata for one
//! translation run. The store is built once and only read afterwards;
//! translation components borrow it rather than consulting global state.

use std::collections::{HashMap, HashSet};

use super::types::{Measure, Metric, SemanticModel};

/// Physical columns per relation name, taken from the dbt build manifest.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PhysicalColumnIndex {
    relations: HashMap<String, HashSet<String>>,
}

impl PhysicalColumnIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the columns of a relation, replacing any previous entry.
    pub fn insert<I, S>(&mut self, relation_name: impl Into<String>, columns: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.relations.insert(
            relation_name.into(),
            columns.into_iter().map(Into::into).collect(),
        );
    }

    pub fn with_relation<I, S>(mut self, relation_name: impl Into<String>, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.insert(relation_name, columns);
        self
    }

    /// Columns of a relation, matched by exact relation name.
    pub fn columns(&self, relation_name: &str) -> Option<&HashSet<String>> {
        self.relations.get(relation_name)
    }

    pub fn is_empty(&self) -> bool {
        self.relations.is_empty()
    }

    pub fn len(&self) -> usize {
        self.relations.len()
    }
}

/// A measure together with the model that declares it.
#[derive(Debug, Clone, Copy)]
pub struct OwnedMeasure<'a> {
    pub measure: &'a Measure,
    pub model: &'a SemanticModel,
}

impl OwnedMeasure<'_> {
    pub fn owning_model(&self) -> &str {
        &self.model.name
    }
}

/// Lookup-capable collection of everything loaded from the manifests.
#[derive(Debug, Clone, Default)]
pub struct ManifestStore {
    models: Vec<SemanticModel>,
    metrics: Vec<Metric>,
    columns: PhysicalColumnIndex,
    model_index: HashMap<String, usize>,
    metric_index: HashMap<String, usize>,
    /// measure name -> (model position, measure position); first declaration wins.
    measure_index: HashMap<String, (usize, usize)>,
}

impl ManifestStore {
    pub fn new(
        models: Vec<SemanticModel>,
        metrics: Vec<Metric>,
        columns: PhysicalColumnIndex,
    ) -> Self {
        let mut store = Self::default();
        store.load(models, metrics, columns);
        store
    }

    /// Replace all state with the given manifests.
    pub fn load(
        &mut self,
        models: Vec<SemanticModel>,
        metrics: Vec<Metric>,
        columns: PhysicalColumnIndex,
    ) {
        let mut model_index = HashMap::with_capacity(models.len());
        let mut measure_index = HashMap::new();
        for (mi, model) in models.iter().enumerate() {
            model_index.entry(model.name.clone()).or_insert(mi);
            for (pi, measure) in model.measures.iter().enumerate() {
                measure_index.entry(measure.name.clone()).or_insert((mi, pi));
            }
        }

        let mut metric_index = HashMap::with_capacity(metrics.len());
        for (i, metric) in metrics.iter().enumerate() {
            metric_index.entry(metric.name.clone()).or_insert(i);
        }

        self.models = models;
        self.metrics = metrics;
        self.columns = columns;
        self.model_index = model_index;
        self.metric_index = metric_index;
        self.measure_index = measure_index;
    }

    /// Semantic models in manifest declaration order.
    pub fn models(&self) -> &[SemanticModel] {
        &self.models
    }

    /// Metrics in manifest declaration order.
    pub fn metrics(&self) -> &[Metric] {
        &self.metrics
    }

    pub fn model_by_name(&self, name: &str) -> Option<&SemanticModel> {
        self.model_index.get(name).map(|&i| &self.models[i])
    }

    pub fn metric_by_name(&self, name: &str) -> Option<&Metric> {
        self.metric_index.get(name).map(|&i| &self.metrics[i])
    }

    /// Look up a measure across all models; the first declaring model wins.
    pub fn measure_by_name(&self, name: &str) -> Option<OwnedMeasure<'_>> {
        self.measure_index.get(name).map(|&(mi, pi)| {
            let model = &self.models[mi];
            OwnedMeasure {
                measure: &model.measures[pi],
                model,
            }
        })
    }

    /// Every measure, flattened across models, keyed by name.
    pub fn measures_by_name(&self) -> HashMap<&str, OwnedMeasure<'_>> {
        self.measure_index
            .iter()
            .map(|(name, &(mi, pi))| {
                let model = &self.models[mi];
                (
                    name.as_str(),
                    OwnedMeasure {
                        measure: &model.measures[pi],
                        model,
                    },
                )
            })
            .collect()
    }

    pub fn column_index(&self) -> &PhysicalColumnIndex {
        &self.columns
    }

    /// Physical columns of a model's backing relation, when known.
    pub fn physical_columns(&self, model: &SemanticModel) -> Option<&HashSet<String>> {
        self.columns.columns(model.physical_relation()?)
    }
}
