//! View assembly.

use thiserror::Error;
use tracing::{debug, info};

use crate::compose::{Composer, Composition, Diagnostic, FilterStyle};
use crate::dialect::{Dialect, TargetDialect};
use crate::manifest::{Dimension, Entity, ManifestStore, Metric, SemanticModel};
use crate::translate::{ExpressionTranslator, ResolveError};

use super::timezone::TimezoneConversion;
use super::view::{DialectView, ViewDimension};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum AssembleError {
    #[error("Unknown semantic model '{name}'")]
    UnknownModel { name: String },

    /// An entity or dimension expression failed to translate.
    #[error("Failed to translate model '{model}': {source}")]
    Resolve {
        model: String,
        #[source]
        source: ResolveError,
    },
}

pub type AssembleResult<T> = Result<T, AssembleError>;

/// Dialect-independent assembly settings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssembleOptions {
    /// Name of the emitted view/cube; defaults to the model name.
    pub view_name: Option<String>,
    pub filter_style: FilterStyle,
    /// Time zone applied to Cube time dimensions.
    pub timezone: Option<TimezoneConversion>,
}

impl AssembleOptions {
    pub fn with_view_name(mut self, name: impl Into<String>) -> Self {
        self.view_name = Some(name.into());
        self
    }

    pub fn with_filter_style(mut self, filter_style: FilterStyle) -> Self {
        self.filter_style = filter_style;
        self
    }

    pub fn with_timezone(mut self, timezone: TimezoneConversion) -> Self {
        self.timezone = Some(timezone);
        self
    }
}

/// Assembles views for one dialect.
#[derive(Debug, Clone)]
pub struct ViewAssembler<'a> {
    store: &'a ManifestStore,
    composer: Composer<'a>,
    translator: ExpressionTranslator<'a>,
    options: AssembleOptions,
}

impl<'a> ViewAssembler<'a> {
    pub fn new(store: &'a ManifestStore, dialect: Dialect) -> Self {
        Self::with_options(store, dialect, AssembleOptions::default())
    }

    pub fn with_options(store: &'a ManifestStore, dialect: Dialect, options: AssembleOptions) -> Self {
        Self {
            store,
            composer: Composer::new(store, dialect).with_filter_style(options.filter_style),
            translator: ExpressionTranslator::new(store, dialect),
            options,
        }
    }

    pub fn dialect(&self) -> Dialect {
        self.translator.dialect()
    }

    pub fn composer(&self) -> &Composer<'a> {
        &self.composer
    }

    /// Assemble the view of the model named `model`.
    pub fn assemble(&self, model: &str) -> AssembleResult<DialectView> {
        let model = self
            .store
            .model_by_name(model)
            .ok_or_else(|| AssembleError::UnknownModel {
                name: model.to_string(),
            })?;
        let composition = self.composer.compose_all();
        self.assemble_with(model, &composition)
    }

    /// Assemble every model, composing metrics once.
    pub fn assemble_all(&self) -> AssembleResult<Vec<DialectView>> {
        let composition = self.composer.compose_all();
        self.store
            .models()
            .iter()
            .map(|model| self.assemble_with(model, &composition))
            .collect()
    }

    /// Assemble a model's view from an existing composition.
    pub fn assemble_with(
        &self,
        model: &SemanticModel,
        composition: &Composition,
    ) -> AssembleResult<DialectView> {
        let dialect = self.dialect();
        let resolve_error = |source| AssembleError::Resolve {
            model: model.name.clone(),
            source,
        };

        let mut view = DialectView {
            name: self
                .options
                .view_name
                .clone()
                .unwrap_or_else(|| model.name.clone()),
            model: model.name.clone(),
            dialect,
            table: model.physical_relation().map(str::to_string),
            dimension_groups: Vec::new(),
            dimensions: Vec::new(),
            measures: Vec::new(),
            diagnostics: Vec::new(),
        };

        for entity in &model.entities {
            let dimension = self.entity_dimension(entity, model).map_err(resolve_error)?;
            view.dimensions.push(dimension);
        }

        for dimension in &model.dimensions {
            let translated = self.dimension(dimension, model).map_err(resolve_error)?;
            if translated.is_time() && dialect.uses_dimension_groups() {
                view.dimension_groups.push(translated);
            } else {
                view.dimensions.push(translated);
            }
        }

        view.measures = composition.measures_for(&model.name).cloned().collect();
        view.diagnostics = self.diagnostics_for(model, composition);

        info!(
            model = %model.name,
            dialect = %dialect,
            dimensions = view.dimensions.len(),
            dimension_groups = view.dimension_groups.len(),
            measures = view.measures.len(),
            skipped = view.diagnostics.len(),
            "assembled view"
        );
        Ok(view)
    }

    fn entity_dimension(
        &self,
        entity: &Entity,
        model: &SemanticModel,
    ) -> Result<ViewDimension, ResolveError> {
        let dialect = self.dialect();
        let sql = match &entity.expr {
            Some(expr) => Some(self.translator.translate(expr, model)?),
            None if dialect.entity_sql_defaults_to_name() => Some(entity.name.clone()),
            None => None,
        };

        let mut dimension = ViewDimension::new(&entity.name);
        dimension.label = entity.label.clone();
        dimension.description = non_empty(&entity.description);
        dimension.sql = sql;
        dimension.dimension_type = dialect.entity_type().map(str::to_string);
        dimension.hidden = true;
        dimension.primary_key = entity.is_primary();
        Ok(dimension)
    }

    fn dimension(
        &self,
        source: &Dimension,
        model: &SemanticModel,
    ) -> Result<ViewDimension, ResolveError> {
        let dialect = self.dialect();
        let granularity = source.granularity();

        let sql = match &source.expr {
            Some(expr) => {
                let sql = self.translator.translate(expr, model)?;
                Some(self.wrap_dimension_sql(sql, source.is_time()))
            }
            None if dialect.dimension_sql_defaults_to_name() => Some(source.name.clone()),
            None => None,
        };

        let mut dimension = ViewDimension::new(&source.name);
        dimension.label = non_empty(&source.label);
        dimension.description = non_empty(&source.description);
        dimension.sql = sql;
        if source.is_time() {
            dimension.dimension_type = Some(dialect.time_type(granularity.is_some()).to_string());
            dimension.timeframes = granularity
                .map(|g| {
                    g.and_coarser()
                        .iter()
                        .map(|&g| dialect.timeframe(g).to_string())
                        .collect()
                })
                .unwrap_or_default();
        } else {
            dimension.dimension_type = Some(dialect.categorical_type().to_string());
        }
        Ok(dimension)
    }

    /// Cube: time zone conversion for time dimensions, parentheses around
    /// multi-token SQL otherwise.
    fn wrap_dimension_sql(&self, sql: String, is_time: bool) -> String {
        if !self.dialect().parenthesize_dimension_sql() {
            return sql;
        }
        match &self.options.timezone {
            Some(timezone) if is_time => timezone.apply(&sql),
            _ if sql.split_whitespace().nth(1).is_some() => format!("({sql})"),
            _ => sql,
        }
    }

    /// Diagnostics of metrics whose measures live in `model`. Metrics whose
    /// owner cannot be determined are reported on every view.
    fn diagnostics_for(&self, model: &SemanticModel, composition: &Composition) -> Vec<Diagnostic> {
        composition
            .diagnostics
            .iter()
            .filter(|d| match self.store.metric_by_name(&d.subject) {
                Some(metric) => match self.metric_owner(metric) {
                    Some(owner) => owner == model.name,
                    None => true,
                },
                None => true,
            })
            .inspect(|d| debug!(model = %model.name, metric = %d.subject, "attaching diagnostic"))
            .cloned()
            .collect()
    }

    /// Model declaring the first measure a metric depends on.
    fn metric_owner(&self, metric: &Metric) -> Option<&'a str> {
        let measure = metric
            .measure_name()
            .or_else(|| metric.type_params.input_measures.first().map(|m| m.name.as_str()))?;
        self.store
            .measure_by_name(measure)
            .map(|owned| owned.model.name.as_str())
    }
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value.as_ref().filter(|v| !v.is_empty()).cloned()
}
