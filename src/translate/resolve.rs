//! Reference resolution.
//!
//! Maps `entity__field` and bare `entity` references onto the semantic model
//! that owns them. Models are linked only through shared entity names, so the
//! same entity may be declared primary by several unrelated models (e.g.
//! `location_id` on both `locations` and a `location_targets` table). The
//! candidates are narrowed to the models that also declare the field; if more
//! than one remains the manifest is ambiguous and the reference is rejected.

use crate::dialect::TargetDialect;
use crate::manifest::{ManifestStore, SemanticModel};

use super::error::{ResolveError, ResolveResult};
use super::reference::Reference;

/// A resolved reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QualifiedRef {
    /// Model declaring the field.
    pub owning_model: String,
    /// Field name within the owning model.
    pub field: String,
    /// True when the owning model is the model being translated.
    pub same_model: bool,
    /// True for physical columns of the model's own table.
    pub is_column: bool,
}

impl QualifiedRef {
    /// `field` within the same model, otherwise `owning_model.field`.
    pub fn qualified(&self) -> String {
        if self.same_model {
            self.field.clone()
        } else {
            self.fully_qualified()
        }
    }

    /// Always `owning_model.field`.
    pub fn fully_qualified(&self) -> String {
        format!("{}.{}", self.owning_model, self.field)
    }

    /// Render in a dialect's reference syntax.
    pub fn render(&self, dialect: &dyn TargetDialect) -> String {
        if self.is_column {
            dialect.render_column(&self.field)
        } else if self.same_model {
            dialect.render_field(None, &self.field)
        } else {
            dialect.render_field(Some(&self.owning_model), &self.field)
        }
    }
}

/// Resolves references against a manifest store.
#[derive(Debug, Clone, Copy)]
pub struct ReferenceResolver<'a> {
    store: &'a ManifestStore,
}

impl<'a> ReferenceResolver<'a> {
    pub fn new(store: &'a ManifestStore) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &'a ManifestStore {
        self.store
    }

    /// Parse and resolve reference text such as `order_id__discount_code`.
    pub fn resolve_str(&self, reference: &str, from_model: &str) -> ResolveResult<QualifiedRef> {
        self.resolve(&Reference::parse(reference)?, from_model)
    }

    /// Resolve a reference appearing in `from_model`.
    pub fn resolve(&self, reference: &Reference, from_model: &str) -> ResolveResult<QualifiedRef> {
        match reference {
            Reference::Column { name } => Ok(QualifiedRef {
                owning_model: from_model.to_string(),
                field: name.clone(),
                same_model: true,
                is_column: true,
            }),
            Reference::Entity { entity } => {
                let candidates = self.primary_candidates(entity);
                // A model may refer to its own primary key even when other
                // models share the entity name.
                let owner = if candidates.iter().any(|m| m.name == from_model) {
                    Some(from_model)
                } else {
                    self.single(reference, &candidates)?
                };
                self.qualify(reference, owner, entity, from_model)
            }
            Reference::Field { entity, field } => {
                let candidates: Vec<&SemanticModel> = self
                    .primary_candidates(entity)
                    .into_iter()
                    .filter(|m| m.declares_field(field))
                    .collect();
                let owner = self.single(reference, &candidates)?;
                self.qualify(reference, owner, field, from_model)
            }
        }
    }

    /// Models declaring `entity` as primary, in declaration order.
    fn primary_candidates(&self, entity: &str) -> Vec<&'a SemanticModel> {
        self.store
            .models()
            .iter()
            .filter(|m| m.has_primary_entity(entity))
            .collect()
    }

    fn single<'m>(
        &self,
        reference: &Reference,
        candidates: &[&'m SemanticModel],
    ) -> ResolveResult<Option<&'m str>> {
        match candidates {
            [] => Ok(None),
            [model] => Ok(Some(model.name.as_str())),
            many => Err(ResolveError::Ambiguous {
                reference: reference.to_string(),
                models: many.iter().map(|m| m.name.clone()).collect(),
            }),
        }
    }

    fn qualify(
        &self,
        reference: &Reference,
        owner: Option<&str>,
        field: &str,
        from_model: &str,
    ) -> ResolveResult<QualifiedRef> {
        let owner = owner.ok_or_else(|| ResolveError::Unresolved {
            reference: reference.to_string(),
            model: from_model.to_string(),
        })?;
        Ok(QualifiedRef {
            owning_model: owner.to_string(),
            field: field.to_string(),
            same_model: owner == from_model,
            is_column: false,
        })
    }
}
