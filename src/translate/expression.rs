//! SQL expression rewriting.
//!
//! Expressions are rewritten with regular expressions rather than a SQL
//! lexer, in two passes:
//!
//! 1. Bare words that are physical columns of the model's table become
//!    `${TABLE}.col` / `{CUBE}.col`. Text inside `{{ ... }}` template markers
//!    and already-rendered `${...}` / `{...}` references is skipped.
//! 2. `{{ Dimension('entity__field') }}` and `{{ Entity('entity') }}` markers
//!    are resolved and replaced with the dialect's field reference. Any other
//!    `{{ ... }}` marker (`TimeDimension`, `Metric`, ...) is rejected.
//!
//! Word matching is coarse: a SQL keyword that is also a column name of the
//! table will be qualified too.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::dialect::{Dialect, TargetDialect};
use crate::manifest::{ManifestStore, SemanticModel};

use super::error::{ResolveError, ResolveResult};
use super::reference::Reference;
use super::resolve::ReferenceResolver;

/// Template markers and rendered references (including a `.col` suffix, as in
/// `${TABLE}.col`), left alone by column qualification.
static PROTECTED_SEGMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{\{.*?\}\}|\$?\{[^{}]*\}(?:\.\w+)?").unwrap());

static WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\w+").unwrap());

static TEMPLATE_MARKER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{\{.*?\}\}").unwrap());

/// `{{ Dimension('entity__field') }}` / `{{ Entity('entity') }}`, whitespace tolerant.
static TEMPLATE_REFERENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"^\{\{\s*(Dimension|Entity)\s*\(\s*['"]([^'"]+?)['"]\s*\)\s*\}\}$"#).unwrap()
});

/// Rewrites MetricFlow SQL expressions into one target dialect.
#[derive(Debug, Clone, Copy)]
pub struct ExpressionTranslator<'a> {
    resolver: ReferenceResolver<'a>,
    dialect: Dialect,
}

impl<'a> ExpressionTranslator<'a> {
    pub fn new(store: &'a ManifestStore, dialect: Dialect) -> Self {
        Self {
            resolver: ReferenceResolver::new(store),
            dialect,
        }
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    pub fn resolver(&self) -> &ReferenceResolver<'a> {
        &self.resolver
    }

    /// Translate an expression written in `from_model`.
    pub fn translate(&self, expression: &str, from_model: &SemanticModel) -> ResolveResult<String> {
        let mut expression = expression.trim().to_string();
        if self.dialect.single_line_sql() {
            expression = expression.replace("\r\n", " ").replace('\n', " ");
        }

        let expression = self.qualify_columns(&expression, from_model)?;
        self.substitute_references(&expression, &from_model.name)
    }

    /// Pass 1: qualify bare physical columns.
    fn qualify_columns(&self, expression: &str, from_model: &SemanticModel) -> ResolveResult<String> {
        let Some(columns) = self.resolver.store().physical_columns(from_model) else {
            return Ok(expression.to_string());
        };

        let mut out = String::with_capacity(expression.len());
        let mut rest = 0;
        for segment in PROTECTED_SEGMENT.find_iter(expression) {
            self.qualify_words(&expression[rest..segment.start()], columns, from_model, &mut out)?;
            out.push_str(segment.as_str());
            rest = segment.end();
        }
        self.qualify_words(&expression[rest..], columns, from_model, &mut out)?;
        Ok(out)
    }

    fn qualify_words(
        &self,
        text: &str,
        columns: &HashSet<String>,
        from_model: &SemanticModel,
        out: &mut String,
    ) -> ResolveResult<()> {
        let mut rest = 0;
        for word in WORD.find_iter(text) {
            out.push_str(&text[rest..word.start()]);
            if columns.contains(word.as_str()) {
                let column = self
                    .resolver
                    .resolve(&Reference::column(word.as_str()), &from_model.name)?;
                out.push_str(&column.render(&self.dialect));
            } else {
                out.push_str(word.as_str());
            }
            rest = word.end();
        }
        out.push_str(&text[rest..]);
        Ok(())
    }

    /// Pass 2: replace template markers with dialect references.
    fn substitute_references(&self, expression: &str, from_model: &str) -> ResolveResult<String> {
        let mut out = String::with_capacity(expression.len());
        let mut rest = 0;
        for marker in TEMPLATE_MARKER.find_iter(expression) {
            let caps = TEMPLATE_REFERENCE.captures(marker.as_str()).ok_or_else(|| {
                ResolveError::InvalidReference {
                    reference: marker.as_str().to_string(),
                }
            })?;
            out.push_str(&expression[rest..marker.start()]);
            out.push_str(&self.render_marker(&caps, from_model)?);
            rest = marker.end();
        }
        out.push_str(&expression[rest..]);
        Ok(out)
    }

    fn render_marker(&self, caps: &Captures<'_>, from_model: &str) -> ResolveResult<String> {
        // `Entity('order_id__customer_id')` is the `customer_id` entity of the
        // model keyed by `order_id`, resolved like a dimension pair.
        let text = caps.get(2).map_or("", |m| m.as_str());
        let reference = Reference::parse(text)?;
        let resolved = self.resolver.resolve(&reference, from_model)?;
        Ok(resolved.render(&self.dialect))
    }
}
