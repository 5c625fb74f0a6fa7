//! Reference resolution and expression translation.
//!
//! [`ReferenceResolver`] maps MetricFlow references onto their owning model;
//! [`ExpressionTranslator`] rewrites whole SQL expressions using it. Both are
//! shared across dialects, which only differ in how resolved references are
//! rendered (see [`crate::dialect`]).

pub mod error;
pub mod expression;
pub mod reference;
pub mod resolve;

pub use error::{ResolveError, ResolveResult};
pub use expression::ExpressionTranslator;
pub use reference::Reference;
pub use resolve::{QualifiedRef, ReferenceResolver};
