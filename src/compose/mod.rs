//! Measure and metric composition.
//!
//! See [`Composer`] for the translation rules. Metrics that cannot be
//! translated never abort a run: [`Composer::compose_metrics`] records a
//! [`Diagnostic`] for them and carries on.

pub mod composer;
pub mod diagnostic;
pub mod error;

pub use composer::{ComposedMeasure, Composer, Composition, FilterStyle, MetricGroup};
pub use diagnostic::{Diagnostic, Severity};
pub use error::{ComposeError, ComposeResult, RatioSide, SkipReason};
