//! Model/view assembly.
//!
//! Collects the translated entities, dimensions and composed measures of one
//! semantic model into a [`DialectView`], the input of the serializers in
//! [`crate::emit`].

pub mod assembler;
pub mod timezone;
pub mod view;

pub use assembler::{AssembleError, AssembleOptions, AssembleResult, ViewAssembler};
pub use timezone::{TargetDatabase, TimezoneConversion};
pub use view::{DialectView, ViewDimension};
