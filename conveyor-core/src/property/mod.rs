//! Configuration-time property model.
//!
//! Stages declare named properties with a shape (scalar, composite of
//! children, or table of children) at definition time; the host collects
//! configured values and hands them to [`Stage::configure`] as a
//! [`PropertyValues`]. Structured values are resolved through
//! [`Expression`], which evaluates lazily against an optional per-document
//! context.
//!
//! [`Stage::configure`]: crate::stage::Stage::configure

mod descriptor;
mod expression;
mod values;

pub use descriptor::{
    PropertyBuilder, PropertyDecl, PropertyDescriptor, PropertyKind, Sensitivity, Suggestions,
};
pub use expression::Expression;
pub use values::PropertyValues;
