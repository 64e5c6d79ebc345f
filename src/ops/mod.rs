//! Key resolution, type coercion and constraint checking over a [`Document`](crate::Document).

mod coerce;
pub mod constraint;
mod entries;
mod facade;
pub mod path;
mod typed;

pub use coerce::{CoerceError, FromNode, FromScalar};
pub use constraint::{Constraint, ExprError};
pub use entries::entries;
pub use facade::Ops;
