//! Typed access to hierarchical TOML configuration.
//!
//! A [`Document`] is loaded once from layered sources. An [`Ops`] facade then
//! reads values by dotted key path, optionally under an active prefix,
//! optionally validated by a constraint expression and optionally falling
//! back to a default when the key is absent.

pub mod document;
mod error;
pub mod ops;

pub use document::{Document, DocumentBuilder, LoadError};
pub use error::{Error, Result};
pub use ops::{Constraint, ExprError, FromNode, Ops};
