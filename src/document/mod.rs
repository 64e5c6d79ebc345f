//! Loading TOML sources into an immutable node tree.

mod builder;
mod env;
mod error;
mod node;
mod resolve;
mod source;

use std::path::Path;
use std::str::FromStr;

pub use builder::DocumentBuilder;
pub use env::EnvSource;
pub use error::LoadError;
pub use node::{Node, NodeKind, NodeRef, Record, Scalar, ScalarKind};
pub use source::{DocumentSource, FileSource, Layer, TomlStrSource};

/// A loaded configuration document.
///
/// Immutable once built; share it between facades with `Arc<Document>`.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    root: Record,
    origin: String,
}

impl Document {
    pub fn builder() -> DocumentBuilder {
        DocumentBuilder::new()
    }

    /// Loads a single required TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        Self::builder().with_file(path, true).build()
    }

    pub fn root(&self) -> &Record {
        &self.root
    }

    /// Where the document came from, for error messages.
    pub fn origin(&self) -> &str {
        &self.origin
    }
}

impl FromStr for Document {
    type Err = LoadError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::builder().with_toml_str(s).build()
    }
}
