use std::path::PathBuf;
use thiserror::Error;

/// Failure to produce a document from its sources.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LoadError {
    #[error("required config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse '{origin}': {source}")]
    ParseError {
        origin: String,
        source: toml::de::Error,
    },

    #[error("circular reference: {0}")]
    CircularReference(String),

    #[error("referenced path not found: {0}")]
    ReferenceNotFound(String),

    #[error("invalid reference path: {0}")]
    InvalidReferencePath(String),

    #[error("cannot reference non-scalar value: {0}")]
    NonScalarReference(String),

    #[error("unclosed reference (missing '}}') in '{0}'")]
    UnclosedReference(String),

    #[error("unsupported array at '{path}': {reason}")]
    UnsupportedArray { path: String, reason: &'static str },
}
