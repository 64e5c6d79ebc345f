use thiserror::Error;

use crate::document::LoadError;
use crate::ops::ExprError;

pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type for the ops-config library.
///
/// `entry` is always the absolute key path (prefix included) and `origin`
/// names the document it was looked up in.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error("configuration could not be loaded: {0}")]
    Load(#[from] LoadError),

    #[error("entry \"{entry}\" in \"{origin}\" was not found")]
    MissingKey { entry: String, origin: String },

    #[error("entry \"{entry}\" in \"{origin}\" is not a {expected}: found {actual}")]
    TypeMismatch {
        entry: String,
        origin: String,
        expected: &'static str,
        actual: String,
    },

    #[error("entry \"{entry}\" in \"{origin}\": value {value} does not fit in {target}")]
    OutOfRange {
        entry: String,
        origin: String,
        value: i64,
        target: &'static str,
    },

    #[error("while checking entry \"{entry}\" in \"{origin}\" against `{expression}`: {source}")]
    ConstraintExpression {
        entry: String,
        origin: String,
        expression: String,
        source: ExprError,
    },

    #[error(
        "entry \"{entry}\" in \"{origin}\" (value {value}) does not satisfy the constraint:\n      {expression}{note}"
    )]
    ConstraintViolation {
        entry: String,
        origin: String,
        value: String,
        expression: String,
        note: &'static str,
    },

    #[error("entry \"{entry}\" in \"{origin}\" could not be deserialized: {source}")]
    Deserialize {
        entry: String,
        origin: String,
        source: toml::de::Error,
    },
}

impl Error {
    /// True for an absent key, as opposed to a present but unusable one.
    pub fn is_missing_key(&self) -> bool {
        matches!(self, Error::MissingKey { .. })
    }
}
