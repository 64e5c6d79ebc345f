use std::path::Path;
use std::sync::Arc;

use serde::de::DeserializeOwned;

use super::coerce::{CoerceError, FromNode};
use super::constraint::{Constraint, ExprError, MEMBERSHIP_FN};
use super::entries::entries;
use super::path;
use crate::document::{Document, NodeRef};
use crate::{Error, Result};

const MEMBERSHIP_NOTE: &str =
    "\n      Note: 'ops_in(v, {...})' checks whether 'v' is one of the listed values.";

/// Typed, constraint-checked access to a loaded document.
///
/// Keys are dotted paths resolved under the active prefix. The document is
/// shared and immutable; the prefix belongs to this facade alone, and
/// changing it takes `&mut self`. Clone the facade (or use
/// [`scoped`](Self::scoped)) to get an independent prefix over the same
/// document.
///
/// ## Example
///
/// ```
/// use ops_config::Ops;
///
/// let mut ops = Ops::from_toml_str(r#"
///     death_age = 74
///     [name]
///     first = "Georg"
///     last = "Handel"
/// "#)?;
///
/// let age: i64 = ops.get_checked("death_age", "v >= 0 and v < 150")?;
/// assert_eq!(age, 74);
///
/// let entries = ops.entry_list("name")?;
/// ops.set_prefix("name.");
/// let last: String = ops.get(&entries[1])?;
/// assert_eq!(last, "Handel");
///
/// ops.clear_prefix();
/// let show: bool = ops.get_or("show_compositions", "", true)?;
/// assert!(show);
/// # Ok::<(), ops_config::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct Ops {
    document: Arc<Document>,
    prefix: String,
}

impl Ops {
    /// Loads the TOML file at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let document = Document::load(path)?;
        Ok(Self::from_document(Arc::new(document)))
    }

    /// Wraps an already loaded document, for instance one built with
    /// [`Document::builder`], with no prefix set.
    pub fn from_document(document: Arc<Document>) -> Self {
        Self {
            document,
            prefix: String::new(),
        }
    }

    /// Loads a document from TOML text held in memory.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let document: Document = text.parse()?;
        Ok(Self::from_document(Arc::new(document)))
    }

    /// Replaces the document with the file at `path` and clears the prefix.
    ///
    /// On failure the facade keeps its current document and prefix.
    pub fn reopen(&mut self, path: impl AsRef<Path>) -> Result<()> {
        self.document = Arc::new(Document::load(path)?);
        self.clear_prefix();
        Ok(())
    }

    /// The shared document; clones of this facade point at the same one.
    pub fn document(&self) -> &Arc<Document> {
        &self.document
    }

    /// Where the document came from, as shown in error messages.
    pub fn origin(&self) -> &str {
        self.document.origin()
    }

    /// The active prefix, exactly as it was set.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Sets the path prepended to every later lookup.
    ///
    /// Not checked against the document: a prefix that leads nowhere makes
    /// lookups report missing keys.
    pub fn set_prefix(&mut self, prefix: impl Into<String>) {
        self.prefix = prefix.into();
        log::trace!("prefix set to '{}'", self.prefix);
    }

    /// Resets lookups to start from the top of the document.
    pub fn clear_prefix(&mut self) {
        self.prefix.clear();
    }

    /// A facade over the same document with `prefix` active.
    pub fn scoped(&self, prefix: impl Into<String>) -> Self {
        Self {
            document: Arc::clone(&self.document),
            prefix: prefix.into(),
        }
    }

    /// Reads a required value.
    pub fn get<T: FromNode>(&self, key: &str) -> Result<T> {
        self.get_value(key, "", None)
    }

    /// Reads a required value and checks it against `constraint`.
    ///
    /// Vectors are checked element by element.
    pub fn get_checked<T: FromNode>(&self, key: &str, constraint: &str) -> Result<T> {
        self.get_value(key, constraint, None)
    }

    /// Reads a value, falling back to `default` when the key is absent.
    ///
    /// The default is returned as-is, without checking `constraint`. A key
    /// that is present but has the wrong shape is still an error.
    pub fn get_or<T: FromNode>(&self, key: &str, constraint: &str, default: T) -> Result<T> {
        self.get_value(key, constraint, Some(default))
    }

    /// Whether `key` exists and can be read as a `T`.
    pub fn is<T: FromNode>(&self, key: &str) -> bool {
        self.lookup(key)
            .is_some_and(|node| T::from_node(node).is_ok())
    }

    /// Whether anything (scalar, vector or record) lives at `key`.
    pub fn exists(&self, key: &str) -> bool {
        self.lookup(key).is_some()
    }

    /// Whether the value at `key` satisfies `constraint`, whatever its type.
    ///
    /// A vector satisfies it when every element does. Unlike
    /// [`get_checked`](Self::get_checked), a value that fails the constraint
    /// is `Ok(false)`; an absent key, a record or a malformed constraint is
    /// still an error.
    pub fn satisfies(&self, key: &str, constraint: &str) -> Result<bool> {
        let node = self.lookup(key).ok_or_else(|| self.missing(key))?;
        let subjects = match node {
            NodeRef::Scalar(scalar) => std::slice::from_ref(scalar),
            NodeRef::Vector(items) => items,
            NodeRef::Record(_) => {
                return Err(Error::TypeMismatch {
                    entry: self.entry(key),
                    origin: self.origin().to_string(),
                    expected: "scalar or vector",
                    actual: node.kind().to_string(),
                })
            }
        };
        if constraint.trim().is_empty() {
            return Ok(true);
        }

        let expression_error = |source: ExprError| Error::ConstraintExpression {
            entry: self.entry(key),
            origin: self.origin().to_string(),
            expression: constraint.to_string(),
            source,
        };
        let parsed = Constraint::parse(constraint).map_err(expression_error)?;
        for subject in subjects {
            if !parsed.check(subject).map_err(expression_error)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Names of the children of the record at `key`, in document order.
    ///
    /// An empty `key` lists the record at the prefix (or the top level).
    pub fn entry_list(&self, key: &str) -> Result<Vec<String>> {
        let node = self.lookup(key).ok_or_else(|| self.missing(key))?;
        entries(node).ok_or_else(|| Error::TypeMismatch {
            entry: self.entry(key),
            origin: self.origin().to_string(),
            expected: "record",
            actual: node.kind().to_string(),
        })
    }

    /// Deserializes the node at `key` into any serde type.
    pub fn deserialize<T: DeserializeOwned>(&self, key: &str) -> Result<T> {
        let node = self.lookup(key).ok_or_else(|| self.missing(key))?;
        node.to_toml()
            .try_into()
            .map_err(|source| Error::Deserialize {
                entry: self.entry(key),
                origin: self.origin().to_string(),
                source,
            })
    }

    fn lookup(&self, key: &str) -> Option<NodeRef<'_>> {
        let found = path::resolve(self.document.root(), &self.prefix, key);
        log::trace!(
            "lookup '{}' -> {}",
            self.entry(key),
            found.map_or("not found".to_string(), |n| n.kind().to_string())
        );
        found
    }

    fn get_value<T: FromNode>(&self, key: &str, constraint: &str, default: Option<T>) -> Result<T> {
        let Some(node) = self.lookup(key) else {
            return match default {
                Some(value) => {
                    log::debug!("entry '{}' absent, using default", self.entry(key));
                    Ok(value)
                }
                None => Err(self.missing(key)),
            };
        };

        let value = T::from_node(node).map_err(|e| self.coerce_error(key, e))?;
        self.check(key, constraint, &value)?;
        Ok(value)
    }

    fn check<T: FromNode>(&self, key: &str, constraint: &str, value: &T) -> Result<()> {
        if constraint.trim().is_empty() {
            return Ok(());
        }

        let expression_error = |entry: String, source: ExprError| Error::ConstraintExpression {
            entry,
            origin: self.origin().to_string(),
            expression: constraint.to_string(),
            source,
        };

        let parsed = Constraint::parse(constraint)
            .map_err(|source| expression_error(self.entry(key), source))?;

        for (index, subject) in value.subjects().iter().enumerate() {
            let entry = if T::ELEMENTWISE {
                format!("{}[{index}]", self.entry(key))
            } else {
                self.entry(key)
            };
            match parsed.check(subject) {
                Ok(true) => {}
                Ok(false) => {
                    return Err(Error::ConstraintViolation {
                        entry,
                        origin: self.origin().to_string(),
                        value: subject.to_string(),
                        expression: parsed.source().to_string(),
                        note: if parsed.source().contains(MEMBERSHIP_FN) {
                            MEMBERSHIP_NOTE
                        } else {
                            ""
                        },
                    })
                }
                Err(source) => return Err(expression_error(entry, source)),
            }
        }
        Ok(())
    }

    /// Absolute path of `key` under the current prefix.
    fn entry(&self, key: &str) -> String {
        path::join(&self.prefix, key)
    }

    fn missing(&self, key: &str) -> Error {
        Error::MissingKey {
            entry: self.entry(key),
            origin: self.origin().to_string(),
        }
    }

    fn coerce_error(&self, key: &str, error: CoerceError) -> Error {
        match error {
            CoerceError::Mismatch { expected, actual } => Error::TypeMismatch {
                entry: self.entry(key),
                origin: self.origin().to_string(),
                expected,
                actual: actual.to_string(),
            },
            CoerceError::OutOfRange { target, value } => Error::OutOfRange {
                entry: self.entry(key),
                origin: self.origin().to_string(),
                value,
                target,
            },
        }
    }
}
