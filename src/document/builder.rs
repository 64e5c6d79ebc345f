use std::path::Path;

use super::env::EnvSource;
use super::node::record_from_table;
use super::resolve::resolve_references;
use super::source::{merge_at_path, DocumentSource, FileSource, TomlStrSource};
use super::{Document, LoadError};

/// Builder for loading a document from layered sources.
///
/// Sources are merged in registration order, later ones overriding earlier
/// ones. Nested tables merge recursively; other values (including arrays)
/// are replaced entirely.
///
/// ## Variable References
///
/// String values can reference other values using `${path.to.field}`:
///
/// ```toml
/// [server]
/// host = "localhost"
/// port = 8080
/// url = "http://${server.host}:${server.port}/api"
/// ```
///
/// Use `$$` to escape a literal `$` (e.g., `$${VAR}` becomes `${VAR}`).
///
/// ## Example
///
/// ```no_run
/// use ops_config::{Document, Ops};
///
/// let document = Document::builder()
///     .with_file("config/default.toml", true)
///     .with_env("MYAPP", "__")
///     .with_file("config/local.toml", false)
///     .build()?;
/// let ops = Ops::from_document(document.into());
/// # Ok::<(), ops_config::LoadError>(())
/// ```
#[derive(Debug)]
#[must_use = "builders do nothing until .build() is called"]
pub struct DocumentBuilder {
    sources: Vec<Box<dyn DocumentSource>>,
    resolve_references: bool,
}

impl Default for DocumentBuilder {
    fn default() -> Self {
        Self {
            sources: Vec::new(),
            resolve_references: true,
        }
    }
}

impl DocumentBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a TOML file.
    ///
    /// If `required` is `true`, the build fails when the file doesn't exist.
    /// Optional files that are missing are skipped.
    pub fn with_file(self, path: impl AsRef<Path>, required: bool) -> Self {
        self.with_source(FileSource::new(path, required))
    }

    /// Adds TOML text held in memory.
    pub fn with_toml_str(self, text: impl Into<String>) -> Self {
        self.with_source(TomlStrSource::new(text))
    }

    /// Overrides entries from environment variables.
    ///
    /// `MYAPP__DATABASE__PORT=5432` with prefix `MYAPP` and separator `__`
    /// sets `database.port` to the integer `5432`. Path segments are
    /// lowercased; values become a boolean, integer, float or string,
    /// whichever fits first.
    pub fn with_env(self, prefix: impl Into<String>, separator: impl Into<String>) -> Self {
        self.with_source(EnvSource::new(prefix, separator))
    }

    /// Adds a custom source.
    pub fn with_source(mut self, source: impl DocumentSource + 'static) -> Self {
        self.sources.push(Box::new(source));
        self
    }

    /// Leaves `${...}` sequences in strings untouched.
    pub fn without_references(mut self) -> Self {
        self.resolve_references = false;
        self
    }

    /// Loads and merges every source, resolves references and freezes the tree.
    pub fn build(self) -> Result<Document, LoadError> {
        let mut merged = toml::Table::new();
        let mut origins = Vec::new();

        for source in &self.sources {
            let layers = source.layers()?;
            if !layers.is_empty() {
                origins.extend(source.origin());
            }
            for layer in layers {
                merge_at_path(&mut merged, &layer.path, layer.value);
            }
        }

        if self.resolve_references {
            merged = resolve_references(&merged)?;
        }

        let root = record_from_table(merged, "")?;
        let origin = if origins.is_empty() {
            "<empty>".to_string()
        } else {
            origins.join(", ")
        };
        log::debug!("loaded document from {origin} ({} top-level entries)", root.len());

        Ok(Document { root, origin })
    }
}
