//! Sources feeding the document builder and the merge that combines them.

use std::path::{Path, PathBuf};

use toml::{Table, Value};

use super::LoadError;

/// A value to be merged into the document at `path` (empty for the root).
#[derive(Debug, Clone)]
pub struct Layer {
    pub path: Vec<String>,
    pub value: Value,
}

impl Layer {
    pub fn root(table: Table) -> Self {
        Self {
            path: Vec::new(),
            value: Value::Table(table),
        }
    }

    pub fn at_path(path: Vec<String>, value: Value) -> Self {
        Self { path, value }
    }
}

pub trait DocumentSource: Send + Sync + std::fmt::Debug {
    /// Produces the layers contributed by this source.
    fn layers(&self) -> Result<Vec<Layer>, LoadError>;

    /// Name of the source as shown in error messages, if it has one.
    fn origin(&self) -> Option<String> {
        None
    }
}

/// A TOML file, required or optional.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
    required: bool,
}

impl FileSource {
    /// Creates a new file source.
    ///
    /// If `required` is true, loading fails when the file doesn't exist.
    pub fn new(path: impl AsRef<Path>, required: bool) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            required,
        }
    }
}

impl DocumentSource for FileSource {
    fn layers(&self) -> Result<Vec<Layer>, LoadError> {
        match load_toml_file(&self.path, self.required)? {
            Some(table) => Ok(vec![Layer::root(table)]),
            None => Ok(vec![]),
        }
    }

    fn origin(&self) -> Option<String> {
        Some(self.path.display().to_string())
    }
}

/// TOML text held in memory.
#[derive(Debug, Clone)]
pub struct TomlStrSource {
    text: String,
}

impl TomlStrSource {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

impl DocumentSource for TomlStrSource {
    fn layers(&self) -> Result<Vec<Layer>, LoadError> {
        let table = toml::from_str(&self.text).map_err(|e| LoadError::ParseError {
            origin: "<inline>".to_string(),
            source: e,
        })?;
        Ok(vec![Layer::root(table)])
    }

    fn origin(&self) -> Option<String> {
        Some("<inline>".to_string())
    }
}

/// Reads and parses a TOML file.
///
/// Returns `Ok(None)` if the file doesn't exist and `required` is false.
fn load_toml_file(path: &Path, required: bool) -> Result<Option<Table>, LoadError> {
    match std::fs::read_to_string(path) {
        Ok(contents) => {
            let table = toml::from_str(&contents).map_err(|e| LoadError::ParseError {
                origin: path.display().to_string(),
                source: e,
            })?;
            Ok(Some(table))
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            if required {
                Err(LoadError::FileNotFound(path.to_path_buf()))
            } else {
                log::debug!("optional config file {} not present", path.display());
                Ok(None)
            }
        }
        Err(e) => Err(LoadError::ReadError {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}

/// Merges `value` into `table` at `path`, creating intermediate tables.
pub fn merge_at_path(table: &mut Table, path: &[String], value: Value) {
    let Some((first, rest)) = path.split_first() else {
        if let Value::Table(overlay) = value {
            deep_merge(table, overlay);
        }
        return;
    };

    if rest.is_empty() {
        match (table.get_mut(first), value) {
            (Some(Value::Table(base)), Value::Table(overlay)) => deep_merge(base, overlay),
            (_, value) => {
                table.insert(first.clone(), value);
            }
        }
        return;
    }

    if !matches!(table.get(first), Some(Value::Table(_))) {
        table.insert(first.clone(), Value::Table(Table::new()));
    }

    if let Some(Value::Table(nested)) = table.get_mut(first) {
        merge_at_path(nested, rest, value);
    }
}

/// Recursively merges tables; any other overlay value replaces the base.
fn deep_merge(base: &mut Table, overlay: Table) {
    for (key, value) in overlay {
        match (base.get_mut(&key), value) {
            (Some(Value::Table(base_table)), Value::Table(overlay_table)) => {
                deep_merge(base_table, overlay_table);
            }
            (_, value) => {
                base.insert(key, value);
            }
        }
    }
}
