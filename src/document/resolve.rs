//! `${section.field}` substitution inside string values.
//!
//! Every string is expanded exactly once. A reference to another string
//! expands that string first, so references may chain; the result is cached
//! by path. `$$` is a literal `$`, and text produced by an escape is never
//! scanned again.

use std::collections::HashMap;

use toml::{Table, Value};

use super::node::child_path;
use super::LoadError;

/// Returns a copy of `table` with every reference replaced by its target.
pub fn resolve_references(table: &Table) -> Result<Table, LoadError> {
    Resolver {
        root: table,
        resolved: HashMap::new(),
        visiting: Vec::new(),
    }
    .table(table, "")
}

struct Resolver<'a> {
    root: &'a Table,
    /// Expanded strings by path.
    resolved: HashMap<String, String>,
    /// Paths currently being expanded, outermost first.
    visiting: Vec<String>,
}

impl<'a> Resolver<'a> {
    fn table(&mut self, table: &'a Table, at: &str) -> Result<Table, LoadError> {
        let mut out = Table::new();
        for (key, value) in table {
            let here = child_path(at, key);
            let value = match value {
                Value::String(raw) => Value::String(self.entry(&here, raw)?),
                other => self.value(other, &here)?,
            };
            out.insert(key.clone(), value);
        }
        Ok(out)
    }

    fn value(&mut self, value: &'a Value, at: &str) -> Result<Value, LoadError> {
        match value {
            Value::String(raw) => self.expand(raw, at).map(Value::String),
            Value::Table(table) => self.table(table, at).map(Value::Table),
            Value::Array(items) => items
                .iter()
                .map(|item| self.value(item, at))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array),
            other => Ok(other.clone()),
        }
    }

    /// Expands the string stored at `path`, once.
    fn entry(&mut self, path: &str, raw: &'a str) -> Result<String, LoadError> {
        if let Some(done) = self.resolved.get(path) {
            return Ok(done.clone());
        }
        if let Some(start) = self.visiting.iter().position(|p| p == path) {
            let mut chain = self.visiting[start..].to_vec();
            chain.push(path.to_string());
            return Err(LoadError::CircularReference(chain.join(" -> ")));
        }

        self.visiting.push(path.to_string());
        let expanded = self.expand(raw, path);
        self.visiting.pop();

        let expanded = expanded?;
        self.resolved.insert(path.to_string(), expanded.clone());
        Ok(expanded)
    }

    fn expand(&mut self, raw: &str, at: &str) -> Result<String, LoadError> {
        let mut out = String::with_capacity(raw.len());
        let mut rest = raw;

        while let Some(dollar) = rest.find('$') {
            out.push_str(&rest[..dollar]);
            let after = &rest[dollar + 1..];
            rest = if let Some(tail) = after.strip_prefix('$') {
                out.push('$');
                tail
            } else if let Some(tail) = after.strip_prefix('{') {
                let close = tail
                    .find('}')
                    .ok_or_else(|| LoadError::UnclosedReference(at.to_string()))?;
                out.push_str(&self.reference(&tail[..close])?);
                &tail[close + 1..]
            } else {
                out.push('$');
                after
            };
        }

        out.push_str(rest);
        Ok(out)
    }

    /// Renders the scalar at `path` as text.
    fn reference(&mut self, path: &str) -> Result<String, LoadError> {
        let segments: Vec<&str> = path.trim().split('.').collect();
        if segments.iter().any(|s| s.is_empty()) {
            return Err(LoadError::InvalidReferencePath(path.to_string()));
        }

        let not_found = || LoadError::ReferenceNotFound(path.to_string());
        let mut table = self.root;
        let mut target = None;
        for segment in &segments {
            if target.is_some() {
                table = target
                    .and_then(Value::as_table)
                    .ok_or_else(not_found)?;
            }
            target = Some(table.get(*segment).ok_or_else(not_found)?);
        }

        match target.ok_or_else(not_found)? {
            Value::String(raw) => self.entry(&segments.join("."), raw),
            Value::Integer(i) => Ok(i.to_string()),
            Value::Float(x) => Ok(x.to_string()),
            Value::Boolean(b) => Ok(b.to_string()),
            Value::Datetime(dt) => Ok(dt.to_string()),
            Value::Array(_) | Value::Table(_) => {
                Err(LoadError::NonScalarReference(path.to_string()))
            }
        }
    }
}
