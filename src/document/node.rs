//! Immutable node tree backing an [`Ops`](crate::Ops) facade.
//!
//! A document is a [`Record`] of named children. Leaves are [`Scalar`]s or
//! vectors of scalars. The tree is built once from TOML and never mutated.

use std::fmt;

use toml::{Table, Value};

use super::LoadError;

/// A single leaf value.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Int(i64),
    Float(f64),
    Bool(bool),
    String(String),
}

impl Scalar {
    pub fn kind(&self) -> ScalarKind {
        match self {
            Scalar::Int(_) => ScalarKind::Int,
            Scalar::Float(_) => ScalarKind::Float,
            Scalar::Bool(_) => ScalarKind::Bool,
            Scalar::String(_) => ScalarKind::String,
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Int(i) => write!(f, "{i}"),
            Scalar::Float(x) => write!(f, "{x:?}"),
            Scalar::Bool(b) => write!(f, "{b}"),
            Scalar::String(s) => write!(f, "{s:?}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarKind {
    Int,
    Float,
    Bool,
    String,
}

impl ScalarKind {
    pub fn name(self) -> &'static str {
        match self {
            ScalarKind::Int => "integer",
            ScalarKind::Float => "float",
            ScalarKind::Bool => "boolean",
            ScalarKind::String => "string",
        }
    }

    fn is_numeric(self) -> bool {
        matches!(self, ScalarKind::Int | ScalarKind::Float)
    }
}

/// Shape of a node, used in type-mismatch reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Scalar(ScalarKind),
    Vector,
    Record,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeKind::Scalar(kind) => f.write_str(kind.name()),
            NodeKind::Vector => f.write_str("vector"),
            NodeKind::Record => f.write_str("record"),
        }
    }
}

/// Named children in document order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    children: Vec<(String, Node)>,
}

impl Record {
    pub fn get(&self, name: &str) -> Option<&Node> {
        self.children
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, node)| node)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.children.iter().map(|(key, _)| key.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Node)> {
        self.children.iter().map(|(key, node)| (key.as_str(), node))
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Scalar(Scalar),
    Vector(Vec<Scalar>),
    Record(Record),
}

impl Node {
    pub fn kind(&self) -> NodeKind {
        self.view().kind()
    }

    pub fn as_record(&self) -> Option<&Record> {
        match self {
            Node::Record(record) => Some(record),
            _ => None,
        }
    }

    pub fn view(&self) -> NodeRef<'_> {
        match self {
            Node::Scalar(scalar) => NodeRef::Scalar(scalar),
            Node::Vector(items) => NodeRef::Vector(items),
            Node::Record(record) => NodeRef::Record(record),
        }
    }

    /// Converts the node back into a TOML value, e.g. for serde deserialization.
    pub fn to_toml(&self) -> Value {
        self.view().to_toml()
    }
}

/// A borrowed position in the tree: a node, the root record, or one vector element.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NodeRef<'a> {
    Scalar(&'a Scalar),
    Vector(&'a [Scalar]),
    Record(&'a Record),
}

impl<'a> NodeRef<'a> {
    pub fn kind(self) -> NodeKind {
        match self {
            NodeRef::Scalar(scalar) => NodeKind::Scalar(scalar.kind()),
            NodeRef::Vector(_) => NodeKind::Vector,
            NodeRef::Record(_) => NodeKind::Record,
        }
    }

    pub fn as_record(self) -> Option<&'a Record> {
        match self {
            NodeRef::Record(record) => Some(record),
            _ => None,
        }
    }

    pub fn to_toml(self) -> Value {
        match self {
            NodeRef::Scalar(scalar) => scalar_to_toml(scalar),
            NodeRef::Vector(items) => Value::Array(items.iter().map(scalar_to_toml).collect()),
            NodeRef::Record(record) => Value::Table(record_to_toml(record)),
        }
    }
}

impl<'a> From<&'a Node> for NodeRef<'a> {
    fn from(node: &'a Node) -> Self {
        node.view()
    }
}

fn scalar_to_toml(scalar: &Scalar) -> Value {
    match scalar {
        Scalar::Int(i) => Value::Integer(*i),
        Scalar::Float(x) => Value::Float(*x),
        Scalar::Bool(b) => Value::Boolean(*b),
        Scalar::String(s) => Value::String(s.clone()),
    }
}

fn record_to_toml(record: &Record) -> Table {
    record
        .iter()
        .map(|(key, node)| (key.to_string(), node.to_toml()))
        .collect()
}

/// Converts a merged TOML table into a record, validating array shapes.
pub(crate) fn record_from_table(table: Table, path: &str) -> Result<Record, LoadError> {
    let mut children = Vec::with_capacity(table.len());
    for (key, value) in table {
        let child_path = child_path(path, &key);
        let node = node_from_value(value, &child_path)?;
        children.push((key, node));
    }
    Ok(Record { children })
}

fn node_from_value(value: Value, path: &str) -> Result<Node, LoadError> {
    match value {
        Value::Table(table) => Ok(Node::Record(record_from_table(table, path)?)),
        Value::Array(items) => array_to_node(items, path),
        other => scalar_from_value(other)
            .map(Node::Scalar)
            .ok_or_else(|| unsupported(path, "unexpected value")),
    }
}

fn scalar_from_value(value: Value) -> Option<Scalar> {
    match value {
        Value::Integer(i) => Some(Scalar::Int(i)),
        Value::Float(x) => Some(Scalar::Float(x)),
        Value::Boolean(b) => Some(Scalar::Bool(b)),
        Value::String(s) => Some(Scalar::String(s)),
        Value::Datetime(dt) => Some(Scalar::String(dt.to_string())),
        Value::Array(_) | Value::Table(_) => None,
    }
}

fn array_to_node(items: Vec<Value>, path: &str) -> Result<Node, LoadError> {
    if !items.is_empty() && items.iter().all(Value::is_table) {
        // Arrays of tables become records keyed by position.
        let mut children = Vec::with_capacity(items.len());
        for (index, item) in items.into_iter().enumerate() {
            let key = index.to_string();
            let node = node_from_value(item, &child_path(path, &key))?;
            children.push((key, node));
        }
        return Ok(Node::Record(Record { children }));
    }

    let mut scalars = Vec::with_capacity(items.len());
    let mut first_kind: Option<ScalarKind> = None;
    for item in items {
        let scalar = scalar_from_value(item)
            .ok_or_else(|| unsupported(path, "vectors may only hold scalars"))?;
        let kind = scalar.kind();
        match first_kind {
            None => first_kind = Some(kind),
            Some(first) if first == kind || (first.is_numeric() && kind.is_numeric()) => {}
            Some(_) => return Err(unsupported(path, "vector elements must share one kind")),
        }
        scalars.push(scalar);
    }
    Ok(Node::Vector(scalars))
}

pub(super) fn child_path(parent: &str, key: &str) -> String {
    if parent.is_empty() {
        key.to_string()
    } else {
        format!("{parent}.{key}")
    }
}

fn unsupported(path: &str, reason: &'static str) -> LoadError {
    LoadError::UnsupportedArray {
        path: path.to_string(),
        reason,
    }
}
