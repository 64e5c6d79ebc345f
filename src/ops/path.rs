//! Key-path resolution against the document tree.
//!
//! Paths are dot-separated. Empty segments are ignored, so `"name."` and
//! `"name"` address the same record. A decimal segment indexes into a vector.

use crate::document::{NodeRef, Record};

/// Splits a dotted path into its non-empty segments.
pub fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('.').map(str::trim).filter(|s| !s.is_empty())
}

/// Renders the absolute path of `key` under `prefix`.
pub fn join(prefix: &str, key: &str) -> String {
    segments(prefix)
        .chain(segments(key))
        .collect::<Vec<_>>()
        .join(".")
}

/// Walks `prefix` then `key` from `root`.
///
/// Returns `None` on any miss: an absent child, a step through a scalar,
/// or a vector index that is not a number or is out of range. An empty
/// path resolves to `root` itself.
pub fn resolve<'a>(root: &'a Record, prefix: &str, key: &str) -> Option<NodeRef<'a>> {
    segments(prefix)
        .chain(segments(key))
        .try_fold(NodeRef::Record(root), step)
}

fn step<'a>(node: NodeRef<'a>, segment: &str) -> Option<NodeRef<'a>> {
    match node {
        NodeRef::Record(record) => record.get(segment).map(|child| child.view()),
        NodeRef::Vector(items) => {
            let index: usize = segment.parse().ok()?;
            items.get(index).map(NodeRef::Scalar)
        }
        NodeRef::Scalar(_) => None,
    }
}
