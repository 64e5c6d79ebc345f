use crate::document::NodeRef;

/// Names of the direct children of a record, in document order.
///
/// Returns `None` when `node` is not a record.
pub fn entries(node: NodeRef<'_>) -> Option<Vec<String>> {
    node.as_record()
        .map(|record| record.keys().map(str::to_string).collect())
}
