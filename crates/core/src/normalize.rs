//! Save-time conversion of comma-separated values into value nodes.

use crate::document::DocumentTree;
use crate::operator::OperatorDescriptor;

/// Split a comma-separated list into trimmed, non-empty segments.
pub fn split_values(text: &str) -> Vec<String> {
    text.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// True while a multi-valued condition still holds an inline list.
pub fn requires_save(op: &OperatorDescriptor, value: &str) -> bool {
    op.is_multi_valued && !value.trim().is_empty()
}

/// Move an inline comma-separated list into value children of `node`.
///
/// Applies only to multi-valued operators whose condition has inline text
/// and no value children yet. Segments are appended left to right and the
/// inline text is cleared. Returns the number of children created; a second
/// call on the cleared text does nothing.
pub fn normalize_multi_value<T: DocumentTree>(
    tree: &mut T,
    node: T::NodeId,
    op: &OperatorDescriptor,
    value: &mut String,
) -> usize {
    if !requires_save(op, value) || tree.child_count(node) > 0 {
        return 0;
    }
    let segments = split_values(value);
    for segment in &segments {
        tree.append_value_child(node, segment);
    }
    value.clear();
    tracing::debug!(
        operator = op.symbol,
        count = segments.len(),
        "materialized value nodes"
    );
    segments.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{Condition, QueryDocument};
    use crate::operator::find_operator;

    #[test]
    fn split_trims_and_drops_empty_segments() {
        assert_eq!(split_values("a, b ,c"), vec!["a", "b", "c"]);
        assert_eq!(split_values(" x ,, y ,"), vec!["x", "y"]);
        assert!(split_values("  ").is_empty());
    }

    #[test]
    fn normalizes_once() {
        let mut doc = QueryDocument::new("account");
        let cond = doc.add_condition(doc.root_entity(), Condition::new("name", "in", ""));
        let op = find_operator("in").unwrap();
        let mut value = "a, b ,c".to_string();

        assert_eq!(normalize_multi_value(&mut doc, cond, op, &mut value), 3);
        assert_eq!(value, "");
        assert_eq!(doc.value_children(cond), vec!["a", "b", "c"]);

        assert_eq!(normalize_multi_value(&mut doc, cond, op, &mut value), 0);
        assert_eq!(doc.child_count(cond), 3);
    }

    #[test]
    fn single_valued_operators_are_left_alone() {
        let mut doc = QueryDocument::new("account");
        let cond = doc.add_condition(doc.root_entity(), Condition::new("name", "eq", ""));
        let mut value = "a,b".to_string();
        let op = find_operator("eq").unwrap();
        assert_eq!(normalize_multi_value(&mut doc, cond, op, &mut value), 0);
        assert_eq!(value, "a,b");
    }

    #[test]
    fn existing_children_block_conversion() {
        let mut doc = QueryDocument::new("account");
        let cond = doc.add_condition(doc.root_entity(), Condition::new("name", "in", ""));
        doc.append_value_child(cond, "z");
        let mut value = "a,b".to_string();
        let op = find_operator("in").unwrap();
        assert_eq!(normalize_multi_value(&mut doc, cond, op, &mut value), 0);
        assert_eq!(value, "a,b");
    }
}
