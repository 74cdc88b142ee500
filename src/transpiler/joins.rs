//! LEFT JOIN generation from the relation metadata tree.

use tracing::trace;

use crate::metadata::RelationMetadata;
use crate::query::SelectionTree;

/// One `LEFT JOIN` line per requested relation, parents before children.
///
/// A relation is descended into only when its selection is a non-empty object.
pub fn create_joins(metadata: &RelationMetadata, relations: &SelectionTree) -> Vec<String> {
    let mut joins = Vec::new();

    for (key, selection) in relations {
        let Some(child) = metadata.child(key) else {
            trace!(table = %metadata.table_name, relation = %key, "relation not in metadata, skipping join");
            continue;
        };
        if !selection.is_selected() {
            continue;
        }

        joins.push(format!("LEFT JOIN {} ON {}", child.table_name, child.join_condition()));

        if let Some(nested) = selection.nested() {
            joins.extend(create_joins(child, nested));
        }
    }
    joins
}
