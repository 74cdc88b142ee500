//! Projection list generation.
//!
//! Every projected column is aliased `table_____column` so that identically
//! named columns of joined tables stay distinguishable in the result rows.

use indexmap::IndexSet;

use crate::metadata::RelationMetadata;
use crate::query::{Selection, SelectionTree};

/// Separator between table and column in a projection alias.
pub const ALIAS_SEPARATOR: &str = "_____";

/// Insertion ordered, duplicate free `(table, column)` pairs.
pub type Projection = IndexSet<(String, String)>;

/// Walk `select` (cross-checked against `relations`) from `metadata` downwards.
pub fn create_select(
    select: &SelectionTree,
    relations: &SelectionTree,
    metadata: &RelationMetadata,
) -> Projection {
    let mut projection = Projection::new();
    walk(select, relations, metadata, &mut projection);
    projection
}

fn walk(
    select: &SelectionTree,
    relations: &SelectionTree,
    metadata: &RelationMetadata,
    projection: &mut Projection,
) {
    let no_relations = SelectionTree::new();

    for (key, selection) in select {
        if !selection.is_selected() {
            continue;
        }
        let requested = relations.get(key).filter(|r| r.is_selected());

        match (requested, metadata.child(key)) {
            (Some(requested), Some(child)) => {
                let nested_relations = requested.nested().unwrap_or(&no_relations);
                match selection {
                    Selection::Flag(_) => {
                        walk(&all_columns(child), nested_relations, child, projection)
                    }
                    Selection::Nested(tree) => walk(tree, nested_relations, child, projection),
                }
            }
            _ => {
                if metadata.has_column(key) || relations.get(key).is_some_and(Selection::is_true) {
                    projection.insert((metadata.table_name.clone(), key.clone()));
                }
            }
        }
    }

    // Relations joined but never listed in `select` still contribute their
    // columns. An explicit `false` counts as not listed, `{}` does not.
    for (key, requested) in relations {
        let listed = select
            .get(key)
            .is_some_and(|s| !matches!(s, Selection::Flag(false)));
        if !requested.is_selected() || listed {
            continue;
        }
        if let Some(child) = metadata.child(key) {
            let nested_relations = requested.nested().unwrap_or(&no_relations);
            walk(&all_columns(child), nested_relations, child, projection);
        }
    }
}

/// `{column: true}` for every column of `metadata`.
fn all_columns(metadata: &RelationMetadata) -> SelectionTree {
    metadata
        .columns
        .iter()
        .map(|c| (c.name.clone(), Selection::Flag(true)))
        .collect()
}

/// Render `table.column AS table_____column` lines.
pub fn render_select(projection: &Projection) -> String {
    projection
        .iter()
        .map(|(table, column)| {
            format!("\t{table}.{column} AS {table}{ALIAS_SEPARATOR}{column}")
        })
        .collect::<Vec<_>>()
        .join(",\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::RelationKind;
    use crate::query::Query;
    use serde_json::json;

    fn metadata() -> RelationMetadata {
        let order = RelationMetadata::new("order")
            .joined(RelationKind::OneToMany, "user", "userId", "id")
            .columns(["id", "price", "status"]);
        let role = RelationMetadata::new("role")
            .joined(RelationKind::ManyToOne, "user", "roleId", "id")
            .columns(["id", "name"]);
        RelationMetadata::new("user")
            .columns(["id", "login"])
            .relation("order", order)
            .relation("role", role)
    }

    fn aliases(query: serde_json::Value) -> Vec<String> {
        let query = Query::from_value(query).unwrap();
        create_select(&query.select, &query.relations, &metadata())
            .into_iter()
            .map(|(table, column)| format!("{table}.{column}"))
            .collect()
    }

    #[test]
    fn test_relation_flag_expands_all_columns() {
        assert_eq!(
            aliases(json!({
                "relations": { "order": true },
                "select": { "id": true, "order": true }
            })),
            vec!["user.id", "order.id", "order.price", "order.status"]
        );
    }

    #[test]
    fn test_relation_not_joined_is_not_projected() {
        assert_eq!(
            aliases(json!({ "select": { "login": true, "order": { "price": true } } })),
            vec!["user.login"]
        );
    }

    #[test]
    fn test_joined_relation_missing_from_select() {
        assert_eq!(
            aliases(json!({
                "relations": { "role": true },
                "select": { "login": true }
            })),
            vec!["user.login", "role.id", "role.name"]
        );
    }

    #[test]
    fn test_empty_relation_select_is_not_expanded() {
        assert_eq!(
            aliases(json!({
                "relations": { "role": true },
                "select": { "login": true, "role": {} }
            })),
            vec!["user.login"]
        );
        assert_eq!(
            aliases(json!({
                "relations": { "role": true },
                "select": { "login": true, "role": false }
            })),
            vec!["user.login", "role.id", "role.name"]
        );
    }

    #[test]
    fn test_unknown_columns_dropped() {
        assert_eq!(
            aliases(json!({
                "relations": { "order": true },
                "select": { "nope": true, "id": true, "order": { "price": true, "ghost": true } }
            })),
            vec!["user.id", "order.price"]
        );
    }

    #[test]
    fn test_render_select() {
        let mut projection = Projection::new();
        projection.insert(("user".to_string(), "id".to_string()));
        projection.insert(("role".to_string(), "name".to_string()));
        assert_eq!(
            render_select(&projection),
            "\tuser.id AS user_____id,\n\trole.name AS role_____name"
        );
    }
}
