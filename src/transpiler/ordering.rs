//! ORDER BY and GROUP BY lists.
//!
//! Both trees qualify leaves with the current table; a nested object switches
//! the table to its own key.

use indexmap::IndexSet;

use crate::query::{OrderBy, OrderTree, Selection, SelectionTree, SortOrder};

/// `table.column DIRECTION` items. Unknown direction tokens are ignored.
pub fn create_orders(orders: &OrderTree, table: &str) -> Vec<String> {
    let mut items = IndexSet::new();
    walk_orders(orders, table, &mut items);
    items.into_iter().collect()
}

fn walk_orders(orders: &OrderTree, table: &str, items: &mut IndexSet<String>) {
    for (key, order) in orders {
        match order {
            OrderBy::Nested(nested) => walk_orders(nested, key, items),
            OrderBy::Direction(token) => {
                if let Some(dir) = SortOrder::from_token(token) {
                    items.insert(format!("{}.{} {}", table, key, dir));
                }
            }
        }
    }
}

/// `table.column` items for every `true` leaf.
pub fn create_groups(groups: &SelectionTree, table: &str) -> Vec<String> {
    let mut items = IndexSet::new();
    walk_groups(groups, table, &mut items);
    items.into_iter().collect()
}

fn walk_groups(groups: &SelectionTree, table: &str, items: &mut IndexSet<String>) {
    for (key, group) in groups {
        match group {
            Selection::Nested(nested) => walk_groups(nested, key, items),
            Selection::Flag(true) => {
                items.insert(format!("{}.{}", table, key));
            }
            Selection::Flag(false) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::Query;
    use serde_json::json;

    #[test]
    fn test_orders_nested_tables() {
        let query = Query::from_value(json!({
            "orders": {
                "updatedAt": "DESC",
                "order": { "createdAt": "asc", "price": "sideways" }
            }
        }))
        .unwrap();
        assert_eq!(
            create_orders(&query.orders, "user"),
            vec!["user.updatedAt DESC", "order.createdAt ASC"]
        );
    }

    #[test]
    fn test_groups_skip_false() {
        let query = Query::from_value(json!({
            "groups": { "id": false, "order": { "status": true }, "login": true }
        }))
        .unwrap();
        assert_eq!(
            create_groups(&query.groups, "user"),
            vec!["order.status", "user.login"]
        );
    }
}
