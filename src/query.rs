//! The query description handed to the compiler for one invocation.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::RelQueryResult;

/// A node of a `relations`, `select` or `groups` tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Selection {
    Flag(bool),
    Nested(SelectionTree),
}

/// Field or relation name to selection, in document order.
pub type SelectionTree = IndexMap<String, Selection>;

impl Selection {
    /// `false` and empty objects select nothing.
    pub fn is_selected(&self) -> bool {
        match self {
            Selection::Flag(flag) => *flag,
            Selection::Nested(tree) => !tree.is_empty(),
        }
    }

    pub fn is_true(&self) -> bool {
        matches!(self, Selection::Flag(true))
    }

    /// The nested tree, if this node is a non-empty object.
    pub fn nested(&self) -> Option<&SelectionTree> {
        match self {
            Selection::Nested(tree) if !tree.is_empty() => Some(tree),
            _ => None,
        }
    }
}

/// A node of an `orders` tree: a direction token or a nested table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OrderBy {
    Direction(String),
    Nested(OrderTree),
}

pub type OrderTree = IndexMap<String, OrderBy>;

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    /// Accepts `asc`/`desc` in any case.
    pub fn from_token(token: &str) -> Option<Self> {
        if token.eq_ignore_ascii_case("asc") {
            Some(SortOrder::Asc)
        } else if token.eq_ignore_ascii_case("desc") {
            Some(SortOrder::Desc)
        } else {
            None
        }
    }
}

impl std::fmt::Display for SortOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SortOrder::Asc => write!(f, "ASC"),
            SortOrder::Desc => write!(f, "DESC"),
        }
    }
}

/// One query description.
///
/// `where` stays raw JSON: its leaves may be literals, operator expressions,
/// nested objects (AND) or arrays (OR).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Query {
    pub relations: SelectionTree,
    pub select: SelectionTree,
    pub groups: SelectionTree,
    pub orders: OrderTree,
    #[serde(rename = "where", skip_serializing_if = "Option::is_none")]
    pub filter: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skip: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub take: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<i64>,
}

impl Query {
    pub fn from_json(input: &str) -> RelQueryResult<Self> {
        Ok(serde_json::from_str(input)?)
    }

    pub fn from_value(value: Value) -> RelQueryResult<Self> {
        Ok(serde_json::from_value(value)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_trees_keep_order() {
        let query = Query::from_value(json!({
            "relations": { "role": { "role_access": { "access": true } } },
            "select": { "login": true, "id": true, "role": { "name": true } },
            "orders": { "updatedAt": "DESC", "role": { "name": "asc" } },
            "where": { "login": "$Like(\"a%\")" },
            "take": 5
        }))
        .unwrap();

        let keys: Vec<&str> = query.select.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["login", "id", "role"]);
        assert!(query.relations["role"].nested().is_some());
        assert_eq!(query.orders["updatedAt"], OrderBy::Direction("DESC".to_string()));
        assert_eq!(query.take, Some(5));
        assert!(query.filter.is_some());
    }

    #[test]
    fn test_empty_query() {
        let query = Query::from_json("{}").unwrap();
        assert!(query.select.is_empty());
        assert!(query.filter.is_none());
        assert_eq!(query.page, None);
    }

    #[test]
    fn test_sort_order_tokens() {
        assert_eq!(SortOrder::from_token("desc"), Some(SortOrder::Desc));
        assert_eq!(SortOrder::from_token("ASC"), Some(SortOrder::Asc));
        assert_eq!(SortOrder::from_token("up"), None);
        assert_eq!(SortOrder::Desc.to_string(), "DESC");
    }

    #[test]
    fn test_selection_flags() {
        assert!(Selection::Flag(true).is_selected());
        assert!(!Selection::Flag(false).is_selected());
        assert!(!Selection::Nested(SelectionTree::new()).is_selected());
        assert!(Selection::Nested(SelectionTree::new()).nested().is_none());
    }
}
