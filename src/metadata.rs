//! Relation metadata: a table, its columns and the relations reachable from it.
//!
//! The metadata tree is built by the caller (usually decoded from JSON) and is
//! only ever read by the compiler.
//!
//! ```json
//! {
//!   "tableName": "user",
//!   "columns": [{ "name": "id" }, { "name": "roleId" }],
//!   "relations": {
//!     "role": {
//!       "type": "many-to-one",
//!       "tableName": "role",
//!       "referencedTableName": "user",
//!       "referencedColumn": "roleId",
//!       "primaryColumn": "id",
//!       "columns": [{ "name": "id" }, { "name": "name" }]
//!     }
//!   }
//! }
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::RelQueryResult;

/// Direction of a relation between a declaring table and its child.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RelationKind {
    /// The parent's primary key is referenced by the child's foreign key.
    #[serde(rename = "one-to-many")]
    OneToMany,
    /// The parent holds the foreign key pointing at the child.
    #[serde(rename = "many-to-one")]
    ManyToOne,
}

/// A column owned by a table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
}

impl Column {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// One node of the relation metadata tree.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelationMetadata {
    pub table_name: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<RelationKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub referenced_table_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub referenced_column: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_column: Option<String>,
    #[serde(default)]
    pub columns: Vec<Column>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub relations: BTreeMap<String, RelationMetadata>,
}

impl RelationMetadata {
    /// Create an empty node for `table_name`.
    pub fn new(table_name: impl Into<String>) -> Self {
        Self {
            table_name: table_name.into(),
            ..Default::default()
        }
    }

    /// Decode a metadata tree from its JSON form.
    pub fn from_json(input: &str) -> RelQueryResult<Self> {
        Ok(serde_json::from_str(input)?)
    }

    /// Add columns by name.
    pub fn columns<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns.extend(names.into_iter().map(Column::new));
        self
    }

    /// Attach a child relation under `name`.
    pub fn relation(mut self, name: impl Into<String>, child: RelationMetadata) -> Self {
        self.relations.insert(name.into(), child);
        self
    }

    /// Describe how this node joins onto `referenced_table`.
    pub fn joined(
        mut self,
        kind: RelationKind,
        referenced_table: impl Into<String>,
        referenced_column: impl Into<String>,
        primary_column: impl Into<String>,
    ) -> Self {
        self.kind = Some(kind);
        self.referenced_table_name = Some(referenced_table.into());
        self.referenced_column = Some(referenced_column.into());
        self.primary_column = Some(primary_column.into());
        self
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c.name == name)
    }

    /// A child relation, if it is declared and carries any columns.
    pub fn child(&self, name: &str) -> Option<&RelationMetadata> {
        self.relations.get(name).filter(|child| !child.is_empty())
    }

    /// Primary key column used when counting rows, `id` unless declared.
    pub fn primary_column(&self) -> &str {
        self.primary_column.as_deref().unwrap_or("id")
    }

    fn is_empty(&self) -> bool {
        self.table_name.is_empty() && self.columns.is_empty() && self.relations.is_empty()
    }

    /// The `ON` predicate joining this node onto its parent.
    ///
    /// `one-to-many` compares the child's foreign key with the parent's primary
    /// key; every other kind compares the parent's foreign key with the child's
    /// primary key.
    pub fn join_condition(&self) -> String {
        let referenced_table = self.referenced_table_name.as_deref().unwrap_or_default();
        let referenced_column = self.referenced_column.as_deref().unwrap_or_default();
        let primary_column = self.primary_column();

        match self.kind {
            Some(RelationKind::OneToMany) => format!(
                "{}.{} = {}.{}",
                self.table_name, referenced_column, referenced_table, primary_column
            ),
            _ => format!(
                "{}.{} = {}.{}",
                referenced_table, referenced_column, self.table_name, primary_column
            ),
        }
    }
}
