//! # relquery — query descriptions to SQL
//!
//! relquery compiles a declarative, JSON-shaped query description (selected
//! fields, relations to join, filters, grouping, ordering, pagination) and a
//! static relation metadata tree into SQL text. It never executes anything:
//! the caller receives the finished statement.
//!
//! ## Quick Example
//!
//! ```rust,ignore
//! use relquery::prelude::*;
//!
//! let metadata = RelationMetadata::from_json(include_str!("user.json"))?;
//! let query = Query::from_json(r#"{
//!     "select": { "id": true, "login": true },
//!     "where": { "login": "$Like(\"adm%\")" },
//!     "take": 10
//! }"#)?;
//!
//! let sql = Compiler::new(&metadata).find(&query).to_sql();
//! // SELECT
//! //     user.id AS user_____id,
//! //     user.login AS user_____login
//! // FROM user
//! // WHERE
//! //     (LOWER(user.login) LIKE 'adm%')
//! // LIMIT 0, 10;
//! ```
//!
//! ## Operators
//!
//! | Operator | SQL |
//! |----------|-----|
//! | `$Like(p)`, `$ILike(p)` | `LOWER(col) LIKE 'p'` |
//! | `$LessThan(v)` .. `$MoreThanOrEqual(v)` | `col < 'v'` .. `col >= 'v'` |
//! | `$IsNull()` | `col = ''` |
//! | `$Between([a,b])` | `(col >= a) AND (col <= b)` |
//! | `$In([..])`, `$Any([..])` | ORed equalities |
//! | `$And([..])` | ANDed conditions on one column |
//! | `$Not(op)` | `NOT IN`, `NOT LIKE`, `IS NOT NULL`, `NOT <op>`, else `!=` |
//! | `$Max`, `$Min`, `$Sum`, `$Avg`, `$Count`, `$Total` | subquery, or HAVING when grouped |

pub mod ast;
pub mod config;
pub mod error;
pub mod metadata;
pub mod parser;
pub mod query;
pub mod transpiler;

pub mod prelude {
    pub use crate::ast::*;
    pub use crate::config::CompilerConfig;
    pub use crate::error::*;
    pub use crate::metadata::{Column, RelationKind, RelationMetadata};
    pub use crate::query::{OrderBy, Query, Selection, SortOrder};
    pub use crate::transpiler::{Compiler, Fragments, Mode, Statement, ToSql};
}

use metadata::RelationMetadata;
use query::Query;
use transpiler::{Compiler, ToSql};

/// Compile `query` into a row returning SELECT with the default configuration.
///
/// # Example
///
/// ```
/// use relquery::{compile_find, metadata::RelationMetadata, query::Query};
///
/// let metadata = RelationMetadata::new("user").columns(["id"]);
/// let sql = compile_find(&metadata, &Query::default());
/// assert_eq!(sql, "SELECT *\nFROM user\nLIMIT 0, 20;");
/// ```
pub fn compile_find(metadata: &RelationMetadata, query: &Query) -> String {
    Compiler::new(metadata).find(query).to_sql()
}

/// Compile `query` into a row count statement with the default configuration.
pub fn compile_count(metadata: &RelationMetadata, query: &Query) -> String {
    Compiler::new(metadata).count(query).to_sql()
}
