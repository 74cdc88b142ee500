//! SQL transpiler for query descriptions.
//!
//! Turns a [`Query`] plus the root [`RelationMetadata`] into SQL text. The
//! stages run in a fixed order because filtering depends on whether the query
//! is grouped:
//!
//! ```text
//! joins → projection → ordering → grouping → pagination → where → having
//! ```

pub mod conditions;
pub mod joins;
pub mod limits;
pub mod ordering;
pub mod select;
pub mod statement;

use tracing::debug;

use crate::config::CompilerConfig;
use crate::metadata::RelationMetadata;
use crate::query::Query;

use conditions::{Clause, ConditionCompiler};
use limits::Pagination;

pub use statement::{Fragments, Mode, Statement};

/// Trait for converting compiled nodes to SQL.
pub trait ToSql {
    /// Convert this node to a SQL string.
    fn to_sql(&self) -> String;
}

/// Compiles queries against one metadata tree.
///
/// Every call builds its own [`Fragments`], so a compiler can be shared
/// between threads and reused freely.
#[derive(Debug, Clone)]
pub struct Compiler<'a> {
    metadata: &'a RelationMetadata,
    config: CompilerConfig,
}

impl<'a> Compiler<'a> {
    pub fn new(metadata: &'a RelationMetadata) -> Self {
        Self::with_config(metadata, CompilerConfig::default())
    }

    pub fn with_config(metadata: &'a RelationMetadata, config: CompilerConfig) -> Self {
        Self { metadata, config }
    }

    pub fn metadata(&self) -> &'a RelationMetadata {
        self.metadata
    }

    pub fn config(&self) -> &CompilerConfig {
        &self.config
    }

    /// Row returning statement for `query`.
    pub fn find(&self, query: &Query) -> Statement {
        Statement::new(Mode::Find, self.compile(query))
    }

    /// Row count statement for `query`.
    pub fn count(&self, query: &Query) -> Statement {
        Statement::new(Mode::Count, self.compile(query))
    }

    /// Run every stage and collect the clause bodies.
    pub fn compile(&self, query: &Query) -> Fragments {
        let metadata = self.metadata;
        let table = metadata.table_name.as_str();

        let joins = non_empty(joins::create_joins(metadata, &query.relations).join("\n"));

        let select = if metadata.columns.is_empty() || query.select.is_empty() {
            None
        } else {
            let projection = select::create_select(&query.select, &query.relations, metadata);
            non_empty(select::render_select(&projection))
        };

        let orders = non_empty(ordering::create_orders(&query.orders, table).join(", "));
        let groups = non_empty(ordering::create_groups(&query.groups, table).join(", "));
        let limits = Pagination::resolve(query, self.config.default_limit).map(|p| p.to_string());

        let conditions = ConditionCompiler::new(table, groups.is_some());
        let filter = query
            .filter
            .as_ref()
            .and_then(|filter| non_empty(conditions.compile(filter, Clause::Where)));
        let having = match (&groups, &query.filter) {
            (Some(_), Some(filter)) => non_empty(conditions.compile(filter, Clause::Having)),
            _ => None,
        };

        debug!(
            table,
            grouped = groups.is_some(),
            joins = joins.as_ref().map_or(0, |j| j.lines().count()),
            has_where = filter.is_some(),
            has_having = having.is_some(),
            "compiled query"
        );

        Fragments {
            table: table.to_string(),
            primary_column: metadata.primary_column().to_string(),
            joins,
            select,
            orders,
            groups,
            limits,
            filter,
            having,
        }
    }
}

fn non_empty(text: String) -> Option<String> {
    if text.is_empty() { None } else { Some(text) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn metadata() -> RelationMetadata {
        RelationMetadata::new("user").columns(["id", "login"])
    }

    fn query(value: serde_json::Value) -> Query {
        Query::from_value(value).unwrap()
    }

    #[test]
    fn test_empty_query() {
        let meta = metadata();
        let compiler = Compiler::new(&meta);
        assert_eq!(
            compiler.find(&Query::default()).to_sql(),
            "SELECT *\nFROM user\nLIMIT 0, 20;"
        );
    }

    #[test]
    fn test_configured_default_limit() {
        let meta = metadata();
        let compiler = Compiler::with_config(&meta, CompilerConfig::default().with_default_limit(50));
        assert_eq!(compiler.config().default_limit, 50);
        assert_eq!(compiler.metadata().table_name, "user");
        assert_eq!(
            compiler.find(&Query::default()).to_sql(),
            "SELECT *\nFROM user\nLIMIT 0, 50;"
        );
    }

    #[test]
    fn test_calls_do_not_leak_state() {
        let meta = metadata();
        let compiler = Compiler::new(&meta);
        let filtered = query(json!({ "select": { "login": true }, "where": { "login": "a" } }));

        let first = compiler.find(&filtered).to_sql();
        let plain = compiler.find(&Query::default()).to_sql();
        let second = compiler.find(&filtered).to_sql();

        assert_eq!(first, second);
        assert_eq!(plain, "SELECT *\nFROM user\nLIMIT 0, 20;");
    }

    #[test]
    fn test_having_needs_grouping() {
        let meta = metadata();
        let compiler = Compiler::new(&meta);
        let fragments = compiler.compile(&query(json!({ "where": { "id": "$Count(3)" } })));
        assert_eq!(fragments.having, None);
        assert_eq!(
            fragments.filter.as_deref(),
            Some("(user.id = (SELECT COUNT(user.id) FROM user))")
        );
    }

    #[test]
    fn test_having_without_where_portion() {
        let meta = metadata();
        let compiler = Compiler::new(&meta);
        let fragments = compiler.compile(&query(json!({
            "groups": { "login": true },
            "where": { "id": "$Count($MoreThan(3))" }
        })));
        assert_eq!(fragments.filter, None);
        assert_eq!(fragments.having.as_deref(), Some("(COUNT(user.id) > '3')"));
    }

    #[test]
    fn test_statement_keeps_its_fragments() {
        let meta = metadata();
        let compiler = Compiler::new(&meta);
        let query = query(json!({ "where": { "login": "a" }, "take": 5 }));

        let find = compiler.find(&query);
        let count = compiler.count(&query);
        assert_eq!(find.mode(), Mode::Find);
        assert_eq!(count.mode(), Mode::Count);
        assert_eq!(find.fragments(), count.fragments());
        assert_eq!(find.fragments().limits.as_deref(), Some("LIMIT 0, 5"));
        assert_eq!(find.fragments().filter.as_deref(), Some("(user.login = 'a')"));
    }

    #[test]
    fn test_select_ignored_without_columns() {
        let meta = RelationMetadata::new("audit");
        let compiler = Compiler::new(&meta);
        let fragments = compiler.compile(&query(json!({ "select": { "id": true } })));
        assert_eq!(fragments.select, None);
    }

    #[test]
    fn test_compiler_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Compiler<'static>>();
    }
}
