//! WHERE and HAVING predicates from the filter tree.
//!
//! Object entries are ANDed, array items are ORed, and string leaves go
//! through the operator parser. Branches that compile to nothing are dropped
//! without leaving a dangling `AND`/`OR`. An OR group that ends up next to
//! other conditions in an AND is parenthesized.
//!
//! The same tree is compiled twice when the query is grouped: once for WHERE,
//! where aggregate operators contribute nothing, and once for HAVING, where
//! only aggregate operators contribute.

use indexmap::IndexSet;
use serde_json::Value;

use crate::ast::{value_text, Expr, Operator};
use crate::parser;

/// Which clause a filter tree is being compiled for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Clause {
    Where,
    Having,
}

/// A compiled condition. `disjunction` marks a bare `a OR b` chain.
#[derive(Debug, Default, Clone, PartialEq, Eq, Hash)]
struct Predicate {
    sql: String,
    disjunction: bool,
}

impl Predicate {
    fn new(sql: String) -> Self {
        Self {
            sql,
            disjunction: false,
        }
    }

    fn is_empty(&self) -> bool {
        self.sql.is_empty()
    }

    /// `a OR b OR ..` over the non-empty parts.
    fn any(parts: impl IntoIterator<Item = Predicate>) -> Self {
        let parts = non_empty(parts);
        Self {
            disjunction: parts.len() > 1,
            sql: parts
                .into_iter()
                .map(|part| part.sql)
                .collect::<Vec<_>>()
                .join(" OR "),
        }
    }

    /// `a AND b AND ..` over the non-empty parts.
    fn all(parts: impl IntoIterator<Item = Predicate>) -> Self {
        let parts = non_empty(parts);
        // AND binds tighter than OR.
        let wrap = parts.len() > 1;
        Self::new(
            parts
                .into_iter()
                .map(|part| {
                    if wrap && part.disjunction {
                        format!("({})", part.sql)
                    } else {
                        part.sql
                    }
                })
                .collect::<Vec<_>>()
                .join(" AND "),
        )
    }
}

/// Compiles filter trees rooted at one table.
#[derive(Debug, Clone, Copy)]
pub struct ConditionCompiler<'a> {
    table: &'a str,
    grouped: bool,
}

impl<'a> ConditionCompiler<'a> {
    /// `grouped` is whether the query carries a GROUP BY clause.
    pub fn new(table: &'a str, grouped: bool) -> Self {
        Self { table, grouped }
    }

    /// Compile a whole filter tree.
    pub fn compile(&self, filter: &Value, clause: Clause) -> String {
        self.compile_tree(filter, clause).sql
    }

    fn compile_tree(&self, filter: &Value, clause: Clause) -> Predicate {
        match filter {
            Value::Array(items) => Predicate::any(
                items.iter().map(|item| self.compile_array_item(item, clause)),
            ),
            Value::Object(entries) => Predicate::all(
                entries
                    .iter()
                    .map(|(column, value)| self.compile_item(column, value, clause)),
            ),
            _ => Predicate::default(),
        }
    }

    /// Items of a top-level array: nested trees recurse, scalars are raw SQL.
    fn compile_array_item(&self, item: &Value, clause: Clause) -> Predicate {
        match item {
            Value::Array(items) if !items.is_empty() => self.compile_tree(item, clause),
            Value::Object(entries) if !entries.is_empty() => self.compile_tree(item, clause),
            Value::String(raw) if clause == Clause::Where => Predicate::new(raw.clone()),
            Value::Bool(_) | Value::Number(_) if clause == Clause::Where => {
                Predicate::new(item.to_string())
            }
            _ => Predicate::default(),
        }
    }

    /// Compile the condition `value` on `column`.
    fn compile_item(&self, column: &str, value: &Value, clause: Clause) -> Predicate {
        let column = self.qualify(column);

        match value {
            Value::String(text) if !text.trim().is_empty() => {
                self.compile_expr(&column, &parser::strip_placeholders(text), clause)
            }
            Value::String(_) => where_only(clause, || format!("({} = '')", column)),
            Value::Bool(_) | Value::Number(_) => {
                where_only(clause, || format!("({} = {})", column, value))
            }
            Value::Object(entries) if !entries.is_empty() => {
                let table = column.rsplit('.').next().unwrap_or(column.as_str());
                let parts: IndexSet<Predicate> = entries
                    .iter()
                    .map(|(key, nested)| self.compile_item(&format!("{}.{}", table, key), nested, clause))
                    .collect();
                Predicate::all(parts)
            }
            Value::Array(items) if !items.is_empty() => Predicate::any(
                items.iter().map(|item| self.compile_item(&column, item, clause)),
            ),
            _ => Predicate::default(),
        }
    }

    fn compile_expr(&self, column: &str, text: &str, clause: Clause) -> Predicate {
        match parser::parse(text) {
            Expr::Literal(literal) | Expr::Escaped(literal) => {
                where_only(clause, || format!("({} = '{}')", column, literal))
            }
            Expr::Op(op) => self.compile_operator(column, &op, clause),
        }
    }

    fn compile_operator(&self, column: &str, op: &Operator, clause: Clause) -> Predicate {
        let sql = match op {
            Operator::Aggregate(aggregate, arg) => match clause {
                // The nested condition applies to the aggregated column itself.
                Clause::Having => {
                    return self.compile_item(&aggregate.apply(column), arg, Clause::Where);
                }
                Clause::Where if self.grouped => String::new(),
                Clause::Where => format!(
                    "({} = (SELECT {} FROM {}))",
                    column,
                    aggregate.apply(column),
                    self.table
                ),
            },
            Operator::And(items) => {
                return Predicate::all(
                    items.iter().map(|item| self.compile_item(column, item, clause)),
                );
            }
            _ if clause == Clause::Having => String::new(),
            Operator::Like(pattern) | Operator::ILike(pattern) => {
                format!("(LOWER({}) LIKE '{}')", column, value_text(pattern))
            }
            Operator::Compare(comparison, value) => {
                format!("({} {} '{}')", column, comparison.symbol(), value_text(value))
            }
            Operator::IsNull => format!("({} = '')", column),
            Operator::Between(low, high) => format!(
                "(({} >= {}) AND ({} <= {}))",
                column,
                bound(low),
                column,
                bound(high)
            ),
            Operator::In(items) if items.is_empty() => String::new(),
            Operator::In(items) => format!("({})", equalities(column, items).join(" OR ")),
            Operator::Any(items) if items.is_empty() => String::new(),
            Operator::Any(items) => format!("(ANY(ARRAY[{}]))", equalities(column, items).join(",")),
            Operator::Not(inner) => negate(column, inner),
            Operator::NotEqual(value) => format!("({} != '{}')", column, value_text(value)),
        };
        Predicate::new(sql)
    }

    /// Bare column names belong to the root table.
    fn qualify(&self, column: &str) -> String {
        if column.contains('.') || column.contains('(') {
            column.to_string()
        } else {
            format!("{}.{}", self.table, column)
        }
    }
}

/// The dedicated negated form of a `$Not` operand.
fn negate(column: &str, inner: &Operator) -> String {
    match inner {
        Operator::In(items) if items.is_empty() => String::new(),
        Operator::In(items) => format!(
            "({} NOT IN ({}))",
            column,
            items
                .iter()
                .map(|item| format!("'{}'", value_text(item)))
                .collect::<Vec<_>>()
                .join(",")
        ),
        Operator::Like(pattern) | Operator::ILike(pattern) => {
            format!("({} NOT LIKE '{}')", column, value_text(pattern))
        }
        Operator::IsNull => format!("({} IS NOT NULL)", column),
        Operator::Compare(comparison, value) => format!(
            "({} NOT {} ({}))",
            column,
            comparison.symbol(),
            value_text(value)
        ),
        // The parser only wraps negatable operators.
        _ => String::new(),
    }
}

fn equalities(column: &str, items: &[Value]) -> Vec<String> {
    items
        .iter()
        .map(|item| format!("({} = '{}')", column, value_text(item)))
        .collect()
}

/// Numbers stay bare, everything else is quoted.
fn bound(value: &Value) -> String {
    match value {
        Value::Number(n) => n.to_string(),
        other => format!("'{}'", value_text(other)),
    }
}

fn where_only(clause: Clause, render: impl FnOnce() -> String) -> Predicate {
    match clause {
        Clause::Where => Predicate::new(render()),
        Clause::Having => Predicate::default(),
    }
}

fn non_empty(parts: impl IntoIterator<Item = Predicate>) -> Vec<Predicate> {
    parts.into_iter().filter(|part| !part.is_empty()).collect()
}
