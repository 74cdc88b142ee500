//! Compiled fragments and the final statement text.

use std::fmt;

use super::ToSql;

/// What kind of statement to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Row returning SELECT.
    Find,
    /// `SELECT COUNT(..) AS total`.
    Count,
}

/// Clause bodies produced by one compilation.
///
/// A `None` fragment means the clause is left out of the statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragments {
    pub table: String,
    pub primary_column: String,
    pub joins: Option<String>,
    pub select: Option<String>,
    pub orders: Option<String>,
    pub groups: Option<String>,
    pub limits: Option<String>,
    pub filter: Option<String>,
    pub having: Option<String>,
}

impl Fragments {
    pub fn is_grouped(&self) -> bool {
        self.groups.is_some()
    }

    /// Render the statement for `mode`.
    pub fn render(&self, mode: Mode) -> String {
        match mode {
            Mode::Find => self.render_find(),
            Mode::Count if self.is_grouped() => {
                format!("SELECT\nCOUNT(*) AS total\nFROM (\n\t{}) grouped;", self.body())
            }
            Mode::Count => {
                let mut sql = format!(
                    "SELECT\nCOUNT(DISTINCT {}.{}) AS total\nFROM {}",
                    self.table, self.primary_column, self.table
                );
                push_clause(&mut sql, "", &self.joins);
                push_clause(&mut sql, "WHERE\n\t", &self.filter);
                sql.push(';');
                sql
            }
        }
    }

    fn render_find(&self) -> String {
        let mut sql = self.body();
        push_clause(&mut sql, "ORDER BY\n\t", &self.orders);
        sql.push('\n');
        if let Some(limits) = &self.limits {
            sql.push_str(limits);
        }
        sql.push(';');
        sql
    }

    /// SELECT through HAVING, shared by `find` and the grouped `count`.
    fn body(&self) -> String {
        let mut sql = String::from("SELECT");
        match &self.select {
            Some(select) => {
                sql.push('\n');
                sql.push_str(select);
            }
            None => sql.push_str(" *"),
        }
        sql.push_str("\nFROM ");
        sql.push_str(&self.table);
        push_clause(&mut sql, "", &self.joins);
        push_clause(&mut sql, "WHERE\n\t", &self.filter);
        push_clause(&mut sql, "GROUP BY\n\t", &self.groups);
        push_clause(&mut sql, "HAVING\n\t", &self.having);
        sql
    }
}

fn push_clause(sql: &mut String, keyword: &str, body: &Option<String>) {
    if let Some(body) = body {
        sql.push('\n');
        sql.push_str(keyword);
        sql.push_str(body);
    }
}

/// A compiled query bound to its mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    mode: Mode,
    fragments: Fragments,
}

impl Statement {
    pub fn new(mode: Mode, fragments: Fragments) -> Self {
        Self { mode, fragments }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn fragments(&self) -> &Fragments {
        &self.fragments
    }
}

impl ToSql for Statement {
    fn to_sql(&self) -> String {
        self.fragments.render(self.mode)
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_sql())
    }
}
