//! Parsed form of an operator expression such as `$Not($In([1,2,3]))`.
//!
//! Arguments stay as JSON values: nested operator expressions inside them are
//! kept as strings and parsed again when the condition compiler reaches them.

use serde_json::Value;

/// A filter string after parsing.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Equality against the text as written.
    Literal(String),
    /// `\`-prefixed value: equality against the text after the backslash.
    Escaped(String),
    /// A recognised operator call.
    Op(Operator),
}

/// Aggregate functions usable as operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Aggregate {
    Max,
    Min,
    Sum,
    Avg,
    Count,
    Total,
}

impl Aggregate {
    /// Wrap `column` in the aggregate's SQL function.
    pub fn apply(&self, column: &str) -> String {
        match self {
            Aggregate::Max => format!("MAX({})", column),
            Aggregate::Min => format!("MIN({})", column),
            Aggregate::Sum => format!("SUM({})", column),
            Aggregate::Avg => format!("AVG({})", column),
            Aggregate::Count => format!("COUNT({})", column),
            Aggregate::Total => "COUNT(*)".to_string(),
        }
    }
}

/// Ordering comparisons.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    LessThan,
    LessThanOrEqual,
    MoreThan,
    MoreThanOrEqual,
}

impl Comparison {
    pub fn symbol(&self) -> &'static str {
        match self {
            Comparison::LessThan => "<",
            Comparison::LessThanOrEqual => "<=",
            Comparison::MoreThan => ">",
            Comparison::MoreThanOrEqual => ">=",
        }
    }
}

/// Operator calls of the filter mini-language.
#[derive(Debug, Clone, PartialEq)]
pub enum Operator {
    /// `$Like(pattern)`
    Like(Value),
    /// `$ILike(pattern)`, rendered through `LOWER(..) LIKE` like `$Like`
    ILike(Value),
    /// `$LessThan(v)`, `$LessThanOrEqual(v)`, `$MoreThan(v)`, `$MoreThanOrEqual(v)`
    Compare(Comparison, Value),
    /// `$IsNull()`
    IsNull,
    /// `$Between([low, high])`
    Between(Value, Value),
    /// `$In([a, b, ...])`
    In(Vec<Value>),
    /// `$Any([a, b, ...])`
    Any(Vec<Value>),
    /// `$And([cond, cond, ...])`, each item compiled against the same column
    And(Vec<Value>),
    /// `$Not(op)` where `op` has a dedicated negated form
    Not(Box<Operator>),
    /// `$Not(value)` for anything else
    NotEqual(Value),
    /// `$Max(cond)`, `$Count(cond)`, ...
    Aggregate(Aggregate, Value),
}

impl Operator {
    /// Whether `$Not` has a specific SQL form for this operator.
    pub fn is_negatable(&self) -> bool {
        matches!(
            self,
            Operator::Like(_)
                | Operator::ILike(_)
                | Operator::In(_)
                | Operator::IsNull
                | Operator::Compare(..)
        )
    }
}

/// Text of an argument value as it is spliced into SQL.
pub fn value_text(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        Value::Array(items) => items.iter().map(value_text).collect::<Vec<_>>().join(","),
        Value::Object(_) => value.to_string(),
    }
}
