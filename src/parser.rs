//! Operator expression parser using nom.
//!
//! Parses the filter mini-language into [`Expr`].
//!
//! # Syntax Overview
//!
//! ```text
//! $Not($In(["a","b"]))
//! ─┬── ─┬─ ────┬────
//!  │    │      └── Argument payload (JSON, quoted text or nested calls)
//!  │    └── Nested operator call, kept as text until compiled
//!  └── Operator name
//! ```
//!
//! Parsing never fails. Text that is not a well formed call of a known
//! operator becomes [`Expr::Literal`] and compiles to an equality test.

use nom::{
    branch::alt,
    bytes::complete::{escaped, is_not, take_while1},
    character::complete::{anychar, char},
    combinator::{all_consuming, opt, recognize, rest},
    multi::{many0, separated_list0},
    number::complete::recognize_float,
    sequence::{delimited, preceded, terminated, tuple},
    IResult,
};
use serde_json::Value;
use tracing::trace;

use crate::ast::*;

/// Parse one filter string.
pub fn parse(input: &str) -> Expr {
    let input = input.trim();

    if let Some(escaped) = input.strip_prefix('\\') {
        return Expr::Escaped(escaped.to_string());
    }

    let Some((name, args)) = split_call(input) else {
        return Expr::Literal(input.to_string());
    };

    match parse_operator(name, args) {
        Some(op) => Expr::Op(op),
        None => {
            trace!(operator = name, "unrecognised operator, comparing as literal");
            Expr::Literal(input.to_string())
        }
    }
}

/// Remove `${...}` template placeholders left in a filter value.
pub fn strip_placeholders(input: &str) -> String {
    let mut value = input.to_string();

    loop {
        match (value.find("${"), value.find('}')) {
            (Some(start), Some(end)) if end > start => value.replace_range(start..=end, ""),
            _ => return value,
        }
    }
}

/// Split `Name(args)` into its name and raw argument text.
fn split_call(input: &str) -> Option<(&str, &str)> {
    let (rest, name) = parse_operator_name(input).ok()?;
    let args = rest.strip_suffix(')')?;
    Some((name, args))
}

/// Parse the operator name up to and including the opening parenthesis.
fn parse_operator_name(input: &str) -> IResult<&str, &str> {
    terminated(take_while1(|c: char| c != '('), char('('))(input)
}

/// Build the operator for `name` from its raw argument text.
fn parse_operator(name: &str, args: &str) -> Option<Operator> {
    let op = match name {
        "$Like" => Operator::Like(decode_argument(args)),
        "$ILike" => Operator::ILike(decode_argument(args)),
        "$LessThan" => Operator::Compare(Comparison::LessThan, decode_argument(args)),
        "$LessThanOrEqual" => Operator::Compare(Comparison::LessThanOrEqual, decode_argument(args)),
        "$MoreThan" => Operator::Compare(Comparison::MoreThan, decode_argument(args)),
        "$MoreThanOrEqual" => Operator::Compare(Comparison::MoreThanOrEqual, decode_argument(args)),
        "$IsNull" => Operator::IsNull,
        "$Between" => match decode_argument(args) {
            Value::Array(items) if items.len() >= 2 => {
                Operator::Between(items[0].clone(), items[1].clone())
            }
            _ => return None,
        },
        "$In" => Operator::In(into_list(decode_argument(args))),
        "$Any" => Operator::Any(into_list(decode_argument(args))),
        "$And" => Operator::And(match decode_argument(args) {
            Value::Array(items) => items,
            Value::String(s) => split_arguments(&s),
            other => vec![other],
        }),
        "$Not" => parse_not(decode_argument(args)),
        "$Max" => Operator::Aggregate(Aggregate::Max, decode_argument(args)),
        "$Min" => Operator::Aggregate(Aggregate::Min, decode_argument(args)),
        "$Sum" => Operator::Aggregate(Aggregate::Sum, decode_argument(args)),
        "$Avg" => Operator::Aggregate(Aggregate::Avg, decode_argument(args)),
        "$Count" => Operator::Aggregate(Aggregate::Count, decode_argument(args)),
        "$Total" => Operator::Aggregate(Aggregate::Total, decode_argument(args)),
        _ => return None,
    };
    Some(op)
}

/// `$Not` keeps a dedicated form only for operators that have one.
fn parse_not(arg: Value) -> Operator {
    if let Value::String(text) = &arg {
        if text.trim_end().ends_with(')') {
            if let Expr::Op(inner) = parse(text) {
                if inner.is_negatable() {
                    return Operator::Not(Box::new(inner));
                }
            }
        }
    }
    Operator::NotEqual(arg)
}

fn into_list(value: Value) -> Vec<Value> {
    match value {
        Value::Array(items) => items,
        Value::String(s) if s.is_empty() => Vec::new(),
        other => vec![other],
    }
}

/// Decode an argument payload.
///
/// Tries JSON first. Quoted payloads (`'..'`, `".."`, `` `..` ``) lose one
/// layer of quotes and are retried as a JSON array, then as a JSON object.
/// Anything else is returned as trimmed text.
pub fn decode_argument(input: &str) -> Value {
    if let Ok(value) = serde_json::from_str::<Value>(input) {
        return value;
    }

    let input = input.trim();
    match strip_quotes(input) {
        Some(inner) => serde_json::from_str(&format!("[{}]", inner))
            .or_else(|_| serde_json::from_str(&format!("{{{}}}", inner)))
            .unwrap_or_else(|_| Value::String(inner.to_string())),
        None => Value::String(input.to_string()),
    }
}

fn strip_quotes(input: &str) -> Option<&str> {
    let first = input.chars().next()?;
    if input.len() < 2 || !matches!(first, '\'' | '"' | '`') || !input.ends_with(first) {
        return None;
    }
    Some(&input[1..input.len() - 1])
}

/// Split an argument list on top-level commas and coerce each token.
///
/// A surrounding `[...]` is dropped first. Commas nested in parentheses or
/// inside `'`/`"` quotes do not split.
pub fn split_arguments(input: &str) -> Vec<Value> {
    let input = input
        .strip_prefix('[')
        .and_then(|rest| rest.strip_suffix(']'))
        .unwrap_or(input);

    let Ok((_, mut tokens)) = separated_list0(char(','), argument)(input) else {
        return Vec::new();
    };
    if tokens.last().is_some_and(|last| last.trim().is_empty()) {
        tokens.pop();
    }

    tokens.iter().map(|token| coerce_token(token.trim())).collect()
}

/// One top-level argument, up to the next comma outside quotes and parentheses.
fn argument(input: &str) -> IResult<&str, &str> {
    recognize(many0(alt((
        quoted,
        group,
        is_not(",'\"()"),
        // An unmatched `)` keeps the rest of the input in this argument.
        recognize(preceded(char(')'), rest)),
    ))))(input)
}

/// `( .. )` with nesting. An unclosed group runs to the end of the input.
fn group(input: &str) -> IResult<&str, &str> {
    recognize(delimited(
        char('('),
        many0(alt((quoted, group, is_not("'\"()")))),
        opt(char(')')),
    ))(input)
}

/// A `'..'` or `".."` string. `\` escapes the next character.
fn quoted(input: &str) -> IResult<&str, &str> {
    alt((
        recognize(tuple((
            char('\''),
            opt(escaped(is_not("\\'"), '\\', anychar)),
            opt(char('\'')),
        ))),
        recognize(tuple((
            char('"'),
            opt(escaped(is_not("\\\""), '\\', anychar)),
            opt(char('"')),
        ))),
    ))(input)
}

/// Give a split token its JSON type.
fn coerce_token(token: &str) -> Value {
    if token.starts_with('$') && token.contains('(') && token.ends_with(')') {
        return Value::String(token.to_string());
    }
    match token {
        "true" => return Value::Bool(true),
        "false" => return Value::Bool(false),
        "null" => return Value::Null,
        _ => {}
    }
    if let Some(number) = parse_number(token) {
        return number;
    }
    match strip_quotes(token) {
        Some(inner) => Value::String(inner.to_string()),
        None => Value::String(token.to_string()),
    }
}

/// Parse a numeric literal (integer or float).
fn parse_number(token: &str) -> Option<Value> {
    let (_, num_str) = all_consuming(recognize_float::<&str, nom::error::Error<&str>>)(token).ok()?;

    if let Ok(n) = num_str.parse::<i64>() {
        return Some(Value::from(n));
    }
    num_str
        .parse::<f64>()
        .ok()
        .and_then(serde_json::Number::from_f64)
        .map(Value::Number)
}
