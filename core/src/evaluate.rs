//! Leaf evaluation — patterns, predicates and literals
//!
//! A leaf is evaluated against one possibly-absent value and produces a
//! boolean. On failure exactly one reason is appended to the sink (unless the
//! predicate already explained itself).

use crate::{mismatch::render, ErrorSink, Predicate, Reason};
use regex::Regex;
use serde_json::{Number, Value};
use std::borrow::Cow;

/// A template node with no structural children.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Leaf<'a> {
    Pattern(&'a Regex),
    Predicate(&'a Predicate),
    Literal(&'a Value),
}

/// Evaluate a leaf against a value, recording a reason on failure.
pub(crate) fn evaluate_leaf(leaf: Leaf<'_>, value: Option<&Value>, errors: &mut ErrorSink) -> bool {
    match leaf {
        Leaf::Pattern(re) => {
            if pattern_subject(value).is_some_and(|text| re.is_match(&text)) {
                return true;
            }
            errors.push(Reason::PatternMismatch {
                pattern: re.as_str().to_owned(),
                value: render(value),
            });
            false
        }
        Leaf::Predicate(predicate) => {
            let checkpoint = errors.checkpoint();
            if predicate.test(value, errors) {
                errors.rollback(checkpoint);
                return true;
            }
            if !errors.reported_since(checkpoint) {
                errors.push(Reason::PredicateFailed {
                    name: predicate.name().to_owned(),
                    value: render(value),
                });
            }
            false
        }
        Leaf::Literal(expected) => {
            if value.is_some_and(|v| strict_eq(expected, v)) {
                return true;
            }
            errors.push(Reason::NotEqual {
                expected: expected.to_string(),
                value: render(value),
            });
            false
        }
    }
}

/// The text a pattern is tested against.
///
/// Strings are used as-is; numbers and booleans by their JSON text. Absent
/// values, `null`, arrays and objects have no text and never match.
fn pattern_subject(value: Option<&Value>) -> Option<Cow<'_, str>> {
    match value? {
        Value::String(s) => Some(Cow::Borrowed(s)),
        Value::Number(n) => Some(Cow::Owned(n.to_string())),
        Value::Bool(b) => Some(Cow::Owned(b.to_string())),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Literal equality.
///
/// Numbers compare by numeric value, so `1` equals `1.0`. Arrays and objects
/// compare element-wise with the same rule.
pub(crate) fn strict_eq(expected: &Value, actual: &Value) -> bool {
    match (expected, actual) {
        (Value::Number(a), Value::Number(b)) => numbers_eq(a, b),
        (Value::Array(a), Value::Array(b)) => {
            a.len() == b.len() && a.iter().zip(b).all(|(x, y)| strict_eq(x, y))
        }
        (Value::Object(a), Value::Object(b)) => {
            a.len() == b.len()
                && a.iter()
                    .all(|(k, x)| b.get(k).is_some_and(|y| strict_eq(x, y)))
        }
        _ => expected == actual,
    }
}

fn numbers_eq(a: &Number, b: &Number) -> bool {
    if let (Some(x), Some(y)) = (a.as_i64(), b.as_i64()) {
        return x == y;
    }
    if let (Some(x), Some(y)) = (a.as_u64(), b.as_u64()) {
        return x == y;
    }
    match (a.as_f64(), b.as_f64()) {
        (Some(x), Some(y)) => x == y,
        _ => false,
    }
}
