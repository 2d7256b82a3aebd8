//! Built-in predicates
//!
//! Type checks over a possibly-absent value. `None` (an absent key) only
//! satisfies [`is_undefined`]; JSON `null` only satisfies [`is_defined`] and
//! [`is_null`].

use crate::Predicate;
use serde_json::Value;

/// The key is present (any value, including `null`).
#[must_use]
pub fn is_defined() -> Predicate {
    Predicate::new("is_defined", |v| v.is_some())
}

/// The key is absent.
#[must_use]
pub fn is_undefined() -> Predicate {
    Predicate::new("is_undefined", |v| v.is_none())
}

#[must_use]
pub fn is_null() -> Predicate {
    Predicate::new("is_null", |v| v.is_some_and(Value::is_null))
}

#[must_use]
pub fn is_number() -> Predicate {
    Predicate::new("is_number", |v| v.is_some_and(Value::is_number))
}

/// A number with no fractional part.
#[must_use]
pub fn is_integer() -> Predicate {
    Predicate::new("is_integer", |v| match v {
        Some(Value::Number(n)) => {
            n.is_i64() || n.is_u64() || n.as_f64().is_some_and(|f| f.fract() == 0.0)
        }
        _ => false,
    })
}

#[must_use]
pub fn is_string() -> Predicate {
    Predicate::new("is_string", |v| v.is_some_and(Value::is_string))
}

#[must_use]
pub fn is_boolean() -> Predicate {
    Predicate::new("is_boolean", |v| v.is_some_and(Value::is_boolean))
}

#[must_use]
pub fn is_array() -> Predicate {
    Predicate::new("is_array", |v| v.is_some_and(Value::is_array))
}

/// A mapping or an array.
#[must_use]
pub fn is_object() -> Predicate {
    Predicate::new("is_object", |v| {
        v.is_some_and(|v| v.is_object() || v.is_array())
    })
}

/// A mapping, excluding arrays.
#[must_use]
pub fn is_plain_object() -> Predicate {
    Predicate::new("is_plain_object", |v| v.is_some_and(Value::is_object))
}

/// Every built-in predicate, in name order.
#[must_use]
pub fn all() -> Vec<Predicate> {
    vec![
        is_array(),
        is_boolean(),
        is_defined(),
        is_integer(),
        is_null(),
        is_number(),
        is_object(),
        is_plain_object(),
        is_string(),
        is_undefined(),
    ]
}
