//! Combinators — `not` and `or` over template nodes
//!
//! Both combinators evaluate their operands speculatively: the sink is
//! checkpointed before an operand runs and rolled back when that operand's
//! diagnostics should not survive.

use crate::{
    matcher::{match_node, Scope},
    mismatch::render,
    ErrorSink, Reason, Template,
};
use serde_json::Value;

/// Negate a template node.
///
/// # Example
///
/// ```
/// use congruence::{builtins, congruent, not, Template};
/// use serde_json::json;
///
/// let template = Template::object([("id", not(builtins::is_string()))]).unwrap();
/// assert!(congruent(&template, &json!({ "id": 1 })));
/// assert!(!congruent(&template, &json!({ "id": "1" })));
/// ```
#[must_use]
pub fn not(node: impl Into<Template>) -> Template {
    Template::Not(Box::new(node.into()))
}

/// Match when any operand matches. Operands are tried in order.
///
/// An `or` with no operands never matches.
///
/// # Example
///
/// ```
/// use congruence::{builtins, congruent, or, Template};
/// use serde_json::json;
///
/// let id = or([builtins::is_number().into(), Template::pattern("^[0-9]+$").unwrap()]);
/// let template = Template::object([("id", id)]).unwrap();
/// assert!(congruent(&template, &json!({ "id": 7 })));
/// assert!(congruent(&template, &json!({ "id": "7" })));
/// assert!(!congruent(&template, &json!({ "id": "seven" })));
/// ```
#[must_use]
pub fn or<I, T>(operands: I) -> Template
where
    I: IntoIterator<Item = T>,
    T: Into<Template>,
{
    Template::Or(operands.into_iter().map(Into::into).collect())
}

/// # INV: no leakage
///
/// Nothing the inner node pushes survives, whatever its outcome.
pub(crate) fn evaluate_not(
    inner: &Template,
    value: Option<&Value>,
    scope: Scope,
    errors: &mut ErrorSink,
) -> bool {
    let checkpoint = errors.checkpoint();
    let matched = match_node(inner, value, scope, errors);
    errors.rollback(checkpoint);
    if matched {
        errors.push(Reason::PredicateFailed {
            name: format!("not({inner})"),
            value: render(value),
        });
    }
    !matched
}

/// # INV: last operand explains
///
/// On success the sink is restored to its pre-`or` state. On failure only
/// the last operand's reasons remain.
pub(crate) fn evaluate_or(
    operands: &[Template],
    value: Option<&Value>,
    scope: Scope,
    errors: &mut ErrorSink,
) -> bool {
    let Some(last) = operands.len().checked_sub(1) else {
        errors.push(Reason::PredicateFailed {
            name: "or()".to_owned(),
            value: render(value),
        });
        return false;
    };

    let checkpoint = errors.checkpoint();
    for (i, operand) in operands.iter().enumerate() {
        if match_node(operand, value, scope, errors) {
            errors.rollback(checkpoint);
            return true;
        }
        if i != last {
            errors.rollback(checkpoint);
        }
    }
    false
}
