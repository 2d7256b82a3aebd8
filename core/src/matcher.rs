//! Structural matcher — recursive walk of a template/object pair
//!
//! [`match_node`] dispatches on the template node kind. Nested templates walk
//! the union of template keys and object keys; leaves hand off to
//! [`evaluate_leaf`](crate::evaluate::evaluate_leaf); combinators re-enter
//! `match_node`.

use crate::{
    combinator,
    evaluate::{evaluate_leaf, Leaf},
    mismatch::render,
    ErrorSink, MatchMode, NestedTemplate, Reason, Template, MAX_DEPTH,
};
use serde_json::{Map, Value};

/// Per-call state carried down the recursion.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Scope {
    mode: MatchMode,
    depth: usize,
}

impl Scope {
    pub(crate) fn root() -> Self {
        Self::with_mode(MatchMode::Congruent)
    }

    pub(crate) fn with_mode(mode: MatchMode) -> Self {
        Self { mode, depth: 0 }
    }

    /// One level deeper. A nested template may fix its own mode.
    pub(crate) fn descend(self, mode: Option<MatchMode>) -> Self {
        Self {
            mode: mode.unwrap_or(self.mode),
            depth: self.depth + 1,
        }
    }
}

/// Match one template node against one possibly-absent value.
///
/// # INV: result is pure
///
/// The return value depends only on the template and value. The sink only
/// receives explanations; it never influences the outcome.
pub(crate) fn match_node(
    template: &Template,
    value: Option<&Value>,
    scope: Scope,
    errors: &mut ErrorSink,
) -> bool {
    if scope.depth >= MAX_DEPTH {
        tracing::trace!(depth = scope.depth, "nesting depth guard hit");
        errors.push(Reason::DepthExceeded { max: MAX_DEPTH });
        return false;
    }

    match template {
        Template::Nested(nested) => match value {
            Some(Value::Object(object)) => {
                match_nested(nested, object, scope.descend(nested.mode()), errors)
            }
            other => {
                errors.push(Reason::NotAnObject {
                    value: render(other),
                });
                false
            }
        },
        Template::Not(inner) => combinator::evaluate_not(inner, value, scope.descend(None), errors),
        Template::Or(operands) => {
            combinator::evaluate_or(operands, value, scope.descend(None), errors)
        }
        Template::Pattern(re) => evaluate_leaf(Leaf::Pattern(re), value, errors),
        Template::Predicate(predicate) => evaluate_leaf(Leaf::Predicate(predicate), value, errors),
        Template::Literal(expected) => evaluate_leaf(Leaf::Literal(expected), value, errors),
    }
}

/// Match a mapping against a nested template.
///
/// Every key is visited, even after a failure, so that the sink collects
/// one reason per offending key.
pub(crate) fn match_nested(
    nested: &NestedTemplate,
    object: &Map<String, Value>,
    scope: Scope,
    errors: &mut ErrorSink,
) -> bool {
    let rest = nested.rest_template();
    let mut matched = true;

    for (key, field) in nested.fields() {
        let value = object.get(key);
        if field.is_optional() && value.is_none() {
            continue;
        }
        errors.enter(key);
        let checkpoint = errors.checkpoint();
        let mut ok = match_node(field.template(), value, scope, errors);
        if !ok {
            if let Some(rest) = rest {
                tracing::trace!(key, "retrying against rest template");
                errors.rollback(checkpoint);
                ok = match_node(rest, value, scope, errors);
            }
        }
        errors.leave();
        matched &= ok;
    }

    for (key, value) in object {
        if nested.get(key).is_some() {
            continue;
        }
        let ok = match rest {
            Some(rest) => {
                errors.enter(key);
                let ok = match_node(rest, Some(value), scope, errors);
                errors.leave();
                ok
            }
            None if scope.mode == MatchMode::Similar => true,
            None => {
                errors.enter(key);
                errors.push(Reason::NoMatch {
                    value: render(Some(value)),
                });
                errors.leave();
                false
            }
        };
        matched &= ok;
    }

    matched
}
