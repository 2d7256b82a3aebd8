//! Entry points — free functions and the typed [`Congruence`] root

use crate::{
    matcher::{match_nested, Scope},
    ErrorSink, MatchMode, Mismatch, NestedTemplate, Reason, Template, TemplateError,
};
use serde_json::Value;
use std::sync::Arc;

/// Returns `true` if `object` has exactly the template's key set and every
/// value matches.
///
/// Returns `false` (never panics) if either argument is not a mapping.
///
/// # Example
///
/// ```
/// use congruence::{builtins, congruent, Template};
/// use serde_json::json;
///
/// let template = Template::object([("a", builtins::is_number().into())]).unwrap();
/// assert!(congruent(&template, &json!({ "a": 1 })));
/// assert!(!congruent(&template, &json!({ "a": 1, "b": 2 })));
/// assert!(!congruent(&template, &json!({})));
/// ```
#[must_use]
pub fn congruent(template: &Template, object: &Value) -> bool {
    congruent_with(template, object, &mut ErrorSink::new())
}

/// [`congruent`], recording why the match failed.
///
/// Entries already in `errors` are kept; new entries equal to an existing
/// one are not added again.
pub fn congruent_with(template: &Template, object: &Value, errors: &mut ErrorSink) -> bool {
    run(template, object, MatchMode::Congruent, errors)
}

/// Returns `true` if every key the template names matches; object keys the
/// template does not name are ignored.
///
/// ```
/// use congruence::{similar, Template};
/// use serde_json::json;
///
/// let template = Template::from_json(&json!({ "id": 57 })).unwrap();
/// assert!(similar(&template, &json!({ "id": 57, "color": "blue" })));
/// assert!(!similar(&template, &json!({ "color": "blue" })));
/// ```
#[must_use]
pub fn similar(template: &Template, object: &Value) -> bool {
    similar_with(template, object, &mut ErrorSink::new())
}

/// [`similar`], recording why the match failed.
pub fn similar_with(template: &Template, object: &Value, errors: &mut ErrorSink) -> bool {
    run(template, object, MatchMode::Similar, errors)
}

fn run(template: &Template, object: &Value, mode: MatchMode, errors: &mut ErrorSink) -> bool {
    let object = match object {
        Value::Object(map) => Some(map),
        _ => {
            errors.push(Reason::InvalidArgument { argument: "object" });
            None
        }
    };
    let nested = match template.as_nested() {
        Some(nested) => Some(nested),
        None => {
            errors.push(Reason::InvalidArgument {
                argument: "template",
            });
            None
        }
    };
    match (nested, object) {
        (Some(nested), Some(object)) => {
            let scope = Scope::with_mode(nested.mode().unwrap_or(mode));
            match_nested(nested, object, scope.descend(None), errors)
        }
        _ => false,
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Congruence
// ═══════════════════════════════════════════════════════════════════════════════

/// A validated root template.
///
/// Construction rejects templates that are not mappings or that exceed the
/// safety limits, so [`matches`](Self::matches) only ever fails on the
/// object.
///
/// # Example
///
/// ```
/// use congruence::{builtins, Congruence, Template};
/// use serde_json::json;
///
/// let user = Congruence::new(Template::object([
///     ("id", builtins::is_integer().into()),
///     ("(?)email", Template::pattern("@").unwrap()),
/// ])?)?;
///
/// assert!(user.matches(&json!({ "id": 1 })));
///
/// let errors = user.explain(&json!({ "id": "x", "admin": true })).unwrap_err();
/// let messages: Vec<String> = errors.iter().map(ToString::to_string).collect();
/// assert_eq!(
///     messages,
///     vec![r#"id: is_integer("x") returned false"#, "admin: no match for true"]
/// );
/// # Ok::<(), congruence::TemplateError>(())
/// ```
#[derive(Debug, Clone)]
pub struct Congruence {
    root: Arc<NestedTemplate>,
    mode: MatchMode,
}

impl Congruence {
    /// Validate a root template.
    ///
    /// # Errors
    ///
    /// - [`TemplateError::NotAMapping`] if the template is not nested
    /// - any error from [`Template::validate`]
    pub fn new(template: Template) -> Result<Self, TemplateError> {
        template.validate()?;
        let root = match template {
            Template::Nested(root) => root,
            other => {
                return Err(TemplateError::NotAMapping {
                    found: other.kind_name(),
                })
            }
        };
        tracing::debug!(
            keys = root.len(),
            rest = root.rest_template().is_some(),
            "validated root template"
        );
        let mode = root.mode().unwrap_or_default();
        Ok(Self { root, mode })
    }

    /// Switch this root to subset matching.
    ///
    /// The mode is fixed on the root template as well, so it survives
    /// conversion into a nested [`Template`].
    #[must_use]
    pub fn similar(mut self) -> Self {
        self.mode = MatchMode::Similar;
        self.root = Arc::new(Arc::unwrap_or_clone(self.root).with_mode(MatchMode::Similar));
        self
    }

    #[must_use]
    pub fn mode(&self) -> MatchMode {
        self.mode
    }

    /// The root template.
    #[must_use]
    pub fn template(&self) -> &NestedTemplate {
        &self.root
    }

    #[must_use]
    pub fn matches(&self, object: &Value) -> bool {
        self.check(object, &mut ErrorSink::new())
    }

    /// Match, recording failures into `errors`.
    pub fn check(&self, object: &Value, errors: &mut ErrorSink) -> bool {
        let Value::Object(map) = object else {
            errors.push(Reason::InvalidArgument { argument: "object" });
            return false;
        };
        match_nested(&self.root, map, Scope::with_mode(self.mode).descend(None), errors)
    }

    /// Match, returning the failures.
    ///
    /// # Errors
    ///
    /// Returns every recorded [`Mismatch`] when the object does not match.
    pub fn explain(&self, object: &Value) -> Result<(), Vec<Mismatch>> {
        let mut errors = ErrorSink::new();
        if self.check(object, &mut errors) {
            Ok(())
        } else {
            Err(errors.into_vec())
        }
    }
}

impl From<Congruence> for Template {
    fn from(congruence: Congruence) -> Self {
        Self::Nested(congruence.root)
    }
}
