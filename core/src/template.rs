//! Template — The typed rule tree an object is matched against
//!
//! A [`Template`] node is resolved to one of a fixed set of kinds once, at
//! construction time:
//!
//! | Kind | Matches when |
//! |------|--------------|
//! | [`Template::Literal`] | the value is equal to the literal |
//! | [`Template::Pattern`] | the value's text matches the regex |
//! | [`Template::Predicate`] | the named predicate returns `true` |
//! | [`Template::Nested`] | the value is a mapping whose keys satisfy the [`NestedTemplate`] |
//! | [`Template::Not`] | the inner node does not match |
//! | [`Template::Or`] | any operand matches |
//!
//! # Key markers
//!
//! When a nested template is built from raw keys ([`Template::object`],
//! [`Template::from_json`]) two reserved spellings are recognised:
//!
//! - `"(?)name"` — optional key: may be absent from the object
//! - `"(+)"` — wildcard/rest key: matches any key the template does not name,
//!   and is retried for named keys whose own rule fails
//!
//! Markers are parsed here so the matcher never re-examines key spelling.

use crate::{
    ErrorSink, Predicate, TemplateError, MAX_DEPTH, MAX_OPERANDS, MAX_REGEX_PATTERN_LENGTH,
};
use regex::Regex;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Prefix marking a template key as optional.
pub const OPTIONAL_MARKER: &str = "(?)";

/// The reserved wildcard/rest key.
pub const REST_KEY: &str = "(+)";

/// How keys the template does not name are treated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "registry", derive(serde::Deserialize))]
#[cfg_attr(feature = "registry", serde(rename_all = "lowercase"))]
pub enum MatchMode {
    /// Key sets must be identical: unnamed object keys fail.
    #[default]
    Congruent,
    /// Template keys must be a subset: unnamed object keys are ignored.
    Similar,
}

/// One node of a template tree.
///
/// Templates are immutable once built and cheap to clone; nested mappings
/// are shared behind an `Arc`.
#[derive(Debug, Clone)]
pub enum Template {
    /// Matched by equality.
    Literal(Value),
    /// Matched by regular expression against the value's text.
    Pattern(Regex),
    /// Matched by a named predicate.
    Predicate(Predicate),
    /// Matched key by key against a mapping.
    Nested(Arc<NestedTemplate>),
    /// Matches when the inner node does not.
    Not(Box<Template>),
    /// Matches when any operand does; operands are tried in order.
    Or(Vec<Template>),
}

impl Template {
    /// A literal leaf.
    pub fn literal(value: impl Into<Value>) -> Self {
        Self::Literal(value.into())
    }

    /// A regular-expression leaf.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError::PatternTooLong`] if the pattern exceeds
    /// [`MAX_REGEX_PATTERN_LENGTH`], or [`TemplateError::InvalidPattern`] if it
    /// does not compile.
    pub fn pattern(pattern: &str) -> Result<Self, TemplateError> {
        if pattern.len() > MAX_REGEX_PATTERN_LENGTH {
            return Err(TemplateError::PatternTooLong {
                len: pattern.len(),
                max: MAX_REGEX_PATTERN_LENGTH,
            });
        }
        Regex::new(pattern)
            .map(Self::Pattern)
            .map_err(|e| TemplateError::InvalidPattern {
                pattern: pattern.to_owned(),
                message: e.to_string(),
            })
    }

    /// A nested template from raw `(key, node)` pairs.
    ///
    /// Keys may carry the `(?)` optional marker, or be the `(+)` rest key.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError::DuplicateKey`] if a key is declared twice
    /// (including `"a"` together with `"(?)a"`).
    ///
    /// # Example
    ///
    /// ```
    /// use congruence::{builtins, congruent, Template};
    /// use serde_json::json;
    ///
    /// let template = Template::object([
    ///     ("id", builtins::is_number().into()),
    ///     ("(?)name", builtins::is_string().into()),
    /// ])
    /// .unwrap();
    ///
    /// assert!(congruent(&template, &json!({ "id": 1 })));
    /// assert!(congruent(&template, &json!({ "id": 1, "name": "x" })));
    /// assert!(!congruent(&template, &json!({ "id": 1, "extra": true })));
    /// ```
    pub fn object<I, K>(pairs: I) -> Result<Self, TemplateError>
    where
        I: IntoIterator<Item = (K, Template)>,
        K: AsRef<str>,
    {
        let mut nested = NestedTemplate::new();
        for (key, node) in pairs {
            nested.insert(key.as_ref(), node)?;
        }
        Ok(Self::from(nested))
    }

    /// Build a template from a JSON value.
    ///
    /// Objects become nested templates (with key markers parsed); every
    /// other value becomes a literal.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError::DuplicateKey`] if an object declares both
    /// `"k"` and `"(?)k"`.
    pub fn from_json(value: &Value) -> Result<Self, TemplateError> {
        match value {
            Value::Object(map) => {
                let mut nested = NestedTemplate::new();
                for (key, child) in map {
                    nested.insert(key, Self::from_json(child)?)?;
                }
                Ok(Self::from(nested))
            }
            other => Ok(Self::Literal(other.clone())),
        }
    }

    /// A nested template that always uses exact key-set matching,
    /// whatever mode the enclosing match runs in.
    #[must_use]
    pub fn congruent(nested: NestedTemplate) -> Self {
        Self::from(nested.with_mode(MatchMode::Congruent))
    }

    /// A nested template that ignores object keys it does not name,
    /// whatever mode the enclosing match runs in.
    #[must_use]
    pub fn similar(nested: NestedTemplate) -> Self {
        Self::from(nested.with_mode(MatchMode::Similar))
    }

    /// Returns `true` if this is a nested template.
    #[must_use]
    pub fn is_nested(&self) -> bool {
        matches!(self, Self::Nested(_))
    }

    /// The nested template, if this node is one.
    #[must_use]
    pub fn as_nested(&self) -> Option<&NestedTemplate> {
        match self {
            Self::Nested(n) => Some(n),
            _ => None,
        }
    }

    /// Short name of this node's kind, used in error messages.
    #[must_use]
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Literal(_) => "literal",
            Self::Pattern(_) => "pattern",
            Self::Predicate(_) => "predicate",
            Self::Nested(_) => "nested template",
            Self::Not(_) => "not",
            Self::Or(_) => "or",
        }
    }

    /// Depth of this template tree. Leaves have depth 1.
    #[must_use]
    pub fn depth(&self) -> usize {
        match self {
            Self::Literal(_) | Self::Pattern(_) | Self::Predicate(_) => 1,
            Self::Nested(n) => 1 + n.children().map(Template::depth).max().unwrap_or(0),
            Self::Not(inner) => 1 + inner.depth(),
            Self::Or(operands) => 1 + operands.iter().map(Template::depth).max().unwrap_or(0),
        }
    }

    /// Validate this template against the safety limits.
    ///
    /// # Errors
    ///
    /// - [`TemplateError::DepthExceeded`] if nesting exceeds [`MAX_DEPTH`]
    /// - [`TemplateError::TooManyOperands`] if an `or` exceeds [`MAX_OPERANDS`]
    pub fn validate(&self) -> Result<(), TemplateError> {
        let depth = self.depth();
        if depth > MAX_DEPTH {
            return Err(TemplateError::DepthExceeded {
                depth,
                max: MAX_DEPTH,
            });
        }
        self.check_operands()
    }

    fn check_operands(&self) -> Result<(), TemplateError> {
        match self {
            Self::Literal(_) | Self::Pattern(_) | Self::Predicate(_) => Ok(()),
            Self::Nested(n) => n.children().try_for_each(Template::check_operands),
            Self::Not(inner) => inner.check_operands(),
            Self::Or(operands) => {
                if operands.len() > MAX_OPERANDS {
                    return Err(TemplateError::TooManyOperands {
                        count: operands.len(),
                        max: MAX_OPERANDS,
                    });
                }
                operands.iter().try_for_each(Template::check_operands)
            }
        }
    }

    /// Match a single, possibly-absent value against this node.
    ///
    /// This is the entry point for custom predicates that delegate to a
    /// template. Unlike [`congruent_with`](crate::congruent_with), the value
    /// does not have to be a mapping.
    pub fn test(&self, value: Option<&Value>, errors: &mut ErrorSink) -> bool {
        crate::matcher::match_node(self, value, crate::matcher::Scope::root(), errors)
    }
}

/// Compact description used inside failure messages (`not(is_number)`).
impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(v) => write!(f, "{v}"),
            Self::Pattern(re) => write!(f, "/{}/", re.as_str()),
            Self::Predicate(p) => f.write_str(p.name()),
            Self::Nested(n) => write!(f, "{n}"),
            Self::Not(inner) => write!(f, "not({inner})"),
            Self::Or(operands) => {
                f.write_str("or(")?;
                for (i, op) in operands.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{op}")?;
                }
                f.write_str(")")
            }
        }
    }
}

impl From<Value> for Template {
    /// Every JSON value, including objects, becomes a literal.
    /// Use [`Template::from_json`] to turn objects into nested templates.
    fn from(value: Value) -> Self {
        Self::Literal(value)
    }
}

impl From<&str> for Template {
    fn from(value: &str) -> Self {
        Self::Literal(Value::from(value))
    }
}

impl From<String> for Template {
    fn from(value: String) -> Self {
        Self::Literal(Value::from(value))
    }
}

impl From<bool> for Template {
    fn from(value: bool) -> Self {
        Self::Literal(Value::from(value))
    }
}

impl From<i64> for Template {
    fn from(value: i64) -> Self {
        Self::Literal(Value::from(value))
    }
}

impl From<i32> for Template {
    fn from(value: i32) -> Self {
        Self::Literal(Value::from(value))
    }
}

impl From<u64> for Template {
    fn from(value: u64) -> Self {
        Self::Literal(Value::from(value))
    }
}

impl From<f64> for Template {
    fn from(value: f64) -> Self {
        Self::Literal(Value::from(value))
    }
}

impl From<Regex> for Template {
    fn from(re: Regex) -> Self {
        Self::Pattern(re)
    }
}

impl From<Predicate> for Template {
    fn from(predicate: Predicate) -> Self {
        Self::Predicate(predicate)
    }
}

impl From<NestedTemplate> for Template {
    fn from(nested: NestedTemplate) -> Self {
        Self::Nested(Arc::new(nested))
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// NestedTemplate
// ═══════════════════════════════════════════════════════════════════════════════

/// A declared key of a [`NestedTemplate`].
#[derive(Debug, Clone)]
pub struct Field {
    template: Template,
    optional: bool,
}

impl Field {
    /// The rule for this key's value.
    #[must_use]
    pub fn template(&self) -> &Template {
        &self.template
    }

    /// Returns `true` if the key may be absent from the object.
    #[must_use]
    pub fn is_optional(&self) -> bool {
        self.optional
    }
}

/// The mapping form of a template: declared keys, an optional rest rule,
/// and an optional fixed [`MatchMode`].
///
/// Keys are stored by their normalized name (without the `(?)` marker) in
/// sorted order, which keeps error output stable across runs.
///
/// # Example
///
/// ```
/// use congruence::{builtins, NestedTemplate, Template};
///
/// let nested = NestedTemplate::new()
///     .field("id", builtins::is_number())
///     .optional("tags", builtins::is_array())
///     .rest(builtins::is_string());
///
/// assert_eq!(nested.len(), 2);
/// assert!(nested.rest_template().is_some());
/// let template = Template::from(nested);
/// ```
#[derive(Debug, Clone, Default)]
pub struct NestedTemplate {
    fields: BTreeMap<String, Field>,
    rest: Option<Box<Template>>,
    mode: Option<MatchMode>,
}

/// A raw template key with its marker resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateKey<'a> {
    /// A plain key: must be present.
    Required(&'a str),
    /// A `(?)`-marked key: may be absent.
    Optional(&'a str),
    /// The `(+)` wildcard/rest key.
    Rest,
}

impl<'a> TemplateKey<'a> {
    /// Resolve the marker on a raw key.
    ///
    /// ```
    /// use congruence::TemplateKey;
    ///
    /// assert_eq!(TemplateKey::parse("a"), TemplateKey::Required("a"));
    /// assert_eq!(TemplateKey::parse("(?)a"), TemplateKey::Optional("a"));
    /// assert_eq!(TemplateKey::parse("(+)"), TemplateKey::Rest);
    /// ```
    #[must_use]
    pub fn parse(raw: &'a str) -> Self {
        if raw == REST_KEY {
            Self::Rest
        } else if let Some(name) = raw.strip_prefix(OPTIONAL_MARKER) {
            Self::Optional(name)
        } else {
            Self::Required(raw)
        }
    }
}

impl NestedTemplate {
    /// Create an empty nested template.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a required key. A later declaration of the same name replaces it.
    #[must_use]
    pub fn field(mut self, key: impl Into<String>, template: impl Into<Template>) -> Self {
        self.fields.insert(
            key.into(),
            Field {
                template: template.into(),
                optional: false,
            },
        );
        self
    }

    /// Declare an optional key. A later declaration of the same name replaces it.
    #[must_use]
    pub fn optional(mut self, key: impl Into<String>, template: impl Into<Template>) -> Self {
        self.fields.insert(
            key.into(),
            Field {
                template: template.into(),
                optional: true,
            },
        );
        self
    }

    /// Set the wildcard/rest rule.
    #[must_use]
    pub fn rest(mut self, template: impl Into<Template>) -> Self {
        self.rest = Some(Box::new(template.into()));
        self
    }

    /// Fix the key-set mode for this subtree.
    #[must_use]
    pub fn with_mode(mut self, mode: MatchMode) -> Self {
        self.mode = Some(mode);
        self
    }

    /// Insert a raw (possibly marked) key.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError::DuplicateKey`] if the normalized key, or the
    /// rest key, is already declared.
    pub fn insert(&mut self, raw_key: &str, template: Template) -> Result<(), TemplateError> {
        let (name, optional) = match TemplateKey::parse(raw_key) {
            TemplateKey::Rest => {
                if self.rest.is_some() {
                    return Err(TemplateError::DuplicateKey {
                        key: REST_KEY.to_owned(),
                    });
                }
                self.rest = Some(Box::new(template));
                return Ok(());
            }
            TemplateKey::Required(name) => (name, false),
            TemplateKey::Optional(name) => (name, true),
        };
        if self.fields.contains_key(name) {
            return Err(TemplateError::DuplicateKey {
                key: name.to_owned(),
            });
        }
        self.fields
            .insert(name.to_owned(), Field { template, optional });
        Ok(())
    }

    /// Look up a declared key by its normalized name.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Field> {
        self.fields.get(key)
    }

    /// Iterate declared keys in sorted order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &Field)> {
        self.fields.iter().map(|(k, f)| (k.as_str(), f))
    }

    /// The wildcard/rest rule, if declared.
    #[must_use]
    pub fn rest_template(&self) -> Option<&Template> {
        self.rest.as_deref()
    }

    /// The fixed key-set mode, if any. `None` inherits the enclosing mode.
    #[must_use]
    pub fn mode(&self) -> Option<MatchMode> {
        self.mode
    }

    /// Number of declared keys (the rest key is not counted).
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns `true` if no keys are declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    fn children(&self) -> impl Iterator<Item = &Template> {
        self.fields
            .values()
            .map(Field::template)
            .chain(self.rest.as_deref())
    }
}

impl fmt::Display for NestedTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = match self.mode {
            Some(MatchMode::Similar) => "similar",
            Some(MatchMode::Congruent) => "congruent",
            None => "",
        };
        write!(f, "{prefix}{{")?;
        let mut first = true;
        for (key, field) in &self.fields {
            if !first {
                f.write_str(", ")?;
            }
            first = false;
            if field.optional {
                f.write_str(OPTIONAL_MARKER)?;
            }
            f.write_str(key)?;
        }
        if self.rest.is_some() {
            if !first {
                f.write_str(", ")?;
            }
            f.write_str(REST_KEY)?;
        }
        f.write_str("}")
    }
}
