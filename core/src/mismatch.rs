//! `Mismatch` — Structured failure records produced during matching
//!
//! Every failed check appends one [`Mismatch`] to the [`ErrorSink`](crate::ErrorSink).
//! A mismatch pairs the dotted key path where the failure happened with a
//! [`Reason`] describing which rule failed. Both render to a single line of text.

use serde_json::Value;
use std::fmt;

/// Why a single check failed.
///
/// Values are stored already rendered (compact JSON, or `undefined` for an
/// absent key) so that records compare by content and can be deduplicated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reason {
    /// A top-level argument was not a mapping (`"template"` or `"object"`).
    InvalidArgument {
        /// Which argument was malformed.
        argument: &'static str,
    },

    /// The object has a key the template does not account for.
    NoMatch {
        /// The rendered value under the unexpected key.
        value: String,
    },

    /// A nested template met a value that is not a mapping.
    NotAnObject {
        /// The rendered value.
        value: String,
    },

    /// A regular expression did not match.
    PatternMismatch {
        /// The pattern source.
        pattern: String,
        /// The rendered value.
        value: String,
    },

    /// A named predicate returned `false`.
    PredicateFailed {
        /// Display name of the predicate.
        name: String,
        /// The rendered value.
        value: String,
    },

    /// A literal leaf was not equal to the value.
    NotEqual {
        /// The rendered literal.
        expected: String,
        /// The rendered value.
        value: String,
    },

    /// Evaluation went deeper than [`MAX_DEPTH`](crate::MAX_DEPTH).
    DepthExceeded {
        /// The depth limit that was hit.
        max: usize,
    },

    /// Free-form reason reported by a user predicate.
    Custom(String),
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidArgument { argument } => {
                write!(f, "'{argument}' must be a valid object")
            }
            Self::NoMatch { value } => write!(f, "no match for {value}"),
            Self::NotAnObject { value } => write!(f, "expected {value} to be an object"),
            Self::PatternMismatch { pattern, value } => {
                write!(f, "expected /{pattern}/ to match {value}")
            }
            Self::PredicateFailed { name, value } => write!(f, "{name}({value}) returned false"),
            Self::NotEqual { expected, value } => {
                write!(f, "expected {expected} to equal {value}")
            }
            Self::DepthExceeded { max } => write!(f, "maximum nesting depth {max} exceeded"),
            Self::Custom(message) => f.write_str(message),
        }
    }
}

/// One recorded failure: a [`Reason`] at a key path.
///
/// The path is empty for failures at the root of the match.
///
/// # Example
///
/// ```
/// use congruence::{Mismatch, Reason};
///
/// let mismatch = Mismatch::new("a.b", Reason::NoMatch { value: "1".into() });
/// assert_eq!(mismatch.to_string(), "a.b: no match for 1");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mismatch {
    path: String,
    reason: Reason,
}

impl Mismatch {
    /// Create a mismatch at the given dotted path.
    pub fn new(path: impl Into<String>, reason: Reason) -> Self {
        Self {
            path: path.into(),
            reason,
        }
    }

    /// The dotted key path (empty at the root).
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The failure reason.
    #[must_use]
    pub fn reason(&self) -> &Reason {
        &self.reason
    }
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "{}", self.reason)
        } else {
            write!(f, "{}: {}", self.path, self.reason)
        }
    }
}

/// Render a possibly-absent value for a failure message.
///
/// Present values render as compact JSON; an absent key renders as `undefined`.
#[must_use]
pub fn render(value: Option<&Value>) -> String {
    value.map_or_else(|| "undefined".to_owned(), Value::to_string)
}
