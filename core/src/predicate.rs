//! Predicate — Named callables used as template leaves
//!
//! A [`Predicate`] pairs a display name with a function over a possibly-absent
//! value. The name is what appears in failure messages
//! (`is_number("x") returned false`), so it is supplied explicitly rather than
//! recovered by reflection.

use crate::ErrorSink;
use serde_json::Value;
use std::fmt::{self, Debug};
use std::sync::Arc;

type PredicateFn = dyn Fn(Option<&Value>, &mut ErrorSink) -> bool + Send + Sync;

/// A named boolean test over a single value.
///
/// The value is `None` when the key is absent from the object ("undefined"),
/// which is distinct from JSON `null`.
///
/// Predicates are cheap to clone (the function is behind an `Arc`) and are
/// `Send + Sync`, so templates holding them can be shared across threads.
///
/// # Reporting
///
/// A predicate built with [`with_sink`](Self::with_sink) may push its own,
/// more specific reasons into the sink. If it fails after pushing something,
/// the evaluator does not add the generic `name(value) returned false` line.
/// Anything pushed by a predicate that then succeeds is rolled back.
///
/// # Example
///
/// ```
/// use congruence::{ErrorSink, Predicate};
/// use serde_json::json;
///
/// let positive = Predicate::new("is_positive", |v| {
///     v.and_then(serde_json::Value::as_f64).is_some_and(|n| n > 0.0)
/// });
///
/// let mut errors = ErrorSink::new();
/// assert!(positive.test(Some(&json!(3)), &mut errors));
/// assert!(!positive.test(Some(&json!(-1)), &mut errors));
/// assert!(!positive.test(None, &mut errors));
/// ```
#[derive(Clone)]
pub struct Predicate {
    name: Arc<str>,
    func: Arc<PredicateFn>,
}

impl Predicate {
    /// Create a predicate that only looks at the value.
    pub fn new<F>(name: impl Into<String>, func: F) -> Self
    where
        F: Fn(Option<&Value>) -> bool + Send + Sync + 'static,
    {
        let func: Arc<PredicateFn> =
            Arc::new(move |value: Option<&Value>, _: &mut ErrorSink| func(value));
        Self {
            name: Arc::from(name.into()),
            func,
        }
    }

    /// Create a predicate that can report its own reasons into the sink.
    pub fn with_sink<F>(name: impl Into<String>, func: F) -> Self
    where
        F: Fn(Option<&Value>, &mut ErrorSink) -> bool + Send + Sync + 'static,
    {
        Self {
            name: Arc::from(name.into()),
            func: Arc::new(func),
        }
    }

    /// The display name used in failure messages.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Return a copy of this predicate under a different display name.
    #[must_use]
    pub fn named(&self, name: impl Into<String>) -> Self {
        Self {
            name: Arc::from(name.into()),
            func: Arc::clone(&self.func),
        }
    }

    /// Invoke the predicate.
    ///
    /// This is the raw call: no generic failure reason is recorded here.
    pub fn test(&self, value: Option<&Value>, errors: &mut ErrorSink) -> bool {
        (self.func)(value, errors)
    }

    /// Invoke the predicate against a present value, discarding any reasons.
    #[must_use]
    pub fn check(&self, value: &Value) -> bool {
        self.test(Some(value), &mut ErrorSink::new())
    }
}

impl Debug for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Predicate").field(&&*self.name).finish()
    }
}

// Predicates compare by name and identity of the underlying function.
impl PartialEq for Predicate {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && Arc::ptr_eq(&self.func, &other.func)
    }
}
