//! congruence-test: Test predicates and conformance fixtures
//!
//! Provides a small set of domain predicates used by the conformance suite,
//! and (feature `fixtures`) the YAML fixture runner. This is also the
//! reference for how to package predicates for a [`congruence::Registry`].
//!
//! # Example
//!
//! ```
//! use congruence_test::prelude::*;
//! use serde_json::json;
//!
//! let release = Template::object([
//!     ("version", is_semver().into()),
//!     ("build", is_odd().into()),
//! ])
//! .unwrap();
//!
//! assert!(congruent(&release, &json!({ "version": "1.2.3", "build": 7 })));
//! assert!(!congruent(&release, &json!({ "version": "1.2", "build": 7 })));
//! ```

use congruence::{ErrorSink, Predicate};
use serde_json::Value;

#[cfg(feature = "fixtures")]
pub mod fixture;

/// A string of the form `MAJOR.MINOR.PATCH` with decimal components.
///
/// Reports its own reason on failure instead of the generic one.
#[must_use]
pub fn is_semver() -> Predicate {
    Predicate::with_sink("is_semver", |value, errors: &mut ErrorSink| {
        let Some(text) = value.and_then(Value::as_str) else {
            errors.report(format!(
                "expected a version string, found {}",
                congruence::render(value)
            ));
            return false;
        };
        let parts: Vec<&str> = text.split('.').collect();
        let ok = parts.len() == 3
            && parts
                .iter()
                .all(|p| !p.is_empty() && p.bytes().all(|b| b.is_ascii_digit()));
        if !ok {
            errors.report(format!("\"{text}\" is not MAJOR.MINOR.PATCH"));
        }
        ok
    })
}

/// An odd integer.
#[must_use]
pub fn is_odd() -> Predicate {
    Predicate::new("is_odd", |value| {
        value.and_then(Value::as_i64).is_some_and(|n| n % 2 != 0)
    })
}

/// Length of a string (in chars) or array is within `min..=max`.
#[derive(Debug, Clone, Copy)]
pub struct LengthBetween {
    min: usize,
    max: usize,
}

impl LengthBetween {
    /// Create the bounds.
    #[must_use]
    pub fn new(min: usize, max: usize) -> Self {
        Self { min, max }
    }

    /// Build the predicate.
    #[must_use]
    pub fn predicate(self) -> Predicate {
        let Self { min, max } = self;
        Predicate::with_sink(format!("length_between({min}, {max})"), move |value, errors| {
            let len = match value {
                Some(Value::String(s)) => s.chars().count(),
                Some(Value::Array(a)) => a.len(),
                _ => return false,
            };
            let ok = (min..=max).contains(&len);
            if !ok {
                errors.report(format!("length {len} is outside {min}..={max}"));
            }
            ok
        })
    }
}

/// Value is equal to one of a fixed list.
#[derive(Debug, Clone)]
pub struct OneOf {
    values: Vec<Value>,
}

impl OneOf {
    /// Create the list of accepted values.
    #[must_use]
    pub fn new(values: Vec<Value>) -> Self {
        Self { values }
    }

    /// Build the predicate.
    #[must_use]
    pub fn predicate(self) -> Predicate {
        let values = self.values;
        Predicate::new("one_of", move |value| {
            value.is_some_and(|v| values.contains(v))
        })
    }
}

/// Prelude for convenient imports.
pub mod prelude {
    pub use super::{is_odd, is_semver, LengthBetween, OneOf};
    pub use congruence::prelude::*;
}

// ═══════════════════════════════════════════════════════════════════════════════
// Registry support (feature = "registry")
// ═══════════════════════════════════════════════════════════════════════════════

/// Configuration for [`LengthBetween`].
#[cfg(feature = "registry")]
#[derive(serde::Deserialize)]
pub struct LengthBetweenConfig {
    /// Inclusive lower bound.
    #[serde(default)]
    pub min: usize,
    /// Inclusive upper bound.
    pub max: usize,
}

#[cfg(feature = "registry")]
impl congruence::IntoPredicate for LengthBetween {
    type Config = LengthBetweenConfig;

    fn from_config(config: Self::Config) -> Result<Predicate, congruence::TemplateError> {
        if config.min > config.max {
            return Err(congruence::TemplateError::InvalidConfig {
                message: format!("min ({}) is greater than max ({})", config.min, config.max),
            });
        }
        Ok(LengthBetween::new(config.min, config.max).predicate())
    }
}

/// Configuration for [`OneOf`].
#[cfg(feature = "registry")]
#[derive(serde::Deserialize)]
pub struct OneOfConfig {
    /// Accepted values.
    pub values: Vec<Value>,
}

#[cfg(feature = "registry")]
impl congruence::IntoPredicate for OneOf {
    type Config = OneOfConfig;

    fn from_config(config: Self::Config) -> Result<Predicate, congruence::TemplateError> {
        Ok(OneOf::new(config.values).predicate())
    }
}

/// Register the built-ins and all congruence-test predicates with the given builder.
///
/// - `is_semver` → [`is_semver`]
/// - `is_odd` → [`is_odd`]
/// - `length_between` → [`LengthBetween`] (`{ min, max }`)
/// - `one_of` → [`OneOf`] (`{ values }`)
#[cfg(feature = "registry")]
#[must_use]
pub fn register(builder: congruence::RegistryBuilder) -> congruence::RegistryBuilder {
    congruence::register_builtins(builder)
        .predicate("is_semver", is_semver())
        .predicate("is_odd", is_odd())
        .factory::<LengthBetween>("length_between")
        .factory::<OneOf>("one_of")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn run(p: &Predicate, value: Option<&Value>) -> (bool, Vec<String>) {
        let mut errors = ErrorSink::new();
        let ok = p.test(value, &mut errors);
        (ok, errors.messages())
    }

    #[test]
    fn semver() {
        let p = is_semver();
        assert!(p.check(&json!("0.1.0")));
        assert!(p.check(&json!("10.20.30")));

        let (ok, errors) = run(&p, Some(&json!("1.2")));
        assert!(!ok);
        assert_eq!(errors, vec![r#""1.2" is not MAJOR.MINOR.PATCH"#]);

        let (ok, errors) = run(&p, None);
        assert!(!ok);
        assert_eq!(errors, vec!["expected a version string, found undefined"]);
    }

    #[test]
    fn odd() {
        assert!(is_odd().check(&json!(3)));
        assert!(is_odd().check(&json!(-3)));
        assert!(!is_odd().check(&json!(4)));
        assert!(!is_odd().check(&json!("3")));
    }

    #[test]
    fn length_between() {
        let p = LengthBetween::new(1, 3).predicate();
        assert_eq!(p.name(), "length_between(1, 3)");
        assert!(p.check(&json!("ab")));
        assert!(p.check(&json!([1, 2, 3])));

        let (ok, errors) = run(&p, Some(&json!("abcd")));
        assert!(!ok);
        assert_eq!(errors, vec!["length 4 is outside 1..=3"]);

        // Wrong type falls back to the evaluator's generic reason
        let (ok, errors) = run(&p, Some(&json!(5)));
        assert!(!ok);
        assert!(errors.is_empty());
    }

    #[test]
    fn one_of() {
        let p = OneOf::new(vec![json!("a"), json!(1)]).predicate();
        assert!(p.check(&json!("a")));
        assert!(p.check(&json!(1)));
        assert!(!p.check(&json!("b")));
    }

    #[cfg(feature = "registry")]
    #[test]
    fn register_adds_test_predicates() {
        let registry = register(congruence::RegistryBuilder::new()).build();
        assert!(registry.contains("is_semver"));
        assert!(registry.contains("length_between"));
        assert!(registry.contains("is_number"));
        assert_eq!(registry.len(), congruence::builtins::all().len() + 4);
    }

    #[cfg(feature = "registry")]
    #[test]
    fn length_between_rejects_inverted_bounds() {
        use congruence::IntoPredicate;
        let err = LengthBetween::from_config(LengthBetweenConfig { min: 3, max: 1 }).unwrap_err();
        assert!(matches!(err, congruence::TemplateError::InvalidConfig { .. }));
    }
}
