//! congruence - structural template matching for JSON-like values
//!
//! A template is a tree that mirrors the shape of the data it accepts. Each
//! position holds a literal, a regular expression, a named predicate, a
//! nested template, or a combinator (`not`, `or`). Matching walks the
//! template and the object together and reports every failure it finds.
//!
//! # Architecture
//!
//! - [`Template`] — the typed rule tree; node kinds are resolved at construction
//! - [`NestedTemplate`] — the mapping form, with `(?)optional` keys and a `(+)` rest key
//! - [`Predicate`] — a named callable leaf
//! - [`ErrorSink`] — deduplicating failure collector with checkpoint/rollback
//! - [`Congruence`] — a validated root template
//!
//! # Key Design Insights
//!
//! 1. **Absent is not null**: a missing key reaches leaves as `None`, which
//!    is distinct from `Some(Value::Null)`.
//!
//! 2. **Results never depend on the sink**: the sink only explains. Failed
//!    branches of `or`, `not` and wildcard retries are rolled back.
//!
//! 3. **All keys are visited**: a failure does not stop the walk, so one
//!    call reports one reason per offending key.
//!
//! # Example
//!
//! ```
//! use congruence::prelude::*;
//! use serde_json::json;
//!
//! let template = Template::object([
//!     ("id", builtins::is_number().into()),
//!     ("(?)tags", builtins::is_array().into()),
//!     ("kind", or(["user", "admin"])),
//! ])
//! .unwrap();
//!
//! assert!(congruent(&template, &json!({ "id": 1, "kind": "user" })));
//!
//! let mut errors = ErrorSink::new();
//! assert!(!congruent_with(&template, &json!({ "id": "1", "kind": "root" }), &mut errors));
//! assert_eq!(
//!     errors.messages(),
//!     vec![
//!         r#"id: is_number("1") returned false"#,
//!         r#"kind: expected "admin" to equal "root""#,
//!     ]
//! );
//! ```
//!
//! # Extensions
//!
//! - Config loading through a predicate [`Registry`] (feature = `"registry"`)
//! - [`congruence-test`](https://docs.rs/congruence-test) — fixtures and test predicates (internal)

// ═══════════════════════════════════════════════════════════════════════════════
// Modules
// ═══════════════════════════════════════════════════════════════════════════════

pub mod builtins;
mod combinator;
mod congruence;
mod error_sink;
mod evaluate;
mod matcher;
mod mismatch;
mod predicate;
mod template;

#[cfg(feature = "registry")]
mod config;
#[cfg(feature = "registry")]
mod registry;

// ═══════════════════════════════════════════════════════════════════════════════
// Public API
// ═══════════════════════════════════════════════════════════════════════════════

// Core types
pub use combinator::{not, or};
pub use congruence::{congruent, congruent_with, similar, similar_with, Congruence};
pub use error_sink::{Checkpoint, ErrorSink};
pub use mismatch::{render, Mismatch, Reason};
pub use predicate::Predicate;
pub use template::{
    Field, MatchMode, NestedTemplate, Template, TemplateKey, OPTIONAL_MARKER, REST_KEY,
};

// Registry (feature-gated)
#[cfg(feature = "registry")]
pub use config::{DirectiveConfig, PredicateRef, TemplateConfig, UnitConfig};
#[cfg(feature = "registry")]
pub use registry::{register_builtins, IntoPredicate, Registry, RegistryBuilder};

// ═══════════════════════════════════════════════════════════════════════════════
// Prelude
// ═══════════════════════════════════════════════════════════════════════════════

/// Prelude module for convenient imports.
///
/// ```
/// use congruence::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        builtins,
        // Entry points
        congruent,
        congruent_with,
        not,
        or,
        similar,
        similar_with,
        // Core types
        Congruence,
        ErrorSink,
        MatchMode,
        Mismatch,
        NestedTemplate,
        Predicate,
        Reason,
        Template,
        // Errors
        TemplateError,
    };
}

// ═══════════════════════════════════════════════════════════════════════════════
// Constants
// ═══════════════════════════════════════════════════════════════════════════════

/// Maximum allowed depth of a template tree.
///
/// Checked at construction by [`Congruence::new`] and enforced again during
/// evaluation, where hitting it records a failure instead of recursing.
///
/// Templates are immutable and cannot form cycles, so this is a fixed cap on
/// nesting rather than a cycle guard. A hand-built template deeper than this
/// fails every match with "maximum nesting depth 32 exceeded".
pub const MAX_DEPTH: usize = 32;

/// Maximum number of operands in a single `or`.
pub const MAX_OPERANDS: usize = 256;

/// Maximum length for regex patterns.
///
/// Regex compilation is expensive even with the linear-time Rust `regex` crate.
pub const MAX_REGEX_PATTERN_LENGTH: usize = 4096;

// ═══════════════════════════════════════════════════════════════════════════════
// Errors
// ═══════════════════════════════════════════════════════════════════════════════

/// Errors from template construction and config loading.
///
/// A template that is well-formed never produces these while matching: a
/// failed match is reported through [`ErrorSink`] and a `false` result.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TemplateError {
    /// A root template was not a mapping.
    #[error("root template must be a mapping, found {found}")]
    NotAMapping {
        /// Kind of the node that was supplied.
        found: &'static str,
    },

    /// A key was declared twice (`"a"` and `"(?)a"` count as the same key).
    #[error("duplicate template key \"{key}\"")]
    DuplicateKey {
        /// The normalized key.
        key: String,
    },

    /// A regex pattern failed to compile.
    #[error("invalid pattern \"{pattern}\": {message}")]
    InvalidPattern {
        /// The pattern that failed to compile.
        pattern: String,
        /// The underlying error message.
        message: String,
    },

    /// A regex pattern exceeds [`MAX_REGEX_PATTERN_LENGTH`].
    #[error("pattern length is {len}, but maximum allowed is {max}")]
    PatternTooLong {
        /// Actual length of the pattern.
        len: usize,
        /// Maximum allowed length.
        max: usize,
    },

    /// Template nesting exceeds [`MAX_DEPTH`].
    #[error("template nesting depth is {depth}, but maximum allowed is {max}")]
    DepthExceeded {
        /// Actual depth of the template tree.
        depth: usize,
        /// Maximum allowed depth.
        max: usize,
    },

    /// An `or` has more than [`MAX_OPERANDS`] operands.
    #[error("or has {count} operands, but maximum allowed is {max}")]
    TooManyOperands {
        /// Actual operand count.
        count: usize,
        /// Maximum allowed.
        max: usize,
    },

    /// A predicate name was not found in the registry.
    #[error("unknown predicate \"{name}\"{}", list_available(.available))]
    UnknownPredicate {
        /// The unregistered name.
        name: String,
        /// Names that ARE registered (for self-correcting error messages).
        available: Vec<String>,
    },

    /// Configuration deserialization or construction failed.
    #[error("invalid config: {message}")]
    InvalidConfig {
        /// The underlying error message.
        message: String,
    },
}

fn list_available(available: &[String]) -> String {
    if available.is_empty() {
        "; no predicates are registered".to_owned()
    } else {
        format!("; registered: {}", available.join(", "))
    }
}
