//! Config types for data-driven template construction.
//!
//! Templates can be written as plain JSON/YAML and loaded through a
//! [`Registry`](crate::Registry), which resolves predicate names to
//! [`Predicate`](crate::Predicate) values.
//!
//! # Shape
//!
//! A config node is one of:
//!
//! | Form | Example | Loads as |
//! |------|---------|----------|
//! | directive (single `$`-key mapping) | `{ "$is": "is_number" }` | predicate, regex, combinator, ... |
//! | mapping | `{ "id": 1, "(?)tags": { "$is": "is_array" } }` | nested template |
//! | anything else | `"text"`, `3`, `[1, 2]`, `null` | literal |
//!
//! # Directives
//!
//! | Directive | Payload |
//! |-----------|---------|
//! | `$is` | predicate name, or `{ name, config }` for configurable predicates |
//! | `$regex` | pattern source |
//! | `$not` | one node |
//! | `$or` | list of nodes |
//! | `$literal` | any value, taken verbatim (use for mapping literals) |
//! | `$similar` | mapping; unnamed object keys are ignored in this subtree |
//! | `$congruent` | mapping; unnamed object keys fail in this subtree |

use serde::Deserialize;
use std::collections::BTreeMap;

/// A template node as written in config.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum TemplateConfig {
    /// A single-key `$`-directive.
    Directive(DirectiveConfig),

    /// A nested template. Keys may carry `(?)` or be `(+)`.
    Object(BTreeMap<String, TemplateConfig>),

    /// Any other value, matched by equality.
    Literal(serde_json::Value),
}

/// A `$`-directive. Deserializes from a mapping with exactly one key.
#[derive(Debug, Clone, Deserialize)]
pub enum DirectiveConfig {
    /// A registered predicate.
    #[serde(rename = "$is")]
    Is(PredicateRef),

    /// A regular expression.
    #[serde(rename = "$regex")]
    Regex(String),

    /// Negation of the inner node.
    #[serde(rename = "$not")]
    Not(Box<TemplateConfig>),

    /// Disjunction of the operands, tried in order.
    #[serde(rename = "$or")]
    Or(Vec<TemplateConfig>),

    /// A literal, including mappings that would otherwise become templates.
    #[serde(rename = "$literal")]
    Literal(serde_json::Value),

    /// A nested template fixed to subset matching.
    #[serde(rename = "$similar")]
    Similar(BTreeMap<String, TemplateConfig>),

    /// A nested template fixed to exact key-set matching.
    #[serde(rename = "$congruent")]
    Congruent(BTreeMap<String, TemplateConfig>),
}

/// Reference to a registered predicate.
///
/// ```yaml
/// $is: is_number                      # by name
/// $is: { name: length_between, config: { min: 1, max: 3 } }
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum PredicateRef {
    /// A predicate registered without configuration.
    Name(String),

    /// A predicate factory plus its configuration payload.
    Typed {
        /// The registered name.
        name: String,

        /// Factory-specific configuration.
        /// Deserialized as the `Config` associated type of the registered [`IntoPredicate`](crate::IntoPredicate).
        #[serde(default = "default_config")]
        config: serde_json::Value,
    },
}

impl PredicateRef {
    /// The registered name being referenced.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Name(name) | Self::Typed { name, .. } => name,
        }
    }
}

fn default_config() -> serde_json::Value {
    serde_json::Value::Object(serde_json::Map::new())
}

/// Empty configuration for predicate factories that take no parameters.
///
/// Accepts any value (`{}`, `null`, etc.) and ignores it.
#[derive(Debug, Clone, Copy)]
pub struct UnitConfig;

impl<'de> Deserialize<'de> for UnitConfig {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        serde::de::IgnoredAny::deserialize(deserializer)?;
        Ok(UnitConfig)
    }
}
