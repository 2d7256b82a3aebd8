//! Predicate registry for config-driven template construction.
//!
//! Config files refer to predicates by name (`{ "$is": "is_number" }`). The
//! registry maps those names to [`Predicate`] values, or to factories that
//! build a predicate from a configuration payload.
//!
//! # Architecture (axum `BoxedIntoRoute` pattern)
//!
//! Each configurable predicate type registers itself via [`IntoPredicate`]. At
//! registration time the concrete type `T` is monomorphized into a closure and
//! erased behind `Box<dyn Fn>`: early type erasure at registration, late
//! invocation at load time.
//!
//! # Example
//!
//! ```
//! use congruence::{register_builtins, RegistryBuilder, TemplateConfig};
//! use serde_json::json;
//!
//! let registry = register_builtins(RegistryBuilder::new()).build();
//!
//! let config: TemplateConfig = serde_json::from_value(json!({
//!     "id": { "$is": "is_number" },
//!     "(?)email": { "$regex": "@" },
//! }))?;
//! let root = registry.load_congruence(config)?;
//!
//! assert!(root.matches(&json!({ "id": 1, "email": "a@b" })));
//! assert!(!root.matches(&json!({ "id": "1" })));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use std::collections::{BTreeMap, HashMap};

use serde::de::DeserializeOwned;

use crate::{
    builtins,
    config::{DirectiveConfig, PredicateRef, TemplateConfig},
    Congruence, MatchMode, NestedTemplate, Predicate, Template, TemplateError, MAX_DEPTH,
    MAX_OPERANDS,
};

// ═══════════════════════════════════════════════════════════════════════════════
// Traits
// ═══════════════════════════════════════════════════════════════════════════════

/// Trait for predicate types that can be constructed from configuration.
///
/// # Example
///
/// ```
/// use congruence::{IntoPredicate, Predicate, TemplateError};
/// use serde::Deserialize;
///
/// #[derive(Deserialize)]
/// struct AtLeastConfig { min: f64 }
///
/// struct AtLeast;
///
/// impl IntoPredicate for AtLeast {
///     type Config = AtLeastConfig;
///
///     fn from_config(config: Self::Config) -> Result<Predicate, TemplateError> {
///         let min = config.min;
///         Ok(Predicate::new(format!("at_least_{min}"), move |v| {
///             v.and_then(serde_json::Value::as_f64).is_some_and(|n| n >= min)
///         }))
///     }
/// }
/// ```
pub trait IntoPredicate: Send + Sync + 'static {
    /// The configuration type deserialized from JSON/YAML.
    type Config: DeserializeOwned + Send + Sync;

    /// Construct a predicate from deserialized configuration.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError::InvalidConfig`] if the config is semantically
    /// invalid (e.g., `min > max`).
    fn from_config(config: Self::Config) -> Result<Predicate, TemplateError>;
}

// ═══════════════════════════════════════════════════════════════════════════════
// Type-erased factories
// ═══════════════════════════════════════════════════════════════════════════════

/// Type-erased predicate factory closure.
type BoxedPredicateFactory =
    Box<dyn Fn(&serde_json::Value) -> Result<Predicate, TemplateError> + Send + Sync>;

// ═══════════════════════════════════════════════════════════════════════════════
// Builder
// ═══════════════════════════════════════════════════════════════════════════════

/// Builder for constructing a [`Registry`].
///
/// Register predicates by name, then call [`build()`](Self::build) to produce
/// an immutable `Registry`. No runtime registration is possible afterwards.
pub struct RegistryBuilder {
    factories: HashMap<String, BoxedPredicateFactory>,
}

impl RegistryBuilder {
    /// Create a new empty registry builder.
    #[must_use]
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Register a ready-made predicate under `name`.
    ///
    /// The predicate is renamed to `name` so that config references and
    /// failure messages agree. Any configuration payload is ignored.
    #[must_use]
    pub fn predicate(mut self, name: &str, predicate: Predicate) -> Self {
        let predicate = predicate.named(name);
        self.factories.insert(
            name.to_owned(),
            Box::new(move |_: &serde_json::Value| Ok(predicate.clone())),
        );
        self
    }

    /// Register a configurable predicate type under `name`.
    ///
    /// At load time the registry deserializes the payload as `T::Config` and
    /// calls `T::from_config()`.
    #[must_use]
    pub fn factory<T: IntoPredicate>(mut self, name: &str) -> Self {
        self.factories.insert(
            name.to_owned(),
            Box::new(|value: &serde_json::Value| {
                let config: T::Config = serde_json::from_value(value.clone()).map_err(|e| {
                    TemplateError::InvalidConfig {
                        message: e.to_string(),
                    }
                })?;
                T::from_config(config)
            }),
        );
        self
    }

    /// Freeze the registry.
    #[must_use]
    pub fn build(self) -> Registry {
        Registry {
            factories: self.factories,
        }
    }
}

impl Default for RegistryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Register every predicate in [`builtins`] under its own name.
///
/// # Example
///
/// ```ignore
/// pub fn register(builder: RegistryBuilder) -> RegistryBuilder {
///     congruence::register_builtins(builder)
///         .factory::<LengthBetween>("length_between")
/// }
/// ```
#[must_use]
pub fn register_builtins(builder: RegistryBuilder) -> RegistryBuilder {
    builtins::all().into_iter().fold(builder, |builder, predicate| {
        let name = predicate.name().to_owned();
        builder.predicate(&name, predicate)
    })
}

// ═══════════════════════════════════════════════════════════════════════════════
// Registry
// ═══════════════════════════════════════════════════════════════════════════════

/// Immutable map from predicate names to factories.
///
/// Constructed via [`RegistryBuilder`]. Use [`load_template()`](Self::load_template)
/// to compile config into a runtime [`Template`].
pub struct Registry {
    factories: HashMap<String, BoxedPredicateFactory>,
}

impl Registry {
    /// Load a template from configuration.
    ///
    /// # Errors
    ///
    /// - [`TemplateError::UnknownPredicate`] — a `$is` name is not registered
    /// - [`TemplateError::InvalidConfig`] — a factory rejected its payload, or a
    ///   mapping key starts with `$` without being a well-formed directive
    /// - [`TemplateError::InvalidPattern`] / [`TemplateError::PatternTooLong`] — bad `$regex`
    /// - [`TemplateError::DuplicateKey`] — `k` and `(?)k` in one mapping
    /// - [`TemplateError::DepthExceeded`] / [`TemplateError::TooManyOperands`] — safety limits
    pub fn load_template(&self, config: TemplateConfig) -> Result<Template, TemplateError> {
        let template = self.load_node(config, 1)?;
        template.validate()?;
        tracing::debug!(
            kind = template.kind_name(),
            depth = template.depth(),
            "loaded template"
        );
        Ok(template)
    }

    /// Load a validated root template from configuration.
    ///
    /// # Errors
    ///
    /// Same as [`load_template()`](Self::load_template), plus
    /// [`TemplateError::NotAMapping`] when the root is not a mapping.
    pub fn load_congruence(&self, config: TemplateConfig) -> Result<Congruence, TemplateError> {
        Congruence::new(self.load_template(config)?)
    }

    /// Resolve a single predicate reference.
    ///
    /// # Errors
    ///
    /// [`TemplateError::UnknownPredicate`] if the name is not registered, or
    /// whatever the factory returns.
    pub fn resolve(&self, reference: &PredicateRef) -> Result<Predicate, TemplateError> {
        let name = reference.name();
        let factory = self
            .factories
            .get(name)
            .ok_or_else(|| TemplateError::UnknownPredicate {
                name: name.to_owned(),
                available: self.names().into_iter().map(str::to_owned).collect(),
            })?;
        match reference {
            PredicateRef::Name(_) => factory(&serde_json::Value::Object(serde_json::Map::new())),
            PredicateRef::Typed { config, .. } => factory(config),
        }
    }

    /// Returns the number of registered predicates.
    #[must_use]
    pub fn len(&self) -> usize {
        self.factories.len()
    }

    /// Returns `true` if no predicates are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }

    /// Returns `true` if the given predicate name is registered.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Returns all registered predicate names (sorted).
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    fn load_node(&self, config: TemplateConfig, depth: usize) -> Result<Template, TemplateError> {
        if depth > MAX_DEPTH {
            return Err(TemplateError::DepthExceeded {
                depth,
                max: MAX_DEPTH,
            });
        }
        match config {
            TemplateConfig::Literal(value) => Ok(Template::Literal(value)),
            TemplateConfig::Object(map) => Ok(Template::from(self.load_nested(map, depth)?)),
            TemplateConfig::Directive(directive) => self.load_directive(directive, depth),
        }
    }

    fn load_directive(
        &self,
        directive: DirectiveConfig,
        depth: usize,
    ) -> Result<Template, TemplateError> {
        match directive {
            DirectiveConfig::Is(reference) => self.resolve(&reference).map(Template::Predicate),
            DirectiveConfig::Regex(pattern) => Template::pattern(&pattern),
            DirectiveConfig::Literal(value) => Ok(Template::Literal(value)),
            DirectiveConfig::Not(inner) => Ok(crate::not(self.load_node(*inner, depth + 1)?)),
            DirectiveConfig::Or(operands) => {
                if operands.len() > MAX_OPERANDS {
                    return Err(TemplateError::TooManyOperands {
                        count: operands.len(),
                        max: MAX_OPERANDS,
                    });
                }
                let operands = operands
                    .into_iter()
                    .map(|op| self.load_node(op, depth + 1))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Template::Or(operands))
            }
            DirectiveConfig::Similar(map) => Ok(Template::from(
                self.load_nested(map, depth)?.with_mode(MatchMode::Similar),
            )),
            DirectiveConfig::Congruent(map) => Ok(Template::from(
                self.load_nested(map, depth)?.with_mode(MatchMode::Congruent),
            )),
        }
    }

    fn load_nested(
        &self,
        map: BTreeMap<String, TemplateConfig>,
        depth: usize,
    ) -> Result<NestedTemplate, TemplateError> {
        let mut nested = NestedTemplate::new();
        for (key, child) in map {
            if key.starts_with('$') {
                return Err(TemplateError::InvalidConfig {
                    message: format!(
                        "\"{key}\" is not a directive; \
                         directives must be the only key in their mapping"
                    ),
                });
            }
            nested.insert(&key, self.load_node(child, depth + 1)?)?;
        }
        Ok(nested)
    }
}
