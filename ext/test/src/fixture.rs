//! Conformance test fixture runner
//!
//! Loads YAML fixtures and runs them through the config loading path:
//! YAML → [`TemplateConfig`] → [`Registry::load_template`] → match.
//!
//! ```yaml
//! name: optional_keys
//! description: "(?)k may be absent"
//! template:
//!   id: { $is: is_number }
//!   (?)name: { $is: is_string }
//! cases:
//!   - name: absent
//!     object: { id: 1 }
//!     expect: true
//!   - name: wrong_type
//!     object: { id: 1, name: 2 }
//!     expect: false
//!     errors: ["name: is_string(2) returned false"]
//! ```
//!
//! A fixture with `load_error` instead asserts that loading the template
//! fails with a message containing that text.

use congruence::{
    congruent_with, similar_with, ErrorSink, MatchMode, Registry, RegistryBuilder, TemplateConfig,
};
use serde::Deserialize;

/// A complete test fixture
#[derive(Debug, Deserialize)]
pub struct Fixture {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub mode: MatchMode,
    pub template: TemplateConfig,
    #[serde(default)]
    pub load_error: Option<String>,
    #[serde(default)]
    pub cases: Vec<TestCase>,
}

/// Test case
#[derive(Debug, Deserialize)]
pub struct TestCase {
    pub name: String,
    pub object: serde_json::Value,
    pub expect: bool,
    /// Exact expected messages, in order. Unchecked when absent.
    #[serde(default)]
    pub errors: Option<Vec<String>>,
}

// ═══════════════════════════════════════════════════════════════════════════════
// Runner
// ═══════════════════════════════════════════════════════════════════════════════

/// Result of running a single test case
#[derive(Debug)]
pub struct CaseResult {
    pub case_name: String,
    pub passed: bool,
    pub expected: bool,
    pub actual: bool,
    pub expected_errors: Option<Vec<String>>,
    pub errors: Vec<String>,
}

/// The registry fixtures are loaded against: built-ins plus the test predicates.
#[must_use]
pub fn registry() -> Registry {
    crate::register(RegistryBuilder::new()).build()
}

impl Fixture {
    /// Parse a fixture from YAML
    pub fn from_yaml(yaml: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }

    /// Parse multiple fixtures from a YAML file with `---` separators
    pub fn from_yaml_multi(yaml: &str) -> Result<Vec<Self>, serde_yaml::Error> {
        let mut fixtures = Vec::new();
        for doc in serde_yaml::Deserializer::from_str(yaml) {
            fixtures.push(Self::deserialize(doc)?);
        }
        Ok(fixtures)
    }

    /// Load the template and run all test cases.
    ///
    /// # Errors
    ///
    /// Returns the load error message if the template does not load.
    pub fn run(&self, registry: &Registry) -> Result<Vec<CaseResult>, String> {
        let template = registry
            .load_template(self.template.clone())
            .map_err(|e| e.to_string())?;

        Ok(self
            .cases
            .iter()
            .map(|case| {
                let mut errors = ErrorSink::new();
                let actual = match self.mode {
                    MatchMode::Congruent => congruent_with(&template, &case.object, &mut errors),
                    MatchMode::Similar => similar_with(&template, &case.object, &mut errors),
                };
                let errors = errors.messages();
                let errors_ok = case.errors.as_ref().map_or(true, |e| *e == errors);
                CaseResult {
                    case_name: case.name.clone(),
                    passed: actual == case.expect && errors_ok,
                    expected: case.expect,
                    actual,
                    expected_errors: case.errors.clone(),
                    errors,
                }
            })
            .collect())
    }

    /// Run all test cases and panic on first failure
    pub fn run_and_assert(&self, registry: &Registry) {
        let outcome = self.run(registry);

        if let Some(expected) = &self.load_error {
            match outcome {
                Err(message) => assert!(
                    message.contains(expected.as_str()),
                    "Fixture '{}': load error {message:?} does not contain {expected:?}",
                    self.name
                ),
                Ok(_) => panic!(
                    "Fixture '{}': expected load error containing {expected:?}",
                    self.name
                ),
            }
            return;
        }

        let results = outcome
            .unwrap_or_else(|e| panic!("Fixture '{}' failed to load: {e}", self.name));
        for result in results {
            assert!(
                result.passed,
                "Fixture '{}' case '{}' failed: expected {} with errors {:?}, got {} with errors {:?}",
                self.name,
                result.case_name,
                result.expected,
                result.expected_errors,
                result.actual,
                result.errors
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIXTURE: &str = r#"
name: exact_keys
description: "key sets must match"
template:
  a: { $is: is_number }
cases:
  - name: hit
    object: { a: 1 }
    expect: true
  - name: extra_key
    object: { a: 1, b: 2 }
    expect: false
    errors: ["b: no match for 2"]
"#;

    #[test]
    fn parse_and_run() {
        let fixture = Fixture::from_yaml(FIXTURE).unwrap();
        assert_eq!(fixture.mode, MatchMode::Congruent);
        let results = fixture.run(&registry()).unwrap();
        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|r| r.passed));
    }

    #[test]
    fn wrong_expectation_fails() {
        let yaml = FIXTURE.replace("errors: [\"b: no match for 2\"]", "errors: []");
        let fixture = Fixture::from_yaml(&yaml).unwrap();
        let results = fixture.run(&registry()).unwrap();
        assert!(!results[1].passed);
        assert_eq!(results[1].errors, vec!["b: no match for 2"]);
    }

    #[test]
    fn multi_document() {
        let yaml = format!("{FIXTURE}---\n{FIXTURE}");
        assert_eq!(Fixture::from_yaml_multi(&yaml).unwrap().len(), 2);
    }

    #[test]
    fn load_error_fixture() {
        let fixture = Fixture::from_yaml(
            "name: bad\ntemplate: { a: { $is: nope } }\nload_error: unknown predicate\n",
        )
        .unwrap();
        fixture.run_and_assert(&registry());
    }
}
