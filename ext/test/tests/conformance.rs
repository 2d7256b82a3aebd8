//! Conformance tests that run YAML fixtures against congruence
//!
//! Run with: cargo test -p congruence-test --test conformance --features congruence-test/fixtures
//!
//! Note: This test file requires the `fixtures` feature to be enabled.

#![cfg(feature = "fixtures")]

use congruence::Registry;
use congruence_test::fixture::{self, Fixture};
use std::fs;
use std::path::{Path, PathBuf};

/// The fixtures directory, next to this crate's manifest
fn fixtures_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures")
}

/// Load and run all fixtures in a directory
fn run_fixtures_in_dir(dir: &Path) {
    assert!(dir.exists(), "Fixtures directory does not exist: {}", dir.display());

    let registry: Registry = fixture::registry();
    let mut paths: Vec<PathBuf> = fs::read_dir(dir)
        .expect("read dir")
        .map(|entry| entry.expect("dir entry").path())
        .filter(|path| {
            path.extension()
                .is_some_and(|e| e == "yaml" || e == "yml")
        })
        .collect();
    paths.sort();
    assert!(!paths.is_empty(), "No fixtures in {}", dir.display());

    for path in paths {
        println!("Running fixture: {}", path.display());

        let yaml = fs::read_to_string(&path).expect("read yaml");

        // Parse potentially multiple fixtures (separated by ---)
        let fixtures = Fixture::from_yaml_multi(&yaml).unwrap_or_else(|e| {
            panic!("Failed to parse {}: {}", path.display(), e);
        });

        for fixture in fixtures {
            println!("  Running: {}", fixture.name);
            fixture.run_and_assert(&registry);
        }
    }
}

#[test]
fn test_structure() {
    run_fixtures_in_dir(&fixtures_dir().join("01_structure"));
}

#[test]
fn test_markers() {
    run_fixtures_in_dir(&fixtures_dir().join("02_markers"));
}

#[test]
fn test_combinators() {
    run_fixtures_in_dir(&fixtures_dir().join("03_combinators"));
}

#[test]
fn test_predicates() {
    run_fixtures_in_dir(&fixtures_dir().join("04_predicates"));
}

#[test]
fn test_config() {
    run_fixtures_in_dir(&fixtures_dir().join("05_config"));
}
