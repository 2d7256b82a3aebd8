//! congruence CLI — match JSON/YAML objects against templates from the shell.
//!
//! Subcommands:
//! - `check <template> <object> [--similar]` — match an object, print every mismatch
//! - `validate <template>` — validate a template loads without errors
//! - `info` — print registered predicate names

use std::path::Path;
use std::process;

use congruence::{Congruence, Registry, RegistryBuilder, Template, TemplateConfig};
use serde_json::Value;

fn main() {
    init_tracing();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        process::exit(1);
    }

    let result = match args[1].as_str() {
        "check" => cmd_check(&args[2..]),
        "validate" => cmd_validate(&args[2..]),
        "info" => cmd_info(),
        "--help" | "-h" | "help" => {
            print_usage();
            Ok(())
        }
        other => {
            eprintln!("error: unknown command \"{other}\"");
            print_usage();
            process::exit(1);
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        process::exit(1);
    }
}

/// Enable with `RUST_LOG=congruence=debug`.
fn init_tracing() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    if std::env::var("RUST_LOG").is_ok() {
        tracing_subscriber::registry()
            .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
            .with(EnvFilter::from_default_env())
            .init();
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Commands
// ═══════════════════════════════════════════════════════════════════════════════

fn cmd_check(args: &[String]) -> Result<(), String> {
    let args = parse_check_args(args)?;

    let congruence = load_congruence(&args.template)?;
    let congruence = if args.similar {
        congruence.similar()
    } else {
        congruence
    };
    let object: Value = load_document(&args.object)?;

    match congruence.explain(&object) {
        Ok(()) => {
            println!("match");
            Ok(())
        }
        Err(mismatches) => {
            for mismatch in &mismatches {
                println!("{mismatch}");
            }
            Err(format!("{} mismatch(es)", mismatches.len()))
        }
    }
}

fn cmd_validate(args: &[String]) -> Result<(), String> {
    let [path] = args else {
        return Err("validate requires exactly one template file path".into());
    };

    let root = load_congruence(path)?;
    let keys = root.template().len();
    let depth = Template::from(root).depth();
    println!("Template valid ({keys} keys, depth {depth})");
    Ok(())
}

#[allow(clippy::unnecessary_wraps)] // Uniform return type for all commands
fn cmd_info() -> Result<(), String> {
    let registry = build_registry();

    println!("Registered predicates:");
    for name in registry.names() {
        println!("  {name}");
    }

    Ok(())
}

// ═══════════════════════════════════════════════════════════════════════════════
// Registry assembly (composition root)
// ═══════════════════════════════════════════════════════════════════════════════

fn build_registry() -> Registry {
    congruence_test::register(RegistryBuilder::new()).build()
}

fn load_congruence(path: &str) -> Result<Congruence, String> {
    let config: TemplateConfig = load_document(path)?;
    let root = build_registry()
        .load_congruence(config)
        .map_err(|e| format!("template invalid: {e}"))?;
    tracing::debug!(path, keys = root.template().len(), "loaded template");
    Ok(root)
}

// ═══════════════════════════════════════════════════════════════════════════════
// Document loading
// ═══════════════════════════════════════════════════════════════════════════════

fn load_document<T: serde::de::DeserializeOwned>(path: &str) -> Result<T, String> {
    let content =
        std::fs::read_to_string(path).map_err(|e| format!("failed to read \"{path}\": {e}"))?;
    parse_document(path, &content)
}

fn parse_document<T: serde::de::DeserializeOwned>(path: &str, content: &str) -> Result<T, String> {
    let is_json = Path::new(path)
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    if is_json {
        serde_json::from_str(content).map_err(|e| format!("JSON parse error: {e}"))
    } else {
        // Default to YAML (handles .yaml and .yml)
        serde_yaml::from_str(content).map_err(|e| format!("YAML parse error: {e}"))
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Argument parsing
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, PartialEq, Eq)]
struct CheckArgs {
    template: String,
    object: String,
    similar: bool,
}

fn parse_check_args(args: &[String]) -> Result<CheckArgs, String> {
    let mut paths = Vec::new();
    let mut similar = false;

    for arg in args {
        match arg.as_str() {
            "--similar" => similar = true,
            flag if flag.starts_with("--") => {
                return Err(format!("unexpected argument \"{flag}\""));
            }
            path => paths.push(path.to_owned()),
        }
    }

    let [template, object]: [String; 2] = paths
        .try_into()
        .map_err(|_| "check requires a template path and an object path".to_owned())?;

    Ok(CheckArgs {
        template,
        object,
        similar,
    })
}

fn print_usage() {
    eprintln!(
        "Usage: congruence <command> [options]

Commands:
  check <template> <object> [--similar]   Match object against template
  validate <template>                     Validate template
  info                                    Print registered predicates
  help                                    Show this help"
    );
}
