use std::env;
use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

use console_runtime::{snapshot_json_schema, ConsoleCommand};
use jsonschema::JSONSchema;
use serde_json::Value;

const SCHEMA_DIR: &str = "schemas";
const SNAPSHOT_FIXTURES: &str = "integration_tests/tests/fixtures/snapshots/*.json";
const SCENARIO_FIXTURES: &str = "integration_tests/tests/fixtures/scenarios/*.json";

fn main() -> Result<(), Box<dyn Error>> {
    let mut args = env::args().skip(1);
    match args.next().as_deref() {
        Some("snapshot-schema") => snapshot_schema(),
        Some("validate-fixtures") => validate_fixtures(),
        Some("help") | None => {
            print_usage();
            Ok(())
        }
        Some(cmd) => {
            eprintln!("Unknown xtask '{cmd}'.");
            print_usage();
            std::process::exit(1);
        }
    }
}

fn print_usage() {
    eprintln!("Usage: cargo xtask snapshot-schema");
    eprintln!("       cargo xtask validate-fixtures");
    eprintln!("       cargo xtask help");
}

fn snapshot_schema() -> Result<(), Box<dyn Error>> {
    let dir = Path::new(SCHEMA_DIR);
    fs::create_dir_all(dir)?;

    let outputs = [
        (
            dir.join("console_snapshot.schema.json"),
            serde_json::to_string_pretty(&snapshot_json_schema())?,
        ),
        (
            dir.join("console_command.schema.json"),
            serde_json::to_string_pretty(&schemars::schema_for!(ConsoleCommand))?,
        ),
    ];
    for (path, text) in outputs {
        fs::write(&path, text + "\n")?;
        println!("Wrote {}", path.display());
    }
    Ok(())
}

fn validate_fixtures() -> Result<(), Box<dyn Error>> {
    let schema_value = serde_json::to_value(snapshot_json_schema())?;
    let schema = JSONSchema::compile(&schema_value)
        .map_err(|err| format!("snapshot schema does not compile: {err}"))?;

    let mut checked = 0usize;
    let mut failures = Vec::new();

    for path in fixture_paths(SNAPSHOT_FIXTURES)? {
        let value = read_json(&path)?;
        checked += 1;
        check(&schema, &value, &path.display().to_string(), &mut failures);
    }

    for path in fixture_paths(SCENARIO_FIXTURES)? {
        let value = read_json(&path)?;
        let steps = value
            .get("steps")
            .and_then(Value::as_array)
            .ok_or_else(|| format!("{} has no steps array", path.display()))?;
        for (index, step) in steps.iter().enumerate() {
            if let Some(snapshot) = step.get("snapshot") {
                checked += 1;
                let label = format!("{} step {index}", path.display());
                check(&schema, snapshot, &label, &mut failures);
            }
        }
    }

    if !failures.is_empty() {
        for failure in &failures {
            eprintln!("{failure}");
        }
        return Err(format!("{} of {checked} snapshots failed validation", failures.len()).into());
    }
    println!("Validated {checked} snapshots");
    Ok(())
}

fn fixture_paths(pattern: &str) -> Result<Vec<PathBuf>, Box<dyn Error>> {
    let mut paths = glob::glob(pattern)?.collect::<Result<Vec<_>, _>>()?;
    paths.sort();
    Ok(paths)
}

fn read_json(path: &Path) -> Result<Value, Box<dyn Error>> {
    let text = fs::read_to_string(path)?;
    serde_json::from_str(&text).map_err(|err| format!("{}: {err}", path.display()).into())
}

fn check(schema: &JSONSchema, value: &Value, label: &str, failures: &mut Vec<String>) {
    if let Err(errors) = schema.validate(value) {
        for error in errors {
            failures.push(format!("{label}: {} at {}", error, error.instance_path));
        }
    }
}
