use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use console_core::ConsoleConfig;
use console_runtime::ConsoleSnapshot;
use scenario_replay::Scenario;

pub fn fixture_path(relative: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(relative)
}

pub fn load_snapshot(name: &str) -> Result<ConsoleSnapshot> {
    let path = fixture_path(&format!("snapshots/{name}.json"));
    let text = fs::read_to_string(&path)
        .with_context(|| format!("reading snapshot fixture {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))
}

pub fn load_scenario(name: &str) -> Result<Scenario> {
    let path = fixture_path(&format!("scenarios/{name}.json"));
    let text = fs::read_to_string(&path)
        .with_context(|| format!("reading scenario fixture {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))
}

pub fn default_config() -> Arc<ConsoleConfig> {
    Arc::new(ConsoleConfig::default())
}
