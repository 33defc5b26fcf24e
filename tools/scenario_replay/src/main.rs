use std::{fs, path::PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use console_core::load_console_config;
use scenario_replay::{run_scenario, Scenario, StepOutcome};

#[derive(Parser, Debug)]
#[command(author, version, about = "Replay exodrone console scenarios headlessly", long_about = None)]
struct Args {
    /// Path to scenario JSON file
    #[arg(long)]
    scenario: PathBuf,

    /// Console presentation config (defaults to EXODRONE_CONSOLE_CONFIG_PATH or builtin)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the scenario's viewer identity
    #[arg(long)]
    viewer: Option<String>,

    /// Print the final screen descriptor as well
    #[arg(long)]
    show_view: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .compact()
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let text = fs::read_to_string(&args.scenario)
        .with_context(|| format!("Failed to read scenario at {}", args.scenario.display()))?;
    let mut scenario: Scenario = serde_json::from_str(&text).with_context(|| {
        format!(
            "Failed to parse scenario JSON at {}",
            args.scenario.display()
        )
    })?;
    if let Some(viewer) = args.viewer {
        scenario.viewer = viewer;
    }

    let (config, _) = load_console_config(args.config.as_deref());
    let report = run_scenario(&scenario, config)
        .with_context(|| format!("Scenario {} is malformed", args.scenario.display()))?;

    for step in &report.steps {
        let intent = step.intent.as_deref().unwrap_or("-");
        let outcome = match &step.outcome {
            StepOutcome::Snapshot => "snapshot applied".to_string(),
            StepOutcome::Command(line) => format!("sent `{line}`"),
            StepOutcome::Local => "local".to_string(),
            StepOutcome::Rejected(reason) => format!("rejected: {reason}"),
        };
        println!(
            "{:>3}  {:<22} {:<28} {}",
            step.index,
            step.mode.as_str(),
            intent,
            outcome
        );
    }

    if args.show_view {
        if let Some(view) = &report.view {
            println!("=== view ===");
            println!("{view:#?}");
        }
    }

    if !report.passed() {
        for failure in &report.failures {
            eprintln!("{failure}");
        }
        anyhow::bail!("{} expectation(s) failed", report.failures.len());
    }
    Ok(())
}
