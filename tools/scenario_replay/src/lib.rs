//! Headless replay of console scenarios.
//!
//! A scenario is a JSON document listing snapshots to apply and intents to
//! dispatch, with optional expectations on the selected screen and the
//! emitted command line.

use std::sync::Arc;

use console_core::{ConsoleConfig, ConsoleIntent, ConsoleMode, ConsoleSession, ConsoleView};
use console_runtime::{format_command_line, ConsoleSnapshot, TravelTarget};
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    #[serde(default = "default_viewer")]
    pub viewer: String,
    pub steps: Vec<ScenarioStep>,
}

fn default_viewer() -> String {
    "console".to_string()
}

/// One step: apply `snapshot` if present, then dispatch `intent` if present.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ScenarioStep {
    pub snapshot: Option<ConsoleSnapshot>,
    /// Intent line such as `launch s2` or `open_travel_preview`.
    pub intent: Option<String>,
    /// Expected screen after the step, by mode name.
    pub expect_mode: Option<String>,
    /// Expected command line; an empty string expects a local-only intent.
    pub expect_command: Option<String>,
    pub expect_rejected: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IntentLineError {
    #[error("intent line is empty")]
    Empty,
    #[error("unknown intent `{0}`")]
    Unknown(String),
    #[error("intent `{0}` requires an argument")]
    MissingArgument(String),
    #[error("intent `{intent}` takes no argument, got `{value}`")]
    UnexpectedArgument { intent: String, value: String },
}

/// Parse `name [argument]`. `launch` without an argument travels home.
pub fn parse_intent_line(line: &str) -> Result<ConsoleIntent, IntentLineError> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Err(IntentLineError::Empty);
    }
    let (name, rest) = match trimmed.split_once(char::is_whitespace) {
        Some((name, rest)) => (name, rest.trim()),
        None => (trimmed, ""),
    };
    let argument = (!rest.is_empty()).then(|| rest.to_string());
    let required = || required_argument(name, argument.as_deref());

    let intent = match name {
        "acknowledge_signal_lost" => ConsoleIntent::AcknowledgeSignalLost,
        "select_drone" => return Ok(ConsoleIntent::SelectDrone(required()?)),
        "end_control" => ConsoleIntent::EndControl,
        "self_destruct" => ConsoleIntent::SelfDestruct,
        "cancel_self_destruct" => ConsoleIntent::CancelSelfDestruct,
        "open_tool_picker" => ConsoleIntent::OpenToolPicker,
        "close_tool_picker" => ConsoleIntent::CloseToolPicker,
        "add_tool" => return Ok(ConsoleIntent::AddTool(required()?)),
        "remove_tool" => return Ok(ConsoleIntent::RemoveTool(required()?)),
        "jettison" => return Ok(ConsoleIntent::Jettison(required()?)),
        "open_travel_preview" => ConsoleIntent::OpenTravelPreview,
        "cancel_travel_preview" => ConsoleIntent::CancelTravelPreview,
        "launch" => {
            return Ok(ConsoleIntent::Launch(
                argument.clone().map_or(TravelTarget::Home, TravelTarget::Site),
            ))
        }
        "explore" => ConsoleIntent::Explore,
        "explore_event" => return Ok(ConsoleIntent::ExploreEvent(required()?)),
        "start_event" => ConsoleIntent::StartEvent,
        "skip_event" => ConsoleIntent::SkipEvent,
        "adventure_choice" => return Ok(ConsoleIntent::AdventureChoice(required()?)),
        other => return Err(IntentLineError::Unknown(other.to_string())),
    };
    match argument {
        Some(value) => Err(IntentLineError::UnexpectedArgument {
            intent: name.to_string(),
            value,
        }),
        None => Ok(intent),
    }
}

fn required_argument(name: &str, argument: Option<&str>) -> Result<String, IntentLineError> {
    argument
        .map(str::to_string)
        .ok_or_else(|| IntentLineError::MissingArgument(name.to_string()))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    Snapshot,
    Command(String),
    Local,
    Rejected(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepReport {
    pub index: usize,
    pub mode: ConsoleMode,
    pub intent: Option<String>,
    pub outcome: StepOutcome,
}

#[derive(Debug, Clone, Default)]
pub struct ReplayReport {
    pub steps: Vec<StepReport>,
    pub failures: Vec<String>,
    /// Screen descriptor after the last step.
    pub view: Option<ConsoleView>,
}

impl ReplayReport {
    pub fn passed(&self) -> bool {
        self.failures.is_empty()
    }

    /// Every command line the scenario emitted, in order.
    pub fn commands(&self) -> Vec<&str> {
        self.steps
            .iter()
            .filter_map(|step| match &step.outcome {
                StepOutcome::Command(line) => Some(line.as_str()),
                _ => None,
            })
            .collect()
    }
}

pub fn run_scenario(
    scenario: &Scenario,
    config: Arc<ConsoleConfig>,
) -> Result<ReplayReport, IntentLineError> {
    let mut session = ConsoleSession::new(scenario.viewer.clone(), config);
    let mut report = ReplayReport::default();

    for (index, step) in scenario.steps.iter().enumerate() {
        if let Some(snapshot) = &step.snapshot {
            session.apply_snapshot(snapshot.clone());
        }
        let outcome = match &step.intent {
            Some(line) => match session.dispatch(parse_intent_line(line)?) {
                Ok(Some(command)) => StepOutcome::Command(format_command_line(&command)),
                Ok(None) => StepOutcome::Local,
                Err(err) => StepOutcome::Rejected(err.to_string()),
            },
            None => StepOutcome::Snapshot,
        };
        let mode = session.mode();
        check_step(index, step, mode, &outcome, &mut report.failures);
        tracing::debug!(
            target: "exodrone::replay",
            step = index,
            mode = mode.as_str(),
            ?outcome,
            "replay.step"
        );
        report.steps.push(StepReport {
            index,
            mode,
            intent: step.intent.clone(),
            outcome,
        });
    }
    report.view = Some(session.view());
    Ok(report)
}

fn check_step(
    index: usize,
    step: &ScenarioStep,
    mode: ConsoleMode,
    outcome: &StepOutcome,
    failures: &mut Vec<String>,
) {
    if let Some(expected) = &step.expect_mode {
        if expected != mode.as_str() {
            failures.push(format!(
                "step {index}: expected mode {expected}, got {}",
                mode.as_str()
            ));
        }
    }
    if let Some(expected) = &step.expect_command {
        let actual = match outcome {
            StepOutcome::Command(line) => line.as_str(),
            _ => "",
        };
        if expected != actual {
            failures.push(format!(
                "step {index}: expected command `{expected}`, got {outcome:?}"
            ));
        }
    }
    if step.expect_rejected && !matches!(outcome, StepOutcome::Rejected(_)) {
        failures.push(format!("step {index}: expected rejection, got {outcome:?}"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn launch_without_argument_goes_home() {
        assert_eq!(
            parse_intent_line("launch"),
            Ok(ConsoleIntent::Launch(TravelTarget::Home))
        );
        assert_eq!(
            parse_intent_line("  launch   s2 "),
            Ok(ConsoleIntent::Launch(TravelTarget::Site("s2".into())))
        );
    }

    #[test]
    fn malformed_lines_are_rejected() {
        assert_eq!(parse_intent_line("   "), Err(IntentLineError::Empty));
        assert_eq!(
            parse_intent_line("jettison"),
            Err(IntentLineError::MissingArgument("jettison".into()))
        );
        assert_eq!(
            parse_intent_line("explore now"),
            Err(IntentLineError::UnexpectedArgument {
                intent: "explore".into(),
                value: "now".into()
            })
        );
        assert_eq!(
            parse_intent_line("warp s1"),
            Err(IntentLineError::Unknown("warp".into()))
        );
    }

    #[test]
    fn adventure_choice_keeps_spaces() {
        assert_eq!(
            parse_intent_line("adventure_choice open the hatch"),
            Ok(ConsoleIntent::AdventureChoice("open the hatch".into()))
        );
    }

    #[test]
    fn expectations_are_checked() {
        let scenario: Scenario = serde_json::from_str(
            r#"{
                "viewer": "console-a",
                "steps": [
                    {"snapshot": {"signal_lost": true}, "expect_mode": "no_drone_selected"},
                    {"intent": "explore", "expect_rejected": true},
                    {"intent": "acknowledge_signal_lost", "expect_command": "confirm_signal_lost"},
                    {"intent": "end_control", "expect_command": "end_control"}
                ]
            }"#,
        )
        .unwrap();
        let report = run_scenario(&scenario, Arc::new(ConsoleConfig::default())).unwrap();
        assert_eq!(report.commands(), vec!["confirm_signal_lost"]);
        assert_eq!(report.failures.len(), 1);
        assert!(report.failures[0].starts_with("step 3"));
    }
}
