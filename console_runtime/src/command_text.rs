use thiserror::Error;

use crate::{ConsoleCommand, TravelTarget};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandParseError {
    #[error("empty command")]
    Empty,
    #[error("unknown command: {0}")]
    UnknownCommand(String),
    #[error("missing argument: {0}")]
    MissingArgument(&'static str),
    #[error("unexpected argument '{value}' for {verb}")]
    UnexpectedArgument { verb: &'static str, value: String },
}

/// Parse one text command line, e.g. `start_travel site-3` or `explore`.
///
/// The argument is everything after the first whitespace character following
/// the verb, taken verbatim; only the line terminator is stripped.
/// `start_travel` without a site reference means "return home".
pub fn parse_command_line(input: &str) -> Result<ConsoleCommand, CommandParseError> {
    let line = input
        .trim_end_matches(|c| c == '\r' || c == '\n')
        .trim_start();
    if line.trim_end().is_empty() {
        return Err(CommandParseError::Empty);
    }

    let (verb, argument) = match line.split_once(char::is_whitespace) {
        Some((verb, rest)) => (verb, rest),
        None => (line, ""),
    };
    let verb = verb.to_ascii_lowercase();
    let argument = (!argument.trim().is_empty()).then_some(argument);

    let command = match verb.as_str() {
        "confirm_signal_lost" => ConsoleCommand::ConfirmSignalLost,
        "select_drone" => ConsoleCommand::SelectDrone {
            drone_ref: required(argument, "drone_ref")?,
        },
        "end_control" => ConsoleCommand::EndControl,
        "self_destruct" => ConsoleCommand::SelfDestruct,
        "add_tool" => ConsoleCommand::AddTool {
            tool_type: required(argument, "tool_type")?,
        },
        "remove_tool" => ConsoleCommand::RemoveTool {
            tool_type: required(argument, "tool_type")?,
        },
        "jettison" => ConsoleCommand::Jettison {
            target_ref: required(argument, "target_ref")?,
        },
        "start_travel" => {
            let target = match argument {
                Some(reference) => TravelTarget::Site(reference.to_string()),
                None => TravelTarget::Home,
            };
            return Ok(ConsoleCommand::StartTravel { target });
        }
        "explore" => ConsoleCommand::Explore,
        "explore_event" => ConsoleCommand::ExploreEvent {
            target_event: required(argument, "target_event")?,
        },
        "start_event" => ConsoleCommand::StartEvent,
        "skip_event" => ConsoleCommand::SkipEvent,
        "adventure_choice" => ConsoleCommand::AdventureChoice {
            choice: required(argument, "choice")?,
        },
        other => return Err(CommandParseError::UnknownCommand(other.to_string())),
    };

    let bare = matches!(
        command,
        ConsoleCommand::ConfirmSignalLost
            | ConsoleCommand::EndControl
            | ConsoleCommand::SelfDestruct
            | ConsoleCommand::Explore
            | ConsoleCommand::StartEvent
            | ConsoleCommand::SkipEvent
    );
    match argument {
        Some(extra) if bare => Err(CommandParseError::UnexpectedArgument {
            verb: command.verb(),
            value: extra.trim().to_string(),
        }),
        _ => Ok(command),
    }
}

/// Render a command as a text line (without the trailing newline).
pub fn format_command_line(command: &ConsoleCommand) -> String {
    let verb = command.verb();
    match command {
        ConsoleCommand::SelectDrone { drone_ref } => format!("{verb} {drone_ref}"),
        ConsoleCommand::AddTool { tool_type } | ConsoleCommand::RemoveTool { tool_type } => {
            format!("{verb} {tool_type}")
        }
        ConsoleCommand::Jettison { target_ref } => format!("{verb} {target_ref}"),
        ConsoleCommand::StartTravel { target } => match target {
            TravelTarget::Home => verb.to_string(),
            TravelTarget::Site(reference) => format!("{verb} {reference}"),
        },
        ConsoleCommand::ExploreEvent { target_event } => format!("{verb} {target_event}"),
        ConsoleCommand::AdventureChoice { choice } => format!("{verb} {choice}"),
        ConsoleCommand::ConfirmSignalLost
        | ConsoleCommand::EndControl
        | ConsoleCommand::SelfDestruct
        | ConsoleCommand::Explore
        | ConsoleCommand::StartEvent
        | ConsoleCommand::SkipEvent => verb.to_string(),
    }
}

fn required(argument: Option<&str>, name: &'static str) -> Result<String, CommandParseError> {
    argument
        .map(str::to_string)
        .ok_or(CommandParseError::MissingArgument(name))
}
