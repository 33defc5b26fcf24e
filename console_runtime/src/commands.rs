use prost::Message;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

mod proto {
    include!(concat!(env!("OUT_DIR"), "/exodrone.commands.rs"));
}

use proto as pb;

/// Destination named by a travel request.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum TravelTarget {
    Home,
    Site(String),
}

impl TravelTarget {
    pub fn site_ref(&self) -> Option<&str> {
        match self {
            TravelTarget::Home => None,
            TravelTarget::Site(reference) => Some(reference.as_str()),
        }
    }
}

/// Intents the console sends to the authority. Every command is
/// fire-and-forget; the next snapshot is the only acknowledgement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ConsoleCommand {
    ConfirmSignalLost,
    SelectDrone { drone_ref: String },
    EndControl,
    SelfDestruct,
    AddTool { tool_type: String },
    RemoveTool { tool_type: String },
    Jettison { target_ref: String },
    StartTravel { target: TravelTarget },
    Explore,
    ExploreEvent { target_event: String },
    StartEvent,
    SkipEvent,
    AdventureChoice { choice: String },
}

impl ConsoleCommand {
    /// Wire verb shared by the text and protobuf encodings.
    pub fn verb(&self) -> &'static str {
        match self {
            ConsoleCommand::ConfirmSignalLost => "confirm_signal_lost",
            ConsoleCommand::SelectDrone { .. } => "select_drone",
            ConsoleCommand::EndControl => "end_control",
            ConsoleCommand::SelfDestruct => "self_destruct",
            ConsoleCommand::AddTool { .. } => "add_tool",
            ConsoleCommand::RemoveTool { .. } => "remove_tool",
            ConsoleCommand::Jettison { .. } => "jettison",
            ConsoleCommand::StartTravel { .. } => "start_travel",
            ConsoleCommand::Explore => "explore",
            ConsoleCommand::ExploreEvent { .. } => "explore_event",
            ConsoleCommand::StartEvent => "start_event",
            ConsoleCommand::SkipEvent => "skip_event",
            ConsoleCommand::AdventureChoice { .. } => "adventure_choice",
        }
    }
}

/// High-level representation of a command envelope.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandEnvelope {
    pub payload: ConsoleCommand,
    pub correlation_id: Option<u64>,
}

/// Error returned when encoding a command envelope fails.
#[derive(Debug, Error)]
pub enum CommandEncodeError {
    #[error("encode failed: {0}")]
    Encode(#[from] prost::EncodeError),
}

/// Error returned when decoding a command envelope fails.
///
/// Commands that name a drone, tool, cargo, event or choice must carry a
/// non-empty reference; an empty one yields
/// [`CommandDecodeError::EmptyReference`].
#[derive(Debug, Error)]
pub enum CommandDecodeError {
    #[error("decode failed: {0}")]
    Decode(#[from] prost::DecodeError),
    #[error("command envelope missing payload")]
    MissingPayload,
    #[error("empty reference for {field}")]
    EmptyReference { field: &'static str },
}

impl CommandEnvelope {
    pub fn new(payload: ConsoleCommand) -> Self {
        Self {
            payload,
            correlation_id: None,
        }
    }

    pub fn with_correlation(payload: ConsoleCommand, correlation_id: u64) -> Self {
        Self {
            payload,
            correlation_id: Some(correlation_id),
        }
    }

    /// Encode the envelope into a protobuf binary frame.
    pub fn encode_to_vec(&self) -> Result<Vec<u8>, CommandEncodeError> {
        let proto = self.to_proto();
        let mut buffer = Vec::with_capacity(proto.encoded_len());
        proto.encode(&mut buffer)?;
        Ok(buffer)
    }

    /// Decode an envelope from a protobuf binary frame.
    pub fn decode(bytes: &[u8]) -> Result<Self, CommandDecodeError> {
        let proto = pb::CommandEnvelope::decode(bytes)?;
        Self::try_from_proto(proto)
    }

    /// Convert the high-level envelope into its protobuf representation.
    pub fn to_proto(&self) -> pb::CommandEnvelope {
        use pb::command_envelope::Command;

        let command = Some(match &self.payload {
            ConsoleCommand::ConfirmSignalLost => {
                Command::ConfirmSignalLost(pb::ConfirmSignalLostCommand {})
            }
            ConsoleCommand::SelectDrone { drone_ref } => {
                Command::SelectDrone(pb::SelectDroneCommand {
                    drone_ref: drone_ref.clone(),
                })
            }
            ConsoleCommand::EndControl => Command::EndControl(pb::EndControlCommand {}),
            ConsoleCommand::SelfDestruct => Command::SelfDestruct(pb::SelfDestructCommand {}),
            ConsoleCommand::AddTool { tool_type } => Command::AddTool(pb::AddToolCommand {
                tool_type: tool_type.clone(),
            }),
            ConsoleCommand::RemoveTool { tool_type } => {
                Command::RemoveTool(pb::RemoveToolCommand {
                    tool_type: tool_type.clone(),
                })
            }
            ConsoleCommand::Jettison { target_ref } => Command::Jettison(pb::JettisonCommand {
                target_ref: target_ref.clone(),
            }),
            ConsoleCommand::StartTravel { target } => {
                Command::StartTravel(pb::StartTravelCommand {
                    target_site: target.site_ref().map(str::to_string),
                })
            }
            ConsoleCommand::Explore => Command::Explore(pb::ExploreCommand {}),
            ConsoleCommand::ExploreEvent { target_event } => {
                Command::ExploreEvent(pb::ExploreEventCommand {
                    target_event: target_event.clone(),
                })
            }
            ConsoleCommand::StartEvent => Command::StartEvent(pb::StartEventCommand {}),
            ConsoleCommand::SkipEvent => Command::SkipEvent(pb::SkipEventCommand {}),
            ConsoleCommand::AdventureChoice { choice } => {
                Command::AdventureChoice(pb::AdventureChoiceCommand {
                    choice: choice.clone(),
                })
            }
        });

        pb::CommandEnvelope {
            command,
            correlation_id: self.correlation_id,
        }
    }

    /// Attempt to build a high-level envelope from the protobuf representation.
    pub fn try_from_proto(proto: pb::CommandEnvelope) -> Result<Self, CommandDecodeError> {
        use pb::command_envelope::Command;

        let payload = match proto.command.ok_or(CommandDecodeError::MissingPayload)? {
            Command::ConfirmSignalLost(_) => ConsoleCommand::ConfirmSignalLost,
            Command::SelectDrone(cmd) => ConsoleCommand::SelectDrone {
                drone_ref: require_reference(cmd.drone_ref, "SelectDrone.drone_ref")?,
            },
            Command::EndControl(_) => ConsoleCommand::EndControl,
            Command::SelfDestruct(_) => ConsoleCommand::SelfDestruct,
            Command::AddTool(cmd) => ConsoleCommand::AddTool {
                tool_type: require_reference(cmd.tool_type, "AddTool.tool_type")?,
            },
            Command::RemoveTool(cmd) => ConsoleCommand::RemoveTool {
                tool_type: require_reference(cmd.tool_type, "RemoveTool.tool_type")?,
            },
            Command::Jettison(cmd) => ConsoleCommand::Jettison {
                target_ref: require_reference(cmd.target_ref, "Jettison.target_ref")?,
            },
            Command::StartTravel(cmd) => {
                let target = match cmd.target_site {
                    Some(reference) => TravelTarget::Site(require_reference(
                        reference,
                        "StartTravel.target_site",
                    )?),
                    None => TravelTarget::Home,
                };
                ConsoleCommand::StartTravel { target }
            }
            Command::Explore(_) => ConsoleCommand::Explore,
            Command::ExploreEvent(cmd) => ConsoleCommand::ExploreEvent {
                target_event: require_reference(cmd.target_event, "ExploreEvent.target_event")?,
            },
            Command::StartEvent(_) => ConsoleCommand::StartEvent,
            Command::SkipEvent(_) => ConsoleCommand::SkipEvent,
            Command::AdventureChoice(cmd) => ConsoleCommand::AdventureChoice {
                choice: require_reference(cmd.choice, "AdventureChoice.choice")?,
            },
        };

        Ok(CommandEnvelope {
            payload,
            correlation_id: proto.correlation_id,
        })
    }
}

fn require_reference(value: String, field: &'static str) -> Result<String, CommandDecodeError> {
    if value.trim().is_empty() {
        Err(CommandDecodeError::EmptyReference { field })
    } else {
        Ok(value)
    }
}
