//! Outbound command surface for the exodrone console.
//!
//! Re-exports the snapshot contracts from `console_schema` and adds the
//! command model with its protobuf and text-line encodings.

pub use console_schema::*;

pub mod command_text;
pub mod commands;

pub use command_text::{format_command_line, parse_command_line, CommandParseError};
pub use commands::{
    CommandDecodeError, CommandEncodeError, CommandEnvelope, ConsoleCommand, TravelTarget,
};
