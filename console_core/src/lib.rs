//! Client-side logic for the exodrone console.
//!
//! The authority owns all drone state and publishes it as
//! [`ConsoleSnapshot`]s. This crate turns the latest snapshot into a screen
//! selection and a renderable view, and turns user intents into
//! [`ConsoleCommand`]s. It never mutates authoritative state.

pub mod bands;
pub mod config;
pub mod screens;
pub mod selection;
mod session;
pub mod signal;
pub mod state_machine;
pub mod travel;

pub use console_runtime::{ConsoleCommand, ConsoleSnapshot, TravelTarget};

pub use bands::{has_band_readings, visible_bands};
pub use config::{
    load_console_config, ConsoleConfig, ConsoleConfigError, ConsoleConfigMetadata,
    IntegrityThresholds, BUILTIN_CONSOLE_CONFIG, CONSOLE_CONFIG_ENV,
};
pub use screens::{build_view, ConsoleView, DroneScreen, ViewContext};
pub use selection::{can_control, drone_listing, DroneListing, ListingAction};
pub use session::{ConsoleIntent, ConsoleSession, IntentError};
pub use signal::ConnectionLossGate;
pub use state_machine::{select_mode, ConsoleMode, ConsoleStateMachine, ModeInputs, ModeTransition};
pub use travel::{format_eta, home_cost, travel_cost, EtaStyle, SiteTravelCalculator, TravelPlan};
