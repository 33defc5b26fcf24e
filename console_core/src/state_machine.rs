//! Screen selection for the console.
//!
//! The selected [`ConsoleMode`] is a pure function of [`ModeInputs`]. The
//! only state the machine keeps of its own is the viewer's travel preview
//! toggle, which lets an exploring drone's operator browse destinations
//! without the drone leaving exploration.

use console_runtime::{ConsoleSnapshot, DroneStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConsoleMode {
    NoDroneSelected,
    Busy,
    PlanningTravel,
    TravelInProgress,
    AdventureInteraction,
    EventActive,
    ExplorationIdle,
}

impl ConsoleMode {
    pub fn as_str(self) -> &'static str {
        match self {
            ConsoleMode::NoDroneSelected => "no_drone_selected",
            ConsoleMode::Busy => "busy",
            ConsoleMode::PlanningTravel => "planning_travel",
            ConsoleMode::TravelInProgress => "travel_in_progress",
            ConsoleMode::AdventureInteraction => "adventure_interaction",
            ConsoleMode::EventActive => "event_active",
            ConsoleMode::ExplorationIdle => "exploration_idle",
        }
    }
}

/// Everything screen selection depends on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ModeInputs {
    /// Status of the drone this viewer controls; `None` when it controls none.
    pub status: Option<DroneStatus>,
    pub event_active: bool,
    pub travel_preview: bool,
}

impl ModeInputs {
    pub fn from_snapshot(snapshot: &ConsoleSnapshot, travel_preview: bool) -> Self {
        Self {
            status: snapshot.status(),
            event_active: snapshot.event.is_some(),
            travel_preview,
        }
    }
}

pub fn select_mode(inputs: ModeInputs) -> ConsoleMode {
    let Some(status) = inputs.status else {
        return ConsoleMode::NoDroneSelected;
    };
    match status {
        DroneStatus::Busy => ConsoleMode::Busy,
        DroneStatus::Idle => ConsoleMode::PlanningTravel,
        DroneStatus::Travel => ConsoleMode::TravelInProgress,
        DroneStatus::Adventure => ConsoleMode::AdventureInteraction,
        DroneStatus::Exploration if inputs.event_active => ConsoleMode::EventActive,
        DroneStatus::Exploration if inputs.travel_preview => ConsoleMode::PlanningTravel,
        DroneStatus::Exploration => ConsoleMode::ExplorationIdle,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModeTransition {
    pub from: ConsoleMode,
    pub to: ConsoleMode,
    /// The travel preview was switched off because its premise went away.
    pub preview_cleared: bool,
}

#[derive(Debug, Clone)]
pub struct ConsoleStateMachine {
    inputs: ModeInputs,
    mode: ConsoleMode,
}

impl Default for ConsoleStateMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl ConsoleStateMachine {
    pub fn new() -> Self {
        Self {
            inputs: ModeInputs::default(),
            mode: ConsoleMode::NoDroneSelected,
        }
    }

    pub fn mode(&self) -> ConsoleMode {
        self.mode
    }

    pub fn inputs(&self) -> ModeInputs {
        self.inputs
    }

    pub fn travel_preview(&self) -> bool {
        self.inputs.travel_preview
    }

    /// Re-select the mode for a freshly applied snapshot. The preview toggle
    /// survives only while the drone is still exploring under our control.
    pub fn observe(&mut self, snapshot: &ConsoleSnapshot) -> Option<ModeTransition> {
        let keep_preview =
            self.inputs.travel_preview && snapshot.status() == Some(DroneStatus::Exploration);
        let preview_cleared = self.inputs.travel_preview && !keep_preview;
        self.update(ModeInputs::from_snapshot(snapshot, keep_preview), preview_cleared)
    }

    /// Drop the preview toggle ahead of the next [`observe`](Self::observe),
    /// e.g. when control passes to another drone. Returns whether it was set.
    pub fn reset_preview(&mut self) -> bool {
        std::mem::take(&mut self.inputs.travel_preview)
    }

    /// Show travel destinations while exploring. Only honoured from
    /// [`ConsoleMode::ExplorationIdle`].
    pub fn open_travel_preview(&mut self) -> bool {
        if self.mode != ConsoleMode::ExplorationIdle {
            return false;
        }
        let inputs = ModeInputs {
            travel_preview: true,
            ..self.inputs
        };
        self.update(inputs, false);
        true
    }

    /// Leave the preview and return to the exploration screen.
    pub fn cancel_travel_preview(&mut self) -> bool {
        if !self.inputs.travel_preview {
            return false;
        }
        let inputs = ModeInputs {
            travel_preview: false,
            ..self.inputs
        };
        self.update(inputs, false);
        true
    }

    fn update(&mut self, inputs: ModeInputs, preview_cleared: bool) -> Option<ModeTransition> {
        let from = self.mode;
        self.inputs = inputs;
        self.mode = select_mode(inputs);
        (from != self.mode || preview_cleared).then_some(ModeTransition {
            from,
            to: self.mode,
            preview_cleared,
        })
    }
}
