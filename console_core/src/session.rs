//! One viewer's console session.
//!
//! The session applies snapshots wholesale, keeps the viewer-local toggles
//! (travel preview, tool picker, self-destruct confirmation) consistent with
//! them, and turns user intents into commands. Intents are resolved against
//! the latest snapshot at dispatch time; nothing is cached across snapshots.

use std::sync::Arc;

use console_runtime::{ConsoleCommand, ConsoleSnapshot, TravelTarget};
use thiserror::Error;
use tracing::{debug, info, trace, warn};

use crate::config::ConsoleConfig;
use crate::screens::{build_view, ConsoleView, ViewContext};
use crate::selection::{can_control, is_listed};
use crate::signal::ConnectionLossGate;
use crate::state_machine::{ConsoleMode, ConsoleStateMachine, ModeTransition};
use crate::travel::SiteTravelCalculator;

/// Something the local user asked for. Some intents only flip local toggles;
/// the rest map onto exactly one [`ConsoleCommand`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleIntent {
    AcknowledgeSignalLost,
    SelectDrone(String),
    EndControl,
    /// First request arms the confirmation, the second sends the command.
    SelfDestruct,
    CancelSelfDestruct,
    OpenToolPicker,
    CloseToolPicker,
    AddTool(String),
    RemoveTool(String),
    Jettison(String),
    OpenTravelPreview,
    CancelTravelPreview,
    Launch(TravelTarget),
    Explore,
    ExploreEvent(String),
    StartEvent,
    SkipEvent,
    AdventureChoice(String),
}

impl ConsoleIntent {
    pub fn name(&self) -> &'static str {
        match self {
            ConsoleIntent::AcknowledgeSignalLost => "acknowledge_signal_lost",
            ConsoleIntent::SelectDrone(_) => "select_drone",
            ConsoleIntent::EndControl => "end_control",
            ConsoleIntent::SelfDestruct => "self_destruct",
            ConsoleIntent::CancelSelfDestruct => "cancel_self_destruct",
            ConsoleIntent::OpenToolPicker => "open_tool_picker",
            ConsoleIntent::CloseToolPicker => "close_tool_picker",
            ConsoleIntent::AddTool(_) => "add_tool",
            ConsoleIntent::RemoveTool(_) => "remove_tool",
            ConsoleIntent::Jettison(_) => "jettison",
            ConsoleIntent::OpenTravelPreview => "open_travel_preview",
            ConsoleIntent::CancelTravelPreview => "cancel_travel_preview",
            ConsoleIntent::Launch(_) => "launch",
            ConsoleIntent::Explore => "explore",
            ConsoleIntent::ExploreEvent(_) => "explore_event",
            ConsoleIntent::StartEvent => "start_event",
            ConsoleIntent::SkipEvent => "skip_event",
            ConsoleIntent::AdventureChoice(_) => "adventure_choice",
        }
    }
}

/// Why an intent produced no command. None of these are fatal; the next
/// snapshot may make the intent valid again.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IntentError {
    #[error("drone signal lost; only acknowledgement is accepted")]
    SignalLost,
    #[error("drone signal is not lost")]
    SignalNotLost,
    #[error("no drone under control")]
    NoDrone,
    #[error("a drone is already under control")]
    AlreadyControlling,
    #[error("drone {0} is not in the roster")]
    UnknownDrone(String),
    #[error("drone {0} is controlled by another console")]
    ControlledElsewhere(String),
    #[error("{intent} is unavailable on the {mode} screen")]
    WrongMode {
        intent: &'static str,
        mode: &'static str,
    },
    #[error("tools cannot be reconfigured right now")]
    NotConfigurable,
    #[error("tool {0} is not in the catalog")]
    UnknownTool(String),
    #[error("tool {0} is not installed")]
    ToolNotInstalled(String),
    #[error("cargo {0} is no longer aboard")]
    StaleCargo(String),
    #[error("travel is blocked: {0}")]
    TravelBlocked(String),
    #[error("{0} is not an available destination")]
    InvalidDestination(String),
    #[error("event {0} is not listed at this site")]
    StaleEvent(String),
    #[error("event action is disabled")]
    EventActionDisabled,
    #[error("event cannot be skipped")]
    EventNotSkippable,
    #[error("no adventure in progress")]
    NoAdventure,
    #[error("choice {0} is not offered")]
    StaleChoice(String),
}

#[derive(Debug, Clone)]
pub struct ConsoleSession {
    viewer: String,
    config: Arc<ConsoleConfig>,
    snapshot: ConsoleSnapshot,
    gate: ConnectionLossGate,
    machine: ConsoleStateMachine,
    choosing_tools: bool,
    self_destruct_armed: bool,
}

impl ConsoleSession {
    pub fn new(viewer: impl Into<String>, config: Arc<ConsoleConfig>) -> Self {
        Self {
            viewer: viewer.into(),
            config,
            snapshot: ConsoleSnapshot::default(),
            gate: ConnectionLossGate::default(),
            machine: ConsoleStateMachine::new(),
            choosing_tools: false,
            self_destruct_armed: false,
        }
    }

    pub fn viewer(&self) -> &str {
        &self.viewer
    }

    pub fn config(&self) -> &ConsoleConfig {
        &self.config
    }

    pub fn snapshot(&self) -> &ConsoleSnapshot {
        &self.snapshot
    }

    pub fn mode(&self) -> ConsoleMode {
        self.machine.mode()
    }

    pub fn signal_lost(&self) -> bool {
        self.gate.is_blocking()
    }

    pub fn travel_preview(&self) -> bool {
        self.machine.travel_preview()
    }

    pub fn choosing_tools(&self) -> bool {
        self.choosing_tools
    }

    pub fn self_destruct_armed(&self) -> bool {
        self.self_destruct_armed
    }

    /// Replace the session state with `snapshot` and return the resulting mode.
    pub fn apply_snapshot(&mut self, snapshot: ConsoleSnapshot) -> ConsoleMode {
        if snapshot.header.hash != 0 && snapshot.header.hash == self.snapshot.header.hash {
            trace!(
                target: "exodrone::session",
                sequence = snapshot.header.sequence,
                "snapshot.unchanged"
            );
        }
        for anomaly in snapshot.anomalies() {
            warn!(
                target: "exodrone::session",
                sequence = snapshot.header.sequence,
                %anomaly,
                "snapshot.anomaly"
            );
        }

        let previous_drone = self
            .snapshot
            .drone
            .as_ref()
            .map(|drone| drone.reference.clone());
        let next_drone = snapshot.drone.as_ref().map(|drone| drone.reference.as_str());
        let control_changed = previous_drone.as_deref() != next_drone;

        if self.choosing_tools
            && (next_drone.is_none() || control_changed || !snapshot.configurable)
        {
            self.choosing_tools = false;
            debug!(target: "exodrone::session", "tool_picker.closed=invalidated");
        }
        if self.self_destruct_armed && (next_drone.is_none() || control_changed) {
            self.self_destruct_armed = false;
            debug!(target: "exodrone::session", "self_destruct.disarmed=invalidated");
        }

        if control_changed && self.machine.reset_preview() {
            debug!(target: "exodrone::session", "travel_preview.closed=invalidated");
        }

        let gate = ConnectionLossGate::from_snapshot(&snapshot);
        if gate != self.gate {
            if gate.is_blocking() {
                warn!(target: "exodrone::session", "signal.lost");
            } else {
                info!(target: "exodrone::session", "signal.restored");
            }
        }
        self.gate = gate;

        if let Some(transition) = self.machine.observe(&snapshot) {
            log_transition(transition, snapshot.header.sequence);
        }
        self.snapshot = snapshot;
        self.machine.mode()
    }

    /// Build the screen descriptor for the current snapshot.
    pub fn view(&self) -> ConsoleView {
        build_view(
            &self.snapshot,
            ViewContext {
                mode: self.machine.mode(),
                travel_preview: self.machine.travel_preview(),
                choosing_tools: self.choosing_tools,
                self_destruct_armed: self.self_destruct_armed,
            },
            &self.config,
            &self.viewer,
        )
    }

    /// Resolve `intent` against the current snapshot. `Ok(None)` means the
    /// intent only changed local view state.
    pub fn dispatch(
        &mut self,
        intent: ConsoleIntent,
    ) -> Result<Option<ConsoleCommand>, IntentError> {
        let name = intent.name();
        let result = self.resolve(intent);
        match &result {
            Ok(Some(command)) => info!(
                target: "exodrone::session",
                intent = name,
                command = command.verb(),
                "intent.command"
            ),
            Ok(None) => debug!(target: "exodrone::session", intent = name, "intent.local"),
            Err(err) => debug!(
                target: "exodrone::session",
                intent = name,
                error = %err,
                "intent.rejected"
            ),
        }
        result
    }

    fn resolve(&mut self, intent: ConsoleIntent) -> Result<Option<ConsoleCommand>, IntentError> {
        if self.gate.is_blocking() {
            return match intent {
                ConsoleIntent::AcknowledgeSignalLost => Ok(self.gate.acknowledgement()),
                _ => Err(IntentError::SignalLost),
            };
        }

        match intent {
            ConsoleIntent::AcknowledgeSignalLost => Err(IntentError::SignalNotLost),
            ConsoleIntent::SelectDrone(reference) => self.select_drone(reference).map(Some),
            ConsoleIntent::EndControl => {
                self.require_drone()?;
                Ok(Some(ConsoleCommand::EndControl))
            }
            ConsoleIntent::SelfDestruct => {
                self.require_drone()?;
                if self.self_destruct_armed {
                    self.self_destruct_armed = false;
                    Ok(Some(ConsoleCommand::SelfDestruct))
                } else {
                    self.self_destruct_armed = true;
                    Ok(None)
                }
            }
            ConsoleIntent::CancelSelfDestruct => {
                self.self_destruct_armed = false;
                Ok(None)
            }
            ConsoleIntent::OpenToolPicker => {
                self.require_configurable()?;
                self.choosing_tools = true;
                Ok(None)
            }
            ConsoleIntent::CloseToolPicker => {
                self.choosing_tools = false;
                Ok(None)
            }
            ConsoleIntent::AddTool(tool_type) => {
                self.require_configurable()?;
                if self.snapshot.catalogs.tool(&tool_type).is_none() {
                    return Err(IntentError::UnknownTool(tool_type));
                }
                self.choosing_tools = false;
                Ok(Some(ConsoleCommand::AddTool { tool_type }))
            }
            ConsoleIntent::RemoveTool(tool_type) => {
                self.require_configurable()?;
                if !self.snapshot.has_tool(&tool_type) {
                    return Err(IntentError::ToolNotInstalled(tool_type));
                }
                Ok(Some(ConsoleCommand::RemoveTool { tool_type }))
            }
            ConsoleIntent::Jettison(target_ref) => {
                self.require_drone()?;
                if !self.snapshot.has_cargo(&target_ref) {
                    return Err(IntentError::StaleCargo(target_ref));
                }
                Ok(Some(ConsoleCommand::Jettison { target_ref }))
            }
            ConsoleIntent::OpenTravelPreview => {
                if self.machine.open_travel_preview() {
                    Ok(None)
                } else {
                    Err(self.wrong_mode("open_travel_preview"))
                }
            }
            ConsoleIntent::CancelTravelPreview => {
                if self.machine.cancel_travel_preview() {
                    Ok(None)
                } else {
                    Err(self.wrong_mode("cancel_travel_preview"))
                }
            }
            ConsoleIntent::Launch(target) => self.launch(target).map(Some),
            ConsoleIntent::Explore => {
                self.require_mode(ConsoleMode::ExplorationIdle, "explore")?;
                Ok(Some(ConsoleCommand::Explore))
            }
            ConsoleIntent::ExploreEvent(target_event) => {
                self.require_mode(ConsoleMode::ExplorationIdle, "explore_event")?;
                let listed = self
                    .snapshot
                    .site
                    .as_ref()
                    .is_some_and(|site| site.lists_event(&target_event));
                if !listed {
                    return Err(IntentError::StaleEvent(target_event));
                }
                Ok(Some(ConsoleCommand::ExploreEvent { target_event }))
            }
            ConsoleIntent::StartEvent => {
                self.require_mode(ConsoleMode::EventActive, "start_event")?;
                match &self.snapshot.event {
                    Some(event) if event.action_enabled => Ok(Some(ConsoleCommand::StartEvent)),
                    _ => Err(IntentError::EventActionDisabled),
                }
            }
            ConsoleIntent::SkipEvent => {
                self.require_mode(ConsoleMode::EventActive, "skip_event")?;
                match &self.snapshot.event {
                    Some(event) if event.skippable => Ok(Some(ConsoleCommand::SkipEvent)),
                    _ => Err(IntentError::EventNotSkippable),
                }
            }
            ConsoleIntent::AdventureChoice(choice) => {
                self.require_mode(ConsoleMode::AdventureInteraction, "adventure_choice")?;
                let node = self
                    .snapshot
                    .adventure
                    .as_ref()
                    .ok_or(IntentError::NoAdventure)?;
                if !node.has_choice(&choice) {
                    return Err(IntentError::StaleChoice(choice));
                }
                Ok(Some(ConsoleCommand::AdventureChoice { choice }))
            }
        }
    }

    fn select_drone(&self, reference: String) -> Result<ConsoleCommand, IntentError> {
        if self.snapshot.drone.is_some() {
            return Err(IntentError::AlreadyControlling);
        }
        let Some(entry) = self
            .snapshot
            .roster_entry(&reference)
            .filter(|entry| is_listed(entry))
        else {
            return Err(IntentError::UnknownDrone(reference));
        };
        if !can_control(entry, &self.viewer) {
            return Err(IntentError::ControlledElsewhere(reference));
        }
        Ok(ConsoleCommand::SelectDrone {
            drone_ref: reference,
        })
    }

    fn launch(&mut self, target: TravelTarget) -> Result<ConsoleCommand, IntentError> {
        self.require_mode(ConsoleMode::PlanningTravel, "launch")?;
        if !self.snapshot.can_travel {
            return Err(IntentError::TravelBlocked(self.snapshot.travel_error.clone()));
        }
        let offered = self
            .destinations()
            .into_iter()
            .any(|destination| destination == target);
        if !offered {
            let label = match &target {
                TravelTarget::Home => "home".to_string(),
                TravelTarget::Site(reference) => format!("site {reference}"),
            };
            return Err(IntentError::InvalidDestination(label));
        }
        self.machine.cancel_travel_preview();
        Ok(ConsoleCommand::StartTravel { target })
    }

    /// Destinations the travel listing offers for the current snapshot.
    pub fn destinations(&self) -> Vec<TravelTarget> {
        let Some(drone) = self.snapshot.drone.as_ref() else {
            return Vec::new();
        };
        SiteTravelCalculator::new(drone.travel_coefficient)
            .destinations(self.snapshot.site.as_ref(), &self.snapshot.sites)
            .into_iter()
            .map(|plan| plan.destination)
            .collect()
    }

    /// Every command the console could send right now.
    pub fn available_commands(&self) -> Vec<ConsoleCommand> {
        if let Some(ack) = self.gate.acknowledgement() {
            return vec![ack];
        }
        let snapshot = &self.snapshot;
        let mut commands = Vec::new();

        if snapshot.drone.is_none() {
            commands.extend(
                snapshot
                    .roster
                    .iter()
                    .filter(|drone| is_listed(drone) && can_control(drone, &self.viewer))
                    .map(|drone| ConsoleCommand::SelectDrone {
                        drone_ref: drone.reference.clone(),
                    }),
            );
            return commands;
        }

        commands.push(ConsoleCommand::EndControl);
        commands.push(ConsoleCommand::SelfDestruct);
        if snapshot.configurable {
            commands.extend(snapshot.catalogs.tools.iter().map(|tool| {
                ConsoleCommand::AddTool {
                    tool_type: tool.name.clone(),
                }
            }));
            commands.extend(snapshot.cargo.iter().filter_map(|slot| {
                slot.tool_name().map(|name| ConsoleCommand::RemoveTool {
                    tool_type: name.to_string(),
                })
            }));
        }
        commands.extend(snapshot.cargo.iter().filter_map(|slot| {
            slot.cargo_reference().map(|reference| ConsoleCommand::Jettison {
                target_ref: reference.to_string(),
            })
        }));

        match self.machine.mode() {
            ConsoleMode::PlanningTravel if snapshot.can_travel => {
                commands.extend(
                    self.destinations()
                        .into_iter()
                        .map(|target| ConsoleCommand::StartTravel { target }),
                );
            }
            ConsoleMode::ExplorationIdle => {
                commands.push(ConsoleCommand::Explore);
                if let Some(site) = &snapshot.site {
                    commands.extend(site.events.iter().map(|event| ConsoleCommand::ExploreEvent {
                        target_event: event.reference.clone(),
                    }));
                }
            }
            ConsoleMode::EventActive => {
                if let Some(event) = &snapshot.event {
                    if event.action_enabled {
                        commands.push(ConsoleCommand::StartEvent);
                    }
                    if event.skippable {
                        commands.push(ConsoleCommand::SkipEvent);
                    }
                }
            }
            ConsoleMode::AdventureInteraction => {
                if let Some(node) = &snapshot.adventure {
                    commands.extend(node.choices.iter().map(|choice| {
                        ConsoleCommand::AdventureChoice {
                            choice: choice.key.clone(),
                        }
                    }));
                }
            }
            ConsoleMode::PlanningTravel
            | ConsoleMode::NoDroneSelected
            | ConsoleMode::Busy
            | ConsoleMode::TravelInProgress => {}
        }
        commands
    }

    fn require_drone(&self) -> Result<(), IntentError> {
        if self.snapshot.drone.is_some() {
            Ok(())
        } else {
            Err(IntentError::NoDrone)
        }
    }

    fn require_configurable(&self) -> Result<(), IntentError> {
        self.require_drone()?;
        if self.snapshot.configurable {
            Ok(())
        } else {
            Err(IntentError::NotConfigurable)
        }
    }

    fn require_mode(&self, mode: ConsoleMode, intent: &'static str) -> Result<(), IntentError> {
        if self.machine.mode() == mode {
            Ok(())
        } else {
            Err(self.wrong_mode(intent))
        }
    }

    fn wrong_mode(&self, intent: &'static str) -> IntentError {
        IntentError::WrongMode {
            intent,
            mode: self.machine.mode().as_str(),
        }
    }
}

fn log_transition(transition: ModeTransition, sequence: u64) {
    info!(
        target: "exodrone::session",
        sequence,
        from = transition.from.as_str(),
        to = transition.to.as_str(),
        preview_cleared = transition.preview_cleared,
        "console.mode_changed"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use console_runtime::{
        ActiveEvent, AdventureChoice, AdventureNode, CargoSlot, Catalogs, ControlledDrone,
        DroneStatus, DroneSummary, ExplorationEventRef, SiteState, ToolDescriptor,
    };

    fn session() -> ConsoleSession {
        ConsoleSession::new("console-a", Arc::new(ConsoleConfig::default()))
    }

    fn site(reference: &str, distance: f64) -> SiteState {
        SiteState {
            reference: reference.to_string(),
            name: reference.to_string(),
            distance,
            events: vec![ExplorationEventRef {
                reference: format!("{reference}-event"),
                name: "strange signal".into(),
            }],
            ..Default::default()
        }
    }

    fn drone(status: DroneStatus) -> ControlledDrone {
        ControlledDrone {
            reference: "d1".into(),
            name: "Scout".into(),
            status,
            integrity: 100.0,
            max_integrity: 100.0,
            travel_coefficient: 2.0,
            log: Vec::new(),
        }
    }

    fn exploring() -> ConsoleSnapshot {
        ConsoleSnapshot {
            drone: Some(drone(DroneStatus::Exploration)),
            can_travel: true,
            configurable: true,
            sites: vec![site("s1", 10.0), site("s2", 20.0)],
            site: Some(site("s1", 10.0)),
            cargo: vec![
                CargoSlot::Tool {
                    name: "drill".into(),
                },
                CargoSlot::Cargo {
                    name: "relic".into(),
                    reference: "c1".into(),
                },
                CargoSlot::Empty,
            ],
            catalogs: Catalogs {
                tools: vec![ToolDescriptor {
                    name: "drill".into(),
                    description: "Bores into rock.".into(),
                    icon: "screwdriver".into(),
                }],
                bands: Vec::new(),
            },
            ..Default::default()
        }
    }

    #[test]
    fn exploration_without_event_is_idle_and_with_event_is_active() {
        let mut session = session();
        assert_eq!(session.apply_snapshot(exploring()), ConsoleMode::ExplorationIdle);

        let mut with_event = exploring();
        with_event.event = Some(ActiveEvent {
            reference: "s1-event".into(),
            action_enabled: true,
            ..Default::default()
        });
        assert_eq!(session.apply_snapshot(with_event), ConsoleMode::EventActive);
    }

    #[test]
    fn signal_loss_blocks_everything_but_acknowledgement() {
        let mut session = session();
        let mut snapshot = exploring();
        snapshot.signal_lost = true;
        session.apply_snapshot(snapshot);

        assert_eq!(
            session.available_commands(),
            vec![ConsoleCommand::ConfirmSignalLost]
        );
        assert_eq!(
            session.dispatch(ConsoleIntent::Explore),
            Err(IntentError::SignalLost)
        );
        assert_eq!(
            session.dispatch(ConsoleIntent::OpenTravelPreview),
            Err(IntentError::SignalLost)
        );
        assert_eq!(
            session.dispatch(ConsoleIntent::AcknowledgeSignalLost),
            Ok(Some(ConsoleCommand::ConfirmSignalLost))
        );
        // Acknowledging does not clear the flag locally.
        assert!(session.signal_lost());
        assert_eq!(session.view(), ConsoleView::SignalLost);
    }

    #[test]
    fn acknowledgement_without_lost_signal_is_rejected() {
        let mut session = session();
        session.apply_snapshot(exploring());
        assert_eq!(
            session.dispatch(ConsoleIntent::AcknowledgeSignalLost),
            Err(IntentError::SignalNotLost)
        );
    }

    #[test]
    fn preview_resets_when_status_leaves_exploration() {
        let mut session = session();
        session.apply_snapshot(exploring());
        assert_eq!(session.dispatch(ConsoleIntent::OpenTravelPreview), Ok(None));
        assert_eq!(session.mode(), ConsoleMode::PlanningTravel);

        let mut busy = exploring();
        busy.drone = Some(drone(DroneStatus::Busy));
        busy.site = None;
        session.apply_snapshot(busy);
        assert!(!session.travel_preview());

        session.apply_snapshot(exploring());
        assert_eq!(session.mode(), ConsoleMode::ExplorationIdle);
    }

    #[test]
    fn preview_launch_excludes_current_site_and_closes_preview() {
        let mut session = session();
        session.apply_snapshot(exploring());
        session.dispatch(ConsoleIntent::OpenTravelPreview).unwrap();

        assert_eq!(
            session.dispatch(ConsoleIntent::Launch(TravelTarget::Site("s1".into()))),
            Err(IntentError::InvalidDestination("site s1".into()))
        );
        assert_eq!(
            session.dispatch(ConsoleIntent::Launch(TravelTarget::Home)),
            Ok(Some(ConsoleCommand::StartTravel {
                target: TravelTarget::Home
            }))
        );
        assert!(!session.travel_preview());
        assert_eq!(session.mode(), ConsoleMode::ExplorationIdle);
    }

    #[test]
    fn idle_drone_at_home_cannot_travel_home() {
        let mut session = session();
        let mut idle = exploring();
        idle.drone = Some(drone(DroneStatus::Idle));
        idle.site = None;
        session.apply_snapshot(idle);

        assert_eq!(
            session.destinations(),
            vec![
                TravelTarget::Site("s1".into()),
                TravelTarget::Site("s2".into())
            ]
        );
        assert!(matches!(
            session.dispatch(ConsoleIntent::Launch(TravelTarget::Home)),
            Err(IntentError::InvalidDestination(_))
        ));
    }

    #[test]
    fn blocked_travel_is_a_display_veto() {
        let mut session = session();
        let mut idle = exploring();
        idle.drone = Some(drone(DroneStatus::Idle));
        idle.site = None;
        idle.can_travel = false;
        idle.travel_error = "Drone busy".into();
        session.apply_snapshot(idle);

        assert_eq!(
            session.dispatch(ConsoleIntent::Launch(TravelTarget::Site("s2".into()))),
            Err(IntentError::TravelBlocked("Drone busy".into()))
        );
        assert!(!session
            .available_commands()
            .iter()
            .any(|command| matches!(command, ConsoleCommand::StartTravel { .. })));
    }

    #[test]
    fn stale_references_produce_no_command() {
        let mut session = session();
        session.apply_snapshot(exploring());

        let mut after_jettison = exploring();
        after_jettison.cargo.retain(|slot| slot.cargo_reference().is_none());
        after_jettison.site = Some(SiteState {
            events: Vec::new(),
            ..site("s1", 10.0)
        });
        session.apply_snapshot(after_jettison);

        assert_eq!(
            session.dispatch(ConsoleIntent::Jettison("c1".into())),
            Err(IntentError::StaleCargo("c1".into()))
        );
        assert_eq!(
            session.dispatch(ConsoleIntent::ExploreEvent("s1-event".into())),
            Err(IntentError::StaleEvent("s1-event".into()))
        );
    }

    #[test]
    fn self_destruct_needs_confirmation() {
        let mut session = session();
        session.apply_snapshot(exploring());
        assert_eq!(session.dispatch(ConsoleIntent::SelfDestruct), Ok(None));
        assert!(session.self_destruct_armed());
        assert_eq!(
            session.dispatch(ConsoleIntent::SelfDestruct),
            Ok(Some(ConsoleCommand::SelfDestruct))
        );
        assert!(!session.self_destruct_armed());
    }

    #[test]
    fn losing_control_resets_tool_picker_and_self_destruct() {
        let mut session = session();
        session.apply_snapshot(exploring());
        session.dispatch(ConsoleIntent::OpenToolPicker).unwrap();
        session.dispatch(ConsoleIntent::SelfDestruct).unwrap();
        assert!(session.choosing_tools());

        session.apply_snapshot(ConsoleSnapshot::default());
        assert!(!session.choosing_tools());
        assert!(!session.self_destruct_armed());
        assert_eq!(session.mode(), ConsoleMode::NoDroneSelected);
    }

    #[test]
    fn switching_drones_resets_viewer_local_flags() {
        let mut session = session();
        session.apply_snapshot(exploring());
        session.dispatch(ConsoleIntent::OpenToolPicker).unwrap();
        session.dispatch(ConsoleIntent::OpenTravelPreview).unwrap();
        session.dispatch(ConsoleIntent::SelfDestruct).unwrap();
        assert!(session.travel_preview());

        let mut handover = exploring();
        if let Some(drone) = handover.drone.as_mut() {
            drone.reference = "d2".into();
            drone.name = "Hauler".into();
        }
        session.apply_snapshot(handover);
        assert!(!session.choosing_tools());
        assert!(!session.travel_preview());
        assert!(!session.self_destruct_armed());
        assert_eq!(session.mode(), ConsoleMode::ExplorationIdle);
    }

    #[test]
    fn tool_changes_require_configurable_console() {
        let mut session = session();
        let mut locked = exploring();
        locked.configurable = false;
        session.apply_snapshot(locked);

        assert_eq!(
            session.dispatch(ConsoleIntent::OpenToolPicker),
            Err(IntentError::NotConfigurable)
        );
        assert_eq!(
            session.dispatch(ConsoleIntent::RemoveTool("drill".into())),
            Err(IntentError::NotConfigurable)
        );

        session.apply_snapshot(exploring());
        session.dispatch(ConsoleIntent::OpenToolPicker).unwrap();
        assert_eq!(
            session.dispatch(ConsoleIntent::AddTool("drill".into())),
            Ok(Some(ConsoleCommand::AddTool {
                tool_type: "drill".into()
            }))
        );
        assert!(!session.choosing_tools());
        assert_eq!(
            session.dispatch(ConsoleIntent::AddTool("laser".into())),
            Err(IntentError::UnknownTool("laser".into()))
        );
        assert_eq!(
            session.dispatch(ConsoleIntent::RemoveTool("relic".into())),
            Err(IntentError::ToolNotInstalled("relic".into()))
        );
    }

    #[test]
    fn selection_respects_other_controllers() {
        let mut session = session();
        session.apply_snapshot(ConsoleSnapshot {
            roster: vec![
                DroneSummary {
                    reference: "d1".into(),
                    name: "Scout".into(),
                    description: String::new(),
                    controller: None,
                },
                DroneSummary {
                    reference: "d2".into(),
                    name: "Hauler".into(),
                    description: String::new(),
                    controller: Some("console-b".into()),
                },
            ],
            ..Default::default()
        });

        assert_eq!(
            session.available_commands(),
            vec![ConsoleCommand::SelectDrone {
                drone_ref: "d1".into()
            }]
        );
        assert_eq!(
            session.dispatch(ConsoleIntent::SelectDrone("d2".into())),
            Err(IntentError::ControlledElsewhere("d2".into()))
        );
        assert_eq!(
            session.dispatch(ConsoleIntent::SelectDrone("d9".into())),
            Err(IntentError::UnknownDrone("d9".into()))
        );
        // Selecting is fire-and-forget; the session still shows the listing.
        session
            .dispatch(ConsoleIntent::SelectDrone("d1".into()))
            .unwrap();
        assert_eq!(session.mode(), ConsoleMode::NoDroneSelected);
    }

    #[test]
    fn adventure_choice_must_be_listed() {
        let mut session = session();
        let mut adventure = exploring();
        adventure.drone = Some(drone(DroneStatus::Adventure));
        adventure.site = None;
        adventure.adventure = Some(AdventureNode {
            description: "A sealed hatch.".into(),
            choices: vec![AdventureChoice {
                key: "open".into(),
                text: "Open it".into(),
            }],
            ..Default::default()
        });
        session.apply_snapshot(adventure);

        assert_eq!(
            session.dispatch(ConsoleIntent::AdventureChoice("open".into())),
            Ok(Some(ConsoleCommand::AdventureChoice {
                choice: "open".into()
            }))
        );
        assert_eq!(
            session.dispatch(ConsoleIntent::AdventureChoice("flee".into())),
            Err(IntentError::StaleChoice("flee".into()))
        );
        assert!(matches!(
            session.dispatch(ConsoleIntent::Explore),
            Err(IntentError::WrongMode { .. })
        ));
    }

    #[test]
    fn event_actions_follow_authority_flags() {
        let mut session = session();
        let mut with_event = exploring();
        with_event.event = Some(ActiveEvent {
            reference: "s1-event".into(),
            action_enabled: false,
            skippable: true,
            ignore_text: "Leave".into(),
            ..Default::default()
        });
        session.apply_snapshot(with_event);

        assert_eq!(
            session.dispatch(ConsoleIntent::StartEvent),
            Err(IntentError::EventActionDisabled)
        );
        assert_eq!(
            session.dispatch(ConsoleIntent::SkipEvent),
            Ok(Some(ConsoleCommand::SkipEvent))
        );
        assert!(!session
            .available_commands()
            .contains(&ConsoleCommand::StartEvent));
    }

    #[test]
    fn exploration_offers_listed_events() {
        let mut session = session();
        session.apply_snapshot(exploring());
        let commands = session.available_commands();
        assert!(commands.contains(&ConsoleCommand::Explore));
        assert!(commands.contains(&ConsoleCommand::ExploreEvent {
            target_event: "s1-event".into()
        }));
        assert!(commands.contains(&ConsoleCommand::Jettison {
            target_ref: "c1".into()
        }));
        assert!(commands.contains(&ConsoleCommand::RemoveTool {
            tool_type: "drill".into()
        }));
    }
}
