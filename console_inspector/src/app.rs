use std::sync::mpsc::{Receiver, Sender};
use std::time::{Duration, Instant};

use color_eyre::Result;
use console_core::screens::{DroneScreen, SlotView};
use console_core::selection::ListingAction;
use console_core::{ConsoleIntent, ConsoleSession, ConsoleView};
use console_runtime::{ConsoleCommand, ConsoleSnapshot};
use crossterm::event::{self, Event, KeyCode};
use ratatui::backend::CrosstermBackend;
use ratatui::prelude::*;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tracing::{error, info, warn};

use crate::ui::{draw_ui, UiState};

pub struct InspectorApp {
    terminal: Terminal<CrosstermBackend<std::io::Stdout>>,
    session: ConsoleSession,
    ui_state: UiState,
    receiver: UnboundedReceiver<ConsoleSnapshot>,
    command_sender: Sender<ConsoleCommand>,
    shutdown_sender: Sender<()>,
    log_receiver: Receiver<String>,
}

impl InspectorApp {
    pub fn new(
        session: ConsoleSession,
        receiver: UnboundedReceiver<ConsoleSnapshot>,
        command_sender: Sender<ConsoleCommand>,
        shutdown_sender: Sender<()>,
        log_receiver: Receiver<String>,
    ) -> Result<Self> {
        let stdout = std::io::stdout();
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;
        crossterm::terminal::enable_raw_mode()?;
        terminal.clear()?;
        terminal.hide_cursor()?;
        Ok(Self {
            terminal,
            session,
            ui_state: UiState::default(),
            receiver,
            command_sender,
            shutdown_sender,
            log_receiver,
        })
    }

    pub fn run(mut self) -> Result<()> {
        let mut last_draw = Instant::now();
        let mut view = self.session.view();

        loop {
            let mut refreshed = false;
            while let Ok(snapshot) = self.receiver.try_recv() {
                self.ui_state.connected = true;
                self.session.apply_snapshot(snapshot);
                refreshed = true;
            }
            if refreshed {
                view = self.session.view();
                self.ui_state.clamp_cursors(&view);
            }

            while let Ok(line) = self.log_receiver.try_recv() {
                self.ui_state.push_log(line);
            }

            if last_draw.elapsed() >= Duration::from_millis(100) {
                self.terminal
                    .draw(|frame| draw_ui(frame, &self.ui_state, &view))?;
                last_draw = Instant::now();
            }

            if event::poll(Duration::from_millis(50))? {
                if let Event::Key(key) = event::read()? {
                    match map_key(key.code, &view, &self.ui_state) {
                        KeyAction::Quit => break,
                        KeyAction::Cursor(step) => self.ui_state.move_cursor(step, &view),
                        KeyAction::Slot(step) => self.ui_state.move_slot(step, &view),
                        KeyAction::Intent(intent) => {
                            self.dispatch(intent);
                            view = self.session.view();
                            self.ui_state.clamp_cursors(&view);
                        }
                        KeyAction::None => {}
                    }
                }
            }
        }

        self.terminal.show_cursor()?;
        crossterm::terminal::disable_raw_mode()?;
        let _ = self.shutdown_sender.send(());
        Ok(())
    }

    fn dispatch(&mut self, intent: ConsoleIntent) {
        match self.session.dispatch(intent) {
            Ok(Some(command)) => {
                self.ui_state.status = None;
                if let Err(err) = self.command_sender.send(command) {
                    error!("Failed to queue command: {}", err);
                }
            }
            Ok(None) => self.ui_state.status = None,
            Err(err) => {
                warn!("Intent rejected: {}", err);
                self.ui_state.status = Some(err.to_string());
            }
        }
    }
}

pub fn channel() -> (
    UnboundedSender<ConsoleSnapshot>,
    UnboundedReceiver<ConsoleSnapshot>,
) {
    unbounded_channel()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyAction {
    Quit,
    Cursor(i32),
    Slot(i32),
    Intent(ConsoleIntent),
    None,
}

/// Translate a key press into what the user meant on the current view.
pub fn map_key(code: KeyCode, view: &ConsoleView, state: &UiState) -> KeyAction {
    match code {
        KeyCode::Char('q') => return KeyAction::Quit,
        KeyCode::Up | KeyCode::Char('k') => return KeyAction::Cursor(-1),
        KeyCode::Down | KeyCode::Char('j') => return KeyAction::Cursor(1),
        KeyCode::Left | KeyCode::Char('[') => return KeyAction::Slot(-1),
        KeyCode::Right | KeyCode::Char(']') => return KeyAction::Slot(1),
        _ => {}
    }

    let console = match view {
        ConsoleView::SignalLost => {
            return match code {
                KeyCode::Enter | KeyCode::Char('a') => {
                    KeyAction::Intent(ConsoleIntent::AcknowledgeSignalLost)
                }
                _ => KeyAction::None,
            };
        }
        ConsoleView::Selection { drones } => {
            return match code {
                KeyCode::Enter => drones
                    .get(state.cursor)
                    .filter(|entry| entry.action == ListingAction::AssumeControl)
                    .map_or(KeyAction::None, |entry| {
                        KeyAction::Intent(ConsoleIntent::SelectDrone(entry.reference.clone()))
                    }),
                _ => KeyAction::None,
            };
        }
        ConsoleView::Drone(console) => console,
    };

    if let Some(picker) = &console.tool_picker {
        return match code {
            KeyCode::Enter => picker.tools.get(state.cursor).map_or(KeyAction::None, |tool| {
                KeyAction::Intent(ConsoleIntent::AddTool(tool.name.clone()))
            }),
            KeyCode::Esc | KeyCode::Char('t') => KeyAction::Intent(ConsoleIntent::CloseToolPicker),
            _ => KeyAction::None,
        };
    }

    let slot = console.equipment.slots.get(state.slot_cursor);
    let intent = match code {
        KeyCode::Char('u') => ConsoleIntent::EndControl,
        KeyCode::Char('x') => ConsoleIntent::SelfDestruct,
        KeyCode::Esc if console.equipment.self_destruct_armed => ConsoleIntent::CancelSelfDestruct,
        KeyCode::Char('t') => ConsoleIntent::OpenToolPicker,
        KeyCode::Char('r') => match slot {
            Some(SlotView::Tool { name, .. }) => ConsoleIntent::RemoveTool(name.clone()),
            _ => return KeyAction::None,
        },
        KeyCode::Char('d') => match slot {
            Some(SlotView::Cargo { reference, .. }) => ConsoleIntent::Jettison(reference.clone()),
            _ => return KeyAction::None,
        },
        _ => return screen_key(code, &console.screen, state),
    };
    KeyAction::Intent(intent)
}

fn screen_key(code: KeyCode, screen: &DroneScreen, state: &UiState) -> KeyAction {
    let intent = match (screen, code) {
        (DroneScreen::PlanningTravel(planning), KeyCode::Enter) => {
            match planning.destinations.get(state.cursor) {
                Some(entry) => ConsoleIntent::Launch(entry.target.clone()),
                None => return KeyAction::None,
            }
        }
        (DroneScreen::PlanningTravel(planning), KeyCode::Esc) if planning.cancellable => {
            ConsoleIntent::CancelTravelPreview
        }
        (DroneScreen::Exploration(_), KeyCode::Char('e')) => ConsoleIntent::Explore,
        (DroneScreen::Exploration(_), KeyCode::Char('p')) => ConsoleIntent::OpenTravelPreview,
        (DroneScreen::Exploration(Some(site)), KeyCode::Enter) => {
            match site.events.get(state.cursor) {
                Some(event) => ConsoleIntent::ExploreEvent(event.reference.clone()),
                None => return KeyAction::None,
            }
        }
        (DroneScreen::Event(_), KeyCode::Enter | KeyCode::Char('s')) => ConsoleIntent::StartEvent,
        (DroneScreen::Event(_), KeyCode::Char('i')) => ConsoleIntent::SkipEvent,
        (DroneScreen::Adventure(Some(node)), KeyCode::Enter) => {
            match node.choices.get(state.cursor) {
                Some(choice) => ConsoleIntent::AdventureChoice(choice.key.clone()),
                None => return KeyAction::None,
            }
        }
        _ => return KeyAction::None,
    };
    info!(target: "exodrone::inspector", ?intent, "key.intent");
    KeyAction::Intent(intent)
}

#[cfg(test)]
mod tests {
    use super::*;
    use console_core::screens::{
        DroneConsole, EquipmentPanel, EventOption, ExplorationScreen, IntegrityGauge,
    };
    use console_core::selection::DroneListing;
    use console_core::IntegrityThresholds;

    fn exploration_view(self_destruct_armed: bool) -> ConsoleView {
        ConsoleView::Drone(Box::new(DroneConsole {
            name: "Scout".into(),
            integrity: IntegrityGauge::new(10.0, 10.0, IntegrityThresholds::default()),
            equipment: EquipmentPanel {
                configurable: true,
                self_destruct_armed,
                slots: vec![
                    SlotView::Tool {
                        name: "drill".into(),
                        label: "Drill".into(),
                        icon: None,
                        description: None,
                        removable: true,
                    },
                    SlotView::Cargo {
                        name: "relic".into(),
                        label: "Relic".into(),
                        reference: "c1".into(),
                    },
                ],
            },
            screen: DroneScreen::Exploration(Some(ExplorationScreen {
                site_name: "Crater".into(),
                coordinates: String::new(),
                description: String::new(),
                events: vec![EventOption {
                    reference: "e1".into(),
                    label: "Beacon".into(),
                }],
            })),
            log: Vec::new(),
            tool_picker: None,
        }))
    }

    #[test]
    fn signal_lost_only_maps_acknowledgement() {
        let state = UiState::default();
        assert_eq!(
            map_key(KeyCode::Enter, &ConsoleView::SignalLost, &state),
            KeyAction::Intent(ConsoleIntent::AcknowledgeSignalLost)
        );
        assert_eq!(
            map_key(KeyCode::Char('e'), &ConsoleView::SignalLost, &state),
            KeyAction::None
        );
    }

    #[test]
    fn selection_skips_drones_held_elsewhere() {
        let view = ConsoleView::Selection {
            drones: vec![DroneListing {
                reference: "d2".into(),
                name: "Hauler".into(),
                description: String::new(),
                action: ListingAction::ControlledElsewhere,
            }],
        };
        assert_eq!(
            map_key(KeyCode::Enter, &view, &UiState::default()),
            KeyAction::None
        );
    }

    #[test]
    fn slot_keys_follow_slot_cursor() {
        let view = exploration_view(false);
        let mut state = UiState::default();
        assert_eq!(
            map_key(KeyCode::Char('r'), &view, &state),
            KeyAction::Intent(ConsoleIntent::RemoveTool("drill".into()))
        );
        assert_eq!(map_key(KeyCode::Char('d'), &view, &state), KeyAction::None);

        state.move_slot(1, &view);
        assert_eq!(
            map_key(KeyCode::Char('d'), &view, &state),
            KeyAction::Intent(ConsoleIntent::Jettison("c1".into()))
        );
    }

    #[test]
    fn exploration_keys() {
        let state = UiState::default();
        assert_eq!(
            map_key(KeyCode::Enter, &exploration_view(false), &state),
            KeyAction::Intent(ConsoleIntent::ExploreEvent("e1".into()))
        );
        assert_eq!(
            map_key(KeyCode::Char('p'), &exploration_view(false), &state),
            KeyAction::Intent(ConsoleIntent::OpenTravelPreview)
        );
        assert_eq!(
            map_key(KeyCode::Esc, &exploration_view(true), &state),
            KeyAction::Intent(ConsoleIntent::CancelSelfDestruct)
        );
    }
}
