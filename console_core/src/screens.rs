//! Screen descriptors handed to the rendering collaborator.
//!
//! Descriptors are rebuilt from the current snapshot on every call and never
//! hold on to references across snapshots, so a renderer cannot offer an
//! action against a site, event or cargo item that has since disappeared.

use console_runtime::{
    ActiveEvent, AdventureChoice, AdventureNode, CargoSlot, ConsoleSnapshot, ControlledDrone,
    DroneStatus, ExplorationEventRef, SiteState, ToolDescriptor, TravelTarget,
};

use crate::bands::visible_bands;
use crate::config::{ConsoleConfig, IntegrityThresholds};
use crate::selection::{drone_listing, DroneListing};
use crate::state_machine::ConsoleMode;
use crate::travel::{format_eta, SiteTravelCalculator};

/// Viewer-local state that shapes the view without being part of the snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewContext {
    pub mode: ConsoleMode,
    pub travel_preview: bool,
    pub choosing_tools: bool,
    pub self_destruct_armed: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ConsoleView {
    /// Modal interrupt; nothing else is interactive while it is up.
    SignalLost,
    Selection { drones: Vec<DroneListing> },
    Drone(Box<DroneConsole>),
}

impl ConsoleView {
    pub fn mode(&self) -> Option<ConsoleMode> {
        match self {
            ConsoleView::SignalLost => None,
            ConsoleView::Selection { .. } => Some(ConsoleMode::NoDroneSelected),
            ConsoleView::Drone(console) => Some(console.screen.mode()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DroneConsole {
    pub name: String,
    pub integrity: IntegrityGauge,
    pub equipment: EquipmentPanel,
    pub screen: DroneScreen,
    pub log: Vec<LogEntry>,
    pub tool_picker: Option<ToolPicker>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntegrityBand {
    Good,
    Average,
    Bad,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntegrityGauge {
    pub current: f64,
    pub max: f64,
    pub band: IntegrityBand,
}

impl IntegrityGauge {
    pub fn new(current: f64, max: f64, thresholds: IntegrityThresholds) -> Self {
        let band = if max <= 0.0 {
            IntegrityBand::Bad
        } else if current >= thresholds.good * max {
            IntegrityBand::Good
        } else if current >= thresholds.average * max {
            IntegrityBand::Average
        } else {
            IntegrityBand::Bad
        };
        Self { current, max, band }
    }

    pub fn ratio(&self) -> f64 {
        if self.max > 0.0 {
            (self.current / self.max).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EquipmentPanel {
    pub configurable: bool,
    pub self_destruct_armed: bool,
    pub slots: Vec<SlotView>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlotView {
    Tool {
        name: String,
        label: String,
        /// `None` when the tool is missing from the catalog.
        icon: Option<String>,
        description: Option<String>,
        removable: bool,
    },
    Cargo {
        name: String,
        label: String,
        reference: String,
    },
    Empty,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolPicker {
    pub tools: Vec<ToolDescriptor>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub label: String,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DroneScreen {
    Busy {
        message: String,
        time_left: String,
    },
    PlanningTravel(TravelPlanningScreen),
    TravelInProgress {
        time_left: String,
        /// Fraction of the trip already covered, when the total is known.
        progress: Option<f64>,
    },
    Adventure(Option<AdventureScreen>),
    Event(EventScreen),
    /// `None` until the authority reports the site being explored.
    Exploration(Option<ExplorationScreen>),
}

impl DroneScreen {
    pub fn mode(&self) -> ConsoleMode {
        match self {
            DroneScreen::Busy { .. } => ConsoleMode::Busy,
            DroneScreen::PlanningTravel(_) => ConsoleMode::PlanningTravel,
            DroneScreen::TravelInProgress { .. } => ConsoleMode::TravelInProgress,
            DroneScreen::Adventure(_) => ConsoleMode::AdventureInteraction,
            DroneScreen::Event(_) => ConsoleMode::EventActive,
            DroneScreen::Exploration(_) => ConsoleMode::ExplorationIdle,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TravelPlanningScreen {
    /// Shown when browsing destinations from exploration.
    pub cancellable: bool,
    pub no_destinations: bool,
    pub launch: LaunchAffordance,
    pub destinations: Vec<DestinationEntry>,
}

/// Label and state of every launch button. When travel is blocked the label
/// is the authority's reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchAffordance {
    pub label: String,
    pub enabled: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DestinationEntry {
    pub target: TravelTarget,
    pub title: String,
    pub coordinates: Option<String>,
    pub description: Option<String>,
    pub cost: f64,
    pub eta: String,
    pub bands: Vec<BandReading>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BandReading {
    pub name: String,
    pub label: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExplorationScreen {
    pub site_name: String,
    pub coordinates: String,
    pub description: String,
    pub events: Vec<EventOption>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventOption {
    pub reference: String,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventScreen {
    pub image: String,
    pub description: String,
    pub action_label: String,
    pub action_enabled: bool,
    /// Label of the skip button; `None` when the event cannot be skipped.
    pub skip_label: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    Raw(String),
    Asset(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdventureScreen {
    pub description: String,
    pub image: ImageSource,
    pub choices: Vec<AdventureChoice>,
}

pub fn build_view(
    snapshot: &ConsoleSnapshot,
    context: ViewContext,
    config: &ConsoleConfig,
    viewer: &str,
) -> ConsoleView {
    if snapshot.signal_lost {
        return ConsoleView::SignalLost;
    }
    let drone = match snapshot.drone.as_ref() {
        Some(drone) if context.mode != ConsoleMode::NoDroneSelected => drone,
        _ => return ConsoleView::Selection {
            drones: drone_listing(&snapshot.roster, viewer),
        },
    };

    let tool_picker = (context.choosing_tools && snapshot.configurable).then(|| ToolPicker {
        tools: snapshot.catalogs.tools.clone(),
    });

    ConsoleView::Drone(Box::new(DroneConsole {
        name: drone.name.clone(),
        integrity: IntegrityGauge::new(drone.integrity, drone.max_integrity, config.integrity),
        equipment: equipment_panel(snapshot, context),
        screen: drone_screen(snapshot, drone, context, config),
        log: log_entries(&drone.log, config.max_log_entries),
        tool_picker,
    }))
}

fn drone_screen(
    snapshot: &ConsoleSnapshot,
    drone: &ControlledDrone,
    context: ViewContext,
    config: &ConsoleConfig,
) -> DroneScreen {
    match context.mode {
        ConsoleMode::Busy => DroneScreen::Busy {
            message: snapshot.wait_message.clone(),
            time_left: format_eta(snapshot.wait_time_left as f64, config.countdown_style),
        },
        ConsoleMode::TravelInProgress => DroneScreen::TravelInProgress {
            time_left: format_eta(snapshot.travel_time_left as f64, config.countdown_style),
            progress: travel_progress(snapshot.travel_time, snapshot.travel_time_left),
        },
        ConsoleMode::AdventureInteraction => {
            DroneScreen::Adventure(snapshot.adventure.as_ref().map(adventure_screen))
        }
        ConsoleMode::EventActive => match snapshot.event.as_ref() {
            Some(event) => DroneScreen::Event(event_screen(event)),
            None => DroneScreen::Exploration(exploration_screen(snapshot.site.as_ref())),
        },
        ConsoleMode::ExplorationIdle => {
            DroneScreen::Exploration(exploration_screen(snapshot.site.as_ref()))
        }
        ConsoleMode::PlanningTravel => DroneScreen::PlanningTravel(travel_planning_screen(
            snapshot, drone, context, config,
        )),
        ConsoleMode::NoDroneSelected => unreachable!("build_view lists the roster instead"),
    }
}

fn travel_planning_screen(
    snapshot: &ConsoleSnapshot,
    drone: &ControlledDrone,
    context: ViewContext,
    config: &ConsoleConfig,
) -> TravelPlanningScreen {
    let calculator = SiteTravelCalculator::new(drone.travel_coefficient);
    // A stray site reported alongside a non-travel status is ignored.
    let current = match drone.status {
        DroneStatus::Idle | DroneStatus::Exploration | DroneStatus::Travel => {
            snapshot.site.as_ref()
        }
        DroneStatus::Adventure | DroneStatus::Busy => None,
    };
    let launch = LaunchAffordance {
        label: if snapshot.can_travel {
            config.launch_label.clone()
        } else {
            snapshot.travel_error.clone()
        },
        enabled: snapshot.can_travel,
    };

    let destinations = calculator
        .destinations(current, &snapshot.sites)
        .into_iter()
        .map(|plan| {
            let eta = format_eta(plan.cost, config.eta_style);
            match &plan.destination {
                TravelTarget::Home => DestinationEntry {
                    target: TravelTarget::Home,
                    title: config.home_label.clone(),
                    coordinates: None,
                    description: None,
                    cost: plan.cost,
                    eta,
                    bands: Vec::new(),
                },
                TravelTarget::Site(reference) => {
                    let site = snapshot.site_by_ref(reference);
                    DestinationEntry {
                        target: plan.destination.clone(),
                        title: site.map(|site| site.name.clone()).unwrap_or_default(),
                        coordinates: site.map(|site| site.coordinates.clone()),
                        description: site.map(|site| site.description.clone()),
                        cost: plan.cost,
                        eta,
                        bands: site
                            .map(|site| band_readings(snapshot, site))
                            .unwrap_or_default(),
                    }
                }
            }
        })
        .collect();

    TravelPlanningScreen {
        cancellable: context.travel_preview,
        no_destinations: snapshot.sites.is_empty() && !context.choosing_tools,
        launch,
        destinations,
    }
}

fn band_readings(snapshot: &ConsoleSnapshot, site: &SiteState) -> Vec<BandReading> {
    visible_bands(site, snapshot.catalogs.band_names())
        .into_iter()
        .map(|name| BandReading {
            name: name.to_string(),
            label: snapshot.catalogs.band_label(name).to_string(),
            value: site.band_reading(name).unwrap_or_default(),
        })
        .collect()
}

fn travel_progress(total: u64, left: u64) -> Option<f64> {
    (total > 0).then(|| 1.0 - (left.min(total) as f64 / total as f64))
}

fn exploration_screen(site: Option<&SiteState>) -> Option<ExplorationScreen> {
    site.map(|site| ExplorationScreen {
        site_name: site.name.clone(),
        coordinates: site.coordinates.clone(),
        description: site.description.clone(),
        events: site.events.iter().map(event_option).collect(),
    })
}

fn event_option(event: &ExplorationEventRef) -> EventOption {
    EventOption {
        reference: event.reference.clone(),
        label: capitalize(&event.name),
    }
}

fn event_screen(event: &ActiveEvent) -> EventScreen {
    EventScreen {
        image: event.image.clone(),
        description: event.description.clone(),
        action_label: event.action_text.clone(),
        action_enabled: event.action_enabled,
        skip_label: event.skippable.then(|| event.ignore_text.clone()),
    }
}

fn adventure_screen(node: &AdventureNode) -> AdventureScreen {
    let image = match node.raw_image.as_deref() {
        Some(raw) if !raw.is_empty() => ImageSource::Raw(raw.to_string()),
        _ => ImageSource::Asset(node.image.clone()),
    };
    AdventureScreen {
        description: node.description.clone(),
        image,
        choices: node.choices.clone(),
    }
}

fn equipment_panel(snapshot: &ConsoleSnapshot, context: ViewContext) -> EquipmentPanel {
    let slots = snapshot
        .cargo
        .iter()
        .map(|slot| match slot {
            CargoSlot::Tool { name } => {
                let descriptor = snapshot.catalogs.tool(name);
                SlotView::Tool {
                    name: name.clone(),
                    label: capitalize(name),
                    icon: descriptor.map(|tool| tool.icon.clone()),
                    description: descriptor.map(|tool| tool.description.clone()),
                    removable: snapshot.configurable,
                }
            }
            CargoSlot::Cargo { name, reference } => SlotView::Cargo {
                name: name.clone(),
                label: capitalize(name),
                reference: reference.clone(),
            },
            CargoSlot::Empty => SlotView::Empty,
        })
        .collect();

    EquipmentPanel {
        configurable: snapshot.configurable,
        self_destruct_armed: context.self_destruct_armed,
        slots,
    }
}

fn log_entries(log: &[String], max_entries: usize) -> Vec<LogEntry> {
    let skip = if max_entries == 0 {
        0
    } else {
        log.len().saturating_sub(max_entries)
    };
    log.iter()
        .enumerate()
        .skip(skip)
        .map(|(index, text)| LogEntry {
            label: format!("Entry {}", index + 1),
            text: text.clone(),
        })
        .collect()
}

pub fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
