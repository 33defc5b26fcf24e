//! Data contracts for the exodrone console.
//!
//! Everything in this crate is owned by the authority: the console receives a
//! [`ConsoleSnapshot`] and treats it as read-only until the next one arrives.

use ahash::RandomState;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::hash::{BuildHasher, Hasher};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
#[serde(default)]
pub struct SnapshotHeader {
    pub sequence: u64,
    pub hash: u64,
}

impl SnapshotHeader {
    pub fn new(sequence: u64) -> Self {
        Self { sequence, hash: 0 }
    }
}

/// Operational status reported for the controlled drone.
#[derive(
    Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum DroneStatus {
    #[default]
    Idle,
    /// En route between sites; the travel countdown is running.
    Travel,
    Exploration,
    Adventure,
    Busy,
}

impl DroneStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            DroneStatus::Idle => "idle",
            DroneStatus::Travel => "travel",
            DroneStatus::Exploration => "exploration",
            DroneStatus::Adventure => "adventure",
            DroneStatus::Busy => "busy",
        }
    }
}

impl fmt::Display for DroneStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Roster entry for the drone selection listing.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, JsonSchema)]
#[serde(default)]
pub struct DroneSummary {
    pub reference: String,
    pub name: String,
    pub description: String,
    /// Viewer currently holding control, if any.
    pub controller: Option<String>,
}

impl DroneSummary {
    pub fn is_controlled(&self) -> bool {
        self.controller.is_some()
    }
}

/// The drone under this viewer's control.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, JsonSchema)]
#[serde(default)]
pub struct ControlledDrone {
    pub reference: String,
    pub name: String,
    pub status: DroneStatus,
    pub integrity: f64,
    pub max_integrity: f64,
    pub travel_coefficient: f64,
    pub log: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum CargoSlot {
    Tool { name: String },
    Cargo { name: String, reference: String },
    Empty,
}

impl CargoSlot {
    pub fn tool_name(&self) -> Option<&str> {
        match self {
            CargoSlot::Tool { name } => Some(name.as_str()),
            CargoSlot::Cargo { .. } | CargoSlot::Empty => None,
        }
    }

    pub fn cargo_reference(&self) -> Option<&str> {
        match self {
            CargoSlot::Cargo { reference, .. } => Some(reference.as_str()),
            CargoSlot::Tool { .. } | CargoSlot::Empty => None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
#[serde(default)]
pub struct ExplorationEventRef {
    pub reference: String,
    pub name: String,
}

/// An exploration event the authority has elevated to "in progress".
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
#[serde(default)]
pub struct ActiveEvent {
    pub reference: String,
    pub image: String,
    pub description: String,
    pub action_enabled: bool,
    pub action_text: String,
    pub skippable: bool,
    pub ignore_text: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
#[serde(default)]
pub struct AdventureChoice {
    pub key: String,
    pub text: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
#[serde(default)]
pub struct AdventureNode {
    pub description: String,
    /// Asset key resolved by the renderer.
    pub image: String,
    /// Inline image data; wins over `image` when non-empty.
    pub raw_image: Option<String>,
    pub choices: Vec<AdventureChoice>,
}

impl AdventureNode {
    pub fn has_choice(&self, key: &str) -> bool {
        self.choices.iter().any(|choice| choice.key == key)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, JsonSchema)]
#[serde(default)]
pub struct SiteState {
    pub reference: String,
    pub name: String,
    pub description: String,
    pub coordinates: String,
    pub distance: f64,
    pub band_info: BTreeMap<String, f64>,
    pub revealed: bool,
    pub point_scan_complete: bool,
    pub deep_scan_complete: bool,
    pub events: Vec<ExplorationEventRef>,
}

impl SiteState {
    pub fn band_reading(&self, band: &str) -> Option<f64> {
        self.band_info.get(band).copied()
    }

    pub fn lists_event(&self, reference: &str) -> bool {
        self.events.iter().any(|event| event.reference == reference)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
#[serde(default)]
pub struct ToolDescriptor {
    pub name: String,
    pub description: String,
    pub icon: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
#[serde(default)]
pub struct BandDescriptor {
    pub name: String,
    pub label: String,
}

/// Static data sent alongside every snapshot. Order is display order.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
#[serde(default)]
pub struct Catalogs {
    pub tools: Vec<ToolDescriptor>,
    pub bands: Vec<BandDescriptor>,
}

impl Catalogs {
    pub fn tool(&self, name: &str) -> Option<&ToolDescriptor> {
        self.tools.iter().find(|tool| tool.name == name)
    }

    pub fn band_names(&self) -> impl Iterator<Item = &str> {
        self.bands.iter().map(|band| band.name.as_str())
    }

    pub fn band_label<'a>(&'a self, name: &'a str) -> &'a str {
        self.bands
            .iter()
            .find(|band| band.name == name)
            .map(|band| band.label.as_str())
            .unwrap_or(name)
    }
}

/// One complete state update from the authority. Applied atomically.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, JsonSchema)]
#[serde(default)]
pub struct ConsoleSnapshot {
    pub header: SnapshotHeader,
    pub signal_lost: bool,
    pub roster: Vec<DroneSummary>,
    pub drone: Option<ControlledDrone>,
    pub configurable: bool,
    pub cargo: Vec<CargoSlot>,
    pub can_travel: bool,
    pub travel_error: String,
    pub sites: Vec<SiteState>,
    pub site: Option<SiteState>,
    /// Countdowns are in deciseconds.
    pub travel_time: u64,
    pub travel_time_left: u64,
    pub wait_time_left: u64,
    pub wait_message: String,
    pub event: Option<ActiveEvent>,
    pub adventure: Option<AdventureNode>,
    pub catalogs: Catalogs,
}

/// Inconsistencies between snapshot fields. The console tolerates them but
/// reports them so authority bugs surface in the logs.
#[derive(Debug, Clone, PartialEq)]
pub enum SnapshotAnomaly {
    SiteOutsideTravelContext { status: DroneStatus },
    EventOutsideExploration { status: DroneStatus },
    DroneStateWithoutDrone,
    NonFiniteDistance { reference: String },
    InvalidTravelCoefficient { value: f64 },
}

impl fmt::Display for SnapshotAnomaly {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SnapshotAnomaly::SiteOutsideTravelContext { status } => {
                write!(f, "site present while drone status is {status}")
            }
            SnapshotAnomaly::EventOutsideExploration { status } => {
                write!(f, "active event present while drone status is {status}")
            }
            SnapshotAnomaly::DroneStateWithoutDrone => {
                f.write_str("site, event or adventure present without a controlled drone")
            }
            SnapshotAnomaly::NonFiniteDistance { reference } => {
                write!(f, "site {reference} has a negative or non-finite distance")
            }
            SnapshotAnomaly::InvalidTravelCoefficient { value } => {
                write!(f, "travel coefficient {value} is negative or non-finite")
            }
        }
    }
}

impl ConsoleSnapshot {
    pub fn finalize(mut self) -> bincode::Result<Self> {
        self.header.hash = hash_snapshot(&self)?;
        Ok(self)
    }

    pub fn status(&self) -> Option<DroneStatus> {
        self.drone.as_ref().map(|drone| drone.status)
    }

    pub fn site_by_ref(&self, reference: &str) -> Option<&SiteState> {
        self.sites.iter().find(|site| site.reference == reference)
    }

    pub fn has_cargo(&self, reference: &str) -> bool {
        self.cargo
            .iter()
            .any(|slot| slot.cargo_reference() == Some(reference))
    }

    pub fn has_tool(&self, name: &str) -> bool {
        self.cargo.iter().any(|slot| slot.tool_name() == Some(name))
    }

    pub fn roster_entry(&self, reference: &str) -> Option<&DroneSummary> {
        self.roster.iter().find(|drone| drone.reference == reference)
    }

    pub fn anomalies(&self) -> Vec<SnapshotAnomaly> {
        let mut anomalies = Vec::new();
        match &self.drone {
            Some(drone) => {
                if self.site.is_some()
                    && matches!(drone.status, DroneStatus::Busy | DroneStatus::Adventure)
                {
                    anomalies.push(SnapshotAnomaly::SiteOutsideTravelContext {
                        status: drone.status,
                    });
                }
                if self.event.is_some() && drone.status != DroneStatus::Exploration {
                    anomalies.push(SnapshotAnomaly::EventOutsideExploration {
                        status: drone.status,
                    });
                }
                if !drone.travel_coefficient.is_finite() || drone.travel_coefficient < 0.0 {
                    anomalies.push(SnapshotAnomaly::InvalidTravelCoefficient {
                        value: drone.travel_coefficient,
                    });
                }
            }
            None => {
                if self.site.is_some() || self.event.is_some() || self.adventure.is_some() {
                    anomalies.push(SnapshotAnomaly::DroneStateWithoutDrone);
                }
            }
        }
        for site in self.sites.iter().chain(self.site.iter()) {
            if !site.distance.is_finite() || site.distance < 0.0 {
                anomalies.push(SnapshotAnomaly::NonFiniteDistance {
                    reference: site.reference.clone(),
                });
            }
        }
        anomalies
    }
}

/// Content hash over the bincode encoding with the header hash zeroed.
pub fn hash_snapshot(snapshot: &ConsoleSnapshot) -> bincode::Result<u64> {
    let mut clone = snapshot.clone();
    clone.header.hash = 0;
    let encoded = bincode::serialize(&clone)?;
    let mut hasher = RandomState::with_seeds(0, 0, 0, 0).build_hasher();
    hasher.write(&encoded);
    Ok(hasher.finish())
}

pub fn encode_snapshot(snapshot: &ConsoleSnapshot) -> bincode::Result<Vec<u8>> {
    bincode::serialize(snapshot)
}

pub fn decode_snapshot(data: &[u8]) -> bincode::Result<ConsoleSnapshot> {
    bincode::deserialize(data)
}

pub fn encode_snapshot_json(snapshot: &ConsoleSnapshot) -> serde_json::Result<String> {
    serde_json::to_string(snapshot)
}

pub fn decode_snapshot_json(data: &str) -> serde_json::Result<ConsoleSnapshot> {
    serde_json::from_str(data)
}

/// JSON schema for [`ConsoleSnapshot`], used to validate fixture files.
pub fn snapshot_json_schema() -> schemars::schema::RootSchema {
    schemars::schema_for!(ConsoleSnapshot)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exploring_snapshot() -> ConsoleSnapshot {
        ConsoleSnapshot {
            drone: Some(ControlledDrone {
                reference: "drone-1".into(),
                name: "Scout".into(),
                status: DroneStatus::Exploration,
                integrity: 80.0,
                max_integrity: 100.0,
                travel_coefficient: 2.0,
                log: vec!["Launched.".into()],
            }),
            site: Some(SiteState {
                reference: "s1".into(),
                name: "Crater".into(),
                distance: 10.0,
                ..Default::default()
            }),
            cargo: vec![
                CargoSlot::Tool {
                    name: "drill".into(),
                },
                CargoSlot::Cargo {
                    name: "alien relic".into(),
                    reference: "c1".into(),
                },
                CargoSlot::Empty,
            ],
            ..Default::default()
        }
    }

    #[test]
    fn status_parses_from_lowercase_json() {
        let status: DroneStatus = serde_json::from_str("\"exploration\"").unwrap();
        assert_eq!(status, DroneStatus::Exploration);
        assert_eq!(status.to_string(), "exploration");
    }

    #[test]
    fn cargo_lookup_distinguishes_slot_kinds() {
        let snapshot = exploring_snapshot();
        assert!(snapshot.has_tool("drill"));
        assert!(!snapshot.has_tool("alien relic"));
        assert!(snapshot.has_cargo("c1"));
        assert!(!snapshot.has_cargo("drill"));
    }

    #[test]
    fn hash_ignores_existing_header_hash() {
        let snapshot = exploring_snapshot().finalize().unwrap();
        let mut tampered = snapshot.clone();
        tampered.header.hash = 42;
        assert_eq!(hash_snapshot(&tampered).unwrap(), snapshot.header.hash);
    }

    #[test]
    fn hash_changes_with_content() {
        let first = exploring_snapshot().finalize().unwrap();
        let mut second = exploring_snapshot();
        second.can_travel = true;
        let second = second.finalize().unwrap();
        assert_ne!(first.header.hash, second.header.hash);
    }

    #[test]
    fn bincode_frame_survives_transport() {
        let snapshot = exploring_snapshot();
        let bytes = encode_snapshot(&snapshot).unwrap();
        assert_eq!(decode_snapshot(&bytes).unwrap(), snapshot);
    }

    #[test]
    fn sparse_json_fills_defaults() {
        let snapshot = decode_snapshot_json(r#"{"signal_lost": true}"#).unwrap();
        assert!(snapshot.signal_lost);
        assert!(snapshot.drone.is_none());
        assert!(snapshot.sites.is_empty());
    }

    #[test]
    fn stray_site_during_busy_is_reported() {
        let mut snapshot = exploring_snapshot();
        if let Some(drone) = snapshot.drone.as_mut() {
            drone.status = DroneStatus::Busy;
        }
        assert_eq!(
            snapshot.anomalies(),
            vec![SnapshotAnomaly::SiteOutsideTravelContext {
                status: DroneStatus::Busy
            }]
        );
    }

    #[test]
    fn consistent_snapshot_has_no_anomalies() {
        assert!(exploring_snapshot().anomalies().is_empty());
    }

    #[test]
    fn band_label_falls_back_to_name() {
        let catalogs = Catalogs {
            tools: Vec::new(),
            bands: vec![BandDescriptor {
                name: "radiation".into(),
                label: "Radiation".into(),
            }],
        };
        assert_eq!(catalogs.band_label("radiation"), "Radiation");
        assert_eq!(catalogs.band_label("gravity"), "gravity");
    }
}
