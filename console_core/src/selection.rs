//! Single-controller exclusivity for drones.

use console_runtime::DroneSummary;

/// True unless another viewer already holds the drone.
pub fn can_control(drone: &DroneSummary, viewer: &str) -> bool {
    drone
        .controller
        .as_deref()
        .map_or(true, |controller| controller == viewer)
}

/// Roster entries without a reference cannot be addressed by `select_drone`
/// and are left out of the listing.
pub fn is_listed(drone: &DroneSummary) -> bool {
    !drone.reference.trim().is_empty()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListingAction {
    AssumeControl,
    /// Informational only; no control action is offered.
    ControlledElsewhere,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DroneListing {
    pub reference: String,
    pub name: String,
    pub description: String,
    pub action: ListingAction,
}

pub fn drone_listing(roster: &[DroneSummary], viewer: &str) -> Vec<DroneListing> {
    roster
        .iter()
        .filter(|drone| is_listed(drone))
        .map(|drone| DroneListing {
            reference: drone.reference.clone(),
            name: drone.name.clone(),
            description: drone.description.clone(),
            action: if can_control(drone, viewer) {
                ListingAction::AssumeControl
            } else {
                ListingAction::ControlledElsewhere
            },
        })
        .collect()
}
