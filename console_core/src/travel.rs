//! Travel cost and ETA between sites.
//!
//! Costs are in the authority's time unit (deciseconds). A hop between two
//! sites always costs at least one distance unit, so sites at the same
//! distance from home are never free to reach from each other.

use console_runtime::{SiteState, TravelTarget};
use serde::{Deserialize, Serialize};

/// Cost of moving from `current` (or home when `None`) to `target`.
pub fn travel_cost(current: Option<&SiteState>, target: &SiteState, coefficient: f64) -> f64 {
    match current {
        None => target.distance * coefficient,
        Some(current) => (current.distance - target.distance).abs().max(1.0) * coefficient,
    }
}

/// Cost of returning home from `current`.
pub fn home_cost(current: &SiteState, coefficient: f64) -> f64 {
    current.distance * coefficient
}

#[derive(Debug, Clone, PartialEq)]
pub struct TravelPlan {
    /// Site the drone departs from; `None` means home.
    pub source: Option<String>,
    pub destination: TravelTarget,
    pub cost: f64,
}

/// Computes travel plans for one drone.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SiteTravelCalculator {
    coefficient: f64,
}

impl SiteTravelCalculator {
    pub fn new(coefficient: f64) -> Self {
        Self { coefficient }
    }

    pub fn coefficient(&self) -> f64 {
        self.coefficient
    }

    pub fn cost(&self, current: Option<&SiteState>, target: &SiteState) -> f64 {
        travel_cost(current, target, self.coefficient)
    }

    pub fn plan(&self, current: Option<&SiteState>, target: &SiteState) -> TravelPlan {
        TravelPlan {
            source: current.map(|site| site.reference.clone()),
            destination: TravelTarget::Site(target.reference.clone()),
            cost: self.cost(current, target),
        }
    }

    /// Every destination reachable from `current`: home first when the drone
    /// is away, then each listed site except the one it is standing on.
    pub fn destinations(&self, current: Option<&SiteState>, sites: &[SiteState]) -> Vec<TravelPlan> {
        let mut plans = Vec::with_capacity(sites.len() + 1);
        if let Some(site) = current {
            plans.push(TravelPlan {
                source: Some(site.reference.clone()),
                destination: TravelTarget::Home,
                cost: home_cost(site, self.coefficient),
            });
        }
        plans.extend(
            sites
                .iter()
                .filter(|candidate| current.map_or(true, |site| site.reference != candidate.reference))
                .map(|candidate| self.plan(current, candidate)),
        );
        plans
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EtaStyle {
    /// `1h2m3s`, dropping zero components.
    #[default]
    Short,
    /// `01:02:03`.
    Clock,
}

/// Format a duration given in deciseconds.
pub fn format_eta(deciseconds: f64, style: EtaStyle) -> String {
    let total_seconds = if deciseconds.is_finite() && deciseconds > 0.0 {
        (deciseconds / 10.0).floor() as u64
    } else {
        0
    };
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    match style {
        EtaStyle::Short => {
            let mut text = String::new();
            if hours > 0 {
                text.push_str(&format!("{hours}h"));
            }
            if minutes > 0 {
                text.push_str(&format!("{minutes}m"));
            }
            if seconds > 0 || text.is_empty() {
                text.push_str(&format!("{seconds}s"));
            }
            text
        }
        EtaStyle::Clock => format!("{hours:02}:{minutes:02}:{seconds:02}"),
    }
}
