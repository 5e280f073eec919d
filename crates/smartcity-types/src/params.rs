//! Policy and environment parameters held fixed for the duration of a trial.

use serde::{Deserialize, Serialize};

/// Parameters applied uniformly to every year of a trial.
///
/// Scales follow the model's conventions: efficiency, policy, and
/// engagement run from 0 to 10; shares run from 0 to 1; rainfall
/// variability is a fractional change per year.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimulationParameters {
    /// Waste generated per capita per day (kg).
    pub waste_generation_rate: f64,
    /// Building efficiency on a 0-10 scale.
    pub building_efficiency: f64,
    /// Share of trips taken by public transport (0-1).
    pub public_transport_share: f64,
    /// Coverage of green infrastructure (0-1).
    pub green_infrastructure: f64,
    /// Fractional change in water availability per year.
    pub rainfall_variability: f64,
    /// Emission policy effectiveness on a 0-10 scale.
    pub policy_effectiveness: f64,
    /// Community engagement in waste reduction on a 0-10 scale.
    pub community_engagement: f64,
}

/// How the community-engagement multiplier reduces waste.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WasteReduction {
    /// Multiply the running total every year, so historical waste decays
    /// geometrically. Reproduces the legacy model output.
    #[default]
    Cumulative,
    /// Multiply only the current year's increment before adding it.
    Increment,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn waste_reduction_serializes_snake_case() {
        let json = serde_json::to_string(&WasteReduction::Increment).ok();
        assert_eq!(json.as_deref(), Some("\"increment\""));
        let parsed: Option<WasteReduction> = serde_json::from_str("\"cumulative\"").ok();
        assert_eq!(parsed, Some(WasteReduction::Cumulative));
    }

    #[test]
    fn default_waste_reduction_is_cumulative() {
        assert_eq!(WasteReduction::default(), WasteReduction::Cumulative);
    }
}
