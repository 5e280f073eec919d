//! City state carried from one simulated year to the next.

use serde::{Deserialize, Serialize};

/// Starting values for a trial.
///
/// Every trial builds a fresh [`CityState`] from the same initial
/// conditions, so trials never share mutable state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InitialConditions {
    /// Population at year zero.
    pub initial_population: f64,
    /// Annual energy demand at year zero (kWh).
    pub energy_demand: f64,
    /// Available water at year zero (cubic meters).
    pub water_availability: f64,
    /// Temperature increase already present at year zero (degrees C).
    pub initial_temp_increase: f64,
}

/// Mutable city state threaded through the yearly steps of one trial.
///
/// Emissions and water stress are not part of the state; they are
/// recomputed each year from the fields below.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CityState {
    /// Current population. Grows multiplicatively.
    pub population: f64,
    /// Current annual energy demand.
    pub energy_demand: f64,
    /// Current water availability.
    pub water_availability: f64,
    /// Total waste accumulated since the trial started.
    pub waste_accumulated: f64,
    /// Cumulative temperature increase. Never decreases.
    pub temp_increase: f64,
}

impl CityState {
    /// Create the year-zero state for a new trial.
    ///
    /// Waste accumulation always starts at zero.
    pub const fn from_initial(initial: &InitialConditions) -> Self {
        Self {
            population: initial.initial_population,
            energy_demand: initial.energy_demand,
            water_availability: initial.water_availability,
            waste_accumulated: 0.0,
            temp_increase: initial.initial_temp_increase,
        }
    }
}

impl From<&InitialConditions> for CityState {
    fn from(initial: &InitialConditions) -> Self {
        Self::from_initial(initial)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_state_starts_with_no_waste() {
        let initial = InitialConditions {
            initial_population: 1000.0,
            energy_demand: 50.0,
            water_availability: 2000.0,
            initial_temp_increase: 0.5,
        };
        let state = CityState::from_initial(&initial);
        assert!(state.waste_accumulated.abs() < f64::EPSILON);
        assert!((state.population - 1000.0).abs() < f64::EPSILON);
        assert!((state.temp_increase - 0.5).abs() < f64::EPSILON);
    }
}
