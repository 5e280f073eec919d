//! One simulated year of city evolution.
//!
//! [`step`] is a pure function: it takes the current state, the trial's
//! parameters, and the year's random draws, and returns the next state
//! together with that year's observables. The update order is fixed
//! because later quantities read fields updated earlier in the same year:
//!
//! 1. Population grows by the drawn growth rate.
//! 2. Energy demand grows by the drawn multiplier.
//! 3. Building efficiency scales demand by `1 - efficiency / 10`.
//! 4. Renewable penetration is taken from the draws (not persisted).
//! 5. Emissions are computed from the efficiency-adjusted demand.
//! 6. Water availability is scaled by `1 + rainfall_variability`.
//! 7. Water stress is population over water availability.
//! 8. Waste generated this year is added (`* 365`) to the total.
//! 9. Temperature increases by the drawn increment.
//! 10. Energy demand rises by `tempIncrease / 100`. This carries into next
//!     year only; this year's emissions are already fixed.
//! 11. Policy scales emissions by `1 - policy / 10`.
//! 12. Community engagement scales waste according to [`WasteReduction`].
//!
//! No arithmetic is checked here. Callers that accept external input
//! validate it first (see [`crate::validation`]).

use smartcity_types::{CityState, SimulationParameters, WasteReduction, YearlyMetrics};

use crate::draws::YearDraws;

/// Days per simulated year, used to annualise daily waste generation.
pub const DAYS_PER_YEAR: f64 = 365.0;

/// Advance `state` by one year.
///
/// Returns the state to feed into the next year and the observables
/// recorded for this one.
#[allow(clippy::suboptimal_flops)]
pub fn step(
    state: &CityState,
    params: &SimulationParameters,
    draws: YearDraws,
    waste_reduction: WasteReduction,
) -> (CityState, YearlyMetrics) {
    let mut next = *state;

    next.population += next.population * draws.growth_rate;

    next.energy_demand *= draws.energy_growth;
    next.energy_demand *= 1.0 - params.building_efficiency / 10.0;

    let mut emissions = next.energy_demand
        * (1.0 - draws.renewable_penetration)
        * (1.0 - params.public_transport_share);

    next.water_availability *= 1.0 + params.rainfall_variability;
    let water_stress = next.population / next.water_availability;

    let engagement_factor = 1.0 - params.community_engagement / 10.0;
    let waste_generated =
        next.population * params.waste_generation_rate * (1.0 - params.green_infrastructure);
    let increment = waste_generated * DAYS_PER_YEAR;

    match waste_reduction {
        WasteReduction::Cumulative => next.waste_accumulated += increment,
        WasteReduction::Increment => next.waste_accumulated += increment * engagement_factor,
    }

    next.temp_increase += draws.temp_delta;
    next.energy_demand *= 1.0 + next.temp_increase / 100.0;

    emissions *= 1.0 - params.policy_effectiveness / 10.0;

    if waste_reduction == WasteReduction::Cumulative {
        next.waste_accumulated *= engagement_factor;
    }

    let metrics = YearlyMetrics {
        population: next.population,
        emissions,
        water_stress,
        waste_accumulated: next.waste_accumulated,
    };

    (next, metrics)
}
