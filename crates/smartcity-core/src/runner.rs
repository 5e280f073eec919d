//! Ensemble runner: trials, ensembles, and sensitivity sweeps.
//!
//! This module owns no simulation logic. It threads [`CityState`] through
//! repeated calls to [`step`], repeats whole trials with independent
//! random sources, and repeats whole ensembles across a swept parameter.
//!
//! - [`run_trial`] is unchecked and takes any [`DrawSource`], so callers
//!   can substitute fixed draws.
//! - [`run_ensemble`] and [`run_sensitivity_sweep`] validate their inputs
//!   first, seed every trial with [`trial_seed`], and reject any trial
//!   whose state or metrics leave the finite range.
//!
//! [`step`]: crate::step::step

use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use smartcity_types::{CityState, InitialConditions, Metric, SimulationParameters, WasteReduction};
use tracing::{debug, info, warn};

use crate::draws::{DrawSource, RandomDraws, trial_seed};
use crate::ensemble::{Ensemble, Trajectory};
use crate::step;
use crate::sweep::{SensitivitySweep, SweepPlan, SweepPoint, SweptParameter};
use crate::validation::{self, ValidationError};

/// Errors that can occur when starting a run.
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    /// An input failed validation.
    #[error("validation error: {source}")]
    Validation {
        /// The underlying validation error.
        #[from]
        source: ValidationError,
    },

    /// A trial produced a NaN or infinite value from inputs that passed
    /// validation, e.g. water availability underflowing to zero over a
    /// long horizon or energy demand overflowing.
    #[error("numeric degeneracy in trial {trial}, year {year}: {quantity} = {value}")]
    NumericDegeneracy {
        /// The state field or metric that left the finite range.
        quantity: &'static str,
        /// Zero-based trial index.
        trial: u32,
        /// Zero-based year index.
        year: u32,
        /// The offending value.
        value: f64,
    },
}

/// Shape and seeding of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSettings {
    /// Years simulated per trial.
    pub years: u32,
    /// Trials per ensemble.
    pub trial_count: u32,
    /// Base seed from which every trial seed is derived.
    pub seed: u64,
    /// How community engagement reduces waste.
    pub waste_reduction: WasteReduction,
}

/// Simulate one trial of `years` years.
///
/// Starts from a fresh state built from `initial` and returns exactly
/// `years` chronological records. Inputs are not validated.
pub fn run_trial<D: DrawSource + ?Sized>(
    years: u32,
    initial: &InitialConditions,
    params: &SimulationParameters,
    draws: &mut D,
    waste_reduction: WasteReduction,
) -> Trajectory {
    let mut state = CityState::from_initial(initial);
    let mut trajectory = Trajectory::with_capacity(usize::try_from(years).unwrap_or(0));

    for _ in 0..years {
        let (next, metrics) = step::step(&state, params, draws.draw_year(), waste_reduction);
        trajectory.push(metrics);
        state = next;
    }

    trajectory
}

/// Run `settings.trial_count` independent trials and group them by metric.
///
/// Trial `i` draws from a generator seeded with
/// `trial_seed(settings.seed, i)`, so the ensemble is reproducible and
/// trials share no generator state.
///
/// # Errors
///
/// Returns [`RunError::Validation`] if the counts, initial conditions, or
/// parameters are outside their domains, and
/// [`RunError::NumericDegeneracy`] if a trial produces a NaN or infinite
/// value anyway.
pub fn run_ensemble(
    settings: &RunSettings,
    initial: &InitialConditions,
    params: &SimulationParameters,
) -> Result<Ensemble, RunError> {
    validation::validate_counts(settings.years, settings.trial_count)?;
    validation::validate_initial(initial)?;
    validation::validate_parameters(params)?;

    info!(
        years = settings.years,
        trials = settings.trial_count,
        seed = settings.seed,
        waste_reduction = ?settings.waste_reduction,
        "Running ensemble"
    );

    let ensemble = collect_ensemble(settings, initial, params)?;

    info!(
        trials = ensemble.trial_count(),
        final_mean_population = ensemble.final_mean(Metric::Population),
        final_mean_emissions = ensemble.final_mean(Metric::Emissions),
        "Ensemble complete"
    );

    Ok(ensemble)
}

/// Run one ensemble per value of `parameter`, in the order given.
///
/// Every ensemble uses the same trial seeds, so differences between grid
/// points come from the parameter alone.
///
/// # Errors
///
/// Returns [`RunError::Validation`] if any swept value or base input is
/// outside its domain; nothing is run in that case. Returns
/// [`RunError::NumericDegeneracy`] if any grid point's trial produces a
/// NaN or infinite value.
pub fn run_sensitivity_sweep(
    parameter: SweptParameter,
    values: &[f64],
    settings: &RunSettings,
    initial: &InitialConditions,
    params: &SimulationParameters,
) -> Result<SensitivitySweep, RunError> {
    validation::validate_counts(settings.years, settings.trial_count)?;
    validation::validate_initial(initial)?;
    validation::validate_parameters(params)?;
    parameter.validate_values(values)?;

    info!(
        parameter = parameter.as_str(),
        points = values.len(),
        trials = settings.trial_count,
        years = settings.years,
        "Running sensitivity sweep"
    );

    let points = values
        .iter()
        .map(|&value| {
            let swept = parameter.apply(params, value);
            let ensemble = collect_ensemble(settings, initial, &swept)?;
            debug!(
                parameter = parameter.as_str(),
                value,
                mean_emissions = ensemble.overall_mean(Metric::Emissions),
                "Sweep point complete"
            );
            Ok(SweepPoint { value, ensemble })
        })
        .collect::<Result<Vec<_>, RunError>>()?;

    Ok(SensitivitySweep { parameter, points })
}

/// Run the sweep described by `plan`.
///
/// # Errors
///
/// See [`run_sensitivity_sweep`].
pub fn run_sweep_plan(
    plan: &SweepPlan,
    settings: &RunSettings,
    initial: &InitialConditions,
    params: &SimulationParameters,
) -> Result<SensitivitySweep, RunError> {
    run_sensitivity_sweep(plan.parameter, &plan.values(), settings, initial, params)
}

fn collect_ensemble(
    settings: &RunSettings,
    initial: &InitialConditions,
    params: &SimulationParameters,
) -> Result<Ensemble, RunError> {
    let mut ensemble = Ensemble::new(usize::try_from(settings.years).unwrap_or(0));
    for trial in 0..settings.trial_count {
        let rng = StdRng::seed_from_u64(trial_seed(settings.seed, u64::from(trial)));
        let mut draws = RandomDraws::new(rng);
        let trajectory = run_checked_trial(trial, settings, initial, params, &mut draws)?;
        ensemble.push(&trajectory);
    }
    Ok(ensemble)
}

/// Like [`run_trial`], but fails on the first non-finite state field or
/// metric instead of carrying it forward.
fn run_checked_trial<D: DrawSource + ?Sized>(
    trial: u32,
    settings: &RunSettings,
    initial: &InitialConditions,
    params: &SimulationParameters,
    draws: &mut D,
) -> Result<Trajectory, RunError> {
    let mut state = CityState::from_initial(initial);
    let mut trajectory = Trajectory::with_capacity(usize::try_from(settings.years).unwrap_or(0));

    for year in 0..settings.years {
        let (next, metrics) =
            step::step(&state, params, draws.draw_year(), settings.waste_reduction);

        let quantities = [
            ("population", metrics.population),
            ("emissions", metrics.emissions),
            ("water_stress", metrics.water_stress),
            ("waste_accumulated", metrics.waste_accumulated),
            ("energy_demand", next.energy_demand),
            ("water_availability", next.water_availability),
            ("temp_increase", next.temp_increase),
        ];
        if let Some(&(quantity, value)) = quantities.iter().find(|(_, v)| !v.is_finite()) {
            warn!(trial, year, quantity, value, "Non-finite value, aborting run");
            return Err(RunError::NumericDegeneracy {
                quantity,
                trial,
                year,
                value,
            });
        }

        trajectory.push(metrics);
        state = next;
    }

    Ok(trajectory)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draws::FixedDraws;

    fn reference_initial() -> InitialConditions {
        InitialConditions {
            initial_population: 100_000.0,
            energy_demand: 500_000.0,
            water_availability: 1_000_000.0,
            initial_temp_increase: 0.0,
        }
    }

    fn reference_params() -> SimulationParameters {
        SimulationParameters {
            waste_generation_rate: 1.0,
            building_efficiency: 5.0,
            public_transport_share: 0.3,
            green_infrastructure: 0.1,
            rainfall_variability: 0.0,
            policy_effectiveness: 6.0,
            community_engagement: 7.0,
        }
    }

    fn settings(years: u32, trial_count: u32) -> RunSettings {
        RunSettings {
            years,
            trial_count,
            seed: 42,
            waste_reduction: WasteReduction::Cumulative,
        }
    }

    #[test]
    fn trial_has_one_record_per_year() {
        let mut draws = FixedDraws::minimum();
        let t = run_trial(
            20,
            &reference_initial(),
            &reference_params(),
            &mut draws,
            WasteReduction::Cumulative,
        );
        assert_eq!(t.len(), 20);
    }

    #[test]
    fn zero_year_trial_is_empty() {
        let mut draws = FixedDraws::minimum();
        let t = run_trial(
            0,
            &reference_initial(),
            &reference_params(),
            &mut draws,
            WasteReduction::Cumulative,
        );
        assert!(t.is_empty());
    }

    #[test]
    fn ensemble_shape_matches_settings() {
        let ensemble = run_ensemble(&settings(5, 8), &reference_initial(), &reference_params());
        assert!(ensemble.is_ok());
        let ensemble = ensemble.unwrap_or_else(|_| Ensemble::new(0));
        assert_eq!(ensemble.trial_count(), 8);
        for metric in Metric::ALL {
            assert_eq!(ensemble.trials(metric).len(), 8);
            assert!(ensemble.trials(metric).iter().all(|t| t.len() == 5));
        }
    }

    #[test]
    fn ensemble_is_reproducible_for_a_seed() {
        let a = run_ensemble(&settings(10, 4), &reference_initial(), &reference_params()).ok();
        let b = run_ensemble(&settings(10, 4), &reference_initial(), &reference_params()).ok();
        assert!(a.is_some());
        assert_eq!(a, b);
    }

    #[test]
    fn trials_within_an_ensemble_differ() {
        let ensemble = run_ensemble(&settings(3, 2), &reference_initial(), &reference_params())
            .unwrap_or_else(|_| Ensemble::new(0));
        let trials = ensemble.trials(Metric::Population);
        assert_eq!(trials.len(), 2);
        assert_ne!(trials.first(), trials.get(1));
    }

    #[test]
    fn ensemble_rejects_invalid_input() {
        let mut params = reference_params();
        params.building_efficiency = 12.0;
        let result = run_ensemble(&settings(5, 2), &reference_initial(), &params);
        assert!(matches!(result, Err(RunError::Validation { .. })));
        let result = run_ensemble(&settings(0, 2), &reference_initial(), &reference_params());
        assert!(result.is_err());
    }

    #[test]
    fn sweep_preserves_order_and_value() {
        let values = [10.0, 0.0, 5.0];
        let sweep = run_sensitivity_sweep(
            SweptParameter::BuildingEfficiency,
            &values,
            &settings(4, 3),
            &reference_initial(),
            &reference_params(),
        );
        let sweep = sweep.ok();
        assert!(sweep.is_some());
        if let Some(sweep) = sweep {
            assert_eq!(sweep.values(), values.to_vec());
            assert!(sweep.points.iter().all(|p| p.ensemble.trial_count() == 3));
        }
    }

    #[test]
    fn sweep_rejects_out_of_domain_values() {
        let sweep = run_sensitivity_sweep(
            SweptParameter::BuildingEfficiency,
            &[0.0, 10.5],
            &settings(4, 3),
            &reference_initial(),
            &reference_params(),
        );
        assert!(sweep.is_err());
    }

    #[test]
    fn sweep_shares_random_draws_across_points() {
        // Population never depends on efficiency, so common seeds must
        // give identical population series at every grid point.
        let sweep = run_sensitivity_sweep(
            SweptParameter::BuildingEfficiency,
            &[0.0, 10.0],
            &settings(6, 4),
            &reference_initial(),
            &reference_params(),
        )
        .ok();
        let points = sweep.map(|s| s.points).unwrap_or_default();
        assert_eq!(points.len(), 2);
        let pops: Vec<&[Vec<f64>]> = points
            .iter()
            .map(|p| p.ensemble.trials(Metric::Population))
            .collect();
        assert_eq!(pops.first(), pops.get(1));
    }

    #[test]
    fn water_underflow_is_reported_as_degeneracy() {
        let mut params = reference_params();
        params.rainfall_variability = -0.99;
        let result = run_ensemble(&settings(200, 2), &reference_initial(), &params);
        assert!(matches!(
            result,
            Err(RunError::NumericDegeneracy {
                quantity: "water_stress",
                trial: 0,
                ..
            })
        ));
    }

    #[test]
    fn energy_overflow_is_reported_as_degeneracy() {
        let mut initial = reference_initial();
        initial.energy_demand = f64::MAX;
        let mut params = reference_params();
        params.building_efficiency = 0.0;
        let result = run_ensemble(&settings(5, 3), &initial, &params);
        assert!(matches!(result, Err(RunError::NumericDegeneracy { .. })));
    }

    #[test]
    fn sweep_propagates_degeneracy() {
        let mut params = reference_params();
        params.rainfall_variability = -0.99;
        let sweep = run_sensitivity_sweep(
            SweptParameter::BuildingEfficiency,
            &[0.0, 10.0],
            &settings(200, 1),
            &reference_initial(),
            &params,
        );
        assert!(matches!(sweep, Err(RunError::NumericDegeneracy { .. })));
    }

    #[test]
    fn long_reference_run_stays_finite() {
        let ensemble = run_ensemble(&settings(100, 3), &reference_initial(), &reference_params());
        assert!(ensemble.is_ok());
    }
}
