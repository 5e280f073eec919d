//! Yearly stepping, ensemble runner, and sensitivity sweeps for the smart
//! city simulation.
//!
//! The simulation projects population, emissions, water stress, and waste
//! accumulation for a city over a fixed number of years under random
//! year-to-year perturbations, then repeats that projection many times to
//! build ensembles for sensitivity analysis.
//!
//! # Modules
//!
//! - [`config`] -- Configuration loading from `smartcity-config.yaml` into
//!   strongly-typed structs.
//! - [`draws`] -- [`DrawSource`] trait, seeded [`RandomDraws`], and
//!   [`FixedDraws`] for deterministic runs.
//! - [`step`] -- The pure one-year state transition.
//! - [`validation`] -- Eager domain checks for run inputs.
//! - [`runner`] -- Trials, ensembles, and sweeps.
//! - [`ensemble`] -- Trajectory and ensemble containers with summaries.
//! - [`sweep`] -- Swept parameters, grids, and sweep results.
//! - [`report`] -- JSON run reports for plotting consumers.
//!
//! [`DrawSource`]: draws::DrawSource
//! [`RandomDraws`]: draws::RandomDraws
//! [`FixedDraws`]: draws::FixedDraws

pub mod config;
pub mod draws;
pub mod ensemble;
pub mod report;
pub mod runner;
pub mod step;
pub mod sweep;
pub mod validation;

pub use ensemble::{Ensemble, Trajectory, YearSummary};
pub use runner::{RunError, RunSettings, run_ensemble, run_sensitivity_sweep, run_trial};
pub use sweep::{SensitivitySweep, SweepPlan, SweptParameter};
