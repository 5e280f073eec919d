//! Shared type definitions for the smart city ensemble simulation.
//!
//! This crate holds the plain data that flows between the simulation
//! core, the engine binary, and downstream plotting consumers. It has no
//! behaviour beyond small accessors; all state evolution lives in
//! `smartcity-core`.
//!
//! # Modules
//!
//! - [`state`] -- Mutable per-trial city state and the initial conditions
//!   it is created from.
//! - [`params`] -- Fixed per-trial policy and environment parameters.
//! - [`metrics`] -- Yearly observables and the [`Metric`] key enum.

pub mod metrics;
pub mod params;
pub mod state;

// Re-export all public types at crate root for convenience.
pub use metrics::{Metric, YearlyMetrics};
pub use params::{SimulationParameters, WasteReduction};
pub use state::{CityState, InitialConditions};
