//! Random draws consumed by the yearly step.
//!
//! Each simulated year needs four random quantities. They are gathered
//! into a [`YearDraws`] value by a [`DrawSource`], which the runner
//! injects per trial. Production runs use [`RandomDraws`] over a seeded
//! generator; tests and deterministic scenarios substitute
//! [`FixedDraws`].
//!
//! # Determinism
//!
//! Trial seeds come from [`trial_seed`], a pure function of the run seed
//! and trial index. The same `(seed, trial)` pair always yields the same
//! sequence, and because the swept parameter never affects the draws,
//! every point of a sensitivity sweep sees the same random numbers for a
//! given trial index.

use std::ops::RangeInclusive;

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Range of the yearly population growth rate.
pub const GROWTH_RATE_RANGE: RangeInclusive<f64> = 0.0..=0.05;

/// Range of the yearly energy demand growth multiplier.
pub const ENERGY_GROWTH_RANGE: RangeInclusive<f64> = 1.0..=1.1;

/// Range of the yearly renewable energy penetration.
pub const RENEWABLE_PENETRATION_RANGE: RangeInclusive<f64> = 0.0..=1.0;

/// Range of the yearly temperature increment.
pub const TEMP_DELTA_RANGE: RangeInclusive<f64> = 0.0..=0.04;

/// The random quantities used by one yearly step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct YearDraws {
    /// Fractional population growth for the year.
    pub growth_rate: f64,
    /// Multiplier applied to energy demand.
    pub energy_growth: f64,
    /// Share of energy supplied by renewables this year.
    pub renewable_penetration: f64,
    /// Non-negative temperature increment.
    pub temp_delta: f64,
}

impl YearDraws {
    /// Every draw at the minimum of its range: no growth, no renewables,
    /// no warming.
    pub const MINIMUM: Self = Self {
        growth_rate: 0.0,
        energy_growth: 1.0,
        renewable_penetration: 0.0,
        temp_delta: 0.0,
    };
}

/// A source of per-year random draws.
///
/// Implementations are owned by a single trial. Sharing one source
/// between trials would correlate them.
pub trait DrawSource {
    /// Produce the draws for the next simulated year.
    fn draw_year(&mut self) -> YearDraws;
}

/// Draws sampled uniformly from their ranges using a random generator.
///
/// Quantities are drawn in a fixed order (growth, energy, renewable,
/// temperature) so a seeded generator reproduces a trial exactly.
#[derive(Debug, Clone)]
pub struct RandomDraws<R> {
    rng: R,
}

impl<R: Rng> RandomDraws<R> {
    /// Wrap a generator.
    pub const fn new(rng: R) -> Self {
        Self { rng }
    }

    /// Return the wrapped generator.
    pub fn into_inner(self) -> R {
        self.rng
    }
}

impl<R: Rng> DrawSource for RandomDraws<R> {
    fn draw_year(&mut self) -> YearDraws {
        let growth_rate = self.rng.random_range(GROWTH_RATE_RANGE);
        let energy_growth = self.rng.random_range(ENERGY_GROWTH_RANGE);
        let renewable_penetration = self.rng.random_range(RENEWABLE_PENETRATION_RANGE);
        let temp_delta = self.rng.random_range(TEMP_DELTA_RANGE);
        YearDraws {
            growth_rate,
            energy_growth,
            renewable_penetration,
            temp_delta,
        }
    }
}

/// A draw source that returns the same values every year.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedDraws {
    draws: YearDraws,
}

impl FixedDraws {
    /// Always return `draws`.
    pub const fn new(draws: YearDraws) -> Self {
        Self { draws }
    }

    /// Always return [`YearDraws::MINIMUM`].
    pub const fn minimum() -> Self {
        Self::new(YearDraws::MINIMUM)
    }
}

impl DrawSource for FixedDraws {
    fn draw_year(&mut self) -> YearDraws {
        self.draws
    }
}

/// Derive the seed for trial `trial` of a run seeded with `seed`.
///
/// Uses the splitmix64 finaliser so that neighbouring trial indices get
/// uncorrelated generator states.
pub const fn trial_seed(seed: u64, trial: u64) -> u64 {
    let mut z = seed ^ trial.wrapping_mul(0x9E37_79B9_7F4A_7C15);
    z = z.wrapping_add(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}
