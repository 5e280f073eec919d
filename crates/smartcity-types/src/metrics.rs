//! Yearly observables emitted by the simulation step.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The four observables recorded for each simulated year.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct YearlyMetrics {
    /// Population at the end of the year.
    pub population: f64,
    /// Emissions after transport and policy adjustments.
    pub emissions: f64,
    /// Population divided by water availability.
    pub water_stress: f64,
    /// Accumulated waste at the end of the year.
    pub waste_accumulated: f64,
}

impl YearlyMetrics {
    /// Read a single observable by key.
    pub const fn get(&self, metric: Metric) -> f64 {
        match metric {
            Metric::Population => self.population,
            Metric::Emissions => self.emissions,
            Metric::WaterStress => self.water_stress,
            Metric::WasteAccumulated => self.waste_accumulated,
        }
    }
}

/// Key naming one of the [`YearlyMetrics`] observables.
///
/// Ordering follows declaration order, which is also the order used when
/// ensembles are serialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    /// City population.
    Population,
    /// Annual emissions.
    Emissions,
    /// Water stress ratio.
    WaterStress,
    /// Accumulated waste.
    WasteAccumulated,
}

impl Metric {
    /// Every metric, in canonical order.
    pub const ALL: [Self; 4] = [
        Self::Population,
        Self::Emissions,
        Self::WaterStress,
        Self::WasteAccumulated,
    ];

    /// The snake-case key used in serialized output.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Population => "population",
            Self::Emissions => "emissions",
            Self::WaterStress => "water_stress",
            Self::WasteAccumulated => "waste_accumulated",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
