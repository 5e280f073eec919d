//! Parameter sweeps for sensitivity analysis.
//!
//! A sweep reruns the same ensemble once per value of a single parameter.
//! It only regroups results for comparison; the yearly step is unaware of
//! it. Sweep order is preserved exactly as given.

use serde::{Deserialize, Serialize};
use smartcity_types::{Metric, SimulationParameters};

use crate::ensemble::Ensemble;
use crate::validation::{self, Domain, ValidationError};

/// A scalar parameter that can be swept.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SweptParameter {
    /// Building efficiency (0-10).
    #[default]
    BuildingEfficiency,
    /// Public transport share (0-1).
    PublicTransportShare,
    /// Green infrastructure coverage (0-1).
    GreenInfrastructure,
    /// Rainfall variability (> -1).
    RainfallVariability,
    /// Policy effectiveness (0-10).
    PolicyEffectiveness,
    /// Community engagement (0-10).
    CommunityEngagement,
    /// Waste generation rate (>= 0).
    WasteGenerationRate,
}

impl SweptParameter {
    /// The snake-case name used in configuration and output.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::BuildingEfficiency => "building_efficiency",
            Self::PublicTransportShare => "public_transport_share",
            Self::GreenInfrastructure => "green_infrastructure",
            Self::RainfallVariability => "rainfall_variability",
            Self::PolicyEffectiveness => "policy_effectiveness",
            Self::CommunityEngagement => "community_engagement",
            Self::WasteGenerationRate => "waste_generation_rate",
        }
    }

    const fn domain(self) -> Domain {
        match self {
            Self::BuildingEfficiency | Self::PolicyEffectiveness | Self::CommunityEngagement => {
                Domain::Scale10
            }
            Self::PublicTransportShare | Self::GreenInfrastructure => Domain::Fraction,
            Self::RainfallVariability => Domain::AboveMinusOne,
            Self::WasteGenerationRate => Domain::NonNegative,
        }
    }

    /// Return a copy of `params` with this parameter set to `value`.
    pub const fn apply(self, params: &SimulationParameters, value: f64) -> SimulationParameters {
        let mut out = *params;
        match self {
            Self::BuildingEfficiency => out.building_efficiency = value,
            Self::PublicTransportShare => out.public_transport_share = value,
            Self::GreenInfrastructure => out.green_infrastructure = value,
            Self::RainfallVariability => out.rainfall_variability = value,
            Self::PolicyEffectiveness => out.policy_effectiveness = value,
            Self::CommunityEngagement => out.community_engagement = value,
            Self::WasteGenerationRate => out.waste_generation_rate = value,
        }
        out
    }

    /// Check that every value lies in this parameter's domain.
    pub fn validate_values(self, values: &[f64]) -> Result<(), ValidationError> {
        if values.is_empty() {
            return Err(ValidationError::EmptyCount {
                name: "sweep values",
            });
        }
        for &value in values {
            validation::check(self.as_str(), value, self.domain())?;
        }
        Ok(())
    }
}

/// `steps` evenly spaced values from `start` to `end`, both inclusive.
///
/// A single step yields just `start`; zero steps yield nothing.
#[allow(clippy::cast_precision_loss)]
pub fn linspace(start: f64, end: f64, steps: usize) -> Vec<f64> {
    match steps {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let last = steps.saturating_sub(1);
            let width = (end - start) / last as f64;
            (0..steps)
                .map(|i| {
                    if i == last {
                        end
                    } else {
                        width.mul_add(i as f64, start)
                    }
                })
                .collect()
        }
    }
}

/// A linear sweep grid over one parameter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SweepPlan {
    /// Which parameter to vary.
    pub parameter: SweptParameter,
    /// First grid value.
    pub start: f64,
    /// Last grid value.
    pub end: f64,
    /// Number of grid points.
    pub steps: usize,
}

impl SweepPlan {
    /// The grid values in order.
    pub fn values(&self) -> Vec<f64> {
        linspace(self.start, self.end, self.steps)
    }
}

/// One grid point of a sweep and the ensemble it produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepPoint {
    /// The parameter value used for this ensemble.
    pub value: f64,
    /// The ensemble run with that value.
    pub ensemble: Ensemble,
}

/// Ensembles keyed by swept value, in sweep order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensitivitySweep {
    /// The parameter that was varied.
    pub parameter: SweptParameter,
    /// One entry per swept value.
    pub points: Vec<SweepPoint>,
}

impl SensitivitySweep {
    /// Swept values in order.
    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.value).collect()
    }

    /// The ensemble for an exact swept value, if present.
    pub fn ensemble_for(&self, value: f64) -> Option<&Ensemble> {
        self.points
            .iter()
            .find(|p| p.value.total_cmp(&value).is_eq())
            .map(|p| &p.ensemble)
    }

    /// `(value, mean of metric over all years and trials)` per grid point.
    pub fn comparison(&self, metric: Metric) -> Vec<(f64, f64)> {
        self.points
            .iter()
            .filter_map(|p| p.ensemble.overall_mean(metric).map(|m| (p.value, m)))
            .collect()
    }
}
