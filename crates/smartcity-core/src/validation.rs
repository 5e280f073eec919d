//! Eager validation of run inputs.
//!
//! The yearly step performs unchecked floating-point arithmetic. Inputs
//! outside their documented domains would silently produce negative
//! energy demand or divide by a non-positive water availability, so the
//! runner rejects them here before any trial starts.

use smartcity_types::{InitialConditions, SimulationParameters};

/// Errors raised when a run input is outside its domain.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    /// A numeric parameter is outside its allowed range.
    #[error("invalid parameter {name} = {value}: {reason}")]
    InvalidParameter {
        /// Name of the offending parameter.
        name: &'static str,
        /// The rejected value.
        value: f64,
        /// What the value must satisfy.
        reason: &'static str,
    },

    /// A count (years, trials, sweep steps) is zero.
    #[error("invalid count {name}: must be at least 1")]
    EmptyCount {
        /// Name of the offending count.
        name: &'static str,
    },
}

/// Allowed range for a scalar parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Domain {
    /// Strictly greater than zero.
    Positive,
    /// Zero or greater.
    NonNegative,
    /// Within `[0, 1]`.
    Fraction,
    /// Within `[0, 10]`.
    Scale10,
    /// Strictly greater than `-1`.
    AboveMinusOne,
}

impl Domain {
    const fn contains(self, value: f64) -> bool {
        match self {
            Self::Positive => value > 0.0,
            Self::NonNegative => value >= 0.0,
            Self::Fraction => value >= 0.0 && value <= 1.0,
            Self::Scale10 => value >= 0.0 && value <= 10.0,
            Self::AboveMinusOne => value > -1.0,
        }
    }

    const fn describe(self) -> &'static str {
        match self {
            Self::Positive => "must be greater than 0",
            Self::NonNegative => "must be 0 or greater",
            Self::Fraction => "must be within [0, 1]",
            Self::Scale10 => "must be within [0, 10]",
            Self::AboveMinusOne => "must be greater than -1",
        }
    }
}

/// Check a single value against its domain.
///
/// NaN and infinite values are always rejected.
pub fn check(name: &'static str, value: f64, domain: Domain) -> Result<(), ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::InvalidParameter {
            name,
            value,
            reason: "must be a finite number",
        });
    }
    if !domain.contains(value) {
        return Err(ValidationError::InvalidParameter {
            name,
            value,
            reason: domain.describe(),
        });
    }
    Ok(())
}

/// Validate the starting values of a trial.
pub fn validate_initial(initial: &InitialConditions) -> Result<(), ValidationError> {
    check("initial_population", initial.initial_population, Domain::Positive)?;
    check("energy_demand", initial.energy_demand, Domain::Positive)?;
    check("water_availability", initial.water_availability, Domain::Positive)?;
    check(
        "initial_temp_increase",
        initial.initial_temp_increase,
        Domain::NonNegative,
    )?;
    Ok(())
}

/// Validate the per-trial parameters.
pub fn validate_parameters(params: &SimulationParameters) -> Result<(), ValidationError> {
    check(
        "waste_generation_rate",
        params.waste_generation_rate,
        Domain::NonNegative,
    )?;
    check("building_efficiency", params.building_efficiency, Domain::Scale10)?;
    check(
        "public_transport_share",
        params.public_transport_share,
        Domain::Fraction,
    )?;
    check(
        "green_infrastructure",
        params.green_infrastructure,
        Domain::Fraction,
    )?;
    check(
        "rainfall_variability",
        params.rainfall_variability,
        Domain::AboveMinusOne,
    )?;
    check(
        "policy_effectiveness",
        params.policy_effectiveness,
        Domain::Scale10,
    )?;
    check(
        "community_engagement",
        params.community_engagement,
        Domain::Scale10,
    )?;
    Ok(())
}

/// Validate the shape of a run.
pub const fn validate_counts(years: u32, trial_count: u32) -> Result<(), ValidationError> {
    if years == 0 {
        return Err(ValidationError::EmptyCount { name: "years" });
    }
    if trial_count == 0 {
        return Err(ValidationError::EmptyCount {
            name: "trial_count",
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_params() -> SimulationParameters {
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

    #[test]
    fn accepts_reference_parameters() {
        assert!(validate_parameters(&valid_params()).is_ok());
    }

    #[test]
    fn accepts_scale_boundaries() {
        let mut params = valid_params();
        params.building_efficiency = 0.0;
        assert!(validate_parameters(&params).is_ok());
        params.building_efficiency = 10.0;
        assert!(validate_parameters(&params).is_ok());
    }

    #[test]
    fn rejects_efficiency_above_ten() {
        let mut params = valid_params();
        params.building_efficiency = 10.5;
        let err = validate_parameters(&params).err();
        assert!(matches!(
            err,
            Some(ValidationError::InvalidParameter {
                name: "building_efficiency",
                ..
            })
        ));
    }

    #[test]
    fn rejects_rainfall_that_empties_water() {
        let mut params = valid_params();
        params.rainfall_variability = -1.0;
        assert!(validate_parameters(&params).is_err());
        params.rainfall_variability = -0.99;
        assert!(validate_parameters(&params).is_ok());
    }

    #[test]
    fn rejects_nan() {
        let mut params = valid_params();
        params.public_transport_share = f64::NAN;
        let err = validate_parameters(&params).err();
        assert!(matches!(
            err,
            Some(ValidationError::InvalidParameter {
                reason: "must be a finite number",
                ..
            })
        ));
    }

    #[test]
    fn rejects_non_positive_population() {
        let initial = InitialConditions {
            initial_population: 0.0,
            energy_demand: 1.0,
            water_availability: 1.0,
            initial_temp_increase: 0.0,
        };
        assert!(validate_initial(&initial).is_err());
    }

    #[test]
    fn rejects_zero_counts() {
        assert!(validate_counts(0, 10).is_err());
        assert!(validate_counts(10, 0).is_err());
        assert!(validate_counts(1, 1).is_ok());
    }

    #[test]
    fn error_message_names_the_parameter() {
        let err = check("policy_effectiveness", 11.0, Domain::Scale10).err();
        let msg = err.map(|e| e.to_string()).unwrap_or_default();
        assert!(msg.contains("policy_effectiveness"));
        assert!(msg.contains("[0, 10]"));
    }
}
