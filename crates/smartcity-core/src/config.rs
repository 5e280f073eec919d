//! Configuration loading and typed config structures for the smart city
//! simulation.
//!
//! The configuration lives in a YAML file (`smartcity-config.yaml` by
//! default). This module defines strongly-typed structs mirroring the YAML
//! structure and a loader that reads it. Every field has a default equal
//! to the reference scenario, so an empty file is a valid configuration.
//!
//! Values are checked for domain errors by [`crate::validation`] when a run
//! starts, not here.

use std::num::ParseIntError;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use smartcity_types::{InitialConditions, SimulationParameters, WasteReduction};

use crate::runner::RunSettings;
use crate::sweep::{SweepPlan, SweptParameter};

/// Environment variable overriding `simulation.seed`.
pub const ENV_SEED: &str = "SMARTCITY_SEED";

/// Environment variable overriding `simulation.trials`.
pub const ENV_TRIALS: &str = "SMARTCITY_TRIALS";

/// Environment variable overriding `output.path`.
pub const ENV_OUTPUT: &str = "SMARTCITY_OUTPUT";

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// An environment override could not be parsed.
    #[error("invalid value {value:?} for environment variable {name}: {reason}")]
    Env {
        /// The variable name.
        name: &'static str,
        /// The raw value that failed to parse.
        value: String,
        /// The parser's description of what was wrong.
        reason: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level simulation configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Run shape and seeding.
    #[serde(default)]
    pub simulation: RunConfig,

    /// Year-zero city state.
    #[serde(default)]
    pub city: CityConfig,

    /// Per-trial policy and environment parameters.
    #[serde(default)]
    pub parameters: ParametersConfig,

    /// Sensitivity sweep settings.
    #[serde(default)]
    pub sweep: SweepConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Report output settings.
    #[serde(default)]
    pub output: OutputConfig,
}

impl SimulationConfig {
    /// Load configuration from a YAML file, then apply environment
    /// overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if the content is not valid YAML, or
    /// [`ConfigError::Env`] if an override is malformed.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let mut config = Self::parse(&contents)?;
        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Parse configuration from a YAML string. No overrides are applied.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_yml::from_str(yaml)?;
        Ok(config)
    }

    /// Override values from the process environment.
    ///
    /// - `SMARTCITY_SEED` overrides `simulation.seed`
    /// - `SMARTCITY_TRIALS` overrides `simulation.trials`
    /// - `SMARTCITY_OUTPUT` overrides `output.path`
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Env`] if a numeric override does not parse.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides(|name| std::env::var(name).ok())
    }

    /// Override values using `lookup` to resolve variable names.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Env`] if a numeric override does not parse.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(raw) = lookup(ENV_SEED) {
            self.simulation.seed =
                raw.trim()
                    .parse()
                    .map_err(|e: ParseIntError| ConfigError::Env {
                        name: ENV_SEED,
                        value: raw.clone(),
                        reason: e.to_string(),
                    })?;
        }
        if let Some(raw) = lookup(ENV_TRIALS) {
            self.simulation.trials =
                raw.trim()
                    .parse()
                    .map_err(|e: ParseIntError| ConfigError::Env {
                        name: ENV_TRIALS,
                        value: raw.clone(),
                        reason: e.to_string(),
                    })?;
        }
        if let Some(raw) = lookup(ENV_OUTPUT) {
            self.output.path = Some(PathBuf::from(raw));
        }
        Ok(())
    }

    /// The run shape derived from the `simulation` section.
    pub const fn run_settings(&self) -> RunSettings {
        RunSettings {
            years: self.simulation.years,
            trial_count: self.simulation.trials,
            seed: self.simulation.seed,
            waste_reduction: self.simulation.waste_reduction,
        }
    }

    /// The year-zero values from the `city` section.
    pub const fn initial_conditions(&self) -> InitialConditions {
        InitialConditions {
            initial_population: self.city.initial_population,
            energy_demand: self.city.energy_demand,
            water_availability: self.city.water_availability,
            initial_temp_increase: self.city.initial_temp_increase,
        }
    }

    /// The per-trial parameters from the `parameters` section.
    pub const fn parameters(&self) -> SimulationParameters {
        SimulationParameters {
            waste_generation_rate: self.parameters.waste_generation_rate,
            building_efficiency: self.parameters.building_efficiency,
            public_transport_share: self.parameters.public_transport_share,
            green_infrastructure: self.parameters.green_infrastructure,
            rainfall_variability: self.parameters.rainfall_variability,
            policy_effectiveness: self.parameters.policy_effectiveness,
            community_engagement: self.parameters.community_engagement,
        }
    }

    /// The sweep grid, or `None` when sweeping is disabled.
    pub const fn sweep_plan(&self) -> Option<SweepPlan> {
        if !self.sweep.enabled {
            return None;
        }
        Some(SweepPlan {
            parameter: self.sweep.parameter,
            start: self.sweep.start,
            end: self.sweep.end,
            steps: self.sweep.steps,
        })
    }
}

/// Run shape and seeding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunConfig {
    /// Years simulated per trial.
    #[serde(default = "default_years")]
    pub years: u32,

    /// Trials per ensemble.
    #[serde(default = "default_trials")]
    pub trials: u32,

    /// Base random seed for reproducibility.
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// How community engagement reduces waste: `cumulative` (legacy) or
    /// `increment`.
    #[serde(default)]
    pub waste_reduction: WasteReduction,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            years: default_years(),
            trials: default_trials(),
            seed: default_seed(),
            waste_reduction: WasteReduction::default(),
        }
    }
}

/// Year-zero city state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CityConfig {
    /// Initial population.
    #[serde(default = "default_initial_population")]
    pub initial_population: f64,

    /// Initial annual energy demand (kWh).
    #[serde(default = "default_energy_demand")]
    pub energy_demand: f64,

    /// Initial water availability (cubic meters).
    #[serde(default = "default_water_availability")]
    pub water_availability: f64,

    /// Temperature increase already present (degrees C).
    #[serde(default)]
    pub initial_temp_increase: f64,
}

impl Default for CityConfig {
    fn default() -> Self {
        Self {
            initial_population: default_initial_population(),
            energy_demand: default_energy_demand(),
            water_availability: default_water_availability(),
            initial_temp_increase: 0.0,
        }
    }
}

/// Per-trial policy and environment parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParametersConfig {
    /// Waste generated per capita per day (kg).
    #[serde(default = "default_waste_generation_rate")]
    pub waste_generation_rate: f64,

    /// Building efficiency (0-10).
    #[serde(default = "default_building_efficiency")]
    pub building_efficiency: f64,

    /// Public transport share (0-1).
    #[serde(default = "default_public_transport_share")]
    pub public_transport_share: f64,

    /// Green infrastructure coverage (0-1).
    #[serde(default = "default_green_infrastructure")]
    pub green_infrastructure: f64,

    /// Fractional yearly change in water availability.
    #[serde(default)]
    pub rainfall_variability: f64,

    /// Policy effectiveness (0-10).
    #[serde(default = "default_policy_effectiveness")]
    pub policy_effectiveness: f64,

    /// Community engagement (0-10).
    #[serde(default = "default_community_engagement")]
    pub community_engagement: f64,
}

impl Default for ParametersConfig {
    fn default() -> Self {
        Self {
            waste_generation_rate: default_waste_generation_rate(),
            building_efficiency: default_building_efficiency(),
            public_transport_share: default_public_transport_share(),
            green_infrastructure: default_green_infrastructure(),
            rainfall_variability: 0.0,
            policy_effectiveness: default_policy_effectiveness(),
            community_engagement: default_community_engagement(),
        }
    }
}

/// Sensitivity sweep settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SweepConfig {
    /// Whether to run the sweep after the base ensemble.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Parameter to vary.
    #[serde(default)]
    pub parameter: SweptParameter,

    /// First grid value.
    #[serde(default)]
    pub start: f64,

    /// Last grid value.
    #[serde(default = "default_sweep_end")]
    pub end: f64,

    /// Number of evenly spaced grid points.
    #[serde(default = "default_sweep_steps")]
    pub steps: usize,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            parameter: SweptParameter::default(),
            start: 0.0,
            end: default_sweep_end(),
            steps: default_sweep_steps(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level used when `RUST_LOG` is unset (trace, debug, info, warn,
    /// error).
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// Report output settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Where to write the JSON report. Standard output when unset.
    #[serde(default)]
    pub path: Option<PathBuf>,

    /// Pretty-print the JSON report.
    #[serde(default = "default_true")]
    pub pretty: bool,

    /// Include every trial's raw series, not only the summaries.
    #[serde(default = "default_true")]
    pub include_trials: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: None,
            pretty: true,
            include_trials: true,
        }
    }
}

// ---------------------------------------------------------------------------
// Default value functions (serde default requires named functions)
// ---------------------------------------------------------------------------

const fn default_years() -> u32 {
    20
}

const fn default_trials() -> u32 {
    100
}

const fn default_seed() -> u64 {
    42
}

const fn default_initial_population() -> f64 {
    100_000.0
}

const fn default_energy_demand() -> f64 {
    500_000.0
}

const fn default_water_availability() -> f64 {
    1_000_000.0
}

const fn default_waste_generation_rate() -> f64 {
    1.0
}

const fn default_building_efficiency() -> f64 {
    5.0
}

const fn default_public_transport_share() -> f64 {
    0.3
}

const fn default_green_infrastructure() -> f64 {
    0.1
}

const fn default_policy_effectiveness() -> f64 {
    6.0
}

const fn default_community_engagement() -> f64 {
    7.0
}

const fn default_sweep_end() -> f64 {
    10.0
}

const fn default_sweep_steps() -> usize {
    11
}

fn default_log_level() -> String {
    "info".to_owned()
}

const fn default_true() -> bool {
    true
}
