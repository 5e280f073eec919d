//! Batch driver for the smart city simulation.
//!
//! Loads configuration, runs the base ensemble and the optional
//! sensitivity sweep, and writes a JSON report for external plotting.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `smartcity-config.yaml` (or the path in
//!    `SMARTCITY_CONFIG`), falling back to defaults
//! 2. Initialize structured logging (tracing) on standard error
//! 3. Run the base ensemble
//! 4. Run the sensitivity sweep, if enabled
//! 5. Write the report to the configured path or standard output

mod error;

use std::path::PathBuf;

use smartcity_core::config::SimulationConfig;
use smartcity_core::report::RunReport;
use smartcity_core::runner;
use smartcity_types::Metric;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::error::EngineError;

/// Default configuration file, relative to the working directory.
const DEFAULT_CONFIG_PATH: &str = "smartcity-config.yaml";

/// Environment variable naming an alternative configuration file.
const CONFIG_PATH_ENV: &str = "SMARTCITY_CONFIG";

/// Application entry point.
///
/// # Errors
///
/// Returns an error if configuration, validation, or report output fails.
fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.level)),
        )
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    info!("smartcity-engine starting");
    info!(
        years = config.simulation.years,
        trials = config.simulation.trials,
        seed = config.simulation.seed,
        sweep_enabled = config.sweep.enabled,
        "Configuration loaded"
    );

    run(&config)?;

    info!("smartcity-engine finished");
    Ok(())
}

fn run(config: &SimulationConfig) -> Result<(), EngineError> {
    let settings = config.run_settings();
    let initial = config.initial_conditions();
    let parameters = config.parameters();

    let ensemble = runner::run_ensemble(&settings, &initial, &parameters)?;

    let sweep = match config.sweep_plan() {
        Some(plan) => {
            let sweep = runner::run_sweep_plan(&plan, &settings, &initial, &parameters)?;
            for (value, mean_emissions) in sweep.comparison(Metric::Emissions) {
                info!(
                    parameter = plan.parameter.as_str(),
                    value, mean_emissions, "Sweep point"
                );
            }
            Some(sweep)
        }
        None => {
            info!("Sensitivity sweep disabled");
            None
        }
    };

    let report = RunReport::new(
        settings,
        initial,
        parameters,
        ensemble,
        sweep,
        config.output.include_trials,
    );

    match &config.output.path {
        Some(path) => {
            report.write_to_path(path, config.output.pretty)?;
            info!(run_id = report.run_id, path = %path.display(), "Report written");
        }
        None => {
            report.write_json(std::io::stdout().lock(), config.output.pretty)?;
            info!(run_id = report.run_id, "Report written to stdout");
        }
    }

    Ok(())
}

/// Load the simulation configuration.
///
/// Uses `SMARTCITY_CONFIG` when set, otherwise `smartcity-config.yaml` in
/// the working directory. A missing default file means defaults plus
/// environment overrides.
fn load_config() -> Result<SimulationConfig, EngineError> {
    let explicit = std::env::var(CONFIG_PATH_ENV).ok().map(PathBuf::from);
    let path = explicit
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));

    if explicit.is_some() || path.exists() {
        Ok(SimulationConfig::from_file(&path)?)
    } else {
        let mut config = SimulationConfig::default();
        config.apply_env_overrides()?;
        Ok(config)
    }
}
