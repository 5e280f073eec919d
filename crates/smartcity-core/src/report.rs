//! Run reports handed to external plotting consumers.
//!
//! A [`RunReport`] bundles the inputs of a run with its ensemble, the
//! per-year summaries, and the optional sensitivity sweep, tagged with a
//! run ID and generation timestamp. It is serialized as JSON; no chart
//! generation happens here.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use smartcity_types::{InitialConditions, Metric, SimulationParameters};

use crate::ensemble::{Ensemble, YearSummary};
use crate::runner::RunSettings;
use crate::sweep::{SensitivitySweep, SweptParameter};

/// Errors that can occur when writing a report.
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    /// JSON serialization failed.
    #[error("failed to serialize report: {source}")]
    Serialization {
        /// The underlying serde error.
        #[from]
        source: serde_json::Error,
    },

    /// Writing the report failed.
    #[error("failed to write report: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },
}

/// Summary of one sweep grid point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepPointSummary {
    /// The swept value.
    pub value: f64,
    /// Per-year summaries for each metric.
    pub summary: BTreeMap<Metric, Vec<YearSummary>>,
}

/// Sweep section of a report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepReport {
    /// The parameter that was varied.
    pub parameter: SweptParameter,
    /// Summaries per grid point, in sweep order.
    pub points: Vec<SweepPointSummary>,
    /// Raw ensembles, present when trials are included.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw: Option<SensitivitySweep>,
}

/// A complete, self-describing run result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    /// Unique run identifier (UUID v7).
    pub run_id: String,
    /// When the report was generated.
    pub generated_at: DateTime<Utc>,
    /// Run shape and seed.
    pub settings: RunSettings,
    /// Year-zero values.
    pub initial: InitialConditions,
    /// Per-trial parameters of the base ensemble.
    pub parameters: SimulationParameters,
    /// Per-year summaries of the base ensemble.
    pub summary: BTreeMap<Metric, Vec<YearSummary>>,
    /// Raw trial series of the base ensemble, when included.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ensemble: Option<Ensemble>,
    /// Sensitivity sweep results, when a sweep was run.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sweep: Option<SweepReport>,
}

impl RunReport {
    /// Assemble a report with a fresh run ID.
    ///
    /// Raw trial series are dropped unless `include_trials` is set;
    /// summaries are always present.
    pub fn new(
        settings: RunSettings,
        initial: InitialConditions,
        parameters: SimulationParameters,
        ensemble: Ensemble,
        sweep: Option<SensitivitySweep>,
        include_trials: bool,
    ) -> Self {
        let summary = ensemble.summaries();
        let sweep = sweep.map(|s| SweepReport {
            parameter: s.parameter,
            points: s
                .points
                .iter()
                .map(|p| SweepPointSummary {
                    value: p.value,
                    summary: p.ensemble.summaries(),
                })
                .collect(),
            raw: include_trials.then_some(s),
        });
        Self {
            run_id: uuid::Uuid::now_v7().to_string(),
            generated_at: Utc::now(),
            settings,
            initial,
            parameters,
            summary,
            ensemble: include_trials.then_some(ensemble),
            sweep,
        }
    }

    /// Serialize to a writer as JSON.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError`] if serialization or writing fails.
    pub fn write_json<W: Write>(&self, mut writer: W, pretty: bool) -> Result<(), ReportError> {
        if pretty {
            serde_json::to_writer_pretty(&mut writer, self)?;
        } else {
            serde_json::to_writer(&mut writer, self)?;
        }
        writer.write_all(b"\n")?;
        writer.flush()?;
        Ok(())
    }

    /// Write the report to `path`, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError`] if the file cannot be created or written.
    pub fn write_to_path(&self, path: &Path, pretty: bool) -> Result<(), ReportError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let file = std::fs::File::create(path)?;
        self.write_json(std::io::BufWriter::new(file), pretty)
    }
}

#[cfg(test)]
mod tests {
    use smartcity_types::WasteReduction;

    use super::*;
    use crate::ensemble::Trajectory;
    use crate::sweep::SweepPoint;

    fn fixture(include_trials: bool) -> RunReport {
        let trajectory: Trajectory = (0..3)
            .map(|i| smartcity_types::YearlyMetrics {
                population: f64::from(i),
                emissions: 1.0,
                water_stress: 0.1,
                waste_accumulated: 2.0,
            })
            .collect();
        let ensemble = Ensemble::from_trajectories(3, [&trajectory]);
        let sweep = SensitivitySweep {
            parameter: SweptParameter::BuildingEfficiency,
            points: vec![SweepPoint {
                value: 0.0,
                ensemble: ensemble.clone(),
            }],
        };
        RunReport::new(
            RunSettings {
                years: 3,
                trial_count: 1,
                seed: 1,
                waste_reduction: WasteReduction::Cumulative,
            },
            InitialConditions {
                initial_population: 1.0,
                energy_demand: 1.0,
                water_availability: 1.0,
                initial_temp_increase: 0.0,
            },
            SimulationParameters {
                waste_generation_rate: 1.0,
                building_efficiency: 0.0,
                public_transport_share: 0.0,
                green_infrastructure: 0.0,
                rainfall_variability: 0.0,
                policy_effectiveness: 0.0,
                community_engagement: 0.0,
            },
            ensemble,
            Some(sweep),
            include_trials,
        )
    }

    #[test]
    fn report_ids_are_unique() {
        assert_ne!(fixture(false).run_id, fixture(false).run_id);
    }

    #[test]
    fn summaries_always_present() {
        let report = fixture(false);
        assert!(report.ensemble.is_none());
        assert_eq!(report.summary.len(), 4);
        assert_eq!(report.summary.get(&Metric::Population).map(Vec::len), Some(3));
        let sweep = report.sweep.as_ref();
        assert!(sweep.is_some_and(|s| s.raw.is_none() && s.points.len() == 1));
    }

    #[test]
    fn json_uses_metric_keys() {
        let report = fixture(true);
        let mut buf = Vec::new();
        assert!(report.write_json(&mut buf, false).is_ok());
        let value: serde_json::Value = serde_json::from_slice(&buf).unwrap_or_default();
        assert!(value.pointer("/summary/water_stress/0/mean").is_some());
        assert!(value.pointer("/ensemble/series/emissions/0").is_some());
        assert_eq!(
            value.pointer("/sweep/parameter").and_then(|v| v.as_str()),
            Some("building_efficiency")
        );
    }
}
