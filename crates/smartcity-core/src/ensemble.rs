//! Trajectories and ensembles of trajectories.
//!
//! A [`Trajectory`] is one trial: the chronological sequence of
//! [`YearlyMetrics`]. An [`Ensemble`] regroups many trajectories by
//! metric so that plotting consumers can draw every trial of one metric
//! at once, and offers per-year distribution summaries.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use smartcity_types::{Metric, YearlyMetrics};

/// The yearly observables of one trial, in chronological order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Trajectory {
    years: Vec<YearlyMetrics>,
}

impl Trajectory {
    /// Create an empty trajectory with room for `years` entries.
    pub fn with_capacity(years: usize) -> Self {
        Self {
            years: Vec::with_capacity(years),
        }
    }

    /// Append the next year.
    pub fn push(&mut self, metrics: YearlyMetrics) {
        self.years.push(metrics);
    }

    /// Number of simulated years.
    pub fn len(&self) -> usize {
        self.years.len()
    }

    /// Whether no years were simulated.
    pub fn is_empty(&self) -> bool {
        self.years.is_empty()
    }

    /// All years in order.
    pub fn years(&self) -> &[YearlyMetrics] {
        &self.years
    }

    /// The time series of a single metric.
    pub fn series(&self, metric: Metric) -> Vec<f64> {
        self.years.iter().map(|m| m.get(metric)).collect()
    }

    /// The last simulated year, if any.
    pub fn last(&self) -> Option<&YearlyMetrics> {
        self.years.last()
    }
}

impl FromIterator<YearlyMetrics> for Trajectory {
    fn from_iter<I: IntoIterator<Item = YearlyMetrics>>(iter: I) -> Self {
        Self {
            years: iter.into_iter().collect(),
        }
    }
}

/// Per-metric collections of trial time series.
///
/// `series[metric][trial][year]`. Trials are independent and
/// exchangeable; their order only reflects the order they were run in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ensemble {
    /// Number of simulated years in every trial.
    pub years: usize,
    /// Trial time series keyed by metric.
    pub series: BTreeMap<Metric, Vec<Vec<f64>>>,
}

/// Distribution of one metric across trials for a single year.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct YearSummary {
    /// Zero-based year index.
    pub year: usize,
    /// Mean across trials.
    pub mean: f64,
    /// Smallest value across trials.
    pub min: f64,
    /// Largest value across trials.
    pub max: f64,
    /// 5th percentile.
    pub p05: f64,
    /// Median.
    pub median: f64,
    /// 95th percentile.
    pub p95: f64,
}

impl Ensemble {
    /// Create an ensemble with every metric key present and no trials.
    pub fn new(years: usize) -> Self {
        let series = Metric::ALL.iter().map(|&m| (m, Vec::new())).collect();
        Self { years, series }
    }

    /// Regroup trajectories by metric.
    pub fn from_trajectories<'a, I>(years: usize, trajectories: I) -> Self
    where
        I: IntoIterator<Item = &'a Trajectory>,
    {
        let mut ensemble = Self::new(years);
        for trajectory in trajectories {
            ensemble.push(trajectory);
        }
        ensemble
    }

    /// Add one trial.
    pub fn push(&mut self, trajectory: &Trajectory) {
        for metric in Metric::ALL {
            self.series
                .entry(metric)
                .or_default()
                .push(trajectory.series(metric));
        }
    }

    /// Number of trials recorded.
    pub fn trial_count(&self) -> usize {
        self.series
            .get(&Metric::Population)
            .map_or(0, Vec::len)
    }

    /// All trial series for one metric.
    pub fn trials(&self, metric: Metric) -> &[Vec<f64>] {
        self.series
            .get(&metric)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Values of `metric` across all trials for one year.
    pub fn year_values(&self, metric: Metric, year: usize) -> Vec<f64> {
        self.trials(metric)
            .iter()
            .filter_map(|trial| trial.get(year).copied())
            .collect()
    }

    /// Per-year distribution summary of `metric`.
    ///
    /// Years with no recorded values are skipped.
    pub fn summary(&self, metric: Metric) -> Vec<YearSummary> {
        (0..self.years)
            .filter_map(|year| summarize(year, self.year_values(metric, year)))
            .collect()
    }

    /// Summaries for every metric.
    pub fn summaries(&self) -> BTreeMap<Metric, Vec<YearSummary>> {
        Metric::ALL
            .iter()
            .map(|&m| (m, self.summary(m)))
            .collect()
    }

    /// Mean of `metric` in the final year across trials.
    pub fn final_mean(&self, metric: Metric) -> Option<f64> {
        let last = self.years.checked_sub(1)?;
        mean(&self.year_values(metric, last))
    }

    /// Mean of `metric` over every year of every trial.
    pub fn overall_mean(&self, metric: Metric) -> Option<f64> {
        let values: Vec<f64> = self.trials(metric).iter().flatten().copied().collect();
        mean(&values)
    }
}

#[allow(clippy::cast_precision_loss)]
fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

fn summarize(year: usize, mut values: Vec<f64>) -> Option<YearSummary> {
    let mean = mean(&values)?;
    values.sort_by(f64::total_cmp);
    Some(YearSummary {
        year,
        mean,
        min: *values.first()?,
        max: *values.last()?,
        p05: percentile(&values, 0.05)?,
        median: percentile(&values, 0.5)?,
        p95: percentile(&values, 0.95)?,
    })
}

/// Linear-interpolated percentile of already sorted values.
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
fn percentile(sorted: &[f64], q: f64) -> Option<f64> {
    let last = sorted.len().checked_sub(1)?;
    let rank = q * last as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    let lo = *sorted.get(lower)?;
    let hi = *sorted.get(upper)?;
    Some((hi - lo).mul_add(rank - rank.floor(), lo))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metrics(v: f64) -> YearlyMetrics {
        YearlyMetrics {
            population: v,
            emissions: v * 2.0,
            water_stress: v / 10.0,
            waste_accumulated: v * 100.0,
        }
    }

    fn trajectory(values: &[f64]) -> Trajectory {
        values.iter().map(|&v| metrics(v)).collect()
    }

    #[test]
    fn ensemble_has_every_metric_key() {
        let ensemble = Ensemble::new(3);
        for metric in Metric::ALL {
            assert!(ensemble.series.contains_key(&metric));
        }
        assert_eq!(ensemble.trial_count(), 0);
    }

    #[test]
    fn regroups_trials_by_metric() {
        let a = trajectory(&[1.0, 2.0]);
        let b = trajectory(&[3.0, 4.0]);
        let ensemble = Ensemble::from_trajectories(2, [&a, &b]);
        assert_eq!(ensemble.trial_count(), 2);
        assert_eq!(ensemble.trials(Metric::Emissions), &[vec![2.0, 4.0], vec![6.0, 8.0]]);
        assert_eq!(ensemble.year_values(Metric::Population, 1), vec![2.0, 4.0]);
    }

    #[test]
    fn summary_reports_distribution() {
        let trials: Vec<Trajectory> = (0..=10).map(|i| trajectory(&[f64::from(i)])).collect();
        let ensemble = Ensemble::from_trajectories(1, &trials);
        let summary = ensemble.summary(Metric::Population);
        assert_eq!(summary.len(), 1);
        let year = summary.first().copied();
        assert!(year.is_some());
        if let Some(y) = year {
            assert!((y.mean - 5.0).abs() < 1e-12);
            assert!(y.min.abs() < 1e-12);
            assert!((y.max - 10.0).abs() < 1e-12);
            assert!((y.median - 5.0).abs() < 1e-12);
            assert!((y.p05 - 0.5).abs() < 1e-12);
            assert!((y.p95 - 9.5).abs() < 1e-12);
        }
    }

    #[test]
    fn means_of_empty_ensemble_are_none() {
        let ensemble = Ensemble::new(5);
        assert!(ensemble.final_mean(Metric::Emissions).is_none());
        assert!(ensemble.overall_mean(Metric::Emissions).is_none());
        assert!(ensemble.summary(Metric::Emissions).is_empty());
    }

    #[test]
    fn final_mean_uses_last_year() {
        let a = trajectory(&[1.0, 10.0]);
        let b = trajectory(&[3.0, 20.0]);
        let ensemble = Ensemble::from_trajectories(2, [&a, &b]);
        let final_mean = ensemble.final_mean(Metric::Population).unwrap_or_default();
        assert!((final_mean - 15.0).abs() < 1e-12);
        let overall = ensemble.overall_mean(Metric::Population).unwrap_or_default();
        assert!((overall - 8.5).abs() < 1e-12);
    }

    #[test]
    fn trajectory_serializes_as_list() {
        let t = trajectory(&[1.0]);
        let json = serde_json::to_value(&t).unwrap_or_default();
        assert!(json.is_array());
    }
}
