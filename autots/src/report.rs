//! Key-value trial reporting

use crate::error::Result;
use crate::metrics::Metric;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing::info;

/// One report of a running trial
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrialReport {
    pub trial_id: String,
    pub training_iteration: u64,
    pub metrics: BTreeMap<String, f64>,
    #[serde(default)]
    pub checkpoint: Option<PathBuf>,
}

impl TrialReport {
    pub fn new(trial_id: &str, training_iteration: u64) -> Self {
        Self {
            trial_id: trial_id.to_string(),
            training_iteration,
            metrics: BTreeMap::new(),
            checkpoint: None,
        }
    }

    pub fn with_metric(mut self, name: &str, value: f64) -> Self {
        self.metrics.insert(name.to_string(), value);
        self
    }

    pub fn with_checkpoint<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.checkpoint = Some(path.into());
        self
    }

    /// Value of a reported metric
    pub fn metric(&self, name: &str) -> Option<f64> {
        self.metrics.get(name).copied()
    }
}

/// Sink for trial reports
pub trait Reporter {
    fn report(&mut self, report: TrialReport) -> Result<()>;
}

/// Keeps every report in memory and tracks the best one for a metric
#[derive(Debug, Clone)]
pub struct MemoryReporter {
    metric: Metric,
    reports: Vec<TrialReport>,
    best: Option<usize>,
}

impl MemoryReporter {
    pub fn new(metric: Metric) -> Self {
        Self {
            metric,
            reports: Vec::new(),
            best: None,
        }
    }

    /// All reports in arrival order
    pub fn reports(&self) -> &[TrialReport] {
        &self.reports
    }

    /// Best report seen so far for the tracked metric
    pub fn best(&self) -> Option<&TrialReport> {
        self.best.map(|i| &self.reports[i])
    }

    /// Last report of every trial, best first, at most `k` of them
    pub fn best_trials(&self, k: usize) -> Vec<&TrialReport> {
        let mut last: BTreeMap<&str, &TrialReport> = BTreeMap::new();
        for report in &self.reports {
            last.insert(report.trial_id.as_str(), report);
        }

        let name = self.metric.name();
        let mut trials: Vec<&TrialReport> = last
            .into_values()
            .filter(|r| r.metric(name).is_some())
            .collect();
        trials.sort_by(|a, b| {
            let (a, b) = (a.metric(name).unwrap_or(0.0), b.metric(name).unwrap_or(0.0));
            if self.metric.is_better(a, b) {
                std::cmp::Ordering::Less
            } else if self.metric.is_better(b, a) {
                std::cmp::Ordering::Greater
            } else {
                std::cmp::Ordering::Equal
            }
        });
        trials.truncate(k);
        trials
    }
}

impl Reporter for MemoryReporter {
    fn report(&mut self, report: TrialReport) -> Result<()> {
        info!(
            trial = %report.trial_id,
            iteration = report.training_iteration,
            metrics = ?report.metrics,
            "trial report"
        );

        if let Some(value) = report.metric(self.metric.name()) {
            let improves = match self.best() {
                Some(best) => best
                    .metric(self.metric.name())
                    .map_or(true, |current| self.metric.is_better(value, current)),
                None => true,
            };
            if improves {
                self.best = Some(self.reports.len());
            }
        }

        self.reports.push(report);
        Ok(())
    }
}
