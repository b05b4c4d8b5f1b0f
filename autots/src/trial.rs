//! The train loop of one trial

use crate::config::TrialConfig;
use crate::creator::{DataCreator, TrialData};
use crate::error::{AutoTsError, Result};
use crate::metrics::Metric;
use crate::report::{Reporter, TrialReport};
use crate::stopper::TrialStopper;
use tracing::debug;

/// Upper bound on iterations when the stop criteria never trigger
pub const MAX_ITERATIONS: u64 = 100;

/// Checkpoint file name reported with every iteration
pub const CHECKPOINT_FILENAME: &str = "best.ckpt";

/// Summary of a finished trial
#[derive(Debug, Clone, PartialEq)]
pub struct TrialOutcome {
    pub trial_id: String,
    pub iterations: u64,
    pub best: f64,
}

/// Run one trial.
///
/// Creates the trial's data once, then calls `fit_eval` (one training
/// iteration, returning the metric value) until the stopper fires. Every
/// iteration reports the metric, the best value so far as `best_<metric>` and
/// the checkpoint name.
pub fn run_trial<R, F>(
    trial_id: &str,
    config: &TrialConfig,
    creator: &DataCreator,
    metric: Metric,
    stopper: &TrialStopper,
    reporter: &mut R,
    mut fit_eval: F,
) -> Result<TrialOutcome>
where
    R: Reporter,
    F: FnMut(&TrialData, &TrialConfig) -> Result<f64>,
{
    let data = creator.create(config)?;
    if data.is_empty() {
        return Err(AutoTsError::ConfigError(format!(
            "trial {} has no samples with lookback {}",
            trial_id, config.lookback
        )));
    }

    let best_key = format!("best_{}", metric.name());
    let mut best: Option<f64> = None;

    for iteration in 1..=MAX_ITERATIONS {
        let value = fit_eval(&data, config)?;
        if best.map_or(true, |b| metric.is_better(value, b)) {
            best = Some(value);
        }
        let best_value = best.unwrap_or(value);

        let report = TrialReport::new(trial_id, iteration)
            .with_metric(metric.name(), value)
            .with_metric(&best_key, best_value)
            .with_checkpoint(CHECKPOINT_FILENAME);
        let stop = stopper.should_stop(&report);
        reporter.report(report)?;

        if stop || stopper.stop_all() {
            debug!(trial = trial_id, iteration, "trial stopped");
            return Ok(TrialOutcome {
                trial_id: trial_id.to_string(),
                iterations: iteration,
                best: best_value,
            });
        }
    }

    Ok(TrialOutcome {
        trial_id: trial_id.to_string(),
        iterations: MAX_ITERATIONS,
        best: best.unwrap_or(f64::NAN),
    })
}
