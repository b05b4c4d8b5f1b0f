use autots::{run_trial, DataCreator, MemoryReporter, Metric, StopCriteria, TrialConfig, TrialStopper};
use ndarray::s;
use polars::prelude::*;
use serde_json::json;
use std::sync::Arc;
use tsdataset::{ColumnScaler, TSDataset};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "autots=info,tsdataset=info".into()),
        )
        .init();

    // A noisy seasonal series
    let n = 200;
    let t: Vec<i64> = (0..n).collect();
    let value: Vec<f64> = t
        .iter()
        .map(|i| 10.0 + (*i as f64 * std::f64::consts::PI / 12.0).sin() * 3.0 + (i % 7) as f64 * 0.1)
        .collect();
    let df = df!("t" => t, "value" => value)?;

    let mut data = TSDataset::from_polars(df, "t", &["value"], None, &[])?;
    data.scale(ColumnScaler::standard(), true)?;
    let creator = DataCreator::new(Arc::new(data));

    let metric = Metric::Mse;
    let runtime = json!({"training_iteration": 3, "num_samples": 4});
    let criteria = StopCriteria::from_params(metric, runtime.as_object().ok_or("object expected")?)?;
    let stopper = TrialStopper::new(criteria);
    let mut reporter = MemoryReporter::new(metric);

    // A tiny grid standing in for the search algorithm
    for (i, lookback) in [2usize, 6, 12, 24].iter().enumerate() {
        let config = TrialConfig::from_value(json!({"lookback": lookback, "horizon": 1}))?;
        let outcome = run_trial(
            &format!("trial_{}", i),
            &config,
            &creator,
            metric,
            &stopper,
            &mut reporter,
            |trial, config| {
                // moving average over the lookback window
                let mean = trial.x.slice(s![.., .., ..1]).mean_axis(ndarray::Axis(1)).ok_or_else(|| {
                    autots::AutoTsError::MetricError("empty lookback".to_string())
                })?;
                let pred = mean.insert_axis(ndarray::Axis(1));
                let y = trial.y.as_ref().ok_or_else(|| {
                    autots::AutoTsError::ConfigError(format!("no target for lookback {}", config.lookback))
                })?;
                metric.evaluate(y, &pred)
            },
        )?;
        println!("{:?}", outcome);
    }

    for report in reporter.best_trials(2) {
        println!("best: {} {:?}", report.trial_id, report.metrics);
    }

    Ok(())
}
