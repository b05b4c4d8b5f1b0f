//! # AutoTS
//!
//! The contract between a hyper-parameter search engine and [`tsdataset`].
//!
//! The search engine itself (sampling, scheduling, distribution) lives
//! elsewhere; this crate provides what a trial needs from the data side:
//!
//! - [`TrialConfig`]: one sampled point of the search space
//! - [`DataCreator`]: per-trial rolled tensors from a shared, read-only dataset
//! - [`Metric`]: scoring with its optimisation direction
//! - [`StopCriteria`] and [`TrialStopper`]: when a trial ends
//! - [`Reporter`]: where per-iteration results go
//!
//! ## Quick Start
//!
//! ```rust
//! use autots::{run_trial, DataCreator, MemoryReporter, Metric, StopCriteria, TrialConfig, TrialStopper};
//! use polars::prelude::*;
//! use std::sync::Arc;
//! use tsdataset::TSDataset;
//!
//! # fn main() -> autots::Result<()> {
//! let df = df!(
//!     "t" => &[0i64, 1, 2, 3, 4, 5, 6, 7],
//!     "value" => &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0]
//! )
//! .map_err(tsdataset::DatasetError::from)?;
//! let data = TSDataset::from_polars(df, "t", &["value"], None, &[])?;
//!
//! let creator = DataCreator::new(Arc::new(data));
//! let config = TrialConfig::from_json(r#"{"lookback": 3, "horizon": 1, "lr": 0.01}"#)?;
//! let stopper = TrialStopper::new(StopCriteria::iterations(Metric::Mse, 3));
//! let mut reporter = MemoryReporter::new(Metric::Mse);
//!
//! let outcome = run_trial("trial_0", &config, &creator, Metric::Mse, &stopper, &mut reporter, |data, _| {
//!     // a naive model repeating the last observed value
//!     let y = data.y.as_ref().expect("horizon > 0");
//!     let last = data.x.slice(ndarray::s![.., -1.., ..1]).to_owned();
//!     Metric::Mse.evaluate(y, &last)
//! })?;
//! assert_eq!(outcome.iterations, 3);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod creator;
pub mod error;
pub mod metrics;
pub mod report;
pub mod stopper;
pub mod trial;

// Re-export commonly used types
pub use crate::config::TrialConfig;
pub use crate::creator::{DataCreator, TrialData};
pub use crate::error::{AutoTsError, Result};
pub use crate::metrics::{Metric, Mode};
pub use crate::report::{MemoryReporter, Reporter, TrialReport};
pub use crate::stopper::{StopCriteria, TrialStopper};
pub use crate::trial::{run_trial, TrialOutcome};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
