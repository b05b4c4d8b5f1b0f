//! # AutoTS workspace
//!
//! Facade over the workspace crates:
//!
//! - [`tsdataset`]: the `TSDataset` time series abstraction (imputation,
//!   deduplication, calendar features, rolling windows, scaling)
//! - [`autots`]: the contract between a hyper-parameter search engine and the
//!   dataset (trial configs, per-trial data, metrics, stop criteria, reports)
//!
//! ## Example
//!
//! ```
//! use autots_workspace::autots::{Metric, Mode};
//! use autots_workspace::tsdataset::RollConfig;
//!
//! let config = RollConfig::new(24, 1).with_id_sensitive(true);
//! assert_eq!(config.lookback, 24);
//! assert_eq!(Metric::R2.mode(), Mode::Max);
//! ```

pub use autots;
pub use tsdataset;
