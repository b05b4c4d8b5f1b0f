//! # TSDataset
//!
//! Time series dataset abstraction for forecasting pipelines.
//!
//! ## Features
//!
//! - Multi-entity tables keyed by an identifier column and a timestamp column
//! - Per-entity imputation (`last`, `const`, `linear`) and timestamp deduplication
//! - Calendar feature generation from the timestamp column
//! - Rolling windows into `(samples, lookback, channels)` tensors, pooled over
//!   entities or aligned across entities (`id_sensitive`)
//! - Column-wise scaling with unscaling of prediction tensors
//!
//! ## Quick Start
//!
//! ```rust
//! use polars::prelude::*;
//! use tsdataset::{ColumnScaler, ImputeMode, RollConfig, TSDataset};
//!
//! # fn main() -> tsdataset::Result<()> {
//! let df = df!(
//!     "timestamp" => &[0i64, 1, 2, 3, 4, 5],
//!     "value" => &[Some(1.0), None, Some(3.0), Some(4.0), Some(5.0), Some(6.0)],
//!     "extra" => &[1.0, 1.0, 2.0, 2.0, 3.0, 3.0]
//! )?;
//!
//! let mut data = TSDataset::from_polars(df, "timestamp", &["value"], None, &["extra"])?;
//! data.impute(ImputeMode::Linear)?
//!     .scale(ColumnScaler::standard(), true)?
//!     .roll(&RollConfig::new(3, 1))?;
//!
//! let (x, y) = data.to_ndarray()?;
//! assert_eq!(x.shape(), &[3, 3, 2]);
//! assert_eq!(y.map(|y| y.shape().to_vec()), Some(vec![3, 1, 1]));
//! # Ok(())
//! # }
//! ```

pub mod dataset;
pub mod dedup;
pub mod error;
pub mod features;
pub mod impute;
pub mod roll;
pub mod scale;
pub mod schema;
pub mod split;
pub mod time;
pub mod utils;

// Re-export commonly used types
pub use crate::dataset::TSDataset;
pub use crate::error::{DatasetError, Result};
pub use crate::impute::ImputeMode;
pub use crate::roll::{Horizon, RollConfig};
pub use crate::scale::{ColumnScaler, Scaler, ScalerType};
pub use crate::schema::Schema;
pub use crate::time::SamplingInterval;

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
