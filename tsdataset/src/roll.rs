//! Rolling window engine
//!
//! Turns each entity's row sequence into fixed-length `(lookback, horizon)`
//! samples and joins the per-entity results either along the sample axis
//! (long mode) or along the channel axis (wide, `id_sensitive` mode).
//!
//! Input channels of a window row are the rolled target columns followed by
//! the rolled feature columns. In wide mode the channel axis therefore reads
//! `[e0 targets, e0 features, e1 targets, e1 features, ...]` and the target
//! tensor `[e0 targets, e1 targets, ...]`.

use crate::error::{DatasetError, Result};
use ndarray::{concatenate, s, Array3, ArrayView2, ArrayView3, Axis};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Future steps that form the prediction target
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Horizon {
    /// `n` contiguous steps after the forecasting point; `0` means no target
    Steps(usize),
    /// Explicit 1-based offsets after the forecasting point
    Offsets(Vec<usize>),
}

impl Horizon {
    /// Reject empty offset lists and offsets below 1
    pub fn validate(&self) -> Result<()> {
        match self {
            Horizon::Steps(_) => Ok(()),
            Horizon::Offsets(offsets) if offsets.is_empty() => Err(DatasetError::ConfigError(
                "horizon offsets should not be empty".to_string(),
            )),
            Horizon::Offsets(offsets) => match offsets.iter().find(|o| **o == 0) {
                Some(_) => Err(DatasetError::ConfigError(format!(
                    "horizon offsets should all be >= 1 but found {:?}",
                    offsets
                ))),
                None => Ok(()),
            },
        }
    }

    /// Whether no target should be generated
    pub fn is_none(&self) -> bool {
        matches!(self, Horizon::Steps(0))
    }

    /// Furthest future step needed
    pub fn max_offset(&self) -> usize {
        match self {
            Horizon::Steps(n) => *n,
            Horizon::Offsets(offsets) => offsets.iter().copied().max().unwrap_or(0),
        }
    }

    /// Number of target steps per sample
    pub fn horizon_len(&self) -> usize {
        match self {
            Horizon::Steps(n) => *n,
            Horizon::Offsets(offsets) => offsets.len(),
        }
    }

    /// Offsets sampled for every window, in output order
    pub fn offsets(&self) -> Vec<usize> {
        match self {
            Horizon::Steps(n) => (1..=*n).collect(),
            Horizon::Offsets(offsets) => offsets.clone(),
        }
    }
}

impl From<usize> for Horizon {
    fn from(steps: usize) -> Self {
        Horizon::Steps(steps)
    }
}

impl From<Vec<usize>> for Horizon {
    fn from(offsets: Vec<usize>) -> Self {
        Horizon::Offsets(offsets)
    }
}

impl From<&[usize]> for Horizon {
    fn from(offsets: &[usize]) -> Self {
        Horizon::Offsets(offsets.to_vec())
    }
}

/// Parameters of one rolling call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RollConfig {
    /// Historical steps per sample
    pub lookback: usize,
    /// Future steps per sample
    pub horizon: Horizon,
    /// Feature columns to roll; the dataset's features when `None`
    #[serde(default)]
    pub feature_col: Option<Vec<String>>,
    /// Target columns to roll; the dataset's targets when `None`
    #[serde(default)]
    pub target_col: Option<Vec<String>>,
    /// Treat entities as parallel channels of one joint series
    #[serde(default)]
    pub id_sensitive: bool,
}

impl RollConfig {
    /// Create a config with default columns and long mode
    pub fn new(lookback: usize, horizon: impl Into<Horizon>) -> Self {
        Self {
            lookback,
            horizon: horizon.into(),
            feature_col: None,
            target_col: None,
            id_sensitive: false,
        }
    }

    /// Roll only these feature columns
    pub fn with_feature_col<S: AsRef<str>>(mut self, columns: &[S]) -> Self {
        self.feature_col = Some(columns.iter().map(|c| c.as_ref().to_string()).collect());
        self
    }

    /// Roll only these target columns
    pub fn with_target_col<S: AsRef<str>>(mut self, columns: &[S]) -> Self {
        self.target_col = Some(columns.iter().map(|c| c.as_ref().to_string()).collect());
        self
    }

    /// Switch between long and wide mode
    pub fn with_id_sensitive(mut self, id_sensitive: bool) -> Self {
        self.id_sensitive = id_sensitive;
        self
    }

    /// Check window parameters
    pub fn validate(&self) -> Result<()> {
        if self.lookback == 0 {
            return Err(DatasetError::ConfigError(
                "lookback should be a positive integer".to_string(),
            ));
        }
        self.horizon.validate()?;
        let span = self.lookback.checked_add(self.horizon.max_offset());
        if !matches!(span, Some(span) if span <= isize::MAX as usize) {
            return Err(DatasetError::ConfigError(format!(
                "lookback {} with horizon {} exceeds the largest possible window",
                self.lookback,
                self.horizon.max_offset()
            )));
        }
        Ok(())
    }
}

/// Number of windows an entity with `rows` rows yields
pub fn window_count(rows: usize, lookback: usize, horizon: &Horizon) -> usize {
    match lookback.checked_add(horizon.max_offset()) {
        Some(span) if rows >= span => rows - span + 1,
        _ => 0,
    }
}

/// Windows cut from one entity
#[derive(Debug, Clone)]
pub struct EntityWindows {
    /// `(samples, lookback, n_input)`
    pub x: Array3<f64>,
    /// `(samples, horizon_len, n_target)`, absent for a zero horizon
    pub y: Option<Array3<f64>>,
}

impl EntityWindows {
    /// Number of samples
    pub fn samples(&self) -> usize {
        self.x.shape()[0]
    }
}

/// Cut all windows of one entity.
///
/// `input` is `(rows, n_input)` and `target` is `(rows, n_target)`; sample `i`
/// reads input rows `i .. i + lookback` and, for every offset `o`, target row
/// `i + lookback - 1 + o`.
pub fn roll_entity(
    input: ArrayView2<f64>,
    target: ArrayView2<f64>,
    lookback: usize,
    horizon: &Horizon,
) -> EntityWindows {
    let count = window_count(input.nrows(), lookback, horizon);
    let x = Array3::from_shape_fn((count, lookback, input.ncols()), |(i, j, c)| {
        input[[i + j, c]]
    });

    let y = if horizon.is_none() {
        None
    } else if count == 0 {
        Some(Array3::zeros((0, horizon.horizon_len(), target.ncols())))
    } else {
        let offsets = horizon.offsets();
        Some(Array3::from_shape_fn(
            (count, offsets.len(), target.ncols()),
            |(i, k, c)| target[[i + lookback - 1 + offsets[k], c]],
        ))
    };

    EntityWindows { x, y }
}

/// Joined tensors of a rolling call
#[derive(Debug, Clone)]
pub struct RollOutput {
    pub x: Array3<f64>,
    pub y: Option<Array3<f64>>,
}

/// Shape parameters needed to build empty outputs
#[derive(Debug, Clone, Copy)]
pub struct WindowShape {
    pub lookback: usize,
    pub horizon_len: usize,
    pub n_input: usize,
    pub n_target: usize,
    pub has_target: bool,
}

/// Long mode: pool every entity's samples along the sample axis
pub fn concat_samples(parts: &[EntityWindows], shape: WindowShape) -> Result<RollOutput> {
    let x = join(
        parts.iter().map(|p| p.x.view()).collect(),
        Axis(0),
        (0, shape.lookback, shape.n_input),
    )?;
    let y = if shape.has_target {
        Some(join(
            parts.iter().filter_map(|p| p.y.as_ref().map(|y| y.view())).collect(),
            Axis(0),
            (0, shape.horizon_len, shape.n_target),
        )?)
    } else {
        None
    };

    debug!(samples = x.shape()[0], entities = parts.len(), "pooled rolling windows");
    Ok(RollOutput { x, y })
}

/// Wide mode: align entities to the shortest sample count and join them
/// along the channel axis
pub fn concat_channels(parts: &[EntityWindows], shape: WindowShape) -> Result<RollOutput> {
    let samples = parts.iter().map(EntityWindows::samples).min().unwrap_or(0);
    if parts.iter().any(|p| p.samples() != samples) {
        warn!(
            samples,
            "entities yield different window counts; truncating to the shortest"
        );
    }

    let entities = parts.len();
    let x = join(
        parts.iter().map(|p| p.x.slice(s![..samples, .., ..])).collect(),
        Axis(2),
        (samples, shape.lookback, entities * shape.n_input),
    )?;
    let y = if shape.has_target {
        Some(join(
            parts
                .iter()
                .filter_map(|p| p.y.as_ref().map(|y| y.slice(s![..samples, .., ..])))
                .collect(),
            Axis(2),
            (samples, shape.horizon_len, entities * shape.n_target),
        )?)
    } else {
        None
    };

    debug!(samples, entities, channels = x.shape()[2], "aligned rolling windows");
    Ok(RollOutput { x, y })
}

fn join(
    views: Vec<ArrayView3<f64>>,
    axis: Axis,
    empty: (usize, usize, usize),
) -> Result<Array3<f64>> {
    if views.is_empty() {
        return Ok(Array3::zeros(empty));
    }
    Ok(concatenate(axis, &views)?)
}
