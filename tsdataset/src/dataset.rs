//! The `TSDataset` time series dataset

use crate::dedup::deduplicate_frame;
use crate::error::{DatasetError, Result};
use crate::features::{feature_names, generate_dt_features};
use crate::impute::{impute_frame, ImputeMode};
use crate::roll::{concat_channels, concat_samples, roll_entity, RollConfig, RollOutput, WindowShape};
use crate::scale::{unscale_timeseries_ndarray, Scaler};
use crate::schema::{check_col_numeric, to_list, Schema};
use crate::split::{entity_ids, EntityPartitions};
use crate::time::{self, SamplingInterval};
use crate::utils::{frame_to_matrix, matrix_to_series};
use ndarray::{Array2, Array3};
use polars::prelude::*;
use std::fs::File;
use std::path::Path;
use tracing::{debug, warn};

/// Identifier column added when the input has none
pub const DEFAULT_ID_COL_NAME: &str = "id";
/// Identifier value of the single entity of an id-less input
pub const DEFAULT_ID_PLACEHOLDER: &str = "0";

/// Bookkeeping of the last rolling call, kept for prediction unscaling
#[derive(Debug, Clone)]
struct RollState {
    config: RollConfig,
    target_col: Vec<String>,
    feature_col: Vec<String>,
    num_entities: usize,
}

/// Fitted scaler and the columns it was applied to, in matrix order
#[derive(Debug, Clone)]
struct ScaleState {
    scaler: Box<dyn Scaler>,
    columns: Vec<String>,
}

/// A multi-entity time series table with its schema.
///
/// Mutating operations take `&mut self` and return `Result<&mut Self>` so they
/// can be chained:
///
/// ```no_run
/// # use tsdataset::{ImputeMode, RollConfig, TSDataset};
/// # fn run(mut data: TSDataset) -> tsdataset::Result<()> {
/// data.impute(ImputeMode::Last)?
///     .deduplicate()?
///     .gen_dt_feature()?
///     .roll(&RollConfig::new(24, 1))?;
/// let (x, y) = data.to_ndarray()?;
/// # Ok(())
/// # }
/// ```
///
/// Every mutation builds the new table completely, validates it against the
/// schema and only then swaps it in. Mutations of the table discard rolled
/// tensors, so they have to be rolled again before export.
#[derive(Debug, Clone)]
pub struct TSDataset {
    df: DataFrame,
    schema: Schema,
    id_list: Vec<String>,
    interval: Option<SamplingInterval>,
    rolled: Option<RollOutput>,
    roll_state: Option<RollState>,
    scale_state: Option<ScaleState>,
}

impl TSDataset {
    /// Wrap `df` with `schema`, validating it eagerly
    pub fn new(df: DataFrame, schema: Schema) -> Result<Self> {
        schema.validate(&df)?;
        let id_list = entity_ids(&df, &schema.id_col)?;
        let parts = EntityPartitions::split(&df, &schema.id_col, &id_list)?;
        let interval = infer_interval(&df, &schema.dt_col, &parts)?;

        debug!(
            rows = df.height(),
            entities = id_list.len(),
            targets = schema.target_col.len(),
            features = schema.feature_col.len(),
            "created TSDataset"
        );

        Ok(Self {
            df,
            schema,
            id_list,
            interval,
            rolled: None,
            roll_state: None,
            scale_state: None,
        })
    }

    /// Create a dataset from a polars DataFrame.
    ///
    /// Without `id_col` the whole table is a single entity: an `"id"` column
    /// holding `"0"` is added.
    pub fn from_polars(
        df: DataFrame,
        dt_col: &str,
        target_col: &[&str],
        id_col: Option<&str>,
        extra_feature_col: &[&str],
    ) -> Result<Self> {
        let mut df = df;
        let id_col = match id_col {
            Some(name) => name.to_string(),
            None => {
                if df.get_column_names().contains(&DEFAULT_ID_COL_NAME) {
                    return Err(DatasetError::SchemaError(format!(
                        "{} column already exists; pass it as id_col",
                        DEFAULT_ID_COL_NAME
                    )));
                }
                let ids = vec![DEFAULT_ID_PLACEHOLDER; df.height()];
                df.with_column(Series::new(DEFAULT_ID_COL_NAME, ids))?;
                DEFAULT_ID_COL_NAME.to_string()
            }
        };

        let schema = Schema {
            id_col,
            dt_col: dt_col.to_string(),
            target_col: to_list(target_col),
            feature_col: to_list(extra_feature_col),
        };
        Self::new(df, schema)
    }

    /// Load a dataset from a CSV file with a header row; dates are parsed
    pub fn from_csv<P: AsRef<Path>>(path: P, schema: Schema) -> Result<Self> {
        let file = File::open(path)?;
        let df = CsvReader::new(file)
            .infer_schema(None)
            .has_header(true)
            .with_try_parse_dates(true)
            .finish()?;

        Self::new(df, schema)
    }

    /// Get the DataFrame
    pub fn to_polars(&self) -> &DataFrame {
        &self.df
    }

    /// Take the DataFrame out of the dataset
    pub fn into_polars(self) -> DataFrame {
        self.df
    }

    /// Column roles of the dataset
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Name of the entity identifier column
    pub fn id_col(&self) -> &str {
        &self.schema.id_col
    }

    /// Name of the timestamp column
    pub fn dt_col(&self) -> &str {
        &self.schema.dt_col
    }

    /// Target columns
    pub fn target_col(&self) -> &[String] {
        &self.schema.target_col
    }

    /// Feature columns
    pub fn feature_col(&self) -> &[String] {
        &self.schema.feature_col
    }

    /// Distinct entity identifiers, in processing order
    pub fn id_list(&self) -> &[String] {
        &self.id_list
    }

    /// Sampling interval inferred from the first entity, if it has two rows
    pub fn interval(&self) -> Option<SamplingInterval> {
        self.interval
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.df.height()
    }

    /// Check if the table is empty
    pub fn is_empty(&self) -> bool {
        self.df.height() == 0
    }

    /// Scaler stored by the last [`TSDataset::scale`] call
    pub fn scaler(&self) -> Option<&dyn Scaler> {
        self.scale_state.as_ref().map(|s| &*s.scaler)
    }

    /// A copy of the fitted scaler, to transform validation or test data
    pub fn fitted_scaler(&self) -> Result<Box<dyn Scaler>> {
        self.scale_state
            .as_ref()
            .map(|s| s.scaler.clone())
            .ok_or_else(|| {
                DatasetError::StateError("must scale before a scaler is available".to_string())
            })
    }

    fn partitions(&self) -> Result<EntityPartitions> {
        EntityPartitions::split(&self.df, &self.schema.id_col, &self.id_list)
    }

    /// Validate and install a new table and schema
    fn commit(&mut self, df: DataFrame, schema: Schema) -> Result<()> {
        schema.validate(&df)?;
        self.df = df;
        self.schema = schema;
        self.rolled = None;
        Ok(())
    }

    /// Fill missing target and feature values entity by entity
    pub fn impute(&mut self, mode: ImputeMode) -> Result<&mut Self> {
        let columns = self.schema.value_columns();
        let df = self
            .partitions()?
            .try_map(|_, part| impute_frame(part, &columns, mode))?
            .concat()?;

        debug!(%mode, rows = df.height(), "imputed");
        self.commit(df, self.schema.clone())?;
        Ok(self)
    }

    /// Drop rows repeating an earlier timestamp of the same entity
    pub fn deduplicate(&mut self) -> Result<&mut Self> {
        let dt_col = self.schema.dt_col.clone();
        let before = self.df.height();
        let df = self
            .partitions()?
            .try_map(|_, part| deduplicate_frame(part, &dt_col))?
            .concat()?;

        debug!(removed = before - df.height(), "deduplicated");
        self.commit(df, self.schema.clone())?;
        Ok(self)
    }

    /// Generate calendar features from the timestamp column.
    ///
    /// Adds `MINUTE`, `DAY`, `DAYOFYEAR`, `HOUR`, `WEEKDAY`, `WEEKOFYEAR`,
    /// `MONTH`, `IS_AWAKE`, `IS_BUSY_HOURS` and `IS_WEEKEND`, each named
    /// `NAME(dt_col)`, to the feature columns. Calling it again recomputes the
    /// columns without listing them twice.
    pub fn gen_dt_feature(&mut self) -> Result<&mut Self> {
        let dt_col = self.schema.dt_col.clone();
        let df = self
            .partitions()?
            .try_map(|_, part| generate_dt_features(part, &dt_col))?
            .concat()?;

        let mut schema = self.schema.clone();
        for name in feature_names(&dt_col) {
            if !schema.feature_col.contains(&name) {
                schema.feature_col.push(name);
            }
        }

        self.commit(df, schema)?;
        Ok(self)
    }

    /// Cut every entity into `(lookback, horizon)` samples.
    ///
    /// Without `id_sensitive` the samples of all entities are pooled:
    /// `x` is `(samples, lookback, n_target + n_feature)` and `y` is
    /// `(samples, horizon_len, n_target)`. With `id_sensitive` entities become
    /// channels of one series aligned to the shortest entity: `x` is
    /// `(samples, lookback, n_entity * (n_target + n_feature))` with every
    /// entity's targets before its features, and `y` is
    /// `(samples, horizon_len, n_entity * n_target)`. A zero horizon yields no
    /// `y`.
    pub fn roll(&mut self, config: &RollConfig) -> Result<&mut Self> {
        config.validate()?;

        let target_col = config
            .target_col
            .clone()
            .unwrap_or_else(|| self.schema.target_col.clone());
        let feature_col = config
            .feature_col
            .clone()
            .unwrap_or_else(|| self.schema.feature_col.clone());
        if target_col.is_empty() {
            return Err(DatasetError::ConfigError(
                "at least one target column should be rolled".to_string(),
            ));
        }
        for name in target_col.iter().chain(feature_col.iter()) {
            check_col_numeric(&self.df, name)?;
        }

        let input_col: Vec<String> = target_col.iter().chain(feature_col.iter()).cloned().collect();
        let fits = |steps: usize, columns: usize| {
            matches!(steps.checked_mul(columns), Some(n) if n <= isize::MAX as usize)
        };
        if !fits(config.lookback, input_col.len())
            || !fits(config.horizon.horizon_len(), target_col.len())
        {
            return Err(DatasetError::ConfigError(format!(
                "lookback {} and horizon {} are too large for {} rolled columns",
                config.lookback,
                config.horizon.horizon_len(),
                input_col.len()
            )));
        }
        let parts = self.partitions()?;
        let windows = parts.try_collect(|entity, part| {
            let input = frame_to_matrix(part, &input_col)?;
            let target = frame_to_matrix(part, &target_col)?;
            let w = roll_entity(input.view(), target.view(), config.lookback, &config.horizon);
            if w.samples() == 0 {
                warn!(entity, rows = part.height(), "entity is too short to yield any window");
            }
            Ok(w)
        })?;

        let shape = WindowShape {
            lookback: config.lookback,
            horizon_len: config.horizon.horizon_len(),
            n_input: input_col.len(),
            n_target: target_col.len(),
            has_target: !config.horizon.is_none(),
        };
        let output = if config.id_sensitive {
            concat_channels(&windows, shape)?
        } else {
            concat_samples(&windows, shape)?
        };

        self.rolled = Some(output);
        self.roll_state = Some(RollState {
            config: config.clone(),
            target_col,
            feature_col,
            num_entities: parts.len(),
        });
        Ok(self)
    }

    /// Rolled tensors `(x, y)`; `y` is `None` for a zero horizon
    pub fn to_ndarray(&self) -> Result<(&Array3<f64>, Option<&Array3<f64>>)> {
        let rolled = self.rolled.as_ref().ok_or_else(not_rolled)?;
        Ok((&rolled.x, rolled.y.as_ref()))
    }

    /// Consume the dataset and return the rolled tensors
    pub fn into_ndarray(self) -> Result<(Array3<f64>, Option<Array3<f64>>)> {
        let rolled = self.rolled.ok_or_else(not_rolled)?;
        Ok((rolled.x, rolled.y))
    }

    /// Parameters of the last rolling call
    pub fn roll_config(&self) -> Option<&RollConfig> {
        self.roll_state.as_ref().map(|s| &s.config)
    }

    /// Feature columns of the last rolling call
    pub fn roll_feature(&self) -> Option<&[String]> {
        self.roll_state.as_ref().map(|s| s.feature_col.as_slice())
    }

    /// Target columns of the last rolling call
    pub fn roll_target(&self) -> Option<&[String]> {
        self.roll_state.as_ref().map(|s| s.target_col.as_slice())
    }

    /// Scale target and feature columns.
    ///
    /// `fit` should be true for the training set; validation and test sets
    /// reuse the training scaler with `fit = false`, e.g.
    /// `val.scale(train.fitted_scaler()?, false)`.
    pub fn scale<S: Scaler + 'static>(&mut self, scaler: S, fit: bool) -> Result<&mut Self> {
        let mut scaler = scaler;
        let columns = self.schema.value_columns();
        let matrix = frame_to_matrix(&self.df, &columns)?;
        let scaled = if fit {
            scaler.fit_transform(&matrix)?
        } else {
            scaler.transform(&matrix)?
        };

        let df = replace_columns(&self.df, &scaled, &columns)?;
        self.commit(df, self.schema.clone())?;
        self.scale_state = Some(ScaleState {
            scaler: Box::new(scaler),
            columns,
        });
        Ok(self)
    }

    /// Undo the scaling of the columns scaled by [`TSDataset::scale`]
    pub fn unscale(&mut self) -> Result<&mut Self> {
        let state = self.scale_state.as_ref().ok_or_else(|| {
            DatasetError::StateError("must scale before unscale".to_string())
        })?;
        let matrix = frame_to_matrix(&self.df, &state.columns)?;
        let restored = state.scaler.inverse_transform(&matrix)?;

        let df = replace_columns(&self.df, &restored, &state.columns)?;
        self.commit(df, self.schema.clone())?;
        Ok(self)
    }

    /// Unscale a prediction tensor shaped like the rolled `y`.
    ///
    /// Each channel is mapped back to the scaler column of its target; in
    /// `id_sensitive` mode the target mapping repeats once per entity.
    pub fn unscale_predictions(&self, pred: &Array3<f64>) -> Result<Array3<f64>> {
        let scale = self.scale_state.as_ref().ok_or_else(|| {
            DatasetError::StateError("must scale before unscaling predictions".to_string())
        })?;
        let roll = self.roll_state.as_ref().ok_or_else(|| {
            DatasetError::StateError("must roll before unscaling predictions".to_string())
        })?;

        let index = roll
            .target_col
            .iter()
            .map(|name| {
                scale.columns.iter().position(|c| c == name).ok_or_else(|| {
                    DatasetError::SchemaError(format!("{} was not scaled by the stored scaler", name))
                })
            })
            .collect::<Result<Vec<usize>>>()?;
        let repeat = if roll.config.id_sensitive {
            roll.num_entities
        } else {
            1
        };
        let scaler_index = index.repeat(repeat);

        unscale_timeseries_ndarray(pred, &*scale.scaler, &scaler_index, scale.columns.len())
    }
}

fn not_rolled() -> DatasetError {
    DatasetError::StateError(
        "must roll before export: call `roll` before converting a TSDataset to ndarray".to_string(),
    )
}

/// Copy of `df` with `columns` replaced by the columns of `matrix`
fn replace_columns(df: &DataFrame, matrix: &Array2<f64>, columns: &[String]) -> Result<DataFrame> {
    if matrix.dim() != (df.height(), columns.len()) {
        return Err(DatasetError::ShapeError {
            expected: format!("({}, {})", df.height(), columns.len()),
            actual: format!("{:?}", matrix.dim()),
        });
    }
    let mut out = df.clone();
    for series in matrix_to_series(matrix, columns) {
        out.with_column(series)?;
    }
    Ok(out)
}

/// Sampling interval of the first entity; warns about irregular entities
fn infer_interval(
    df: &DataFrame,
    dt_col: &str,
    parts: &EntityPartitions,
) -> Result<Option<SamplingInterval>> {
    let dtype = df.column(dt_col)?.dtype().clone();
    let spacings = parts.try_collect(|_, part| Ok(time::spacing(&time::ticks(part.column(dt_col)?)?)))?;

    for (entity, spacing) in parts.ids().zip(spacings.iter()) {
        if let Some(s) = spacing {
            if !s.uniform {
                warn!(entity, "timestamps are not evenly spaced");
            }
        }
    }

    Ok(spacings
        .into_iter()
        .next()
        .flatten()
        .map(|s| time::tick_interval(&dtype, s.delta)))
}
