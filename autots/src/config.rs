//! Per-trial configuration sampled by the search engine

use crate::error::{AutoTsError, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tsdataset::{Horizon, RollConfig};

/// Lookback used when a trial does not sample one
pub const DEFAULT_LOOKBACK: usize = 5;
/// Horizon used when a trial does not sample one
pub const DEFAULT_HORIZON: usize = 1;

fn default_lookback() -> usize {
    DEFAULT_LOOKBACK
}

fn default_horizon() -> Horizon {
    Horizon::Steps(DEFAULT_HORIZON)
}

/// One point of the search space.
///
/// Window keys drive the rolling of the trial's data; every other key is kept
/// in `hyper_params` for the model:
///
/// ```json
/// {"lookback": 24, "horizon": [1, 6], "selected_features": ["HOUR(datetime)"],
///  "lr": 0.001, "batch_size": 32}
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrialConfig {
    #[serde(default = "default_lookback", alias = "past_seq_len")]
    pub lookback: usize,

    #[serde(default = "default_horizon", alias = "future_seq_len")]
    pub horizon: Horizon,

    /// Feature columns to roll; all dataset features when absent
    #[serde(default)]
    pub selected_features: Option<Vec<String>>,

    /// Target columns to roll; all dataset targets when absent
    #[serde(default)]
    pub target_col: Option<Vec<String>>,

    #[serde(default)]
    pub id_sensitive: bool,

    /// Model hyper-parameters
    #[serde(flatten)]
    pub hyper_params: Map<String, Value>,
}

impl TrialConfig {
    /// Config with the given window and no hyper-parameters
    pub fn new(lookback: usize, horizon: impl Into<Horizon>) -> Self {
        Self {
            lookback,
            horizon: horizon.into(),
            selected_features: None,
            target_col: None,
            id_sensitive: false,
            hyper_params: Map::new(),
        }
    }

    /// Parse a config from a JSON object string
    pub fn from_json(json: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(json)?;
        Self::from_value(value)
    }

    /// Parse a config from a JSON object
    pub fn from_value(value: Value) -> Result<Self> {
        if !value.is_object() {
            return Err(AutoTsError::ConfigError(format!(
                "a trial config should be a JSON object but found {}",
                value
            )));
        }
        let config: TrialConfig = serde_json::from_value(value)?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_selected_features<S: AsRef<str>>(mut self, features: &[S]) -> Self {
        self.selected_features = Some(features.iter().map(|f| f.as_ref().to_string()).collect());
        self
    }

    pub fn with_id_sensitive(mut self, id_sensitive: bool) -> Self {
        self.id_sensitive = id_sensitive;
        self
    }

    pub fn with_hyper_param(mut self, key: &str, value: Value) -> Self {
        self.hyper_params.insert(key.to_string(), value);
        self
    }

    /// Look up a model hyper-parameter
    pub fn hyper_param(&self, key: &str) -> Option<&Value> {
        self.hyper_params.get(key)
    }

    /// Check the window parameters
    pub fn validate(&self) -> Result<()> {
        self.roll_config().validate()?;
        Ok(())
    }

    /// Rolling parameters of this trial
    pub fn roll_config(&self) -> RollConfig {
        RollConfig {
            lookback: self.lookback,
            horizon: self.horizon.clone(),
            feature_col: self.selected_features.clone(),
            target_col: self.target_col.clone(),
            id_sensitive: self.id_sensitive,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_defaults() {
        let config = TrialConfig::from_value(json!({})).unwrap();
        assert_eq!(config.lookback, DEFAULT_LOOKBACK);
        assert_eq!(config.horizon, Horizon::Steps(DEFAULT_HORIZON));
        assert!(config.hyper_params.is_empty());
    }

    #[test]
    fn test_extra_keys_are_hyper_params() {
        let config = TrialConfig::from_json(
            r#"{"lookback": 8, "horizon": 2, "lr": 0.01, "batch_size": 32}"#,
        )
        .unwrap();
        assert_eq!(config.lookback, 8);
        assert_eq!(config.hyper_param("batch_size"), Some(&json!(32)));
        assert_eq!(config.hyper_params.len(), 2);
    }

    #[test]
    fn test_seq_len_aliases() {
        let config = TrialConfig::from_value(json!({
            "past_seq_len": 12,
            "future_seq_len": [1, 3],
            "selected_features": ["a", "b"]
        }))
        .unwrap();
        let roll = config.roll_config();
        assert_eq!(roll.lookback, 12);
        assert_eq!(roll.horizon, Horizon::Offsets(vec![1, 3]));
        assert_eq!(roll.feature_col, Some(vec!["a".to_string(), "b".to_string()]));
    }

    #[test]
    fn test_invalid_window() {
        assert!(matches!(
            TrialConfig::from_value(json!({"lookback": 0})).unwrap_err(),
            AutoTsError::Dataset(_)
        ));
        assert!(matches!(
            TrialConfig::from_value(json!([1, 2])).unwrap_err(),
            AutoTsError::ConfigError(_)
        ));
        assert!(matches!(
            TrialConfig::from_json(r#"{"lookback": "long"}"#).unwrap_err(),
            AutoTsError::SerializationError(_)
        ));
    }
}
