use autots::AutoTsError;
use tsdataset::DatasetError;

#[test]
fn test_error_conversion() {
    let error = AutoTsError::from(DatasetError::StateError("must roll before export".to_string()));
    match error {
        AutoTsError::Dataset(DatasetError::StateError(msg)) => {
            assert_eq!(msg, "must roll before export")
        }
        other => panic!("Expected Dataset variant, got {:?}", other),
    }

    let json_error = serde_json::from_str::<serde_json::Value>("[1,").unwrap_err();
    assert!(matches!(
        AutoTsError::from(json_error),
        AutoTsError::SerializationError(_)
    ));
}

#[test]
fn test_error_display() {
    let error = AutoTsError::from(DatasetError::ConfigError("lookback should be a positive integer".to_string()));
    let message = error.to_string();
    assert!(message.starts_with("Dataset error"));
    assert!(message.contains("lookback should be a positive integer"));

    let error = AutoTsError::MetricError("unknown metric".to_string());
    assert_eq!(format!("{}", error), "Metric error: unknown metric");
}
