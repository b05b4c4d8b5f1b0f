use std::io;
use tsdataset::DatasetError;

#[test]
fn test_error_conversion() {
    let io_error = io::Error::new(io::ErrorKind::NotFound, "file not found");
    let error = DatasetError::from(io_error);
    assert!(matches!(error, DatasetError::IoError(_)));

    let json_error = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
    let error = DatasetError::from(json_error);
    assert!(matches!(error, DatasetError::SerializationError(_)));

    let polars_error = polars::prelude::PolarsError::ColumnNotFound("value".into());
    let error = DatasetError::from(polars_error);
    match error {
        DatasetError::PolarsError(msg) => assert!(msg.contains("value")),
        other => panic!("Expected PolarsError, got {:?}", other),
    }

    let shape_error = ndarray::Array2::<f64>::from_shape_vec((2, 2), vec![1.0]).unwrap_err();
    let error = DatasetError::from(shape_error);
    assert!(matches!(error, DatasetError::ShapeError { .. }));
}

#[test]
fn test_error_display() {
    let error = DatasetError::StateError("must roll before export".to_string());
    assert_eq!(error.to_string(), "State error: must roll before export");

    let error = DatasetError::ShapeError {
        expected: "2 channels".to_string(),
        actual: "3 channels".to_string(),
    };
    let message = format!("{}", error);
    assert!(message.contains("expected 2 channels"));
    assert!(message.contains("got 3 channels"));

    let io_error = io::Error::new(io::ErrorKind::PermissionDenied, "permission denied");
    let message = DatasetError::from(io_error).to_string();
    assert!(message.contains("IO error"));
    assert!(message.contains("permission denied"));
}
