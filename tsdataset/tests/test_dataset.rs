use chrono::{Duration, NaiveDate, NaiveDateTime};
use polars::prelude::*;
use pretty_assertions::assert_eq;
use tsdataset::{DatasetError, ImputeMode, RollConfig, SamplingInterval, Schema, TSDataset};

fn hourly(n: usize) -> Vec<NaiveDateTime> {
    let start = NaiveDate::from_ymd_opt(2021, 6, 5)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();
    (0..n).map(|i| start + Duration::hours(i as i64)).collect()
}

/// Entity "b" (6 rows) listed before entity "a" (4 rows)
fn two_entities() -> DataFrame {
    let mut dt = hourly(6);
    dt.extend(hourly(4));
    DataFrame::new(vec![
        Series::new("id", &["b", "b", "b", "b", "b", "b", "a", "a", "a", "a"]),
        Series::new("datetime", dt),
        Series::new("value", &[10.0, 11.0, 12.0, 13.0, 14.0, 15.0, 0.0, 1.0, 2.0, 3.0]),
        Series::new("extra", &[1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 2.0, 2.0, 2.0, 2.0]),
    ])
    .unwrap()
}

fn dataset() -> TSDataset {
    TSDataset::new(
        two_entities(),
        Schema::new("id", "datetime", &["value"], &["extra"]),
    )
    .unwrap()
}

fn values(data: &TSDataset, name: &str) -> Vec<f64> {
    data.to_polars()
        .column(name)
        .unwrap()
        .cast(&DataType::Float64)
        .unwrap()
        .f64()
        .unwrap()
        .into_iter()
        .map(|v| v.unwrap_or(f64::NAN))
        .collect()
}

#[test]
fn test_construction_derives_state() {
    let data = dataset();
    assert_eq!(data.len(), 10);
    assert_eq!(data.id_list(), &["a".to_string(), "b".to_string()]);
    assert_eq!(
        data.interval(),
        Some(SamplingInterval::Duration(Duration::hours(1)))
    );
    assert_eq!(data.target_col(), &["value".to_string()]);
    assert_eq!(data.feature_col(), &["extra".to_string()]);
}

#[test]
fn test_integer_time_index_interval() {
    let df = df!(
        "id" => &[1i64, 1, 1, 1, 1],
        "t" => &[0i64, 1, 2, 4, 5],
        "value" => &[1.0, 2.0, 3.0, 4.0, 5.0]
    )
    .unwrap();
    let data = TSDataset::new(df, Schema::new("id", "t", &["value"], &[])).unwrap();
    assert_eq!(data.interval(), Some(SamplingInterval::Steps(1)));
    assert_eq!(data.id_list(), &["1".to_string()]);
}

#[test]
fn test_from_polars_without_id() {
    let df = df!(
        "t" => &[0i64, 1, 2],
        "value" => &[1.0, 2.0, 3.0]
    )
    .unwrap();
    let data = TSDataset::from_polars(df, "t", &["value"], None, &[]).unwrap();
    assert_eq!(data.id_col(), "id");
    assert_eq!(data.id_list(), &["0".to_string()]);
    assert_eq!(data.to_polars().width(), 3);
}

#[test]
fn test_from_polars_rejects_existing_id() {
    let df = df!(
        "id" => &["x", "x"],
        "t" => &[0i64, 1],
        "value" => &[1.0, 2.0]
    )
    .unwrap();
    let err = TSDataset::from_polars(df, "t", &["value"], None, &[]).unwrap_err();
    assert!(matches!(err, DatasetError::SchemaError(_)));
}

#[test]
fn test_missing_column_is_schema_error() {
    let err = TSDataset::new(
        two_entities(),
        Schema::new("id", "datetime", &["nope"], &[]),
    )
    .unwrap_err();
    match err {
        DatasetError::SchemaError(msg) => assert!(msg.contains("nope")),
        other => panic!("Expected SchemaError, got {:?}", other),
    }
}

#[test]
fn test_null_timestamp_is_schema_error() {
    let df = df!(
        "id" => &["a", "a", "a"],
        "t" => &[Some(0i64), None, Some(2)],
        "value" => &[1.0, 2.0, 3.0]
    )
    .unwrap();
    let err = TSDataset::new(df, Schema::new("id", "t", &["value"], &[])).unwrap_err();
    assert!(matches!(err, DatasetError::SchemaError(_)));
}

#[test]
fn test_column_in_both_roles_is_schema_error() {
    let err = TSDataset::new(
        two_entities(),
        Schema::new("id", "datetime", &["value"], &["value"]),
    )
    .unwrap_err();
    assert!(matches!(err, DatasetError::SchemaError(_)));
}

#[test]
fn test_text_timestamp_is_schema_error() {
    let df = df!(
        "id" => &["a", "a"],
        "t" => &["2021-01-01", "2021-01-02"],
        "value" => &[1.0, 2.0]
    )
    .unwrap();
    let err = TSDataset::new(df, Schema::new("id", "t", &["value"], &[])).unwrap_err();
    assert!(matches!(err, DatasetError::SchemaError(_)));
}

#[test]
fn test_impute_stays_within_entity() {
    let df = df!(
        "id" => &["a", "a", "b", "b"],
        "t" => &[0i64, 1, 0, 1],
        "value" => &[Some(1.0), Some(2.0), None, Some(5.0)]
    )
    .unwrap();
    let mut data = TSDataset::new(df, Schema::new("id", "t", &["value"], &[])).unwrap();
    data.impute(ImputeMode::Last).unwrap();
    assert_eq!(values(&data, "value"), vec![1.0, 2.0, 0.0, 5.0]);
}

#[test]
fn test_impute_linear_and_const() {
    let df = df!(
        "id" => &["a", "a", "a", "a"],
        "t" => &[0i64, 1, 2, 3],
        "value" => &[Some(1.0), None, Some(3.0), None],
        "extra" => &[None, Some(1.0), None, None]
    )
    .unwrap();
    let schema = Schema::new("id", "t", &["value"], &["extra"]);

    let mut linear = TSDataset::new(df.clone(), schema.clone()).unwrap();
    linear.impute(ImputeMode::Linear).unwrap();
    assert_eq!(values(&linear, "value"), vec![1.0, 2.0, 3.0, 3.0]);
    assert_eq!(values(&linear, "extra"), vec![1.0, 1.0, 1.0, 1.0]);

    let mut constant = TSDataset::new(df, schema).unwrap();
    constant.impute(ImputeMode::constant(-1.0)).unwrap();
    assert_eq!(values(&constant, "extra"), vec![-1.0, 1.0, -1.0, -1.0]);
}

#[test]
fn test_deduplicate_per_entity() {
    let df = df!(
        "id" => &["a", "a", "a", "a", "b", "b", "b"],
        "t" => &[0i64, 1, 1, 2, 0, 1, 2],
        "value" => &[1.0, 2.0, 99.0, 3.0, 10.0, 11.0, 12.0]
    )
    .unwrap();
    let mut data = TSDataset::new(df, Schema::new("id", "t", &["value"], &[])).unwrap();
    data.deduplicate().unwrap();
    assert_eq!(data.len(), 6);
    assert_eq!(
        values(&data, "value"),
        vec![1.0, 2.0, 3.0, 10.0, 11.0, 12.0]
    );
}

#[test]
fn test_gen_dt_feature_is_idempotent() {
    let mut data = dataset();
    data.gen_dt_feature().unwrap();
    assert_eq!(data.feature_col().len(), 11);
    assert_eq!(data.to_polars().width(), 14);

    data.gen_dt_feature().unwrap();
    assert_eq!(data.feature_col().len(), 11);
    assert_eq!(data.to_polars().width(), 14);
    assert!(data
        .feature_col()
        .contains(&"IS_WEEKEND(datetime)".to_string()));

    // 2021-06-05 is a Saturday
    assert_eq!(values(&data, "WEEKDAY(datetime)")[0], 5.0);
    assert_eq!(values(&data, "IS_WEEKEND(datetime)")[0], 1.0);
    assert_eq!(values(&data, "HOUR(datetime)")[3], 3.0);
}

#[test]
fn test_gen_dt_feature_needs_temporal_column() {
    let df = df!(
        "id" => &["a", "a"],
        "t" => &[0i64, 1],
        "value" => &[1.0, 2.0]
    )
    .unwrap();
    let mut data = TSDataset::new(df, Schema::new("id", "t", &["value"], &[])).unwrap();
    let err = data.gen_dt_feature().unwrap_err();
    assert!(matches!(err, DatasetError::SchemaError(_)));
    assert!(data.feature_col().is_empty());
    assert_eq!(data.to_polars().width(), 3);
}

#[test]
fn test_chained_pipeline() {
    let mut data = dataset();
    data.impute(ImputeMode::Last)
        .unwrap()
        .deduplicate()
        .unwrap()
        .gen_dt_feature()
        .unwrap()
        .roll(&RollConfig::new(2, 1))
        .unwrap();

    let (x, y) = data.to_ndarray().unwrap();
    assert_eq!(x.shape(), &[6, 2, 12]);
    assert_eq!(y.unwrap().shape(), &[6, 1, 1]);
}

#[test]
fn test_mutation_discards_rolled_tensors() {
    let mut data = dataset();
    data.roll(&RollConfig::new(2, 1)).unwrap();
    assert!(data.to_ndarray().is_ok());

    data.impute(ImputeMode::Last).unwrap();
    let err = data.to_ndarray().unwrap_err();
    assert!(matches!(err, DatasetError::StateError(_)));
    assert_eq!(data.roll_target(), Some(&["value".to_string()][..]));
}

#[test]
fn test_clone_is_independent() {
    let mut data = dataset();
    let copy = data.clone();
    data.gen_dt_feature().unwrap();
    assert_eq!(copy.feature_col().len(), 1);
    assert_eq!(copy.to_polars().width(), 4);
}

#[test]
fn test_into_polars_returns_table() {
    let df = dataset().into_polars();
    assert_eq!(df.shape(), (10, 4));
}
