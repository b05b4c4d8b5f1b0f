use std::path::PathBuf;
use tsdataset::{ColumnScaler, ImputeMode, RollConfig, Schema, TSDataset};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tsdataset=debug".into()),
        )
        .init();

    let csv_path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("examples")
        .join("data")
        .join("hourly_load.csv");

    println!("Loading data from: {}", csv_path.display());
    let schema = Schema::new("station", "datetime", &["load"], &["temperature"]);
    let mut data = TSDataset::from_csv(csv_path, schema)?;
    println!(
        "Loaded {} rows for stations {:?}, interval {:?}",
        data.len(),
        data.id_list(),
        data.interval()
    );

    data.deduplicate()?
        .impute(ImputeMode::Linear)?
        .gen_dt_feature()?
        .scale(ColumnScaler::standard(), true)?;
    println!("Features: {:?}", data.feature_col());

    // Pooled samples from both stations
    data.roll(&RollConfig::new(24, 1))?;
    let (x, y) = data.to_ndarray()?;
    println!("pooled x: {:?}", x.shape());
    if let Some(y) = y {
        println!("pooled y: {:?}", y.shape());
    }

    // Stations as channels of one series
    data.roll(&RollConfig::new(24, vec![1, 6]).with_id_sensitive(true))?;
    let (x, y) = data.to_ndarray()?;
    println!("wide x: {:?}", x.shape());

    if let Some(y) = y {
        let restored = data.unscale_predictions(y)?;
        println!("first restored targets: {:?}", restored.slice(ndarray::s![0, .., ..]));
    }

    Ok(())
}
