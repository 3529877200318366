use econ_mood::config::{DataConfig, DataLocation};
use econ_mood::data::{DataLoadError, DataProvider, DataSourceKind};
use econ_mood::questions;
use std::path::PathBuf;

fn missing_file() -> DataLocation {
    DataLocation::Path(PathBuf::from("/nonexistent/econ-mood/indicators.csv"))
}

fn scratch_csv(name: &str, contents: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("econ-mood-{}-{}.csv", std::process::id(), name));
    std::fs::write(&path, contents).expect("write scratch dataset");
    path
}

#[tokio::test]
async fn missing_real_dataset_falls_back_to_bundled_series() {
    let provider = DataProvider::from_config(DataConfig {
        location: missing_file(),
        ..DataConfig::default()
    })
    .expect("provider builds");

    let loaded = provider.series_map(None).await.expect("fallback load");
    assert_eq!(loaded.requested, DataSourceKind::Real);
    assert_eq!(loaded.served, DataSourceKind::Mock);
    assert!(loaded.fell_back());

    let validation = provider
        .validate_required_series(None, &questions::all_series())
        .await;
    assert!(validation.valid, "missing: {:?}", validation.missing);
}

#[tokio::test]
async fn missing_real_dataset_without_fallback_is_an_error() {
    let provider = DataProvider::from_config(DataConfig {
        location: missing_file(),
        fallback_to_mock: false,
        ..DataConfig::default()
    })
    .expect("provider builds");

    let error = provider.series_map(None).await.expect_err("no fallback");
    assert!(matches!(error, DataLoadError::Io { .. }));
    assert!(!provider.is_series_available(None, "UNRATE").await);
    assert!(provider.available_series(None).await.is_empty());
}

#[tokio::test]
async fn real_dataset_is_read_from_disk_and_cached() {
    let path = scratch_csv(
        "real",
        "series_id,date,value\n\
UNRATE,2024-01-01,3.7\n\
UNRATE,2024-02-01,.\n\
UNRATE,2024-03-01,3.8\n\
PAYEMS,2024-03-01,158000\n",
    );
    let provider = DataProvider::from_config(DataConfig {
        location: DataLocation::Path(path.clone()),
        ..DataConfig::default()
    })
    .expect("provider builds");

    let (loaded, summary) = provider.summary(None).await.expect("real load");
    assert_eq!(loaded.served, DataSourceKind::Real);
    assert_eq!(loaded.series.len(), 2);
    let unrate = summary
        .iter()
        .find(|entry| entry.code == "UNRATE")
        .expect("UNRATE summarized");
    assert_eq!(unrate.count, 2);
    assert_eq!(unrate.latest_value, 3.8);

    let info = provider.info(None).await;
    assert!(info.is_loaded);
    assert_eq!(info.series_count, 2);

    let validation = provider.validate_required_series(None, &["UNRATE", "DGS10"]).await;
    assert!(!validation.valid);
    assert_eq!(validation.missing, vec!["DGS10".to_string()]);

    // An explicit mock request is served independently of the real cache entry.
    let mock = provider
        .series_map(Some(DataSourceKind::Mock))
        .await
        .expect("mock load");
    assert!(mock.series.len() > loaded.series.len());

    std::fs::remove_file(&path).expect("remove scratch dataset");
}

#[tokio::test]
async fn reload_picks_up_a_replaced_file() {
    let path = scratch_csv("reload", "series_id,date,value\nUNRATE,2024-01-01,3.7\n");
    let provider = DataProvider::from_config(DataConfig {
        location: DataLocation::Path(path.clone()),
        ..DataConfig::default()
    })
    .expect("provider builds");

    assert_eq!(provider.series_map(None).await.expect("load").series.len(), 1);
    std::fs::write(
        &path,
        "series_id,date,value\nUNRATE,2024-01-01,3.7\nDGS10,2024-01-01,4.1\n",
    )
    .expect("rewrite scratch dataset");

    assert_eq!(provider.series_map(None).await.expect("cached").series.len(), 1);
    assert_eq!(provider.reload(None).await.expect("reload").series.len(), 2);

    std::fs::remove_file(&path).expect("remove scratch dataset");
}
