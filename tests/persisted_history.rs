use async_trait::async_trait;
use sector_datahub::config::Config;
use sector_datahub::scrapers::{FetchOutcome, ReportFetcher};
use sector_datahub::storage::{DocumentStore, JsonFileStore};
use sector_datahub::util::parse_date;
use sector_datahub::{DailyRecord, Mover, ReportError, ReportStore, SectorRecord, SectorSet};
use std::sync::Arc;
use tempfile::TempDir;

struct FixedFetcher(Option<SectorSet>);

#[async_trait]
impl ReportFetcher for FixedFetcher {
    fn source_name(&self) -> &'static str {
        "fixed"
    }

    async fn fetch_sector_report(&self) -> FetchOutcome {
        match &self.0 {
            Some(sectors) => FetchOutcome::Good(sectors.clone()),
            None => FetchOutcome::Bad,
        }
    }
}

fn sectors(tech: f64, energy: f64) -> SectorSet {
    SectorSet::from_records(vec![
        SectorRecord::new("Tech", tech, Mover::new("AAPL", 4.0), Mover::new("IBM", -1.0)),
        SectorRecord::new("Energy", energy, Mover::none(), Mover::new("XOM", -6.0)),
    ])
    .unwrap()
}

fn config_for(dir: &TempDir) -> Config {
    Config::new()
        .with_data_dir(dir.path().to_str().unwrap())
        .with_database("finance")
        .with_collection("sectors")
}

fn open_store(config: &Config, fetched: Option<SectorSet>) -> ReportStore {
    let documents = JsonFileStore::open(config).unwrap();
    ReportStore::new(Box::new(documents), Arc::new(FixedFetcher(fetched))).unwrap()
}

#[tokio::test]
async fn refreshed_reports_survive_reopening() {
    let dir = TempDir::new().unwrap();
    let config = config_for(&dir);

    {
        let mut documents = JsonFileStore::open(&config).unwrap();
        documents
            .insert(&DailyRecord::new(parse_date("2020-01-01").unwrap(), sectors(1.0, -0.5)))
            .unwrap();
    }

    let mut store = open_store(&config, Some(sectors(3.0, -3.1)));
    store.refresh_on(parse_date("2020-01-02").unwrap()).await.unwrap();
    store.refresh_on(parse_date("2020-01-02").unwrap()).await.unwrap();
    drop(store);

    let reopened = open_store(&config, None);
    assert_eq!(
        reopened.dates(),
        &[parse_date("2020-01-01").unwrap(), parse_date("2020-01-02").unwrap()]
    );
    assert_eq!(reopened.average_sector_move("Tech").unwrap(), 2.0);
    assert_eq!(
        reopened.sector_time_series("Tech").unwrap(),
        vec![
            (parse_date("2020-01-01").unwrap(), 1.0),
            (parse_date("2020-01-02").unwrap(), 3.0)
        ]
    );

    let documents = JsonFileStore::open(&config).unwrap();
    assert_eq!(documents.count_by_date(&parse_date("2020-01-02").unwrap()).unwrap(), 1);
}

#[tokio::test]
async fn bad_fetch_does_not_touch_the_file() {
    let dir = TempDir::new().unwrap();
    let config = config_for(&dir);
    let mut store = open_store(&config, None);

    let err = store.refresh().await.unwrap_err();

    assert!(matches!(err, ReportError::FetchFailed(_)));
    assert!(store.is_empty());
    let documents = JsonFileStore::open(&config).unwrap();
    assert!(documents.list_all().unwrap().is_empty());
}

#[test]
fn single_report_queries_from_persisted_legacy_document() {
    let dir = TempDir::new().unwrap();
    let config = config_for(&dir);
    let path = dir.path().join("finance").join("sectors.jsonl");
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(
        &path,
        concat!(
            r#"{"date": "2016-10-17", "data": {"#,
            r#""Technology": {"change": 2.5, "biggest_gainer": {"equity": "AAPL", "change": 3.0}, "biggest_loser": {"equity": "", "change": null}}, "#,
            r#""Energy": {"change": -3.1, "biggest_gainer": {"equity": "", "change": null}, "biggest_loser": {"equity": "CHK", "change": -7.5}}"#,
            "}}\n"
        ),
    )
    .unwrap();

    let store = open_store(&config, None);
    let report = store.get_report(&parse_date("2016-10-17").unwrap()).unwrap();

    assert_eq!(report.greatest_move_sector().unwrap(), "Energy");
    assert_eq!(report.greatest_move_stock(), Some("CHK"));
    assert!((report.average_market_move().unwrap() + 0.3).abs() < 1e-9);
    assert_eq!(report.sector_relative_performance("Technology", "Energy").unwrap(), 2.5 - -3.1);

    let ever = store.greatest_stock_move_ever().unwrap();
    assert_eq!((ever.name.as_str(), ever.change), ("CHK", -7.5));
}
