use async_trait::async_trait;
use chrono::NaiveDate;
use sector_datahub::charts::{ChartRenderer, TextChartRenderer};
use sector_datahub::scrapers::{FetchOutcome, ReportFetcher};
use sector_datahub::storage::MemoryStore;
use sector_datahub::{DailyRecord, Mover, ReportStore, SectorRecord, SectorSet};
use std::sync::Arc;

// 固定返回同一份数据的抓取器
struct CannedFetcher;

#[async_trait]
impl ReportFetcher for CannedFetcher {
    fn source_name(&self) -> &'static str {
        "canned"
    }

    async fn fetch_sector_report(&self) -> FetchOutcome {
        match day(0.8, -0.4, 1.9) {
            Ok(sectors) => FetchOutcome::Good(sectors),
            Err(_) => FetchOutcome::Bad,
        }
    }
}

fn day(tech: f64, energy: f64, health: f64) -> sector_datahub::Result<SectorSet> {
    SectorSet::from_records(vec![
        SectorRecord::new("Technology", tech, Mover::new("NVDA", tech * 3.0), Mover::new("INTC", -1.1)),
        SectorRecord::new("Energy", energy, Mover::none(), Mover::new("XOM", energy * 2.5)),
        SectorRecord::new("Health Care", health, Mover::new("LLY", health * 2.0), Mover::none()),
    ])
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 准备两天的历史数据
    let history = vec![
        DailyRecord::new(NaiveDate::from_ymd_opt(2016, 10, 17).ok_or("bad date")?, day(1.2, -2.3, 0.4)?),
        DailyRecord::new(NaiveDate::from_ymd_opt(2016, 10, 18).ok_or("bad date")?, day(-0.6, 3.1, -0.2)?),
    ];

    let mut store = ReportStore::new(Box::new(MemoryStore::with_records(history)), Arc::new(CannedFetcher))?;
    store.refresh().await?;

    println!("报告数量: {}", store.len());
    for date in store.dates() {
        println!("  - {}", date);
    }

    let sector = store.greatest_sector_move_ever()?;
    println!("\n历史最大板块波动: {} 于 {} ({:+.2}%)", sector.name, sector.date, sector.change);
    let stock = store.greatest_stock_move_ever()?;
    println!("历史最大个股波动: {} 于 {} ({:+.2}%)", stock.name, stock.date, stock.change);

    println!("\nTechnology 平均涨跌: {:.2}%", store.average_sector_move("Technology")?);

    let renderer = TextChartRenderer::new(30);
    println!("\n{}", renderer.render(&store.sector_changes_chart("Energy")?)?);
    println!("{}", renderer.render(&store.average_sector_moves_chart()?)?);

    Ok(())
}
