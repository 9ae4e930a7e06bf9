use chrono::NaiveDate;
use log::{error, info, warn};

use crate::charts::ChartSeries;
use crate::errors::{Result, ReportError};
use crate::models::record::DailyRecord;
use crate::report::Report;
use crate::scrapers::base::{FetchOutcome, ReportFetcher};
use crate::storage::base::DocumentStore;
use crate::util;
use std::collections::HashMap;
use std::sync::Arc;

/// 历史极值：日期、板块或个股名称、涨跌幅
#[derive(Debug, Clone, PartialEq)]
pub struct RecordMove {
    pub date: NaiveDate,
    pub name: String,
    pub change: f64,
}

/// 按日期组织的板块报告集合，与持久化存储保持同步
///
/// `dates[i]` always belongs to `reports[i]` and every date appears once.
/// Reads may run freely; `refresh` needs `&mut self`, so a single writer is
/// enforced by the borrow checker.
pub struct ReportStore {
    dates: Vec<NaiveDate>,
    reports: Vec<Report>,
    // 索引用于快速查找
    date_index: HashMap<NaiveDate, usize>,
    store: Box<dyn DocumentStore + Send>,
    fetcher: Arc<dyn ReportFetcher + Send + Sync>,
}

impl ReportStore {
    /// Loads every persisted record, in store order, into the cache.
    pub fn new(
        store: Box<dyn DocumentStore + Send>,
        fetcher: Arc<dyn ReportFetcher + Send + Sync>,
    ) -> Result<Self> {
        let records = store.list_all().map_err(|e| match e {
            ReportError::IoError(io) => ReportError::StoreUnavailable(io.to_string()),
            other => other,
        })?;

        let mut report_store = Self {
            dates: Vec::new(),
            reports: Vec::new(),
            date_index: HashMap::new(),
            store,
            fetcher,
        };

        for record in records {
            if report_store.date_index.contains_key(&record.date) {
                warn!("Duplicate record for {} in store, keeping the later one", record.date);
                report_store.remove_cached(&record.date);
            }
            report_store.push_report(record);
        }

        info!(
            "Loaded {} reports from {}",
            report_store.reports.len(),
            report_store.store.describe()
        );
        Ok(report_store)
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn reports(&self) -> &[Report] {
        &self.reports
    }

    pub fn len(&self) -> usize {
        self.reports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reports.is_empty()
    }

    pub fn document_store(&self) -> &(dyn DocumentStore + Send) {
        self.store.as_ref()
    }

    /// Report for `date`, or `None` when there is none.
    ///
    /// Unlike the per-report lookups this does not error on absence.
    pub fn get_report(&self, date: &NaiveDate) -> Option<&Report> {
        self.date_index.get(date).map(|&idx| &self.reports[idx])
    }

    pub fn latest_report(&self) -> Option<&Report> {
        self.reports.last()
    }

    /// 抓取今日数据并写入存储与缓存
    pub async fn refresh(&mut self) -> Result<()> {
        self.refresh_on(util::today()).await
    }

    /// Fetches the current dataset and stores it under `date`, replacing any
    /// existing record for that date.
    ///
    /// A bad fetch leaves both the persisted store and the cache untouched.
    pub async fn refresh_on(&mut self, date: NaiveDate) -> Result<()> {
        info!("Refreshing sector report for {} from {}", date, self.fetcher.source_name());

        let sectors = match self.fetcher.fetch_sector_report().await {
            FetchOutcome::Good(sectors) => sectors,
            FetchOutcome::Bad => {
                return Err(ReportError::FetchFailed(format!(
                    "{} returned a bad status",
                    self.fetcher.source_name()
                )));
            }
        };

        let sector_count = sectors.len();
        let record = DailyRecord::new(date, sectors);
        self.persist(&record)?;

        // 持久化成功后再更新缓存
        self.remove_cached(&date);
        self.push_report(record);

        info!("Stored {} sectors for {}", sector_count, date);
        Ok(())
    }

    fn persist(&mut self, record: &DailyRecord) -> Result<()> {
        // 删除前保存快照，写入失败时按原顺序恢复
        let snapshot = if self.store.count_by_date(&record.date)? > 0 {
            let snapshot = self.store.list_all()?;
            let removed = self.store.delete_by_date(&record.date)?;
            info!("Replacing {} existing record(s) for {}", removed, record.date);
            Some(snapshot)
        } else {
            None
        };

        if let Err(e) = self.store.insert(record) {
            if let Some(previous) = snapshot {
                if let Err(restore_err) = self.store.replace_all(&previous) {
                    error!("Failed to restore records for {}: {}", record.date, restore_err);
                }
            }
            return Err(e);
        }
        Ok(())
    }

    fn push_report(&mut self, record: DailyRecord) {
        self.date_index.insert(record.date, self.dates.len());
        self.dates.push(record.date);
        self.reports.push(Report::from_record(record));
    }

    fn remove_cached(&mut self, date: &NaiveDate) {
        if let Some(idx) = self.date_index.get(date).copied() {
            self.dates.remove(idx);
            self.reports.remove(idx);
            self.rebuild_indices();
        }
    }

    /// 重建索引
    fn rebuild_indices(&mut self) {
        self.date_index.clear();
        for (i, date) in self.dates.iter().enumerate() {
            self.date_index.insert(*date, i);
        }
    }

    /// Largest single-day sector move by absolute change; earliest wins ties.
    pub fn greatest_sector_move_ever(&self) -> Result<RecordMove> {
        let mut best: Option<RecordMove> = None;
        for report in &self.reports {
            let name = report.greatest_move_sector()?;
            let change = report.change_for_sector(name)?;
            if best.as_ref().map_or(true, |b| change.abs() > b.change.abs()) {
                best = Some(RecordMove {
                    date: report.date(),
                    name: name.to_string(),
                    change,
                });
            }
        }
        best.ok_or(ReportError::EmptyStore)
    }

    /// Largest single-day stock move by absolute change; earliest wins ties.
    ///
    /// Days without any identified mover are skipped.
    pub fn greatest_stock_move_ever(&self) -> Result<RecordMove> {
        if self.reports.is_empty() {
            return Err(ReportError::EmptyStore);
        }

        let mut best: Option<RecordMove> = None;
        for report in &self.reports {
            let Some((stock, change)) = report.greatest_stock_move() else {
                continue;
            };
            if best.as_ref().map_or(true, |b| change.abs() > b.change.abs()) {
                best = Some(RecordMove {
                    date: report.date(),
                    name: stock.to_string(),
                    change,
                });
            }
        }
        best.ok_or(ReportError::EmptyDataset)
    }

    /// `(date, change)` for `sector`, one entry per report in store order.
    ///
    /// Fails on the first report that lacks the sector.
    pub fn sector_time_series(&self, sector: &str) -> Result<Vec<(NaiveDate, f64)>> {
        self.reports
            .iter()
            .map(|report| Ok((report.date(), report.change_for_sector(sector)?)))
            .collect()
    }

    pub fn average_sector_move(&self, sector: &str) -> Result<f64> {
        let changes: Vec<f64> = self
            .sector_time_series(sector)?
            .into_iter()
            .map(|(_, change)| change)
            .collect();
        util::mean(&changes).ok_or(ReportError::EmptyStore)
    }

    pub fn sector_changes_chart(&self, sector: &str) -> Result<ChartSeries> {
        let points = self
            .sector_time_series(sector)?
            .into_iter()
            .map(|(date, change)| (util::format_date(&date), change))
            .collect();
        Ok(ChartSeries::line(
            "Date",
            &format!("Average {} move (in %)", sector),
            points,
        ))
    }

    /// Average move of every sector listed in the first report.
    pub fn average_sector_moves_chart(&self) -> Result<ChartSeries> {
        let first = self.reports.first().ok_or(ReportError::EmptyStore)?;
        let points = first
            .sector_names()
            .into_iter()
            .map(|name| Ok((name.to_string(), self.average_sector_move(name)?)))
            .collect::<Result<Vec<_>>>()?;
        Ok(ChartSeries::bar("Sector", "Average Sector Move (in %)", points))
    }
}
