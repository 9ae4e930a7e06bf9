use crate::charts::ChartSeries;
use crate::errors::{Result, ReportError};
use crate::models::record::DailyRecord;
use crate::models::sector::SectorSet;
use crate::util;
use chrono::NaiveDate;

/// 某一日期的板块报告（只读）
///
/// Built by [`ReportStore`](crate::report_store::ReportStore) from a persisted
/// or freshly fetched record and never mutated afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    record: DailyRecord,
}

impl Report {
    pub(crate) fn from_record(record: DailyRecord) -> Self {
        Self { record }
    }

    pub fn date(&self) -> NaiveDate {
        self.record.date
    }

    pub fn sectors(&self) -> &SectorSet {
        &self.record.sectors
    }

    pub fn sector_names(&self) -> Vec<&str> {
        self.record.sectors.names()
    }

    /// Name of the sector with the largest absolute change.
    ///
    /// Ties go to the sector listed first.
    pub fn greatest_move_sector(&self) -> Result<&str> {
        let mut best: Option<(&str, f64)> = None;
        for sector in &self.record.sectors {
            let size = sector.change.abs();
            if best.map_or(true, |(_, max)| size > max) {
                best = Some((sector.name.as_str(), size));
            }
        }
        best.map(|(name, _)| name).ok_or(ReportError::EmptyDataset)
    }

    /// Equity with the largest absolute change among all identified movers,
    /// or `None` if no sector has one.
    pub fn greatest_move_stock(&self) -> Option<&str> {
        self.greatest_stock_move().map(|(equity, _)| equity)
    }

    /// The mover picked by [`greatest_move_stock`](Self::greatest_move_stock)
    /// together with its signed change.
    ///
    /// Ties go to the first mover scanned, sectors in order and the gainer
    /// before the loser.
    pub fn greatest_stock_move(&self) -> Option<(&str, f64)> {
        let mut best: Option<(&str, f64)> = None;
        for sector in &self.record.sectors {
            for (equity, change) in sector.movers().into_iter().filter_map(|m| m.identified()) {
                if best.map_or(true, |(_, max)| change.abs() > max.abs()) {
                    best = Some((equity, change));
                }
            }
        }
        best
    }

    pub fn change_for_sector(&self, sector: &str) -> Result<f64> {
        self.record
            .sectors
            .get(sector)
            .map(|s| s.change)
            .ok_or_else(|| ReportError::SectorNotFound(sector.to_string()))
    }

    /// Change of the first identified mover named `stock`, scanning sectors in
    /// order and the gainer before the loser.
    pub fn change_for_stock(&self, stock: &str) -> Result<f64> {
        self.record
            .sectors
            .iter()
            .flat_map(|sector| sector.movers())
            .filter_map(|mover| mover.identified())
            .find(|(equity, _)| *equity == stock)
            .map(|(_, change)| change)
            .ok_or_else(|| ReportError::StockNotFound(stock.to_string()))
    }

    pub fn average_market_move(&self) -> Result<f64> {
        let changes: Vec<f64> = self.record.sectors.iter().map(|s| s.change).collect();
        util::mean(&changes).ok_or(ReportError::EmptyDataset)
    }

    /// Performance of `sec1` relative to `sec2`, in percentage points.
    pub fn sector_relative_performance(&self, sec1: &str, sec2: &str) -> Result<f64> {
        Ok(self.change_for_sector(sec1)? - self.change_for_sector(sec2)?)
    }

    pub fn market_move_chart(&self) -> ChartSeries {
        let points = self
            .record
            .sectors
            .iter()
            .map(|s| (s.name.clone(), s.change))
            .collect();
        ChartSeries::bar(
            "Sector",
            &format!(
                "Average Market Move (in %) on {}",
                util::format_date(&self.record.date)
            ),
            points,
        )
    }
}
