use crate::models::sector::SectorSet;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// 持久化的每日板块文档，每个日期一条
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyRecord {
    pub date: NaiveDate,
    // 早期版本的文档使用 "data" 字段
    #[serde(alias = "data")]
    pub sectors: SectorSet,
}

impl DailyRecord {
    pub fn new(date: NaiveDate, sectors: SectorSet) -> Self {
        Self { date, sectors }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_legacy_data_field() {
        let json = r#"{"date": "2016-10-17", "data": {"Energy": {"change": -0.42, "biggest_gainer": {"equity": "", "change": null}, "biggest_loser": {"equity": "CHK", "change": -3.9}}}}"#;

        let record: DailyRecord = serde_json::from_str(json).unwrap();

        assert_eq!(record.date, NaiveDate::from_ymd_opt(2016, 10, 17).unwrap());
        assert_eq!(record.sectors.len(), 1);
    }

    #[test]
    fn writes_iso_date() {
        let record = DailyRecord::new(NaiveDate::from_ymd_opt(2020, 1, 2).unwrap(), SectorSet::new());
        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(json, r#"{"date":"2020-01-02","sectors":{}}"#);
    }
}
