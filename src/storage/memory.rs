use crate::errors::Result;
use crate::models::record::DailyRecord;
use crate::storage::base::DocumentStore;
use chrono::NaiveDate;

/// 内存存储，用于测试与演示
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    records: Vec<DailyRecord>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: Vec<DailyRecord>) -> Self {
        Self { records }
    }
}

impl DocumentStore for MemoryStore {
    fn describe(&self) -> String {
        "memory".to_string()
    }

    fn list_all(&self) -> Result<Vec<DailyRecord>> {
        Ok(self.records.clone())
    }

    fn find_by_date(&self, date: &NaiveDate) -> Result<Option<DailyRecord>> {
        Ok(self.records.iter().find(|r| r.date == *date).cloned())
    }

    fn count_by_date(&self, date: &NaiveDate) -> Result<usize> {
        Ok(self.records.iter().filter(|r| r.date == *date).count())
    }

    fn delete_by_date(&mut self, date: &NaiveDate) -> Result<usize> {
        let before = self.records.len();
        self.records.retain(|r| r.date != *date);
        Ok(before - self.records.len())
    }

    fn insert(&mut self, record: &DailyRecord) -> Result<()> {
        self.records.push(record.clone());
        Ok(())
    }

    fn replace_all(&mut self, records: &[DailyRecord]) -> Result<()> {
        self.records = records.to_vec();
        Ok(())
    }
}
