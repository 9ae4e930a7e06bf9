use crate::errors::Result;
use crate::models::record::DailyRecord;
use chrono::NaiveDate;

/// Base trait for the persisted collection of daily sector records
///
/// Records are keyed by date. `list_all` returns them in the store's natural
/// order, which for the provided stores is insertion order.
pub trait DocumentStore {
    /// Name used in log messages
    fn describe(&self) -> String;

    fn list_all(&self) -> Result<Vec<DailyRecord>>;

    fn find_by_date(&self, date: &NaiveDate) -> Result<Option<DailyRecord>>;

    fn count_by_date(&self, date: &NaiveDate) -> Result<usize>;

    /// Removes every record for `date`, returning how many were removed.
    fn delete_by_date(&mut self, date: &NaiveDate) -> Result<usize>;

    fn insert(&mut self, record: &DailyRecord) -> Result<()>;

    /// Overwrites the whole collection with `records`, in the given order.
    fn replace_all(&mut self, records: &[DailyRecord]) -> Result<()>;
}
