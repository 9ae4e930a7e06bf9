use crate::config::Config;
use crate::errors::{Result, ReportError};
use crate::models::record::DailyRecord;
use crate::storage::base::DocumentStore;
use chrono::NaiveDate;
use log::{debug, info};
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

/// JSONL document store: one daily record per line.
///
/// Lives at `<data_dir>/<database>/<collection>.jsonl`. Appends go straight
/// to the end of the file; deletes rewrite it through a temp file.
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// 根据配置打开（必要时创建）存储文件
    pub fn open(config: &Config) -> Result<Self> {
        let path = PathBuf::from(&config.data_dir)
            .join(&config.database)
            .join(format!("{}.jsonl", config.collection));
        Self::from_path(path)
    }

    pub fn from_path(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        // 确保目录存在
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).map_err(|e| unavailable(&path, e))?;
            }
        }

        OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| unavailable(&path, e))?;

        info!("Opened document store at {}", path.display());
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_records(&self) -> Result<Vec<DailyRecord>> {
        let file = File::open(&self.path).map_err(|e| unavailable(&self.path, e))?;
        let reader = BufReader::new(file);
        let mut records = Vec::new();

        for (line_no, line) in reader.lines().enumerate() {
            let line = line.map_err(|e| unavailable(&self.path, e))?;
            if line.trim().is_empty() {
                continue;
            }
            let record: DailyRecord = serde_json::from_str(&line).map_err(|e| {
                ReportError::DataError(format!(
                    "Malformed record at {}:{}: {}",
                    self.path.display(),
                    line_no + 1,
                    e
                ))
            })?;
            records.push(record);
        }

        Ok(records)
    }

    fn write_records(&self, records: &[DailyRecord]) -> Result<()> {
        let tmp_path = self.path.with_extension("jsonl.tmp");
        {
            let mut writer = BufWriter::new(File::create(&tmp_path)?);
            for record in records {
                serde_json::to_writer(&mut writer, record)?;
                writer.write_all(b"\n")?;
            }
            writer.flush()?;
        }
        fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }
}

fn unavailable(path: &Path, err: std::io::Error) -> ReportError {
    ReportError::StoreUnavailable(format!("{}: {}", path.display(), err))
}

impl DocumentStore for JsonFileStore {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    fn list_all(&self) -> Result<Vec<DailyRecord>> {
        self.read_records()
    }

    fn find_by_date(&self, date: &NaiveDate) -> Result<Option<DailyRecord>> {
        Ok(self.read_records()?.into_iter().find(|r| r.date == *date))
    }

    fn count_by_date(&self, date: &NaiveDate) -> Result<usize> {
        Ok(self.read_records()?.iter().filter(|r| r.date == *date).count())
    }

    fn delete_by_date(&mut self, date: &NaiveDate) -> Result<usize> {
        let records = self.read_records()?;
        let before = records.len();
        let kept: Vec<DailyRecord> = records.into_iter().filter(|r| r.date != *date).collect();
        let removed = before - kept.len();

        if removed > 0 {
            self.write_records(&kept)?;
            debug!("Deleted {} record(s) for {} from {}", removed, date, self.path.display());
        }
        Ok(removed)
    }

    fn insert(&mut self, record: &DailyRecord) -> Result<()> {
        let line = serde_json::to_string(record)?;
        let mut file = OpenOptions::new().append(true).open(&self.path)?;
        writeln!(file, "{}", line)?;
        file.flush()?;
        debug!("Inserted record for {} into {}", record.date, self.path.display());
        Ok(())
    }

    fn replace_all(&mut self, records: &[DailyRecord]) -> Result<()> {
        self.write_records(records)?;
        debug!("Rewrote {} with {} record(s)", self.path.display(), records.len());
        Ok(())
    }
}
