// 公开导出的模块，供外部使用
pub mod models;
pub mod report;
pub mod report_store;
pub mod errors;
pub mod charts;
pub mod storage;

// 抓取与工具模块主要服务于命令行程序
pub mod scrapers;
pub mod config;
#[doc(hidden)]
pub mod util;

// 重新导出常用类型，方便使用
pub use models::record::DailyRecord;
pub use models::sector::{Mover, SectorRecord, SectorSet};
pub use report::Report;
pub use report_store::{RecordMove, ReportStore};
pub use errors::{Result, ReportError};
