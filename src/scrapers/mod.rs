pub mod base;
pub mod google;
pub mod html;

pub use base::{FetchOutcome, ReportFetcher};
pub use google::GoogleFinanceFetcher;
