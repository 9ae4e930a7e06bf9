use crate::models::sector::SectorSet;
use async_trait::async_trait;

/// Result of one scrape. Failures are data, not errors.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    Good(SectorSet),
    Bad,
}

/// Base trait for sector report fetchers
#[async_trait]
pub trait ReportFetcher {
    /// Get the name of the source this fetcher reads
    fn source_name(&self) -> &'static str;

    /// Fetch today's sector dataset
    ///
    /// Network and parsing failures are reported as [`FetchOutcome::Bad`].
    async fn fetch_sector_report(&self) -> FetchOutcome;
}
