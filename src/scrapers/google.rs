use crate::config::Config;
use crate::errors::{Result, ReportError};
use crate::models::sector::{Mover, SectorRecord, SectorSet};
use crate::scrapers::base::{FetchOutcome, ReportFetcher};
use crate::scrapers::html::{self, Element};
use crate::util;
use async_trait::async_trait;
use log::{debug, error, info};
use reqwest::Client;
use std::sync::Mutex;
use std::time::{Duration, Instant};

// 涨跌幅所在 span 的 class
const CHANGE_CLASSES: [&str; 3] = ["chr", "chg", "chb"];

/// Google Finance 板块表现抓取器
pub struct GoogleFinanceFetcher {
    client: Client,
    base_url: String,
    min_interval: Duration,
    sector_limit: Option<usize>,
    last_request: Mutex<Option<Instant>>,
}

impl GoogleFinanceFetcher {
    pub fn new(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(ReportError::RequestError)?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            min_interval: Duration::from_millis(config.min_request_interval_ms),
            sector_limit: config.debug_mode.then_some(config.debug_sector_limit),
            last_request: Mutex::new(None),
        })
    }

    /// 等待请求频率限制
    async fn wait_for_rate_limit(&self) {
        let now = Instant::now();
        let should_wait = {
            let mut last = self.last_request.lock().unwrap_or_else(|p| p.into_inner());
            let should_wait = (*last).and_then(|instant| {
                let elapsed = instant.elapsed();
                (elapsed < self.min_interval).then(|| self.min_interval - elapsed)
            });
            *last = Some(now);
            should_wait
        };

        if let Some(wait_time) = should_wait {
            debug!("Waiting {:?} to respect rate limit", wait_time);
            tokio::time::sleep(wait_time).await;
        }
    }

    async fn get_page(&self, path: &str) -> Result<String> {
        self.wait_for_rate_limit().await;

        // 板块链接可能是绝对地址
        let url = if path.starts_with("http://") || path.starts_with("https://") {
            path.to_string()
        } else {
            format!("{}{}", self.base_url, path)
        };
        debug!("GET {}", url);
        let response = self
            .client
            .get(&url)
            .send()
            .await?
            .error_for_status()?;
        Ok(response.text().await?)
    }

    async fn scrape(&self) -> Result<SectorSet> {
        let landing = self.get_page("/finance").await?;
        let mut links = parse_sector_links(&landing)?;

        if let Some(limit) = self.sector_limit {
            let original_count = links.len();
            links.truncate(limit);
            info!("DEBUG MODE: Following only {} out of {} sectors", links.len(), original_count);
        }

        let mut sectors = SectorSet::new();
        for (change, href) in links {
            let page = self.get_page(&href).await?;
            let (name, biggest_gainer, biggest_loser) = parse_sector_page(&page)?;
            debug!("Sector {}: {:+.2}%", name, change);
            sectors.push(SectorRecord {
                name,
                change,
                biggest_gainer,
                biggest_loser,
            })?;
        }

        info!("Fetched {} sectors from {}", sectors.len(), self.source_name());
        Ok(sectors)
    }
}

#[async_trait]
impl ReportFetcher for GoogleFinanceFetcher {
    fn source_name(&self) -> &'static str {
        "Google Finance"
    }

    async fn fetch_sector_report(&self) -> FetchOutcome {
        match self.scrape().await {
            Ok(sectors) => FetchOutcome::Good(sectors),
            Err(e) => {
                error!("Sector scrape from {} failed: {}", self.source_name(), e);
                FetchOutcome::Bad
            }
        }
    }
}

fn change_spans<'a>(row: &Element<'a>) -> Vec<Element<'a>> {
    html::find_all(row.inner, "span", |e| CHANGE_CLASSES.iter().any(|c| e.has_class(c)))
}

fn missing(what: &str) -> ReportError {
    ReportError::DataError(format!("Sector page layout changed: {} not found", what))
}

/// Reads `(change, href)` for every row of the sector performance table.
pub fn parse_sector_links(page: &str) -> Result<Vec<(f64, String)>> {
    let block = html::find_element(page, "div", |e| e.attr("id").as_deref() == Some("secperf"))
        .ok_or_else(|| missing("div#secperf"))?;
    let table = html::find_element(block.inner, "table", |_| true)
        .ok_or_else(|| missing("sector table"))?;
    let table_body = html::find_element(table.inner, "tbody", |_| true)
        .map(|body| body.inner)
        .unwrap_or(table.inner);

    let mut links = Vec::new();
    // 第一行为表头
    for row in html::elements(table_body, "tr").iter().skip(1) {
        let span = change_spans(row)
            .into_iter()
            .next()
            .ok_or_else(|| missing("sector change"))?;
        let change = util::parse_percent(&span.text())?;
        let href = html::find_element(row.inner, "a", |_| true)
            .and_then(|a| a.attr("href"))
            .ok_or_else(|| missing("sector link"))?;
        links.push((change, href));
    }

    if links.is_empty() {
        return Err(missing("sector rows"));
    }
    Ok(links)
}

fn mover_from_row(row: &Element) -> Result<Mover> {
    let spans = change_spans(row);
    let span = spans.get(1).ok_or_else(|| missing("mover change"))?;
    let change = util::parse_percent(&span.text())?;
    let equity = html::find_element(row.inner, "a", |_| true)
        .map(|a| a.text())
        .filter(|name| !name.is_empty())
        .ok_or_else(|| missing("mover name"))?;
    Ok(Mover {
        equity: Some(equity),
        change: Some(change),
    })
}

fn heading_contains(row: &Element, word: &str) -> bool {
    html::find_element(row.inner, "b", |_| true)
        .map(|b| b.text().contains(word))
        .unwrap_or(false)
}

/// Reads the sector name and its biggest gainer and loser from a sector page.
///
/// The top-movers table lists gainers under a header in row 0 and losers under
/// a header in row 6. A sector without gainers puts the losers header in row 0.
pub fn parse_sector_page(page: &str) -> Result<(String, Mover, Mover)> {
    let appbar = html::find_element(page, "div", |e| e.has_class("appbar-hide"))
        .ok_or_else(|| missing("div.appbar-hide"))?;
    let name = html::find_element(appbar.inner, "h3", |_| true)
        .map(|h| h.text())
        .filter(|name| !name.is_empty())
        .ok_or_else(|| missing("sector name"))?;

    let movers = html::find_element(page, "table", |e| e.has_class("topmovers"))
        .ok_or_else(|| missing("table.topmovers"))?;
    let movers_body = html::find_element(movers.inner, "tbody", |_| true)
        .map(|body| body.inner)
        .unwrap_or(movers.inner);
    let rows = html::elements(movers_body, "tr");

    let mut gainer = Mover::none();
    let mut loser = Mover::none();

    if let (Some(header), Some(row)) = (rows.first(), rows.get(1)) {
        if heading_contains(header, "Gainers") {
            gainer = mover_from_row(row)?;
        } else if heading_contains(header, "Losers") {
            loser = mover_from_row(row)?;
        }
    }
    if let (Some(header), Some(row)) = (rows.get(6), rows.get(7)) {
        if heading_contains(header, "Losers") {
            loser = mover_from_row(row)?;
        }
    }

    Ok((name, gainer, loser))
}

#[cfg(test)]
mod tests {
    use super::*;

    const LANDING: &str = r#"
        <html><body>
        <div id="secperf"><table>
          <tr><th>Sector</th><th>Change</th></tr>
          <tr><td><a href="/finance?catid=us-TRBC:57">Technology</a></td><td><span class="chg">+1.25%</span></td></tr>
          <tr><td><a href="/finance?catid=us-TRBC:50">Energy</a></td><td><span class="chr">-2.10%</span></td></tr>
        </table></div>
        </body></html>"#;

    fn sector_page(name: &str, rows: &str) -> String {
        format!(
            r#"<div class="appbar-hide"><h3> {} </h3></div>
            <table class="topmovers">{}</table>"#,
            name, rows
        )
    }

    fn mover_row(equity: &str, change: &str) -> String {
        format!(
            r#"<tr><td><a href="/q">{}</a></td><td><span class="chg">0.50</span></td><td><span class="chg">({})</span></td></tr>"#,
            equity, change
        )
    }

    #[test]
    fn landing_page_yields_links_in_order() {
        let links = parse_sector_links(LANDING).unwrap();
        assert_eq!(
            links,
            vec![
                (1.25, "/finance?catid=us-TRBC:57".to_string()),
                (-2.10, "/finance?catid=us-TRBC:50".to_string()),
            ]
        );
    }

    #[test]
    fn landing_page_without_table_is_an_error() {
        assert!(matches!(
            parse_sector_links("<html></html>"),
            Err(ReportError::DataError(_))
        ));
    }

    #[test]
    fn sector_page_with_gainers_and_losers() {
        let mut rows = String::from("<tr><td><b>Top Gainers</b></td></tr>");
        rows.push_str(&mover_row("NVDA", "+6.10%"));
        for _ in 0..4 {
            rows.push_str(&mover_row("FILL", "+1.00%"));
        }
        rows.push_str("<tr><td><b>Top Losers</b></td></tr>");
        rows.push_str(&mover_row("INTC", "-3.40%"));

        let (name, gainer, loser) = parse_sector_page(&sector_page("Technology", &rows)).unwrap();

        assert_eq!(name, "Technology");
        assert_eq!(gainer, Mover::new("NVDA", 6.10));
        assert_eq!(loser, Mover::new("INTC", -3.40));
    }

    #[test]
    fn sector_page_with_only_losers() {
        let mut rows = String::from("<tr><td><b>Top Losers</b></td></tr>");
        rows.push_str(&mover_row("XOM", "-1.20%"));

        let (name, gainer, loser) = parse_sector_page(&sector_page("Energy", &rows)).unwrap();

        assert_eq!(name, "Energy");
        assert_eq!(gainer, Mover::none());
        assert_eq!(loser, Mover::new("XOM", -1.20));
    }

    #[tokio::test]
    async fn unreachable_source_is_a_bad_outcome() {
        // 绑定后立即释放，得到一个无人监听的端口
        let port = std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port();
        let config = Config::new()
            .with_base_url(&format!("http://127.0.0.1:{}", port))
            .with_request_timeout_secs(2);

        let fetcher = GoogleFinanceFetcher::new(&config).unwrap();

        assert_eq!(fetcher.fetch_sector_report().await, FetchOutcome::Bad);
    }
}
