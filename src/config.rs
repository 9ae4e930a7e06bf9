pub struct Config {
    pub debug_mode: bool,
    pub debug_sector_limit: usize,
    pub data_dir: String,
    pub database: String,
    pub collection: String,
    pub base_url: String,
    pub request_timeout_secs: u64,
    pub min_request_interval_ms: u64,
    pub chart_width: usize,
}

impl Config {
    pub fn new() -> Self {
        Self {
            debug_mode: false,
            debug_sector_limit: 2,
            data_dir: "data".to_string(),
            database: "finance".to_string(),
            collection: "sector_reports".to_string(),
            base_url: "https://www.google.com".to_string(),
            request_timeout_secs: 30,
            min_request_interval_ms: 500,
            chart_width: 40,
        }
    }

    pub fn with_debug_mode(mut self, debug_mode: bool) -> Self {
        self.debug_mode = debug_mode;
        self
    }

    pub fn with_debug_sector_limit(mut self, limit: usize) -> Self {
        self.debug_sector_limit = limit;
        self
    }

    pub fn with_data_dir(mut self, dir: &str) -> Self {
        self.data_dir = dir.to_string();
        self
    }

    // 数据库名与集合名共同决定存储文件位置
    pub fn with_database(mut self, database: &str) -> Self {
        self.database = database.to_string();
        self
    }

    pub fn with_collection(mut self, collection: &str) -> Self {
        self.collection = collection.to_string();
        self
    }

    pub fn with_base_url(mut self, url: &str) -> Self {
        self.base_url = url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_request_timeout_secs(mut self, secs: u64) -> Self {
        self.request_timeout_secs = secs;
        self
    }

    pub fn with_min_request_interval_ms(mut self, ms: u64) -> Self {
        self.min_request_interval_ms = ms;
        self
    }

    pub fn with_chart_width(mut self, width: usize) -> Self {
        self.chart_width = width.max(1);
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_overrides_defaults() {
        let config = Config::new()
            .with_data_dir("/tmp/sectors")
            .with_database("db")
            .with_collection("daily")
            .with_base_url("http://localhost:8080/")
            .with_chart_width(0);

        assert_eq!(config.data_dir, "/tmp/sectors");
        assert_eq!(config.database, "db");
        assert_eq!(config.collection, "daily");
        assert_eq!(config.base_url, "http://localhost:8080");
        assert_eq!(config.chart_width, 1);
        assert!(!config.debug_mode);
    }
}
