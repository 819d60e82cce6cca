use std::time::Duration;

#[derive(Debug, Clone)]
pub struct ScraperSettings {
    pub base_url: String,
    pub search_path: String,
    /// URL fragment identifying the search page's own data calls
    pub search_data_fragment: String,
    pub event_path: String,
    pub completed_status: String,
    pub discovery_window_days: i64,
}

impl Default for ScraperSettings {
    fn default() -> Self {
        Self {
            base_url: "https://n01darts.com/n01/tournament".to_string(),
            search_path: "/".to_string(),
            search_data_fragment: "n01_tournament.php".to_string(),
            event_path: "/comp.php?id=".to_string(),
            completed_status: "40".to_string(),
            discovery_window_days: 365,
        }
    }
}

#[derive(Debug, Clone)]
pub struct BrowserSettings {
    pub headless: bool,
    pub sandbox: bool,
    pub window_size: (u32, u32),
    pub user_agent: Option<String>,
    pub navigation_timeout: Duration,
    pub settle_delay: Duration,
    pub poll_interval: Duration,
}

impl Default for BrowserSettings {
    fn default() -> Self {
        Self {
            headless: true,
            sandbox: false,
            window_size: (1920, 1080),
            user_agent: Some(
                "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/121.0.0.0 Safari/537.36"
                    .to_string(),
            ),
            navigation_timeout: Duration::from_secs(60),
            settle_delay: Duration::from_secs(2),
            poll_interval: Duration::from_millis(250),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SyncSettings {
    pub lookup_cap: usize,
    pub retry_delays: Vec<Duration>,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            lookup_cap: 30,
            retry_delays: vec![
                Duration::from_secs(1),
                Duration::from_secs(2),
                Duration::from_secs(4),
            ],
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub scraper: ScraperSettings,
    pub browser: BrowserSettings,
    pub sync: SyncSettings,
    pub database_path: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl AppConfig {
    pub fn new() -> Self {
        Self {
            scraper: ScraperSettings::default(),
            browser: BrowserSettings::default(),
            sync: SyncSettings::default(),
            database_path: "darts_sync.db".to_string(),
        }
    }

    /// Defaults overridden by DATABASE_PATH, DARTS_SYNC_BASE_URL,
    /// DARTS_SYNC_COMPLETED_STATUS and DARTS_SYNC_HEADLESS
    pub fn from_env() -> Self {
        let mut config = Self::new();

        if let Ok(path) = std::env::var("DATABASE_PATH") {
            config.database_path = path;
        }
        if let Ok(base_url) = std::env::var("DARTS_SYNC_BASE_URL") {
            config.scraper.base_url = base_url.trim_end_matches('/').to_string();
        }
        if let Ok(status) = std::env::var("DARTS_SYNC_COMPLETED_STATUS") {
            config.scraper.completed_status = status;
        }
        if let Ok(headless) = std::env::var("DARTS_SYNC_HEADLESS") {
            config.browser.headless = parse_flag(&headless).unwrap_or(true);
        }

        config
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_retry_schedule() {
        let config = AppConfig::default();
        let secs: Vec<u64> = config.sync.retry_delays.iter().map(Duration::as_secs).collect();
        assert_eq!(secs, vec![1, 2, 4]);
        assert_eq!(config.sync.lookup_cap, 30);
        assert_eq!(config.browser.navigation_timeout, Duration::from_secs(60));
    }

    #[test]
    fn test_parse_flag() {
        assert_eq!(parse_flag("TRUE"), Some(true));
        assert_eq!(parse_flag("off"), Some(false));
        assert_eq!(parse_flag("maybe"), None);
    }
}
