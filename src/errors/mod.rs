use headless_chrome::util::Timeout;

/// Add context to fetch errors
pub fn fetch_context(url: &str) -> String {
    format!("Failed to fetch from: {}", url)
}

/// Add context to parse errors
pub fn parse_context(data_type: &str) -> String {
    format!("Failed to parse {}", data_type)
}

const NET_TIMEOUT_CODES: [&str; 2] = ["net::ERR_TIMED_OUT", "net::ERR_CONNECTION_TIMED_OUT"];

/// Errors raised while driving the source site
#[derive(Debug, thiserror::Error)]
pub enum ScrapeError {
    #[error("Browser launch failed: {0}")]
    Launch(String),

    #[error("Navigation error: {0}")]
    Navigation(String),

    #[error("Timeout waiting for: {0}")]
    Timeout(String),

    #[error("Element not found: {0}")]
    ElementNotFound(String),

    #[error("JavaScript execution error: {0}")]
    JavaScript(String),

    #[error("Unexpected page structure: {0}")]
    Structure(String),
}

impl ScrapeError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, ScrapeError::Timeout(_))
    }

    /// Map a browser-level failure onto the taxonomy. Waits that ran out
    /// surface as the driver's `Timeout`; page loads that ran out surface as
    /// Chrome network error codes.
    pub fn from_browser(err: anyhow::Error, action: &str) -> Self {
        let driver_timeout = err.chain().any(|cause| cause.is::<Timeout>());
        let message = format!("{action}: {err:#}");

        if driver_timeout || NET_TIMEOUT_CODES.iter().any(|code| message.contains(code)) {
            ScrapeError::Timeout(message)
        } else {
            ScrapeError::Navigation(message)
        }
    }
}

/// True when any error in the chain is a scrape timeout
pub fn is_timeout(err: &anyhow::Error) -> bool {
    err.chain()
        .filter_map(|cause| cause.downcast_ref::<ScrapeError>())
        .any(ScrapeError::is_timeout)
}

/// Rejected caller input
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum InputError {
    #[error("{field} must be between 1 and {max} characters, got {actual}")]
    Length {
        field: &'static str,
        max: usize,
        actual: usize,
    },
}

pub const MAX_TERM_CHARS: usize = 100;

/// Trim a free-text search term and check its bounds
pub fn validate_term(field: &'static str, value: &str) -> Result<String, InputError> {
    let trimmed = value.trim();
    let actual = trimmed.chars().count();
    if actual == 0 || actual > MAX_TERM_CHARS {
        return Err(InputError::Length {
            field,
            max: MAX_TERM_CHARS,
            actual,
        });
    }
    Ok(trimmed.to_string())
}
