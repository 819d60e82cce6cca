use log::debug;
use serde_json::Value;

/// A data response the page issued on its own while loading
#[derive(Debug, Clone, PartialEq)]
pub struct InterceptedResponse {
    pub url: String,
    pub body: Value,
}

/// Accumulates intercepted responses over one page load
#[derive(Debug, Clone, Default)]
pub struct ResponseCollector {
    responses: Vec<InterceptedResponse>,
}

impl ResponseCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, url: impl Into<String>, body: Value) {
        self.responses.push(InterceptedResponse {
            url: url.into(),
            body,
        });
    }

    /// Keep the body if it is JSON; anything else is noise from the page
    pub fn push_raw(&mut self, url: &str, body: &str) -> bool {
        match serde_json::from_str::<Value>(body) {
            Ok(value) => {
                self.push(url, value);
                true
            }
            Err(e) => {
                debug!("Ignoring non-JSON response from {}: {}", url, e);
                false
            }
        }
    }

    pub fn len(&self) -> usize {
        self.responses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.responses.is_empty()
    }

    pub fn responses(&self) -> &[InterceptedResponse] {
        &self.responses
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_raw_keeps_only_json() {
        let mut collector = ResponseCollector::new();
        assert!(collector.push_raw("https://site.test/api?page=1", r#"{"data": []}"#));
        assert!(!collector.push_raw("https://site.test/api?page=2", "<html>busy</html>"));

        assert_eq!(collector.len(), 1);
        assert_eq!(collector.responses()[0].url, "https://site.test/api?page=1");
    }
}
