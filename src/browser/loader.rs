use anyhow::{Context, Result};
use tokio::task;

use super::{BrowserSession, FrameTarget, PageLoader, ResponseCollector};
use crate::config::BrowserSettings;
use crate::errors::fetch_context;

/// Drives headless Chrome, one fresh session per page visit.
/// The driver is blocking, so every visit runs on the blocking pool.
#[derive(Debug, Clone)]
pub struct ChromeLoader {
    settings: BrowserSettings,
}

impl ChromeLoader {
    pub fn new(settings: BrowserSettings) -> Self {
        Self { settings }
    }

    async fn with_session<T, F>(&self, url: &str, visit: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&BrowserSession) -> Result<T> + Send + 'static,
    {
        let settings = self.settings.clone();

        task::spawn_blocking(move || -> Result<T> {
            let session = BrowserSession::launch(&settings)?;
            visit(&session)
        })
        .await
        .context("Browser task panicked")?
        .with_context(|| fetch_context(url))
    }
}

impl PageLoader for ChromeLoader {
    async fn intercept_json(&self, url: &str, fragment: &str) -> Result<ResponseCollector> {
        let target = url.to_string();
        let fragment = fragment.to_string();
        self.with_session(url, move |session| {
            Ok(session.open_intercepting(&target, &fragment)?)
        })
        .await
    }

    async fn document_html(&self, url: &str) -> Result<String> {
        let target = url.to_string();
        self.with_session(url, move |session| {
            session.open(&target)?;
            Ok(session.html()?)
        })
        .await
    }

    async fn frame_html(&self, url: &str, frame: &FrameTarget) -> Result<String> {
        let target = url.to_string();
        let frame = *frame;
        self.with_session(url, move |session| Ok(session.open_frame(&target, &frame)?))
            .await
    }
}
