use headless_chrome::{Browser, LaunchOptions, Tab};
use log::{debug, info};
use serde_json::Value;
use std::ffi::OsStr;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use super::collector::ResponseCollector;
use super::FrameTarget;
use crate::config::BrowserSettings;
use crate::errors::ScrapeError;

const RESPONSE_HANDLER: &str = "darts_sync_collector";

/// One browser process with a single tab, alive for one page visit.
/// Dropping the session shuts the browser down.
pub struct BrowserSession {
    _browser: Browser,
    tab: Arc<Tab>,
    settings: BrowserSettings,
}

impl BrowserSession {
    pub fn launch(settings: &BrowserSettings) -> Result<Self, ScrapeError> {
        let user_agent_arg = settings
            .user_agent
            .as_ref()
            .map(|ua| format!("--user-agent={}", ua));

        let mut args: Vec<&OsStr> = vec![
            OsStr::new("--disable-blink-features=AutomationControlled"),
            OsStr::new("--disable-dev-shm-usage"),
        ];
        if let Some(ref ua) = user_agent_arg {
            args.push(OsStr::new(ua));
        }

        let options = LaunchOptions::default_builder()
            .headless(settings.headless)
            .sandbox(settings.sandbox)
            .window_size(Some(settings.window_size))
            .idle_browser_timeout(settings.navigation_timeout + Duration::from_secs(30))
            .args(args)
            .build()
            .map_err(|e| ScrapeError::Launch(e.to_string()))?;

        let browser = Browser::new(options).map_err(|e| ScrapeError::Launch(format!("{e:#}")))?;
        let tab = browser
            .new_tab()
            .map_err(|e| ScrapeError::Launch(format!("Tab creation failed: {e:#}")))?;
        tab.set_default_timeout(settings.navigation_timeout);

        Ok(Self {
            _browser: browser,
            tab,
            settings: settings.clone(),
        })
    }

    /// Navigate, wait for the load to finish, then let client-side rendering settle
    pub fn open(&self, url: &str) -> Result<(), ScrapeError> {
        info!("Browser navigating to: {}", url);

        self.tab
            .navigate_to(url)
            .map_err(|e| ScrapeError::from_browser(e, &format!("navigate to {url}")))?;
        self.tab
            .wait_until_navigated()
            .map_err(|e| ScrapeError::from_browser(e, &format!("load {url}")))?;

        std::thread::sleep(self.settings.settle_delay);
        Ok(())
    }

    /// Load `url` while collecting JSON bodies of responses whose URL contains `fragment`
    pub fn open_intercepting(&self, url: &str, fragment: &str) -> Result<ResponseCollector, ScrapeError> {
        let shared = Arc::new(Mutex::new(ResponseCollector::new()));
        let sink = Arc::clone(&shared);
        let fragment = fragment.to_string();

        self.tab
            .register_response_handling(
                RESPONSE_HANDLER,
                Box::new(move |params, fetch_body| {
                    let response_url = params.response.url.clone();
                    if !response_url.contains(&fragment) {
                        return;
                    }
                    match fetch_body() {
                        Ok(body) if !body.base_64_encoded => {
                            if let Ok(mut collector) = sink.lock() {
                                collector.push_raw(&response_url, &body.body);
                            }
                        }
                        Ok(_) => debug!("Skipping binary response from {}", response_url),
                        Err(e) => debug!("Could not read body of {}: {}", response_url, e),
                    }
                }),
            )
            .map_err(|e| ScrapeError::Navigation(format!("Response interception failed: {e:#}")))?;

        let loaded = self.open(url);
        if let Err(e) = self.tab.deregister_response_handling(RESPONSE_HANDLER) {
            debug!("Failed to remove response handler: {e:#}");
        }
        loaded?;

        let collector = shared
            .lock()
            .map(|mut guard| std::mem::take(&mut *guard))
            .map_err(|_| ScrapeError::JavaScript("response collector poisoned".to_string()))?;
        info!("  → Intercepted {} data responses", collector.len());
        Ok(collector)
    }

    pub fn html(&self) -> Result<String, ScrapeError> {
        self.tab
            .get_content()
            .map_err(|e| ScrapeError::JavaScript(format!("Failed to read page content: {e:#}")))
    }

    pub fn evaluate(&self, script: &str) -> Result<Option<Value>, ScrapeError> {
        self.tab
            .evaluate(script, false)
            .map(|result| result.value)
            .map_err(|e| ScrapeError::JavaScript(format!("{e:#}")))
    }

    /// Click the first element matching `selector`
    pub fn click(&self, selector: &str) -> Result<(), ScrapeError> {
        let script = format!(
            "(() => {{ const el = document.querySelector({}); if (!el) return false; el.click(); return true; }})()",
            js_string(selector)
        );

        match self.evaluate(&script)?.and_then(|v| v.as_bool()) {
            Some(true) => Ok(()),
            _ => Err(ScrapeError::ElementNotFound(selector.to_string())),
        }
    }

    /// Activate the frame's tab, wait until its ready cell has text, and
    /// return the frame document
    pub fn open_frame(&self, url: &str, target: &FrameTarget) -> Result<String, ScrapeError> {
        self.open(url)?;
        self.click(target.tab_selector)?;
        self.wait_for_frame_cell(target)?;

        let script = format!(
            "(() => {{ const doc = {}; return doc ? doc.documentElement.outerHTML : null; }})()",
            frame_document_expr(target.frame_selector)
        );
        self.evaluate(&script)?
            .and_then(|v| v.as_str().map(str::to_string))
            .ok_or_else(|| ScrapeError::ElementNotFound(target.frame_selector.to_string()))
    }

    fn wait_for_frame_cell(&self, target: &FrameTarget) -> Result<(), ScrapeError> {
        let script = format!(
            "(() => {{ const doc = {}; if (!doc) return null; const cell = doc.querySelector({}); return cell ? cell.textContent.trim() : ''; }})()",
            frame_document_expr(target.frame_selector),
            js_string(target.ready_selector)
        );

        let start = Instant::now();
        let mut frame_seen = false;

        loop {
            if let Some(Value::String(text)) = self.evaluate(&script)? {
                frame_seen = true;
                if !text.is_empty() {
                    debug!("Frame cell {} ready: {}", target.ready_selector, text);
                    return Ok(());
                }
            }

            if start.elapsed() > self.settings.navigation_timeout {
                return Err(if frame_seen {
                    ScrapeError::Timeout(format!("frame cell {}", target.ready_selector))
                } else {
                    ScrapeError::ElementNotFound(target.frame_selector.to_string())
                });
            }

            std::thread::sleep(self.settings.poll_interval);
        }
    }
}

fn frame_document_expr(frame_selector: &str) -> String {
    format!(
        "(() => {{ const f = document.querySelector({}); return f ? (f.contentDocument || (f.contentWindow && f.contentWindow.document)) : null; }})()",
        js_string(frame_selector)
    )
}

/// Quote a value as a JavaScript string literal
fn js_string(value: &str) -> String {
    Value::String(value.to_string()).to_string()
}
