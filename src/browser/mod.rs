//! Browser access to the source site
//!
//! The site has no programmatic API, so every stage reads rendered pages.
//! Scrapers only see the [`PageLoader`] seam; [`ChromeLoader`] is the
//! production implementation and opens one [`BrowserSession`] per visit.

pub mod collector;
pub mod loader;
pub mod session;

use anyhow::Result;

pub use collector::{InterceptedResponse, ResponseCollector};
pub use loader::ChromeLoader;
pub use session::BrowserSession;

/// Statistics view rendered inside a nested frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameTarget {
    /// Element that activates the view
    pub tab_selector: &'static str,
    pub frame_selector: &'static str,
    /// Cell inside the frame that is empty until client-side rendering finishes
    pub ready_selector: &'static str,
}

/// Page visits the scrapers need
#[allow(async_fn_in_trait)]
pub trait PageLoader {
    /// Load `url` and return the JSON bodies of the page's own data calls
    /// whose URL contains `fragment`
    async fn intercept_json(&self, url: &str, fragment: &str) -> Result<ResponseCollector>;

    /// Rendered HTML of `url`
    async fn document_html(&self, url: &str) -> Result<String>;

    /// HTML of the nested frame described by `frame`, once it is ready
    async fn frame_html(&self, url: &str, frame: &FrameTarget) -> Result<String>;
}
