pub mod settings;

pub use settings::{AppConfig, BrowserSettings, ScraperSettings, SyncSettings};
