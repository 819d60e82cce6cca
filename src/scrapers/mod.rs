pub mod discovery;
pub mod match_list;
pub mod player_results;

pub use discovery::TournamentDiscovery;
pub use match_list::MatchListScraper;
pub use player_results::PlayerResultScraper;

use scraper::ElementRef;
use url::Url;

/// Resolve an href found on `page_url` into an absolute link. An href that
/// cannot be joined is kept as written.
pub fn resolve_link(page_url: &str, href: &str) -> String {
    let href = href.trim();
    Url::parse(page_url)
        .and_then(|base| base.join(href))
        .map(String::from)
        .unwrap_or_else(|_| href.to_string())
}

/// Whitespace-normalized text of an element
pub(crate) fn element_text(element: &ElementRef) -> String {
    element
        .text()
        .collect::<Vec<_>>()
        .join(" ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
