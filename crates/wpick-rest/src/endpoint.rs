//! Endpoint: where a picker's search requests go.
//!
//! Every picker talks to one route of the WordPress REST API:
//!
//! ```text
//! {site}/wp-json/wp/v2/{rest_base}?search=<query>&per_page=<N>
//! ```
//!
//! The query is percent-encoded the way browsers encode a URI component.

use wpick_core::config::SourceConfig;

const API_ROOT: &str = "/wp-json/wp/v2";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    base: String,
    route: String,
}

impl Endpoint {
    pub fn new(site: &str, source: &SourceConfig) -> Self {
        Self {
            base: site.trim_end_matches('/').to_string(),
            route: format!("{API_ROOT}/{}", source.rest_base()),
        }
    }

    /// Path component, e.g. `/wp-json/wp/v2/categories`.
    pub fn route(&self) -> &str {
        &self.route
    }

    pub fn search_url(&self, query: &str, per_page: u32) -> String {
        format!(
            "{}{}?search={}&per_page={}",
            self.base,
            self.route,
            urlencoding::encode(query),
            per_page
        )
    }
}
