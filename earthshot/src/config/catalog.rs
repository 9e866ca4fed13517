//! Catalog query configuration.

use crate::http::Credentials;

/// Default OpenSearch endpoint for the Copernicus data hub.
pub const DEFAULT_SEARCH_ENDPOINT: &str = "https://scihub.copernicus.eu/dhus/search";

/// Default cloud-cover ceiling (percent) for catalog queries.
pub const DEFAULT_CLOUD_COVER_CEILING: f64 = 0.1;

/// Default page size for catalog queries.
pub const DEFAULT_RESULT_ROWS: u32 = 100;

/// Configuration for the imagery catalog client.
#[derive(Debug, Clone)]
pub struct CatalogConfig {
    /// OpenSearch endpoint, without query parameters.
    pub search_endpoint: String,
    /// Basic-auth credentials; `None` only makes sense against mock backends.
    pub credentials: Option<Credentials>,
    /// Maximum acceptable cloud cover percentage for returned scenes.
    pub cloud_cover_ceiling: f64,
    /// Number of results requested per query.
    pub result_rows: u32,
}

impl CatalogConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_search_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.search_endpoint = endpoint.into();
        self
    }

    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// Set the cloud-cover ceiling in percent. Scenes above the ceiling are
    /// filtered out by the catalog itself, not client-side.
    pub fn with_cloud_cover_ceiling(mut self, ceiling: f64) -> Self {
        self.cloud_cover_ceiling = ceiling;
        self
    }

    pub fn with_result_rows(mut self, rows: u32) -> Self {
        self.result_rows = rows;
        self
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            search_endpoint: DEFAULT_SEARCH_ENDPOINT.to_string(),
            credentials: None,
            cloud_cover_ceiling: DEFAULT_CLOUD_COVER_CEILING,
            result_rows: DEFAULT_RESULT_ROWS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = CatalogConfig::default();
        assert_eq!(config.search_endpoint, DEFAULT_SEARCH_ENDPOINT);
        assert_eq!(config.result_rows, DEFAULT_RESULT_ROWS);
        assert!((config.cloud_cover_ceiling - DEFAULT_CLOUD_COVER_CEILING).abs() < f64::EPSILON);
    }

    #[test]
    fn builder_overrides() {
        let config = CatalogConfig::new()
            .with_search_endpoint("https://alt.example.com/search")
            .with_cloud_cover_ceiling(5.0)
            .with_result_rows(25);
        assert_eq!(config.search_endpoint, "https://alt.example.com/search");
        assert_eq!(config.result_rows, 25);
        assert!((config.cloud_cover_ceiling - 5.0).abs() < f64::EPSILON);
    }
}
