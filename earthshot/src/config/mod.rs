//! Configuration types for the acquisition pipeline.
//!
//! Configuration is explicit and value-typed: components receive the structs
//! they need at construction and never read ambient process state. The CLI
//! owns environment-variable lookup and hands the result down.

mod catalog;
mod imaging;
mod retry;
mod search;

pub use catalog::CatalogConfig;
pub use imaging::ImagingConfig;
pub use retry::RetryConfig;
pub use search::SearchConfig;

use crate::http::Credentials;

/// Top-level configuration for a pipeline instance.
#[derive(Debug, Clone, Default)]
pub struct EarthshotConfig {
    pub catalog: CatalogConfig,
    pub search: SearchConfig,
    pub imaging: ImagingConfig,
    pub retry: RetryConfig,
}

impl EarthshotConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.catalog.credentials = Some(credentials);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_complete() {
        let config = EarthshotConfig::default();
        assert!(config.catalog.credentials.is_none());
        assert_eq!(config.search.window_days, 60);
        assert!((config.imaging.preview_threshold - 0.9).abs() < f64::EPSILON);
    }

    #[test]
    fn with_credentials_sets_catalog_auth() {
        let config = EarthshotConfig::new()
            .with_credentials(Credentials::new("user", "secret"));
        let creds = config.catalog.credentials.unwrap();
        assert_eq!(creds.user, "user");
        assert_eq!(creds.password, "secret");
    }
}
