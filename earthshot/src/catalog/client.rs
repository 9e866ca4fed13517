//! Catalog query client.

use super::feed::{parse_feed, FeedParseError};
use super::types::SceneResult;
use crate::config::CatalogConfig;
use crate::http::{AsyncHttpClient, HttpError};
use crate::sampler::Candidate;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Failures of a single catalog query, classified for the retry loop.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The hub signalled overload (HTTP 503); the caller must take the long
    /// backoff before issuing any further catalog query.
    #[error("catalog rate limited")]
    RateLimited,

    /// Transport failure, timeout, or an unexpected status; safe to redraw.
    #[error("catalog request failed: {0}")]
    Transient(String),

    /// The hub answered 2xx but the body was not a usable feed.
    #[error("catalog response unusable: {0}")]
    Parse(#[from] FeedParseError),
}

impl From<HttpError> for CatalogError {
    fn from(e: HttpError) -> Self {
        CatalogError::Transient(e.to_string())
    }
}

/// Client for the imagery catalog's OpenSearch endpoint.
pub struct CatalogClient<H> {
    http: H,
    config: CatalogConfig,
}

impl<H: AsyncHttpClient> CatalogClient<H> {
    pub fn new(http: H, config: CatalogConfig) -> Self {
        Self { http, config }
    }

    /// Searches for scenes intersecting the candidate's point within its
    /// time window, below the configured cloud-cover ceiling.
    ///
    /// Returns an empty vector when the catalog reports zero matches.
    pub async fn search(&self, candidate: &Candidate) -> Result<Vec<SceneResult>, CatalogError> {
        let url = self.build_query(candidate);
        debug!(
            lat = candidate.latitude,
            lon = candidate.longitude,
            window_start = %candidate.window_start,
            "querying catalog"
        );

        let response = self.http.get(&url, self.config.credentials.as_ref()).await?;

        if response.is_service_unavailable() {
            warn!("catalog returned 503, backing off");
            return Err(CatalogError::RateLimited);
        }
        if !response.is_success() {
            warn!(status = response.status, "catalog returned error status");
            return Err(CatalogError::Transient(format!(
                "HTTP {} from catalog",
                response.status
            )));
        }

        let scenes = parse_feed(&response.body)?;
        info!(
            results = scenes.len(),
            lat = candidate.latitude,
            lon = candidate.longitude,
            "catalog query complete"
        );
        Ok(scenes)
    }

    /// Builds the OpenSearch query URL for a candidate.
    fn build_query(&self, candidate: &Candidate) -> String {
        format!(
            "{endpoint}?start=0&rows={rows}&q=footprint:\"Intersects({lat}, {lon})\" AND \
             platformname:\"Sentinel-2\" AND \
             ingestiondate:[{start} TO {end}] AND \
             cloudcoverpercentage:[0 TO {cloud}]&format=json",
            endpoint = self.config.search_endpoint,
            rows = self.config.result_rows,
            lat = candidate.latitude,
            lon = candidate.longitude,
            start = candidate.window_start.format("%Y-%m-%dT%H:%M:%SZ"),
            end = candidate.window_end.format("%Y-%m-%dT%H:%M:%SZ"),
            cloud = self.config.cloud_cover_ceiling,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::tests::MockHttpClient;
    use crate::http::HttpResponse;
    use chrono::{Duration, TimeZone, Utc};

    fn candidate() -> Candidate {
        let start = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
        Candidate {
            latitude: 10.0,
            longitude: 20.0,
            window_start: start,
            window_end: start + Duration::days(60),
        }
    }

    fn two_result_feed() -> Vec<u8> {
        br#"{"feed": {"opensearch:totalResults": "2", "entry": [
            {"title": "S2A_MSIL1C_20200105", "id": "plain",
             "summary": "Date: 2020-01-05T11:04:41.024Z, Instrument: MSI",
             "link": [{"href": "https://hub/plain/$value"},
                      {"rel": "icon", "href": "https://hub/plain/icon"}]},
            {"title": "S2B_MSIL2A_20200107", "id": "corrected",
             "summary": "Date: 2020-01-07T11:04:41.024Z, Instrument: MSI",
             "link": [{"href": "https://hub/corrected/$value"},
                      {"rel": "icon", "href": "https://hub/corrected/icon"}]}
        ]}}"#
            .to_vec()
    }

    #[tokio::test]
    async fn search_parses_results() {
        let mock = MockHttpClient::new().with_body("search?", 200, two_result_feed());
        let client = CatalogClient::new(mock, CatalogConfig::default());

        let scenes = client.search(&candidate()).await.unwrap();
        assert_eq!(scenes.len(), 2);
        assert_eq!(scenes[0].id, "plain");
        assert_eq!(scenes[1].id, "corrected");
    }

    #[tokio::test]
    async fn search_503_is_rate_limited() {
        let mock = MockHttpClient::new().with_body("search?", 503, vec![]);
        let client = CatalogClient::new(mock, CatalogConfig::default());

        let result = client.search(&candidate()).await;
        assert!(matches!(result, Err(CatalogError::RateLimited)));
    }

    #[tokio::test]
    async fn search_other_error_status_is_transient() {
        let mock = MockHttpClient::new().with_body("search?", 500, vec![]);
        let client = CatalogClient::new(mock, CatalogConfig::default());

        let result = client.search(&candidate()).await;
        assert!(matches!(result, Err(CatalogError::Transient(_))));
    }

    #[tokio::test]
    async fn search_transport_failure_is_transient() {
        let mock = MockHttpClient::new(); // no routes: every request fails
        let client = CatalogClient::new(mock, CatalogConfig::default());

        let result = client.search(&candidate()).await;
        assert!(matches!(result, Err(CatalogError::Transient(_))));
    }

    #[tokio::test]
    async fn search_zero_results_is_ok_empty() {
        let body = br#"{"feed": {"opensearch:totalResults": "0"}}"#.to_vec();
        let mock = MockHttpClient::new().with_body("search?", 200, body);
        let client = CatalogClient::new(mock, CatalogConfig::default());

        let scenes = client.search(&candidate()).await.unwrap();
        assert!(scenes.is_empty());
    }

    #[tokio::test]
    async fn query_encodes_candidate_and_config() {
        let mock = MockHttpClient::new().with_body("search?", 200, two_result_feed());
        let config = CatalogConfig::default()
            .with_cloud_cover_ceiling(0.1)
            .with_result_rows(100);
        let client = CatalogClient::new(mock, config);

        client.search(&candidate()).await.unwrap();

        let requests = client.http.requests.lock().unwrap();
        let url = &requests[0];
        assert!(url.contains("Intersects(10, 20)"));
        assert!(url.contains("ingestiondate:[2020-01-01T00:00:00Z TO 2020-03-01T00:00:00Z]"));
        assert!(url.contains("cloudcoverpercentage:[0 TO 0.1]"));
        assert!(url.contains("rows=100"));
        assert!(url.ends_with("format=json"));
    }
}
