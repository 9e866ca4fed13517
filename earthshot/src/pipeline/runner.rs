//! Acquisition cycle runner.

use super::backoff::Backoff;
use super::error::AcquireError;
use crate::bands::{download_archive, extract_archive, locate_bands, BandSet, TransferLimiter};
use crate::catalog::{CatalogClient, SceneResult};
use crate::composite::{composite, BandRaster};
use crate::config::EarthshotConfig;
use crate::http::AsyncHttpClient;
use crate::preview::{PreviewValidator, PreviewVerdict};
use crate::sampler::{Candidate, Sampler};
use crate::select::select_scene;
use chrono::Utc;
use image::RgbImage;
use rand::Rng;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

/// A finished acquisition, ready for captioning and publishing.
#[derive(Debug)]
pub struct Acquisition {
    /// Balanced 8-bit composite.
    pub image: RgbImage,
    /// The candidate that produced the scene.
    pub candidate: Candidate,
    /// Catalog metadata for the scene.
    pub scene: SceneResult,
    /// Which bands were stacked, including the false-colour flag.
    pub band_set: BandSet,
    /// Cycles spent before this acquisition succeeded.
    pub attempts: u32,
}

/// Wires the pipeline stages together and drives the redraw loop.
///
/// All collaborators are injected: the HTTP client for mockability, the
/// backoff so tests never sleep for real, and the RNG per call so draws are
/// reproducible.
pub struct AcquisitionPipeline<H, B> {
    http: Arc<H>,
    catalog: CatalogClient<Arc<H>>,
    preview: PreviewValidator<Arc<H>>,
    sampler: Sampler,
    backoff: B,
    limiter: Arc<TransferLimiter>,
    config: EarthshotConfig,
    /// Directory that per-cycle scratch directories are created under.
    work_root: PathBuf,
}

/// Consecutive decoder-unsupported products tolerated before the loop stops.
/// The missing decoder fails every product identically, so further redraws
/// only hide the condition from operators.
const MAX_UNSUPPORTED_STREAK: u32 = 3;

impl<H, B> AcquisitionPipeline<H, B>
where
    H: AsyncHttpClient + 'static,
    B: Backoff,
{
    pub fn new(http: H, config: EarthshotConfig, backoff: B, work_root: PathBuf) -> Self {
        let http = Arc::new(http);
        let catalog = CatalogClient::new(Arc::clone(&http), config.catalog.clone());
        let preview = PreviewValidator::new(
            Arc::clone(&http),
            config.catalog.credentials.clone(),
            config.imaging.preview_threshold,
        );
        let sampler = Sampler::new(config.search.clone());
        let limiter = Arc::new(TransferLimiter::new(config.retry.parallel_downloads));
        Self {
            http,
            catalog,
            preview,
            sampler,
            backoff,
            limiter,
            config,
            work_root,
        }
    }

    /// Runs one full cycle for one fresh candidate.
    ///
    /// Per-cycle scratch state lives in a temporary directory under the work
    /// root and is removed when the cycle ends, success or not.
    pub async fn run_cycle<R: Rng + Send>(&self, rng: &mut R) -> Result<Acquisition, AcquireError> {
        let candidate = self.sampler.draw(rng, Utc::now());
        info!(
            lat = candidate.latitude,
            lon = candidate.longitude,
            window_start = %candidate.window_start.date_naive(),
            "cycle started"
        );

        let results = self.catalog.search(&candidate).await?;
        if results.is_empty() {
            return Err(AcquireError::NoResults);
        }

        let scene = select_scene(&results)
            .ok_or(AcquireError::NoResults)?
            .clone();
        info!(scene = %scene.id, title = %scene.title, "scene selected");

        match self.preview.validate(&scene).await {
            PreviewVerdict::Accepted { coverage } => {
                info!(scene = %scene.id, coverage, "preview passed quality gate");
            }
            PreviewVerdict::Rejected(reason) => {
                return Err(AcquireError::LowQuality(reason.to_string()));
            }
        }

        let scratch = tempfile::tempdir_in(&self.work_root)
            .map_err(|e| AcquireError::Fatal(format!("cannot create scratch dir: {}", e)))?;

        let archive_path = scratch.path().join("product.zip");
        let credentials = self.config.catalog.credentials.clone();
        download_archive(
            Arc::clone(&self.http),
            credentials,
            &scene,
            &archive_path,
            Arc::clone(&self.limiter),
        )
        .await?;

        let extracted = scratch.path().join("extracted");
        extract_archive(&archive_path, &extracted).await?;

        let layout = locate_bands(&extracted)?;
        let band_set = BandSet::choose(
            rng,
            layout.is_atmospherically_corrected(),
            self.config.imaging.false_colour_probability,
        );
        info!(
            scene = %scene.id,
            false_colour = band_set.is_false_colour(),
            atmospherically_corrected = band_set.is_atmospherically_corrected(),
            "band set chosen"
        );

        let target = self.config.imaging.target_shape;
        let mut rasters = Vec::with_capacity(3);
        for band in band_set.bands() {
            let path = layout.band_path(band)?;
            let raster = tokio::task::spawn_blocking(move || BandRaster::open(&path, target))
                .await
                .map_err(|e| AcquireError::Fatal(format!("band decode task panicked: {}", e)))??;
            rasters.push(raster);
        }
        let rasters: [BandRaster; 3] = rasters
            .try_into()
            .map_err(|_| AcquireError::Fatal("band stack is not three bands".to_string()))?;

        let image = tokio::task::spawn_blocking(move || composite(&rasters, target))
            .await
            .map_err(|e| AcquireError::Fatal(format!("composite task panicked: {}", e)))??;

        info!(scene = %scene.id, "composite ready");
        Ok(Acquisition {
            image,
            candidate,
            scene,
            band_set,
            attempts: 1,
        })
    }

    /// Redraws candidates until a cycle succeeds.
    ///
    /// Rate-limit outcomes wait out the long backoff; every other retryable
    /// outcome waits the short redraw delay. A fatal outcome, or exhausting
    /// the configured attempt cap, returns the error to the caller.
    pub async fn run_until_success<R: Rng + Send>(
        &self,
        rng: &mut R,
    ) -> Result<Acquisition, AcquireError> {
        let mut attempt: u32 = 0;
        let mut unsupported_streak: u32 = 0;
        loop {
            attempt += 1;
            match self.run_cycle(rng).await {
                Ok(mut acquisition) => {
                    acquisition.attempts = attempt;
                    info!(attempts = attempt, "acquisition succeeded");
                    return Ok(acquisition);
                }
                Err(e) if !e.is_retryable() => return Err(e),
                Err(e) => {
                    if matches!(e, AcquireError::UnsupportedMedia(_)) {
                        unsupported_streak += 1;
                        if unsupported_streak >= MAX_UNSUPPORTED_STREAK {
                            return Err(AcquireError::Fatal(format!(
                                "{unsupported_streak} consecutive products with an \
                                 undecodable band encoding; last: {e}"
                            )));
                        }
                    } else {
                        unsupported_streak = 0;
                    }
                    warn!(attempt, error = %e, "cycle failed, redrawing");
                    if let Some(max) = self.config.retry.max_attempts {
                        if attempt >= max {
                            return Err(e);
                        }
                    }
                    let delay = if e.needs_long_backoff() {
                        self.config.retry.rate_limit_backoff
                    } else {
                        self.config.retry.redraw_delay
                    };
                    self.backoff.wait(delay).await;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::tests::MockHttpClient;
    use crate::pipeline::backoff::RecordingBackoff;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;
    use std::time::Duration;
    use tempfile::TempDir;

    fn config(max_attempts: u32) -> EarthshotConfig {
        let mut config = EarthshotConfig::default();
        config.retry = config
            .retry
            .with_rate_limit_backoff(Duration::from_secs(3600))
            .with_redraw_delay(Duration::from_millis(5))
            .with_max_attempts(max_attempts);
        config
    }

    #[tokio::test]
    async fn rate_limited_uses_long_backoff_then_gives_up() {
        let work = TempDir::new().unwrap();
        let mock = MockHttpClient::new().with_body("search?", 503, vec![]);
        let pipeline =
            AcquisitionPipeline::new(mock, config(2), RecordingBackoff::new(), work.path().into());
        let mut rng = SmallRng::seed_from_u64(1);

        let result = pipeline.run_until_success(&mut rng).await;
        assert!(matches!(result, Err(AcquireError::RateLimited)));
        // Attempt 1 backs off; attempt 2 hits the cap and returns
        assert_eq!(pipeline.backoff.waits(), vec![Duration::from_secs(3600)]);
    }

    #[tokio::test]
    async fn no_results_redraws_with_short_delay() {
        let work = TempDir::new().unwrap();
        let empty = br#"{"feed": {"opensearch:totalResults": "0"}}"#.to_vec();
        let mock = MockHttpClient::new().with_body("search?", 200, empty);
        let pipeline =
            AcquisitionPipeline::new(mock, config(3), RecordingBackoff::new(), work.path().into());
        let mut rng = SmallRng::seed_from_u64(2);

        let result = pipeline.run_until_success(&mut rng).await;
        assert!(matches!(result, Err(AcquireError::NoResults)));
        assert_eq!(
            pipeline.backoff.waits(),
            vec![Duration::from_millis(5), Duration::from_millis(5)]
        );
    }

    #[tokio::test]
    async fn transport_failure_is_transient_and_retried() {
        let work = TempDir::new().unwrap();
        let mock = MockHttpClient::new(); // no routes at all
        let pipeline =
            AcquisitionPipeline::new(mock, config(2), RecordingBackoff::new(), work.path().into());
        let mut rng = SmallRng::seed_from_u64(3);

        let result = pipeline.run_until_success(&mut rng).await;
        assert!(matches!(result, Err(AcquireError::Transient(_))));
        assert_eq!(pipeline.backoff.waits().len(), 1);
    }

    #[tokio::test]
    async fn rejected_preview_maps_to_low_quality() {
        let work = TempDir::new().unwrap();
        let feed = br#"{"feed": {"opensearch:totalResults": "1", "entry":
            {"title": "S2A_MSIL1C_20200105", "id": "s1",
             "summary": "Date: 2020-01-05T11:04:41.024Z, Instrument: MSI",
             "link": [{"href": "https://hub/s1/$value"},
                      {"rel": "icon", "href": "https://hub/s1/icon"}]}}}"#
            .to_vec();
        // Preview route exists but serves bytes that do not decode
        let mock = MockHttpClient::new()
            .with_body("search?", 200, feed)
            .with_body("icon", 200, b"junk".to_vec());
        let pipeline =
            AcquisitionPipeline::new(mock, config(1), RecordingBackoff::new(), work.path().into());
        let mut rng = SmallRng::seed_from_u64(4);

        let result = pipeline.run_until_success(&mut rng).await;
        assert!(matches!(result, Err(AcquireError::LowQuality(_))));
        // Cap of one attempt: no backoff recorded
        assert!(pipeline.backoff.waits().is_empty());
    }
}
