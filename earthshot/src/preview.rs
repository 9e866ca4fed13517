//! Preview-based quality gating.
//!
//! Before committing to a multi-hundred-megabyte product download, the
//! pipeline fetches the scene's quicklook preview and checks how much of it
//! carries real data. No-data pixels (sensor edges, unimaged ocean fill)
//! decode as exact black, so a scene dominated by them shows up as pixels
//! whose channel mean is zero.

use crate::catalog::SceneResult;
use crate::http::{AsyncHttpClient, Credentials};
use image::RgbImage;
use tracing::{debug, info};

/// Outcome of validating one scene's preview.
#[derive(Debug, Clone, PartialEq)]
pub enum PreviewVerdict {
    /// Enough valid coverage; proceed to the full download.
    Accepted { coverage: f64 },
    /// Scene is unusable or the preview could not be obtained; redraw.
    Rejected(RejectReason),
}

/// Why a preview was rejected. Every variant sends the outer loop back to
/// the sampler; the same scene is never retried.
#[derive(Debug, Clone, PartialEq)]
pub enum RejectReason {
    /// Preview fetch failed (transport error or non-2xx status).
    FetchFailed(String),
    /// Preview bytes did not decode as an image.
    DecodeFailed(String),
    /// Valid-pixel fraction below the accept threshold.
    LowCoverage { coverage: f64, threshold: f64 },
}

impl std::fmt::Display for RejectReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RejectReason::FetchFailed(msg) => write!(f, "preview fetch failed: {}", msg),
            RejectReason::DecodeFailed(msg) => write!(f, "preview decode failed: {}", msg),
            RejectReason::LowCoverage {
                coverage,
                threshold,
            } => write!(
                f,
                "valid coverage {:.3} below threshold {:.3}",
                coverage, threshold
            ),
        }
    }
}

/// Downloads and gates scene previews.
pub struct PreviewValidator<H> {
    http: H,
    credentials: Option<Credentials>,
    threshold: f64,
}

impl<H: AsyncHttpClient> PreviewValidator<H> {
    pub fn new(http: H, credentials: Option<Credentials>, threshold: f64) -> Self {
        Self {
            http,
            credentials,
            threshold,
        }
    }

    /// Fetches the scene's preview and applies the coverage gate.
    ///
    /// Failures are folded into [`PreviewVerdict::Rejected`] rather than
    /// surfaced as errors: a broken preview and a bad scene get the same
    /// treatment, a fresh candidate.
    pub async fn validate(&self, scene: &SceneResult) -> PreviewVerdict {
        let response = match self.http.get(&scene.preview_url, self.credentials.as_ref()).await {
            Ok(r) if r.is_success() => r,
            Ok(r) => {
                debug!(scene = %scene.id, status = r.status, "preview fetch returned error status");
                return PreviewVerdict::Rejected(RejectReason::FetchFailed(format!(
                    "HTTP {}",
                    r.status
                )));
            }
            Err(e) => {
                debug!(scene = %scene.id, error = %e, "preview fetch failed");
                return PreviewVerdict::Rejected(RejectReason::FetchFailed(e.to_string()));
            }
        };

        let preview = match image::load_from_memory(&response.body) {
            Ok(img) => img.to_rgb8(),
            Err(e) => {
                debug!(scene = %scene.id, error = %e, "preview decode failed");
                return PreviewVerdict::Rejected(RejectReason::DecodeFailed(e.to_string()));
            }
        };

        let coverage = coverage_fraction(&preview);
        if coverage >= self.threshold {
            info!(scene = %scene.id, coverage, "preview accepted");
            PreviewVerdict::Accepted { coverage }
        } else {
            info!(scene = %scene.id, coverage, threshold = self.threshold, "preview rejected");
            PreviewVerdict::Rejected(RejectReason::LowCoverage {
                coverage,
                threshold: self.threshold,
            })
        }
    }
}

/// Fraction of pixels whose mean across colour channels is non-zero.
///
/// For 8-bit channels the mean is non-zero exactly when any channel is
/// non-zero, so this counts pixels that are not pure black.
pub fn coverage_fraction(image: &RgbImage) -> f64 {
    let total = (image.width() as u64) * (image.height() as u64);
    if total == 0 {
        return 0.0;
    }
    let valid = image
        .pixels()
        .filter(|p| p.0[0] != 0 || p.0[1] != 0 || p.0[2] != 0)
        .count() as u64;
    valid as f64 / total as f64
}
