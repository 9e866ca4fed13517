//! Failure taxonomy for the acquisition loop.

use crate::bands::{FetchError, LayoutError};
use crate::catalog::CatalogError;
use crate::composite::CompositeError;
use thiserror::Error;

/// Named outcomes of one acquisition cycle.
///
/// Everything except `Fatal` is handled by abandoning the candidate and
/// redrawing; `RateLimited` additionally requires the long backoff before
/// the next catalog query. `Fatal` propagates out so operators see it
/// instead of the loop spinning on broken state.
#[derive(Debug, Error)]
pub enum AcquireError {
    /// Upstream signalled overload; take the long backoff, then redraw.
    #[error("catalog rate limited")]
    RateLimited,

    /// Network or service hiccup; redraw immediately.
    #[error("transient failure: {0}")]
    Transient(String),

    /// The catalog matched nothing for this candidate; redraw.
    #[error("no scenes found for candidate")]
    NoResults,

    /// The preview failed the quality gate; redraw.
    #[error("scene rejected: {0}")]
    LowQuality(String),

    /// The product archive would not extract or its contents were unusable;
    /// redraw.
    #[error("corrupt product: {0}")]
    CorruptArchive(String),

    /// The product's band files use an encoding the decoder stack cannot
    /// read. Retryable, but the loop escalates after consecutive hits: the
    /// same missing decoder will fail every product the catalog serves.
    #[error("unsupported band encoding: {0}")]
    UnsupportedMedia(String),

    /// Unexpected condition that retrying cannot fix.
    #[error("fatal: {0}")]
    Fatal(String),
}

impl AcquireError {
    /// Whether the outer loop may continue with a fresh candidate.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, AcquireError::Fatal(_))
    }

    /// Whether this outcome demands the long rate-limit backoff.
    pub fn needs_long_backoff(&self) -> bool {
        matches!(self, AcquireError::RateLimited)
    }
}

impl From<CatalogError> for AcquireError {
    fn from(e: CatalogError) -> Self {
        match e {
            CatalogError::RateLimited => AcquireError::RateLimited,
            CatalogError::Transient(msg) => AcquireError::Transient(msg),
            // A malformed feed is indistinguishable from a hub glitch;
            // redraw rather than abort.
            CatalogError::Parse(e) => AcquireError::Transient(e.to_string()),
        }
    }
}

impl From<FetchError> for AcquireError {
    fn from(e: FetchError) -> Self {
        match e {
            FetchError::Download(msg) => AcquireError::Transient(msg),
            FetchError::CorruptArchive(msg) => AcquireError::CorruptArchive(msg),
            FetchError::Io(msg) => AcquireError::Fatal(msg),
        }
    }
}

impl From<LayoutError> for AcquireError {
    fn from(e: LayoutError) -> Self {
        match e {
            // The archive extracted but does not look like a product:
            // treat like a corrupt download and redraw.
            LayoutError::NoProduct(_)
            | LayoutError::NoGranule(_)
            | LayoutError::NoImageData(_)
            | LayoutError::MissingBand { .. } => AcquireError::CorruptArchive(e.to_string()),
            LayoutError::Io { .. } => AcquireError::Fatal(e.to_string()),
        }
    }
}

impl From<CompositeError> for AcquireError {
    fn from(e: CompositeError) -> Self {
        match e {
            // Damaged band files mean this product is unusable.
            CompositeError::BandRead { .. } => AcquireError::CorruptArchive(e.to_string()),
            // A missing decoder is a property of the process, not the scene.
            CompositeError::UnsupportedFormat { .. } => {
                AcquireError::UnsupportedMedia(e.to_string())
            }
            // All-zero bands slipped past the preview gate; same remedy.
            CompositeError::NoValidPixels => AcquireError::LowQuality(e.to_string()),
            // Bands are resampled to the target grid before stacking, so a
            // mismatch is a programming error.
            CompositeError::ShapeMismatch(..) => AcquireError::Fatal(e.to_string()),
        }
    }
}
