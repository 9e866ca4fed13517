//! Publishing seam.
//!
//! Actual social posting is a collaborator outside this crate; the pipeline
//! hands a finished composite and caption through the [`Publisher`] trait.
//! [`FilePublisher`] is the built-in implementation: it writes the JPEG and
//! a caption sidecar to an output directory, which is also what operators
//! use to inspect results locally.

use crate::bands::BandSet;
use image::RgbImage;
use std::future::Future;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

/// Failures while handing off a finished acquisition.
#[derive(Debug, Error)]
pub enum PublishError {
    #[error("encode failed: {0}")]
    Encode(String),

    #[error("I/O error: {0}")]
    Io(String),
}

/// Receives finished composites.
pub trait Publisher: Send + Sync {
    /// Publishes one acquisition. `name` is a unique stem for artifact
    /// naming; `band_set` carries the false-colour and atmospheric-correction
    /// flags as structured data, so implementations that do more than write
    /// text (alt text, tags, per-kind routing) need not parse the caption.
    fn publish(
        &self,
        name: &str,
        image: &RgbImage,
        caption: &str,
        band_set: BandSet,
    ) -> impl Future<Output = Result<(), PublishError>> + Send;
}

/// Writes `<name>.jpg` and `<name>.txt` into an output directory.
pub struct FilePublisher {
    output_dir: PathBuf,
}

impl FilePublisher {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }
}

impl Publisher for FilePublisher {
    async fn publish(
        &self,
        name: &str,
        image: &RgbImage,
        caption: &str,
        band_set: BandSet,
    ) -> Result<(), PublishError> {
        tokio::fs::create_dir_all(&self.output_dir)
            .await
            .map_err(|e| PublishError::Io(e.to_string()))?;

        let image_path = self.output_dir.join(format!("{name}.jpg"));
        let caption_path = self.output_dir.join(format!("{name}.txt"));

        // JPEG encoding is CPU-bound; keep it off the async threads.
        let image = image.clone();
        let encode_path = image_path.clone();
        tokio::task::spawn_blocking(move || {
            image.save_with_format(&encode_path, image::ImageFormat::Jpeg)
        })
        .await
        .map_err(|e| PublishError::Encode(format!("encode task panicked: {}", e)))?
        .map_err(|e| PublishError::Encode(e.to_string()))?;

        tokio::fs::write(&caption_path, caption)
            .await
            .map_err(|e| PublishError::Io(e.to_string()))?;

        info!(
            image = %image_path.display(),
            false_colour = band_set.is_false_colour(),
            atmospherically_corrected = band_set.is_atmospherically_corrected(),
            "acquisition published"
        );
        Ok(())
    }
}
