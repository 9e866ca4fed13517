//! Archive and tile download.
//!
//! Two retrieval paths exist: the catalog's single product zip (streamed to
//! disk, then extracted), and per-band object downloads for backends that
//! expose individual tiles. Both run under the cycle's transfer limiter.

use crate::bands::TransferLimiter;
use crate::catalog::SceneResult;
use crate::http::{AsyncHttpClient, Credentials, HttpError};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

/// Failures while retrieving or unpacking scene data.
#[derive(Debug, Error)]
pub enum FetchError {
    /// A transfer failed; the candidate should be abandoned and redrawn.
    #[error("download failed: {0}")]
    Download(String),

    /// The archive did not extract cleanly. Non-fatal to the process: the
    /// outer loop discards the candidate and redraws.
    #[error("corrupt archive: {0}")]
    CorruptArchive(String),

    /// Local filesystem failure.
    #[error("I/O error: {0}")]
    Io(String),
}

impl From<HttpError> for FetchError {
    fn from(e: HttpError) -> Self {
        FetchError::Download(e.to_string())
    }
}

/// One parallel transfer: a source URL and the destination file the worker
/// exclusively owns.
#[derive(Debug, Clone)]
pub struct TransferJob {
    pub url: String,
    pub dest: PathBuf,
}

/// Streams a scene's product archive to `dest`.
///
/// The transfer runs through the same bounded pool as per-band downloads,
/// so the cycle never holds more open transfers than the limiter allows.
pub async fn download_archive<H>(
    http: Arc<H>,
    credentials: Option<Credentials>,
    scene: &SceneResult,
    dest: &Path,
    limiter: Arc<TransferLimiter>,
) -> Result<u64, FetchError>
where
    H: AsyncHttpClient + 'static,
{
    info!(scene = %scene.id, dest = %dest.display(), "downloading product archive");
    let job = TransferJob {
        url: scene.download_url.clone(),
        dest: dest.to_path_buf(),
    };
    let bytes = download_files(http, credentials, vec![job], limiter).await?;
    info!(scene = %scene.id, bytes, "product archive downloaded");
    Ok(bytes)
}

/// Extracts a product zip into `out_dir`.
///
/// Extraction is blocking CPU/disk work and runs on the blocking pool. A
/// malformed or truncated zip maps to [`FetchError::CorruptArchive`].
pub async fn extract_archive(zip_path: &Path, out_dir: &Path) -> Result<(), FetchError> {
    let zip_path = zip_path.to_path_buf();
    let out_dir = out_dir.to_path_buf();

    tokio::task::spawn_blocking(move || {
        std::fs::create_dir_all(&out_dir)
            .map_err(|e| FetchError::Io(format!("create {}: {}", out_dir.display(), e)))?;
        let file = std::fs::File::open(&zip_path)
            .map_err(|e| FetchError::Io(format!("open {}: {}", zip_path.display(), e)))?;
        let mut archive = zip::ZipArchive::new(file)
            .map_err(|e| FetchError::CorruptArchive(e.to_string()))?;
        archive
            .extract(&out_dir)
            .map_err(|e| FetchError::CorruptArchive(e.to_string()))?;
        debug!(archive = %zip_path.display(), files = archive.len(), "archive extracted");
        Ok(())
    })
    .await
    .map_err(|e| FetchError::Io(format!("extraction task panicked: {}", e)))?
}

/// Downloads a batch of files through the bounded worker pool.
///
/// Each worker acquires a limiter permit, streams its URL to its own
/// destination path, and releases the permit. Any failure abandons the
/// scene: partial band sets cannot be composited.
pub async fn download_files<H>(
    http: Arc<H>,
    credentials: Option<Credentials>,
    jobs: Vec<TransferJob>,
    limiter: Arc<TransferLimiter>,
) -> Result<u64, FetchError>
where
    H: AsyncHttpClient + 'static,
{
    let total_jobs = jobs.len();
    let mut workers = JoinSet::new();

    for job in jobs {
        let http = Arc::clone(&http);
        let limiter = Arc::clone(&limiter);
        let credentials = credentials.clone();

        workers.spawn(async move {
            let _permit = limiter.acquire().await;
            http.download(&job.url, credentials.as_ref(), &job.dest)
                .await
                .map_err(|e| (job.url.clone(), e))
        });
    }

    let mut bytes_total = 0u64;
    let mut failures: Vec<String> = Vec::new();

    while let Some(result) = workers.join_next().await {
        match result {
            Ok(Ok(bytes)) => bytes_total += bytes,
            Ok(Err((url, e))) => {
                warn!(url, error = %e, "transfer failed");
                failures.push(format!("{url}: {e}"));
            }
            Err(join_err) => {
                warn!(error = %join_err, "transfer task panicked");
                failures.push(format!("task panicked: {join_err}"));
            }
        }
    }

    if failures.is_empty() {
        debug!(jobs = total_jobs, bytes = bytes_total, "all transfers complete");
        Ok(bytes_total)
    } else {
        Err(FetchError::Download(format!(
            "{} of {} transfers failed: {}",
            failures.len(),
            total_jobs,
            failures.join("; ")
        )))
    }
}
