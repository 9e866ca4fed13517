//! Product directory layout detection.
//!
//! An extracted product contains a single `*.SAFE` directory with granule
//! image data at `GRANULE/<granule>/IMG_DATA`. Level-1C products keep band
//! files directly in `IMG_DATA`; Level-2A products nest resolution
//! subdirectories and the 10 m bands live in `IMG_DATA/R10m` with a `_10m`
//! file-name suffix. Detection is an explicit directory walk, so it can be
//! exercised against synthetic fixture trees.

use super::bandset::Band;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Failures while resolving the band files of an extracted product.
#[derive(Debug, Error)]
pub enum LayoutError {
    #[error("no product directory under {0}")]
    NoProduct(PathBuf),

    #[error("no granule directory under {0}")]
    NoGranule(PathBuf),

    #[error("no IMG_DATA directory under {0}")]
    NoImageData(PathBuf),

    #[error("no file matching band {band} in {dir}")]
    MissingBand { band: String, dir: PathBuf },

    #[error("I/O error reading {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// The detected granule layout, tagged by processing level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BandLayout {
    /// Bands directly under `IMG_DATA`.
    Level1C { image_dir: PathBuf },
    /// 10 m bands under `IMG_DATA/R10m`.
    Level2A { image_dir: PathBuf },
}

impl BandLayout {
    /// Whether this layout belongs to an atmospherically corrected product.
    pub fn is_atmospherically_corrected(&self) -> bool {
        matches!(self, BandLayout::Level2A { .. })
    }

    fn image_dir(&self) -> &Path {
        match self {
            BandLayout::Level1C { image_dir } => image_dir,
            BandLayout::Level2A { image_dir } => image_dir,
        }
    }

    /// Resolves the file for one band by suffix match against the directory
    /// contents. Granule files carry tile/timestamp prefixes that vary per
    /// product, so only the band suffix is matched.
    pub fn band_path(&self, band: Band) -> Result<PathBuf, LayoutError> {
        let suffix = band.file_name(self.is_atmospherically_corrected());
        let dir = self.image_dir();

        for entry in read_dir(dir)? {
            let path = entry.map_err(|e| io_error(dir, e))?.path();
            if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                if name.ends_with(&suffix) {
                    return Ok(path);
                }
            }
        }

        Err(LayoutError::MissingBand {
            band: suffix,
            dir: dir.to_path_buf(),
        })
    }
}

/// Walks an extraction root and classifies the granule layout.
pub fn locate_bands(extracted_root: &Path) -> Result<BandLayout, LayoutError> {
    let product_dir = single_subdir(extracted_root)?
        .ok_or_else(|| LayoutError::NoProduct(extracted_root.to_path_buf()))?;

    let granule_root = product_dir.join("GRANULE");
    let granule_dir = single_subdir(&granule_root)?
        .ok_or_else(|| LayoutError::NoGranule(product_dir.clone()))?;

    let image_data = granule_dir.join("IMG_DATA");
    if !image_data.is_dir() {
        return Err(LayoutError::NoImageData(granule_dir));
    }

    let r10m = image_data.join("R10m");
    let layout = if r10m.is_dir() {
        BandLayout::Level2A { image_dir: r10m }
    } else {
        BandLayout::Level1C {
            image_dir: image_data,
        }
    };
    debug!(?layout, "granule layout detected");
    Ok(layout)
}

/// First subdirectory of `dir`, or `None` if there is none.
fn single_subdir(dir: &Path) -> Result<Option<PathBuf>, LayoutError> {
    if !dir.is_dir() {
        return Ok(None);
    }
    for entry in read_dir(dir)? {
        let path = entry.map_err(|e| io_error(dir, e))?.path();
        if path.is_dir() {
            return Ok(Some(path));
        }
    }
    Ok(None)
}

fn read_dir(dir: &Path) -> Result<fs::ReadDir, LayoutError> {
    fs::read_dir(dir).map_err(|e| io_error(dir, e))
}

fn io_error(path: &Path, source: std::io::Error) -> LayoutError {
    LayoutError::Io {
        path: path.to_path_buf(),
        source,
    }
}
