//! Band stacking and radiometric balance.
//!
//! The compositor takes three single-band rasters, stacks them in band-set
//! order, and applies a deterministic two-stage balance: a max-stretch so
//! the brightest valid sample maps to 255, then a mean-recentre that scales
//! the whole image so the average valid brightness lands on mid grey (125).
//! The recentre exists because a pure max-stretch leaves ocean scenes nearly
//! black and cloud scenes blown out; pinning the mean makes scenes of any
//! dynamic range publishable. Exact-zero samples are no-data and are
//! excluded from both statistics (they stay black in the output).

use image::{Rgb, RgbImage};
use std::path::Path;
use thiserror::Error;

/// Mid-grey target for the mean-recentre stage.
const TARGET_MEAN: f64 = 125.0;

/// Errors from raster loading and compositing.
#[derive(Debug, Error)]
pub enum CompositeError {
    #[error("band shapes differ: {0}x{1} vs {2}x{3}")]
    ShapeMismatch(u32, u32, u32, u32),

    #[error("no valid (non-zero) pixels to balance")]
    NoValidPixels,

    #[error("failed to read band {path}: {message}")]
    BandRead { path: String, message: String },

    /// The band file's encoding is not one the decoder stack can read.
    /// Distinct from [`CompositeError::BandRead`]: a damaged file varies per
    /// product, an unsupported encoding recurs on every product.
    #[error("band {path} uses an unsupported encoding: {message}")]
    UnsupportedFormat { path: String, message: String },
}

/// A single-band raster of 16-bit samples in row-major order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BandRaster {
    width: u32,
    height: u32,
    data: Vec<u16>,
}

impl BandRaster {
    /// Wraps raw samples. `data.len()` must equal `width * height`.
    pub fn new(width: u32, height: u32, data: Vec<u16>) -> Self {
        assert_eq!(
            data.len(),
            (width as usize) * (height as usize),
            "sample count must match raster dimensions"
        );
        Self {
            width,
            height,
            data,
        }
    }

    /// Decodes a band file and resamples it to the target grid.
    ///
    /// Granule files carry container extensions the decoder registry does
    /// not map, so the format is sniffed from content. A format the stack
    /// has no decoder for is reported as [`CompositeError::UnsupportedFormat`]
    /// so the outer loop can tell a recurring condition from a one-off
    /// damaged file; everything else maps to a read failure.
    pub fn open(path: &Path, target_shape: (u32, u32)) -> Result<Self, CompositeError> {
        let band_read = |e: &dyn std::fmt::Display| CompositeError::BandRead {
            path: path.display().to_string(),
            message: e.to_string(),
        };
        let decoded = image::ImageReader::open(path)
            .map_err(|e| band_read(&e))?
            .with_guessed_format()
            .map_err(|e| band_read(&e))?
            .decode()
            .map_err(|e| match e {
                image::ImageError::Unsupported(err) => CompositeError::UnsupportedFormat {
                    path: path.display().to_string(),
                    message: err.to_string(),
                },
                other => band_read(&other),
            })?;
        let gray = decoded.to_luma16();
        let raster = Self::new(gray.width(), gray.height(), gray.into_raw());
        Ok(raster.resample_to(target_shape))
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn shape(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn samples(&self) -> &[u16] {
        &self.data
    }

    /// Nearest-neighbour resample to the target grid. Returns a clone-shaped
    /// copy when the shape already matches.
    pub fn resample_to(&self, target_shape: (u32, u32)) -> Self {
        let (tw, th) = target_shape;
        if (self.width, self.height) == (tw, th) {
            return self.clone();
        }

        let mut data = Vec::with_capacity((tw as usize) * (th as usize));
        for y in 0..th {
            let src_y = ((y as u64) * (self.height as u64) / (th as u64)) as u32;
            for x in 0..tw {
                let src_x = ((x as u64) * (self.width as u64) / (tw as u64)) as u32;
                data.push(self.data[(src_y as usize) * (self.width as usize) + src_x as usize]);
            }
        }
        Self::new(tw, th, data)
    }
}

/// Stacks three bands and applies the radiometric balance.
///
/// Bands must already share `target_shape`; the caller resamples on load.
/// Channel order follows the band set (red slot first).
pub fn composite(
    bands: &[BandRaster; 3],
    target_shape: (u32, u32),
) -> Result<RgbImage, CompositeError> {
    for band in bands {
        if band.shape() != target_shape {
            return Err(CompositeError::ShapeMismatch(
                band.width,
                band.height,
                target_shape.0,
                target_shape.1,
            ));
        }
    }

    // Statistics over valid (non-zero) samples across all three planes.
    let mut max_sample: u16 = 0;
    let mut valid_sum: u64 = 0;
    let mut valid_count: u64 = 0;
    for band in bands {
        for &sample in band.samples() {
            if sample != 0 {
                max_sample = max_sample.max(sample);
                valid_sum += sample as u64;
                valid_count += 1;
            }
        }
    }
    if valid_count == 0 {
        return Err(CompositeError::NoValidPixels);
    }

    // Stage one: masked max maps to 255.
    let stretch = 255.0 / max_sample as f64;
    // Stage two: masked mean of the stretched data maps to mid grey.
    let stretched_mean = (valid_sum as f64 / valid_count as f64) * stretch;
    let recentre = TARGET_MEAN / stretched_mean;
    let gain = stretch * recentre;

    let (width, height) = target_shape;
    let mut out = RgbImage::new(width, height);
    let plane = (width as usize) * (height as usize);
    for i in 0..plane {
        let pixel = Rgb([
            balance_sample(bands[0].data[i], gain),
            balance_sample(bands[1].data[i], gain),
            balance_sample(bands[2].data[i], gain),
        ]);
        out.put_pixel((i % width as usize) as u32, (i / width as usize) as u32, pixel);
    }
    Ok(out)
}

#[inline]
fn balance_sample(sample: u16, gain: f64) -> u8 {
    (sample as f64 * gain).clamp(0.0, 255.0) as u8
}
